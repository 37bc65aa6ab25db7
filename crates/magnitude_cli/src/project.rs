//! Sample configuration scaffolding

use anyhow::Result;
use magnitude_charts::ChartConfig;
use std::fs;
use std::path::Path;

use crate::config::{MagnitudeConfig, CONFIG_FILE};

const DATA_FILE: &str = "data.txt";

/// Write magnitude.toml and a sample data file into `path`
pub fn create_project(path: &Path, force: bool) -> Result<()> {
    let config_path = path.join(CONFIG_FILE);
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    fs::create_dir_all(path)?;

    let config = MagnitudeConfig {
        data_file: Some(DATA_FILE.to_string()),
        chart: ChartConfig::new(Vec::new(), vec![0.0, 10.0, 100.0, 1000.0, 10000.0])
            .with_bin_size(vec![2.0, 20.0, 200.0, 2000.0]),
        ..MagnitudeConfig::default()
    };
    fs::write(&config_path, config.to_toml()?)?;
    fs::write(path.join(DATA_FILE), sample_data())?;

    tracing::info!(path = %path.display(), "created sample chart");
    Ok(())
}

/// Log-spread samples covering every decade of the sample domains
fn sample_data() -> String {
    let mut out = String::new();
    for decade in 0..4 {
        let base = 10f64.powi(decade);
        let line: Vec<String> = (1..10)
            .flat_map(|m| std::iter::repeat(m).take(10 - m))
            .map(|m| format!("{}", base * m as f64))
            .collect();
        out.push_str(&line.join(", "));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_samples;

    #[test]
    fn sample_data_parses_and_skews_low() {
        let v = parse_samples(&sample_data()).expect("valid samples");
        assert_eq!(v.len(), 4 * 45);
        let below_five = v.iter().filter(|&&x| x < 5.0).count();
        let five_to_ten = v.iter().filter(|&&x| (5.0..10.0).contains(&x)).count();
        assert!(below_five > five_to_ten);
    }
}
