//! magnitude.toml handling

use anyhow::{Context, Result};
use magnitude_charts::ChartConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "magnitude.toml";

/// Top-level CLI configuration (magnitude.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MagnitudeConfig {
    /// Extra samples, one number per token, appended to `chart.data`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<String>,
    #[serde(default)]
    pub chart: ChartConfig,
    /// Directory the config was loaded from
    #[serde(skip)]
    pub root: PathBuf,
}

impl MagnitudeConfig {
    /// Load configuration from a file, or from magnitude.toml inside a directory
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = if path.is_file() {
            path.to_path_buf()
        } else {
            path.join(CONFIG_FILE)
        };

        if !config_path.exists() {
            anyhow::bail!(
                "No {} found in {}. Run `magnitude init` to create one.",
                CONFIG_FILE,
                path.display()
            );
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let mut config: MagnitudeConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;
        config.root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    /// Chart configuration with `data_file` samples merged in
    pub fn resolve_chart(&self) -> Result<ChartConfig> {
        let mut chart = self.chart.clone();
        if let Some(file) = &self.data_file {
            let path = self.root.join(file);
            chart.data.extend(read_samples(&path)?);
        }
        Ok(chart)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Read a sample file: numbers separated by whitespace, commas or newlines
pub fn read_samples(path: &Path) -> Result<Vec<f64>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;
    parse_samples(&content).with_context(|| format!("Invalid data file {}", path.display()))
}

pub fn parse_samples(content: &str) -> Result<Vec<f64>> {
    content
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .enumerate()
        .map(|(i, t)| {
            t.parse::<f64>()
                .with_context(|| format!("token {} ({t:?}) is not a number", i + 1))
        })
        .collect()
}
