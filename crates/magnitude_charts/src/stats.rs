//! Distribution markers for the overview strip above the chart.

use serde::Serialize;

/// `p`-quantile of ascending `sorted` by linear interpolation between ranks.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || !p.is_finite() {
        return None;
    }
    let p = p.clamp(0.0, 1.0);
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (h - lo as f64))
}

/// 10%..90% quantiles.
pub fn deciles(sorted: &[f64]) -> Vec<f64> {
    (1..10)
        .filter_map(|k| quantile_sorted(sorted, k as f64 / 10.0))
        .collect()
}

/// Fraction of `sorted` strictly below `value`.
pub fn fraction_below(sorted: &[f64], value: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.partition_point(|&v| v < value) as f64 / sorted.len() as f64
}

/// Overview markers: data deciles and the share of data left of each interior boundary.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Overview {
    pub deciles: Vec<f64>,
    pub boundary_fractions: Vec<f64>,
}

impl Overview {
    pub fn compute(sorted: &[f64], boundaries: &[f64]) -> Self {
        let interior = boundaries
            .get(1..boundaries.len().saturating_sub(1))
            .unwrap_or_default();
        Self {
            deciles: deciles(sorted),
            boundary_fractions: interior
                .iter()
                .map(|&b| fraction_below(sorted, b))
                .collect(),
        }
    }
}
