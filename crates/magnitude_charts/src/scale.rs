use serde::Serialize;

/// Linear map from a numeric domain to a pixel range.
///
/// A degenerate domain (`[0, 0]` for an empty segment) maps everything to
/// `range_min`; a degenerate range inverts everything to `domain_min`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LinearScale {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl LinearScale {
    pub fn new(domain_min: f64, domain_max: f64, range_min: f64, range_max: f64) -> Self {
        Self {
            domain_min,
            domain_max,
            range_min,
            range_max,
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    pub fn range(&self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }

    pub fn map(&self, value: f64) -> f64 {
        let d = self.domain_max - self.domain_min;
        if d.abs() < 1e-12 {
            return self.range_min;
        }
        let t = (value - self.domain_min) / d;
        self.range_min + t * (self.range_max - self.range_min)
    }

    pub fn invert(&self, px: f64) -> f64 {
        let r = self.range_max - self.range_min;
        if r.abs() < 1e-12 {
            return self.domain_min;
        }
        let t = (px - self.range_min) / r;
        self.domain_min + t * (self.domain_max - self.domain_min)
    }

    /// `count` evenly spaced domain values, endpoints included.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let n = count.max(2);
        let span = self.domain_max - self.domain_min;
        (0..n)
            .map(|i| self.domain_min + span * (i as f64 / (n - 1) as f64))
            .collect()
    }
}
