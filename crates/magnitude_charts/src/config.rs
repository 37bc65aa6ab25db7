//! Chart construction options

use serde::{Deserialize, Serialize};

use crate::prism::{PrismGeometry, PrismMode};

/// Which derived series the renderer consumes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Bar,
    #[default]
    Line,
}

/// Auto-insert the data's min/max as outer boundaries when they fall outside `domains`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct DomainAuto {
    #[serde(default = "default_true")]
    pub min: bool,
    #[serde(default = "default_true")]
    pub max: bool,
}

impl Default for DomainAuto {
    fn default() -> Self {
        Self {
            min: true,
            max: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Plot area and surrounding chrome, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeometryConfig {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_right: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    /// Gap between the brush strip and the plot top
    pub brush_offset: f64,
    pub brush_height: f64,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 200.0,
            margin_top: 80.0,
            margin_right: 20.0,
            margin_bottom: 30.0,
            margin_left: 40.0,
            brush_offset: 20.0,
            brush_height: 8.0,
        }
    }
}

const PRISM_SCALE: f64 = 0.666;

/// Transition zone ("prism") settings.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PrismConfig {
    /// Fixed pixel width of a zone
    pub width: f64,
    /// Apex offset used as the top of the value range in offset geometry
    pub apex_offset: f64,
    /// Minimum pixel gap a dragged boundary keeps from its neighbours
    pub min_gap: f64,
    /// Width of the hover affordance left of each boundary
    pub hover_zone_width: f64,
    /// Bins per segment targeted when a split recomputes bin widths
    pub resolution: f64,
    pub geometry: PrismGeometry,
    pub mode: PrismMode,
}

impl Default for PrismConfig {
    fn default() -> Self {
        Self {
            width: 40.0 * PRISM_SCALE,
            apex_offset: 10.0 * PRISM_SCALE,
            min_gap: 50.0,
            hover_zone_width: 12.0,
            resolution: 50.0,
            geometry: PrismGeometry::Flat,
            mode: PrismMode::Install,
        }
    }
}

/// Everything a host passes when creating a chart.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Primary samples
    pub data: Vec<f64>,
    /// Initial segment boundaries, ascending
    pub domains: Vec<f64>,
    /// Initial pixel boundaries as fractions (0..1) of the plot width
    pub x_bins: Vec<f64>,
    /// Per-segment bin width
    pub bin_size: Vec<f64>,
    pub domain_auto: DomainAuto,
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub geometry: GeometryConfig,
    pub prism: PrismConfig,
}

impl ChartConfig {
    pub fn new(data: Vec<f64>, domains: Vec<f64>) -> Self {
        Self {
            data,
            domains,
            ..Self::default()
        }
    }

    pub fn with_x_bins(mut self, x_bins: Vec<f64>) -> Self {
        self.x_bins = x_bins;
        self
    }

    pub fn with_bin_size(mut self, bin_size: Vec<f64>) -> Self {
        self.bin_size = bin_size;
        self
    }

    pub fn with_domain_auto(mut self, min: bool, max: bool) -> Self {
        self.domain_auto = DomainAuto { min, max };
        self
    }

    pub fn with_prism(mut self, prism: PrismConfig) -> Self {
        self.prism = prism;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_widget_geometry() {
        let c = ChartConfig::default();
        assert_eq!(c.kind, SeriesKind::Line);
        assert_eq!(c.geometry.width, 400.0);
        assert!((c.prism.width - 26.64).abs() < 1e-9);
        assert_eq!(c.prism.min_gap, 50.0);
        assert_eq!(c.prism.geometry, PrismGeometry::Flat);
        assert_eq!(c.prism.mode, PrismMode::Install);
        assert!(c.domain_auto.min && c.domain_auto.max);
    }

    #[test]
    fn deserializes_partial_json() {
        let c: ChartConfig = serde_json::from_str(
            r#"{"data":[1,2],"domains":[0,10],"type":"bar","prism":{"mode":"hover"}}"#,
        )
        .expect("valid config");
        assert_eq!(c.kind, SeriesKind::Bar);
        assert_eq!(c.prism.mode, PrismMode::Hover);
        assert_eq!(c.prism.geometry, PrismGeometry::Flat);
        assert_eq!(c.geometry.height, 200.0);
    }
}
