use serde::Serialize;

use crate::config::GeometryConfig;

/// 1D numeric domain (min..max).
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Domain1D {
    pub min: f64,
    pub max: f64,
}

impl Domain1D {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Build from two endpoints in either order.
    pub fn sorted(a: f64, b: f64) -> Self {
        if a <= b {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }
}

/// Pixel layout of one chart: plot area, margins and the brush strip.
///
/// Every coordinate the engine produces is relative to the plot origin
/// (top-left of the plot area); margins only matter to the host surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PlotLayout {
    pub width: f64,
    pub height: f64,
    /// Margins (top, right, bottom, left).
    pub margins: [f64; 4],
    pub brush_offset: f64,
    pub brush_height: f64,
}

impl PlotLayout {
    pub fn from_config(g: &GeometryConfig) -> Self {
        Self {
            width: g.width,
            height: g.height,
            margins: [g.margin_top, g.margin_right, g.margin_bottom, g.margin_left],
            brush_offset: g.brush_offset,
            brush_height: g.brush_height,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_domain_orders_endpoints() {
        assert_eq!(Domain1D::sorted(8.0, 2.0), Domain1D::new(2.0, 8.0));
        assert_eq!(Domain1D::sorted(-1.0, 4.0), Domain1D::new(-1.0, 4.0));
    }

    #[test]
    fn layout_copies_margins_and_rejects_empty_plots() {
        let mut g = GeometryConfig::default();
        let layout = PlotLayout::from_config(&g);
        assert_eq!(layout.margins, [80.0, 20.0, 30.0, 40.0]);
        assert!(layout.is_valid());

        g.height = f64::NAN;
        assert!(!PlotLayout::from_config(&g).is_valid());
    }
}
