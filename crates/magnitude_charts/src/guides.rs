//! Reference lines drawn over the chart: custom grid, connected count lines,
//! vertical markers and the tick connectors across active zones.

use serde::Serialize;

use crate::prism::{PrismGeometry, PrismMetrics};
use crate::segmented::SegmentedScale;
use crate::y_scale::SegmentYScales;

/// Ticks per scale used for zone connectors.
pub const CONNECTOR_TICKS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GuideLine {
    pub from: [f64; 2],
    pub to: [f64; 2],
}

impl GuideLine {
    fn vertical(x: f64, plot_height: f64) -> Self {
        Self {
            from: [x, 0.0],
            to: [x, plot_height],
        }
    }

    fn horizontal(x0: f64, x1: f64, y: f64) -> Self {
        Self {
            from: [x0, y],
            to: [x1, y],
        }
    }
}

/// Guide geometry over one layout snapshot.
#[derive(Clone, Copy, Debug)]
pub struct Guides<'a> {
    pub xs: &'a SegmentedScale<'a>,
    pub ys: &'a SegmentYScales,
    pub metrics: &'a PrismMetrics,
    pub plot_height: f64,
}

impl<'a> Guides<'a> {
    pub fn vertical_lines(&self, values: &[f64]) -> Vec<GuideLine> {
        values
            .iter()
            .filter(|v| v.is_finite())
            .map(|&v| GuideLine::vertical(self.xs.forward(v), self.plot_height))
            .collect()
    }

    /// Vertical lines at `xs` plus per-segment horizontal lines at each count.
    ///
    /// A count plotted above the top of the value range (offset geometry only)
    /// is drawn narrowed towards the apex of the zone at the segment start.
    pub fn custom_grid_line(&self, xs: &[f64], counts: &[f64]) -> Vec<GuideLine> {
        let mut lines = self.vertical_lines(xs);
        let top = self.metrics.top_y();
        let w = self.metrics.width;
        let x_bins = self.xs.x_bins();

        for &count in counts.iter().filter(|c| c.is_finite()) {
            for (i, scale) in self.ys.iter().enumerate() {
                let y = scale.map(count);
                if !(0.0..=self.plot_height).contains(&y) {
                    continue;
                }
                if y >= top {
                    let (left, right) = self.xs.segment_range(i);
                    lines.push(GuideLine::horizontal(left, right, y));
                } else {
                    let t = y / top;
                    let apex = x_bins[i] + w / 2.0;
                    let left = apex + t * (x_bins[i] - apex);
                    let right = apex + t * (x_bins[i] + w - apex);
                    lines.push(GuideLine::horizontal(left, right, y));
                }
            }
        }
        lines
    }

    /// Polyline through `count` on every segment, sloping across each zone.
    pub fn horizontal_line(&self, count: f64) -> Vec<[f64; 2]> {
        let x = self.xs.x_bins();
        let w = self.metrics.width;
        let mut scales = self.ys.iter().map(|s| s.map(count));
        let Some(mut prev) = scales.next() else {
            return Vec::new();
        };

        let mut points = vec![[x[0], prev], [x[1], prev]];
        for (k, y) in scales.enumerate() {
            let i = k + 1;
            points.extend([
                [x[i], prev],
                [x[i] + w, y],
                [x[i] + w, y],
                [x[i + 1], y],
            ]);
            prev = y;
        }
        points
    }

    pub fn horizontal_lines(&self, counts: &[f64]) -> Vec<Vec<[f64; 2]>> {
        counts
            .iter()
            .filter(|c| c.is_finite())
            .map(|&c| self.horizontal_line(c))
            .collect()
    }

    /// Tick connectors across every active flat zone.
    ///
    /// For the zone right of segment `i`, ticks of both neighbouring scales
    /// run from their height on scale `i` at the zone start to their height on
    /// scale `i + 1` at the boundary.
    pub fn prism_connectors(&self) -> Vec<GuideLine> {
        if self.metrics.geometry != PrismGeometry::Flat {
            return Vec::new();
        }
        let x = self.xs.x_bins();
        let mut lines = Vec::new();
        for i in 0..self.ys.len().saturating_sub(1) {
            if !self.xs.is_zone_active(i + 1) {
                continue;
            }
            let (Some(left), Some(right)) = (self.ys.get(i), self.ys.get(i + 1)) else {
                continue;
            };
            let x1 = x[i + 1];
            let x0 = x1 - self.metrics.width;
            let ticks = left
                .ticks(CONNECTOR_TICKS)
                .into_iter()
                .chain(right.ticks(CONNECTOR_TICKS));
            lines.extend(ticks.map(|d| GuideLine {
                from: [x0, left.map(d)],
                to: [x1, right.map(d)],
            }));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::make_bins;

    static B: [f64; 3] = [0.0, 10.0, 100.0];
    static X: [f64; 3] = [0.0, 200.0, 400.0];

    fn metrics(geometry: PrismGeometry) -> PrismMetrics {
        PrismMetrics {
            width: 20.0,
            apex_offset: 5.0,
            hover_zone_width: 12.0,
            geometry,
        }
    }

    fn y_scales(top: f64) -> SegmentYScales {
        // Segment 0 peaks at 4, segment 1 at 2.
        let bins = make_bins(&[1.0, 1.1, 1.2, 1.3, 50.0, 51.0], &B, &[1.0, 10.0]);
        SegmentYScales::compute(&bins, 2, 100.0, top)
    }

    #[test]
    fn horizontal_line_slopes_across_zone() {
        let active = [false, true, false];
        let xs = SegmentedScale::new(&B, &X, &active, 20.0, PrismGeometry::Flat);
        let ys = y_scales(0.0);
        let m = metrics(PrismGeometry::Flat);
        let g = Guides {
            xs: &xs,
            ys: &ys,
            metrics: &m,
            plot_height: 100.0,
        };
        assert_eq!(
            g.horizontal_line(2.0),
            vec![
                [0.0, 50.0],
                [200.0, 50.0],
                [200.0, 50.0],
                [220.0, 0.0],
                [220.0, 0.0],
                [400.0, 0.0]
            ]
        );
        assert_eq!(g.horizontal_lines(&[1.0, f64::NAN]).len(), 1);
    }

    #[test]
    fn grid_skips_counts_off_the_plot() {
        let active = [false; 3];
        let xs = SegmentedScale::new(&B, &X, &active, 20.0, PrismGeometry::Flat);
        let ys = y_scales(0.0);
        let m = metrics(PrismGeometry::Flat);
        let g = Guides {
            xs: &xs,
            ys: &ys,
            metrics: &m,
            plot_height: 100.0,
        };
        // Count 3 fits segment 0 (y = 25) but overshoots segment 1 (y = -50).
        let lines = g.custom_grid_line(&[5.0], &[3.0]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], GuideLine::vertical(100.0, 100.0));
        assert_eq!(lines[1], GuideLine::horizontal(0.0, 200.0, 25.0));
    }

    #[test]
    fn grid_narrows_above_top_in_offset_geometry() {
        let active = [false; 3];
        let xs = SegmentedScale::new(&B, &X, &active, 20.0, PrismGeometry::Offset);
        // Scales end at y = 0 while the value range tops out at 5.
        let ys = y_scales(0.0);
        let m = metrics(PrismGeometry::Offset);
        let g = Guides {
            xs: &xs,
            ys: &ys,
            metrics: &m,
            plot_height: 100.0,
        };
        let lines = g.custom_grid_line(&[], &[4.0]);
        // Segment 0 tops out at y = 0: narrowed fully onto the apex.
        assert_eq!(lines[0], GuideLine::horizontal(10.0, 10.0, 0.0));
    }

    #[test]
    fn connectors_only_for_active_flat_zones() {
        let ys = y_scales(0.0);
        let m = metrics(PrismGeometry::Flat);

        let collapsed = [false; 3];
        let xs = SegmentedScale::new(&B, &X, &collapsed, 20.0, PrismGeometry::Flat);
        let g = Guides {
            xs: &xs,
            ys: &ys,
            metrics: &m,
            plot_height: 100.0,
        };
        assert!(g.prism_connectors().is_empty());

        let active = [false, true, false];
        let xs = SegmentedScale::new(&B, &X, &active, 20.0, PrismGeometry::Flat);
        let g = Guides {
            xs: &xs,
            ys: &ys,
            metrics: &m,
            plot_height: 100.0,
        };
        let lines = g.prism_connectors();
        assert_eq!(lines.len(), 2 * CONNECTOR_TICKS);
        assert_eq!(lines[0].from, [180.0, 100.0]);
        assert_eq!(lines[0].to, [200.0, 100.0]);
    }
}
