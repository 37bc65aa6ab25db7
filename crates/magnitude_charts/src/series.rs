//! Renderer-facing series derived from bins, one flavour per [`SeriesKind`].

use serde::Serialize;

use crate::binning::BinSet;
use crate::config::SeriesKind;
use crate::segmented::SegmentedScale;
use crate::y_scale::SegmentYScales;

/// One histogram bar in plot pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BarRect {
    pub x: f64,
    pub y: f64,
    /// One pixel narrower than the bin so adjacent bars stay apart.
    pub width: f64,
    pub height: f64,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum DerivedSeries {
    Bar(Vec<BarRect>),
    /// Polyline vertices, padded with a zero point on both ends.
    Line(Vec<[f64; 2]>),
}

impl DerivedSeries {
    pub fn kind(&self) -> SeriesKind {
        match self {
            DerivedSeries::Bar(_) => SeriesKind::Bar,
            DerivedSeries::Line(_) => SeriesKind::Line,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DerivedSeries::Bar(v) => v.len(),
            DerivedSeries::Line(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DerivedSeries {
    fn default() -> Self {
        DerivedSeries::Line(Vec::new())
    }
}

pub fn bar_series(
    bins: &BinSet,
    xs: &SegmentedScale<'_>,
    ys: &SegmentYScales,
    plot_height: f64,
) -> Vec<BarRect> {
    bins.iter()
        .map(|b| {
            let (p0, p1) = (xs.forward(b.x0), xs.forward(b.x1));
            let y = ys.scale_for_bin(b, xs).map(b.count() as f64);
            BarRect {
                x: p0.min(p1),
                y,
                width: ((p1 - p0).abs() - 1.0).max(0.0),
                height: plot_height - y,
                count: b.count(),
            }
        })
        .collect()
}

pub fn line_series(bins: &BinSet, xs: &SegmentedScale<'_>, ys: &SegmentYScales) -> Vec<[f64; 2]> {
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Vec::new();
    };

    let zero_at = |x: f64| [xs.forward(x), ys.scale_at(x, xs).map(0.0)];
    let mut points = Vec::with_capacity(bins.len() + 2);
    points.push(zero_at(first.x0));
    points.extend(bins.iter().map(|b| {
        let x = xs.forward(b.x0).min(xs.forward(b.x1));
        [x, ys.scale_for_bin(b, xs).map(b.count() as f64)]
    }));
    points.push(zero_at(last.x1));
    points
}

pub fn derive(
    kind: SeriesKind,
    bins: &BinSet,
    xs: &SegmentedScale<'_>,
    ys: &SegmentYScales,
    plot_height: f64,
) -> DerivedSeries {
    match kind {
        SeriesKind::Bar => DerivedSeries::Bar(bar_series(bins, xs, ys, plot_height)),
        SeriesKind::Line => DerivedSeries::Line(line_series(bins, xs, ys)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::make_bins;
    use crate::prism::PrismGeometry;

    static B: [f64; 3] = [0.0, 10.0, 100.0];
    static X: [f64; 3] = [0.0, 200.0, 400.0];
    static ACTIVE: [bool; 3] = [false; 3];

    fn fixture() -> (BinSet, SegmentYScales) {
        let bins = make_bins(&[1.0, 1.5, 3.0, 50.0], &B, &[2.0, 10.0]);
        let ys = SegmentYScales::compute(&bins, 2, 100.0, 0.0);
        (bins, ys)
    }

    #[test]
    fn bars_leave_a_pixel_gap() {
        let (bins, ys) = fixture();
        let xs = SegmentedScale::new(&B, &X, &ACTIVE, 20.0, PrismGeometry::Flat);
        let bars = bar_series(&bins, &xs, &ys, 100.0);
        assert_eq!(bars.len(), 3);
        // [0,2) spans 40px, holds the segment's peak count.
        assert_eq!(
            bars[0],
            BarRect {
                x: 0.0,
                y: 0.0,
                width: 39.0,
                height: 100.0,
                count: 2
            }
        );
        assert_eq!(bars[1].y, 50.0);
        assert_eq!(bars[2].height, 100.0);
    }

    #[test]
    fn line_is_padded_with_zero_points() {
        let (bins, ys) = fixture();
        let xs = SegmentedScale::new(&B, &X, &ACTIVE, 20.0, PrismGeometry::Flat);
        let line = line_series(&bins, &xs, &ys);
        assert_eq!(line.len(), bins.len() + 2);
        assert_eq!(line[0], [0.0, 100.0]);
        assert_eq!(line[1], [0.0, 0.0]);
        // Last bin is [50,60): padding sits at 60 -> 311.1px.
        let end = line[line.len() - 1];
        assert!((end[0] - (200.0 + 50.0 / 90.0 * 200.0)).abs() < 1e-9);
        assert_eq!(end[1], 100.0);
    }

    #[test]
    fn empty_bins_give_empty_series() {
        let ys = SegmentYScales::default();
        let xs = SegmentedScale::new(&B, &X, &ACTIVE, 20.0, PrismGeometry::Flat);
        let s = derive(SeriesKind::Line, &BinSet::empty(), &xs, &ys, 100.0);
        assert!(s.is_empty());
        assert_eq!(s.kind(), SeriesKind::Line);
    }
}
