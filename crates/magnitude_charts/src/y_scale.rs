use serde::Serialize;

use crate::binning::{Bin, BinSet};
use crate::interpolate::{lerp, unlerp};
use crate::prism::PrismGeometry;
use crate::scale::LinearScale;
use crate::segmented::SegmentedScale;

/// Count -> pixel-height scale for one bin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BinScale {
    /// The bin's own segment scale.
    Segment(LinearScale),
    /// Inside an active zone: `(1 - t) * left(v) + t * right(v)`.
    Blend {
        left: LinearScale,
        right: LinearScale,
        t: f64,
    },
}

impl BinScale {
    pub fn map(&self, count: f64) -> f64 {
        match *self {
            BinScale::Segment(s) => s.map(count),
            BinScale::Blend { left, right, t } => lerp(left.map(count), right.map(count), t),
        }
    }
}

/// One count scale per segment.
///
/// Segment `i` maps `[0, maxCount_i]` to `[plot_height, top_y]`, where
/// `maxCount_i` is the largest bin count observed in that segment.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SegmentYScales {
    scales: Vec<LinearScale>,
}

impl SegmentYScales {
    pub fn compute(bins: &BinSet, segments: usize, plot_height: f64, top_y: f64) -> Self {
        let scales = (0..segments)
            .map(|i| {
                let max = bins.segment_max_count(i) as f64;
                LinearScale::new(0.0, max, plot_height, top_y)
            })
            .collect();
        Self { scales }
    }

    pub fn len(&self) -> usize {
        self.scales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    pub fn get(&self, segment: usize) -> Option<&LinearScale> {
        self.scales.get(segment)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LinearScale> {
        self.scales.iter()
    }

    /// `maxCount_i` per segment.
    pub fn max_counts(&self) -> Vec<f64> {
        self.scales.iter().map(|s| s.domain().1).collect()
    }

    /// Scale for a bin starting at domain position `x0`.
    ///
    /// Blends with the next segment's scale when `x0` is plotted inside the
    /// active flat zone on the right edge of its segment; `t` runs from 0 at
    /// the zone start to 1 at the shared boundary.
    pub fn scale_at(&self, x0: f64, xs: &SegmentedScale<'_>) -> BinScale {
        let i = xs.segment_index_of(x0).min(self.scales.len().saturating_sub(1));
        let own = self.scales[i];
        let blends = xs.geometry() == PrismGeometry::Flat
            && xs.is_zone_active(i + 1)
            && xs.inside_prism_zone(x0);
        if !blends {
            return BinScale::Segment(own);
        }
        let prism_pos = xs.forward(xs.boundaries()[i + 1]);
        let t = unlerp(prism_pos - xs.prism_width(), prism_pos, xs.forward(x0));
        BinScale::Blend {
            left: own,
            right: self.scales[i + 1],
            t,
        }
    }

    pub fn scale_for_bin(&self, bin: &Bin, xs: &SegmentedScale<'_>) -> BinScale {
        self.scale_at(bin.x0, xs)
    }
}
