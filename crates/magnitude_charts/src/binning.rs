//! Per-segment histogram binning.
//!
//! Each segment `[boundaries[i], boundaries[i+1])` is cut on the grid of
//! integer multiples of its bin width, clipped to the segment, so the first
//! and last bin of a segment may be shorter than the width. The last segment
//! is closed on the right. Only bins that received at least one value are kept.

use serde::Serialize;

/// Upper bound on bins generated for one segment; wider grids are coarsened.
pub const MAX_BINS_PER_SEGMENT: usize = 1 << 16;

/// Domain range `[x0, x1)` inside one segment and the values it holds.
///
/// The last bin of the last segment is `[x0, x1]`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bin {
    pub x0: f64,
    pub x1: f64,
    pub segment: usize,
    /// Values in ascending order.
    pub values: Vec<f64>,
    #[serde(skip)]
    closed: bool,
}

impl Bin {
    pub fn count(&self) -> usize {
        self.values.len()
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.x0 && (v < self.x1 || (self.closed && v == self.x1))
    }
}

/// Bin grid of a single segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentGrid {
    pub start: f64,
    pub end: f64,
    pub width: f64,
    origin: f64,
    first: i64,
    last: i64,
}

impl SegmentGrid {
    /// Grid for `[start, end)` with the requested bin width.
    ///
    /// Cells sit on integer multiples of `width` rather than starting at
    /// `start`, so a segment whose start is not a multiple gets a short first
    /// bin and may hold one bin more than `(end - start) / width`. For example
    /// `[10, 50)` with width 0.8 starts with `[10, 10.4)`.
    ///
    /// A non-finite or non-positive width yields a single bin; a width that
    /// would exceed [`MAX_BINS_PER_SEGMENT`] bins is widened and anchored at
    /// `start` instead of zero.
    pub fn new(start: f64, end: f64, width: f64) -> Self {
        let span = end - start;
        let (width, origin) = if !(width.is_finite() && width > 0.0) {
            (span, start)
        } else if span / width > MAX_BINS_PER_SEGMENT as f64 {
            tracing::warn!(
                start,
                end,
                width,
                "bin width too small for segment, coarsening"
            );
            (span / MAX_BINS_PER_SEGMENT as f64, start)
        } else {
            (width, 0.0)
        };
        let first = ((start - origin) / width).floor() as i64;
        let mut last = ((end - origin) / width).ceil() as i64 - 1;
        // Float noise can produce a grid cell starting at or past `end`.
        while last > first && origin + (last as f64) * width >= end {
            last -= 1;
        }
        Self {
            start,
            end,
            width,
            origin,
            first,
            last: last.max(first),
        }
    }

    pub fn len(&self) -> usize {
        (self.last - self.first + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Edges of grid cell `k` (absolute cell index), clipped to the segment.
    pub fn edges(&self, k: i64) -> (f64, f64) {
        let x0 = if k <= self.first {
            self.start
        } else {
            self.origin + k as f64 * self.width
        };
        let x1 = if k >= self.last {
            self.end
        } else {
            self.origin + (k + 1) as f64 * self.width
        };
        (x0, x1)
    }

    /// All bin edges, left to right.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (self.first..=self.last).map(move |k| self.edges(k))
    }

    /// Grid cell holding `v`, which must lie in `[start, end]`; `end` maps to the last cell.
    pub fn cell_of(&self, v: f64) -> i64 {
        let guess = ((v - self.origin) / self.width).floor() as i64;
        let mut k = guess.clamp(self.first, self.last);
        while k > self.first && v < self.edges(k).0 {
            k -= 1;
        }
        while k < self.last && v >= self.edges(k).1 {
            k += 1;
        }
        k
    }
}

/// Sparse, ordered collection of non-empty bins.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BinSet {
    bins: Vec<Bin>,
}

impl BinSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bin> {
        self.bins.iter()
    }

    pub fn first(&self) -> Option<&Bin> {
        self.bins.first()
    }

    pub fn last(&self) -> Option<&Bin> {
        self.bins.last()
    }

    /// Total values across all bins.
    pub fn total(&self) -> usize {
        self.bins.iter().map(Bin::count).sum()
    }

    pub fn segment_bins(&self, segment: usize) -> impl Iterator<Item = &Bin> {
        self.bins.iter().filter(move |b| b.segment == segment)
    }

    /// Largest bin count in `segment`, 0 when it has no bins.
    pub fn segment_max_count(&self, segment: usize) -> usize {
        self.segment_bins(segment)
            .map(Bin::count)
            .max()
            .unwrap_or(0)
    }

    /// Bin containing `v`, if that bin is non-empty.
    pub fn find(&self, v: f64) -> Option<&Bin> {
        let i = self.bins.partition_point(|b| b.x1 <= v);
        self.bins
            .get(i)
            .or_else(|| self.bins.last())
            .filter(|b| b.contains(v))
    }
}

impl<'a> IntoIterator for &'a BinSet {
    type Item = &'a Bin;
    type IntoIter = std::slice::Iter<'a, Bin>;

    fn into_iter(self) -> Self::IntoIter {
        self.bins.iter()
    }
}

/// Partition `values` into per-segment bins.
///
/// `boundaries` must be strictly increasing with one more entry than
/// `bin_size`. Values outside `[boundaries[0], boundaries[N]]` and non-finite
/// values are ignored; `boundaries[N]` lands in the last bin of the last segment. The result does not depend on the order of `values`.
pub fn make_bins(values: &[f64], boundaries: &[f64], bin_size: &[f64]) -> BinSet {
    debug_assert_eq!(boundaries.len(), bin_size.len() + 1);
    let Some((&lo, &hi)) = boundaries.first().zip(boundaries.last()) else {
        return BinSet::empty();
    };

    let mut sorted: Vec<f64> = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v >= lo && *v <= hi)
        .collect();
    sorted.sort_by(f64::total_cmp);

    let grids: Vec<SegmentGrid> = boundaries
        .windows(2)
        .zip(bin_size)
        .map(|(w, &size)| SegmentGrid::new(w[0], w[1], size))
        .collect();

    let mut bins: Vec<Bin> = Vec::new();
    let mut current: Option<(usize, i64)> = None;
    for v in sorted {
        let segment = (boundaries.partition_point(|&b| b <= v) - 1).min(grids.len() - 1);
        let grid = &grids[segment];
        let cell = grid.cell_of(v);
        if current == Some((segment, cell)) {
            if let Some(bin) = bins.last_mut() {
                bin.values.push(v);
                continue;
            }
        }
        let (x0, x1) = grid.edges(cell);
        bins.push(Bin {
            x0,
            x1,
            segment,
            values: vec![v],
            closed: x1 == hi,
        });
        current = Some((segment, cell));
    }

    tracing::trace!(bins = bins.len(), "binned values");
    BinSet { bins }
}
