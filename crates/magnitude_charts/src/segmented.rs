use crate::prism::PrismGeometry;
use crate::scale::LinearScale;

/// Piecewise domain <-> pixel mapping over the current segment layout.
///
/// Borrowed view over boundary state: build one from the owning
/// [`crate::BoundaryManager`] whenever a mapping is needed.
///
/// `boundaries`, `x_bins` and `active` all have one entry per boundary;
/// `active[i]` is the activation of the zone at boundary `i` (always false
/// for the outer boundaries).
#[derive(Clone, Copy, Debug)]
pub struct SegmentedScale<'a> {
    boundaries: &'a [f64],
    x_bins: &'a [f64],
    active: &'a [bool],
    prism_width: f64,
    geometry: PrismGeometry,
}

impl<'a> SegmentedScale<'a> {
    pub fn new(
        boundaries: &'a [f64],
        x_bins: &'a [f64],
        active: &'a [bool],
        prism_width: f64,
        geometry: PrismGeometry,
    ) -> Self {
        debug_assert!(boundaries.len() >= 2);
        debug_assert_eq!(boundaries.len(), x_bins.len());
        debug_assert_eq!(boundaries.len(), active.len());
        Self {
            boundaries,
            x_bins,
            active,
            prism_width,
            geometry,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn boundaries(&self) -> &'a [f64] {
        self.boundaries
    }

    pub fn x_bins(&self) -> &'a [f64] {
        self.x_bins
    }

    pub fn prism_width(&self) -> f64 {
        self.prism_width
    }

    pub fn geometry(&self) -> PrismGeometry {
        self.geometry
    }

    /// Whether the zone at boundary `i` is active. Outer boundaries never are.
    pub fn is_zone_active(&self, i: usize) -> bool {
        i > 0 && i < self.segment_count() && self.active[i]
    }

    /// Index of the segment owning `value`.
    ///
    /// A value equal to a boundary belongs to the segment it starts. Values
    /// below the first boundary clamp to segment 0, values at or beyond the
    /// last boundary clamp to the last segment.
    pub fn segment_index_of(&self, value: f64) -> usize {
        let starts = self.boundaries.partition_point(|&b| b <= value);
        starts.saturating_sub(1).min(self.segment_count() - 1)
    }

    /// Pixels reserved at the start of segment `i` by its left zone.
    pub fn leading_offset(&self, i: usize) -> f64 {
        match self.geometry {
            PrismGeometry::Offset if self.is_zone_active(i) => self.prism_width,
            _ => 0.0,
        }
    }

    pub fn segment_domain(&self, i: usize) -> (f64, f64) {
        (self.boundaries[i], self.boundaries[i + 1])
    }

    /// Pixel range values of segment `i` are plotted in.
    pub fn segment_range(&self, i: usize) -> (f64, f64) {
        (self.x_bins[i] + self.leading_offset(i), self.x_bins[i + 1])
    }

    pub fn segment_scale(&self, i: usize) -> LinearScale {
        let (d0, d1) = self.segment_domain(i);
        let (r0, r1) = self.segment_range(i);
        LinearScale::new(d0, d1, r0, r1)
    }

    /// Domain value to pixel.
    pub fn forward(&self, value: f64) -> f64 {
        self.segment_scale(self.segment_index_of(value)).map(value)
    }

    /// Pixel to domain value. Inverse of [`Self::forward`] on the plotted range.
    ///
    /// Pixels outside the plot clamp to its edges. In offset geometry the gap
    /// an active zone opens belongs to the segment on its right and maps to
    /// that segment's first value.
    pub fn inverse(&self, px: f64) -> f64 {
        let n = self.segment_count();
        let px = px.clamp(self.x_bins[0], self.x_bins[n]);
        let i = self
            .x_bins
            .partition_point(|&x| x <= px)
            .saturating_sub(1)
            .min(n - 1);
        let (r0, _) = self.segment_range(i);
        if px < r0 {
            return self.boundaries[i];
        }
        self.segment_scale(i).invert(px)
    }

    /// Whether `value` is plotted inside the zone on the right edge of its segment.
    pub fn inside_prism_zone(&self, value: f64) -> bool {
        let i = self.segment_index_of(value);
        if i + 1 >= self.segment_count() {
            return false;
        }
        let prism_pos = self.forward(self.boundaries[i + 1]);
        let pos = self.forward(value);
        pos >= prism_pos - self.prism_width && pos <= prism_pos
    }

    /// Full plotted pixel range.
    pub fn pixel_range(&self) -> (f64, f64) {
        (self.x_bins[0], self.x_bins[self.segment_count()])
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.boundaries[0], self.boundaries[self.segment_count()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static B: [f64; 4] = [0.0, 1.0, 10.0, 100.0];
    static X: [f64; 4] = [0.0, 80.0, 240.0, 400.0];

    fn flat<'a>(active: &'a [bool]) -> SegmentedScale<'a> {
        SegmentedScale::new(&B, &X, active, 20.0, PrismGeometry::Flat)
    }

    #[test]
    fn boundary_value_starts_its_segment() {
        let active = [false; 4];
        let s = flat(&active);
        assert_eq!(s.segment_index_of(0.0), 0);
        assert_eq!(s.segment_index_of(0.999), 0);
        assert_eq!(s.segment_index_of(1.0), 1);
        assert_eq!(s.segment_index_of(100.0), 2);
        assert_eq!(s.segment_index_of(1e9), 2);
        assert_eq!(s.segment_index_of(-5.0), 0);
        assert_eq!(s.forward(1.0), 80.0);
        assert_eq!(s.forward(5.5), 160.0);
    }

    #[test]
    fn inverse_round_trips_in_both_geometries() {
        let active = [false, true, true, false];
        for geometry in [PrismGeometry::Flat, PrismGeometry::Offset] {
            let s = SegmentedScale::new(&B, &X, &active, 20.0, geometry);
            for v in [0.0, 0.3, 1.0, 4.2, 9.99, 10.0, 55.0, 100.0] {
                let back = s.inverse(s.forward(v));
                assert!((back - v).abs() < 1e-9, "{geometry:?}: {v} -> {back}");
            }
        }
    }

    #[test]
    fn offset_gap_belongs_to_right_segment() {
        let active = [false, true, false, false];
        let s = SegmentedScale::new(&B, &X, &active, 20.0, PrismGeometry::Offset);
        assert_eq!(s.leading_offset(1), 20.0);
        assert_eq!(s.forward(1.0), 100.0);
        assert_eq!(s.inverse(90.0), 1.0);
        assert_eq!(s.inverse(-50.0), 0.0);
        assert_eq!(s.inverse(1000.0), 100.0);
    }

    #[test]
    fn prism_zone_covers_right_edge_of_segment() {
        let active = [false; 4];
        let s = flat(&active);
        // Segment 0 spans 0..80px, zone covers 60..80px, i.e. values 0.75..1.
        assert!(s.inside_prism_zone(0.8));
        assert!(!s.inside_prism_zone(0.5));
        // Last segment has no zone on its right.
        assert!(!s.inside_prism_zone(99.0));
    }
}
