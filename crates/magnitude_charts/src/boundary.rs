//! Segment topology and its mutation.
//!
//! [`BoundaryManager`] is the single owner of the boundary list, the pixel
//! boundary list, per-segment bin widths and one transition-zone state machine
//! per interior boundary. It never rebins or rescales by itself; callers run
//! the recompute pipeline after a mutation.

use magnitude_core::{FsmId, FsmRuntime};
use serde::Serialize;

use crate::error::{ChartError, Result};
use crate::prism::{
    effective_state, is_active, zone_machine, PrismGeometry, PrismMetrics, PrismMode, ZoneContext,
    ZoneEvent, ZoneState,
};
use crate::segmented::SegmentedScale;

/// Constants that shape boundary mutation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BoundaryLimits {
    /// Plot width the pixel boundaries are distributed across.
    pub plot_width: f64,
    /// Minimum pixel gap kept by a drag on each side.
    pub min_gap: f64,
    /// Target bins per segment when a split recomputes bin widths.
    pub resolution: f64,
}

pub struct BoundaryManager {
    boundaries: Vec<f64>,
    x_bins: Vec<f64>,
    bin_size: Vec<f64>,
    zones: FsmRuntime<ZoneState, ZoneEvent, ZoneContext>,
    /// Zone machine per interior boundary; `zone_ids[i - 1]` belongs to boundary `i`.
    zone_ids: Vec<FsmId>,
    /// Cached activation per boundary, outer entries always false.
    active: Vec<bool>,
    mode: PrismMode,
    metrics: PrismMetrics,
    limits: BoundaryLimits,
}

impl BoundaryManager {
    /// Build from already validated state.
    ///
    /// `boundaries` must be strictly increasing with at least two entries,
    /// `x_bins` must be increasing pixel offsets of the same length and
    /// `bin_size` must have one entry per segment.
    pub fn new(
        boundaries: Vec<f64>,
        x_bins: Vec<f64>,
        bin_size: Vec<f64>,
        mode: PrismMode,
        metrics: PrismMetrics,
        limits: BoundaryLimits,
    ) -> Self {
        let mut m = Self {
            boundaries,
            x_bins,
            bin_size,
            zones: FsmRuntime::new(),
            zone_ids: Vec::new(),
            active: Vec::new(),
            mode,
            metrics,
            limits,
        };
        m.reset_zones();
        m.check_invariants();
        m
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn x_bins(&self) -> &[f64] {
        &self.x_bins
    }

    pub fn bin_size(&self) -> &[f64] {
        &self.bin_size
    }

    pub fn segment_count(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn zone_count(&self) -> usize {
        self.zone_ids.len()
    }

    pub fn mode(&self) -> PrismMode {
        self.mode
    }

    pub fn metrics(&self) -> &PrismMetrics {
        &self.metrics
    }

    pub fn limits(&self) -> &BoundaryLimits {
        &self.limits
    }

    /// Piecewise mapping over the current layout.
    pub fn scale(&self) -> SegmentedScale<'_> {
        SegmentedScale::new(
            &self.boundaries,
            &self.x_bins,
            &self.active,
            self.metrics.width,
            self.metrics.geometry,
        )
    }

    /// Index of an exact boundary value.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        self.boundaries.iter().position(|&b| b == value)
    }

    fn zone_id(&self, i: usize) -> Option<FsmId> {
        i.checked_sub(1).and_then(|k| self.zone_ids.get(k)).copied()
    }

    fn stored_state(&self, i: usize) -> Option<ZoneState> {
        self.zone_id(i).and_then(|id| self.zones.current_state(id))
    }

    /// Reported state of the zone at boundary `i` (install mode folded in).
    pub fn zone_state(&self, i: usize) -> Option<ZoneState> {
        self.stored_state(i).map(|s| effective_state(s, self.mode))
    }

    /// Reported state of every zone, left to right.
    pub fn zone_states(&self) -> Vec<ZoneState> {
        (1..self.segment_count())
            .filter_map(|i| self.zone_state(i))
            .collect()
    }

    pub fn is_zone_active(&self, i: usize) -> bool {
        self.active.get(i).copied().unwrap_or(false)
    }

    pub fn active(&self) -> &[bool] {
        &self.active
    }

    fn refresh_active(&mut self) {
        let n = self.boundaries.len();
        let mut active = vec![false; n];
        for (i, slot) in active.iter_mut().enumerate().take(n - 1).skip(1) {
            *slot = self
                .stored_state(i)
                .map(|s| is_active(s, self.mode))
                .unwrap_or(false);
        }
        self.active = active;
    }

    /// Recreate every zone machine in the collapsed state.
    fn reset_zones(&mut self) {
        self.zones.clear();
        self.zone_ids = (1..self.segment_count())
            .map(|_| self.zones.create(zone_machine()))
            .collect();
        self.refresh_active();
    }

    fn require_interior(&self, i: usize) -> Result<()> {
        let last = self.segment_count().saturating_sub(1);
        if i == 0 || i > last {
            return Err(ChartError::NotInterior { index: i, last });
        }
        Ok(())
    }

    /// Allowed pixel interval for boundary `i`, empty when the neighbours are too close.
    pub fn drag_bounds(&self, i: usize) -> Option<(f64, f64)> {
        self.require_interior(i).ok()?;
        let lo = self.x_bins[i - 1] + self.limits.min_gap;
        let hi = self.x_bins[i + 1] - self.metrics.width - self.limits.min_gap;
        (lo <= hi).then_some((lo, hi))
    }

    /// Move pixel boundary `i` towards `candidate_px`, clamped to [`Self::drag_bounds`].
    ///
    /// Domain boundaries and bins are untouched. Returns the applied position,
    /// or `None` when `i` is not interior or there is no room to move.
    pub fn drag_boundary(&mut self, i: usize, candidate_px: f64) -> Option<f64> {
        let (lo, hi) = self.drag_bounds(i)?;
        if !candidate_px.is_finite() {
            return None;
        }
        let x = candidate_px.clamp(lo, hi);
        self.x_bins[i] = x;
        tracing::trace!(boundary = i, x, "boundary dragged");
        self.check_invariants();
        Some(x)
    }

    /// Split the segment containing `value` at `value`.
    ///
    /// Pixel boundaries are redistributed evenly, every segment's bin width is
    /// reset to `span / resolution` and every zone collapses. Returns the new
    /// boundary's index.
    pub fn insert_boundary(&mut self, value: f64) -> Result<usize> {
        let (min, max) = (self.boundaries[0], self.boundaries[self.segment_count()]);
        if !(value > min && value < max) {
            return Err(ChartError::SplitOutOfRange { value, min, max });
        }
        if self.index_of(value).is_some() {
            return Err(ChartError::DuplicateBoundary(value));
        }

        let at = self.boundaries.partition_point(|&b| b < value);
        self.boundaries.insert(at, value);
        let n = self.segment_count();
        let width = self.limits.plot_width;
        self.x_bins = (0..=n).map(|i| i as f64 * width / n as f64).collect();
        let resolution = self.limits.resolution;
        self.bin_size = self
            .boundaries
            .windows(2)
            .map(|w| (w[1] - w[0]) / resolution)
            .collect();
        self.reset_zones();

        tracing::debug!(value, index = at, segments = n, "boundary inserted");
        self.check_invariants();
        Ok(at)
    }

    /// Merge the two segments around interior boundary `i`.
    ///
    /// The merged segment keeps the right segment's bin width. Other zones keep
    /// their state. Returns the removed boundary value.
    pub fn remove_boundary(&mut self, i: usize) -> Result<f64> {
        if self.segment_count() <= 1 {
            return Err(ChartError::LastSegment);
        }
        self.require_interior(i)?;

        let value = self.boundaries.remove(i);
        self.x_bins.remove(i);
        self.bin_size.remove(i - 1);
        let id = self.zone_ids.remove(i - 1);
        self.zones.remove(id);
        self.refresh_active();

        tracing::debug!(value, index = i, segments = self.segment_count(), "boundary removed");
        self.check_invariants();
        Ok(value)
    }

    /// Replace every segment's bin width.
    pub fn set_bin_size(&mut self, sizes: Vec<f64>) -> Result<()> {
        if sizes.len() != self.segment_count() {
            return Err(ChartError::BinSizeLength {
                expected: self.segment_count(),
                got: sizes.len(),
            });
        }
        self.bin_size = sizes;
        Ok(())
    }

    /// Feed a pointer event to the zone at boundary `i`.
    ///
    /// Returns the reported state afterwards, `None` if `i` has no zone.
    pub fn zone_event(&mut self, i: usize, event: ZoneEvent, pointer_inside: bool) -> Option<ZoneState> {
        let id = self.zone_id(i)?;
        let ctx = ZoneContext {
            mode: self.mode,
            pointer_inside,
        };
        let before = self.zones.current_state(id);
        let after = self.zones.send(id, event, &ctx).ok()?;
        if before != Some(after) {
            self.refresh_active();
        }
        self.zone_state(i)
    }

    /// Force the zone at boundary `i` into `state`.
    ///
    /// `Installed` is not a per-zone state: it switches every zone to install
    /// mode. `Hovering` is ignored outside hover mode.
    pub fn set_activation(&mut self, i: usize, state: ZoneState) -> Option<ZoneState> {
        let id = self.zone_id(i)?;
        match state {
            ZoneState::Installed => self.set_mode(PrismMode::Install),
            ZoneState::Hovering if self.mode != PrismMode::Hover => {
                tracing::debug!(zone = i, "hover ignored outside hover mode");
            }
            s => {
                if let Some(fsm) = self.zones.get_mut(id) {
                    fsm.reset_to(s);
                }
                self.refresh_active();
            }
        }
        self.zone_state(i)
    }

    /// Switch the global prism mode. Stored zone states are kept.
    pub fn set_mode(&mut self, mode: PrismMode) {
        if self.mode != mode {
            tracing::debug!(?mode, "prism mode changed");
        }
        self.mode = mode;
        if mode == PrismMode::Install {
            // Hover states are meaningless once every zone is installed.
            for &id in &self.zone_ids {
                if let Some(fsm) = self.zones.get_mut(id) {
                    if fsm.is_in(ZoneState::Hovering) {
                        fsm.reset_to(ZoneState::Collapsed);
                    }
                }
            }
        }
        self.refresh_active();
    }

    pub fn set_geometry(&mut self, geometry: PrismGeometry) {
        self.metrics.geometry = geometry;
    }

    fn check_invariants(&self) {
        debug_assert!(self.boundaries.len() >= 2, "at least one segment");
        debug_assert_eq!(self.boundaries.len(), self.x_bins.len());
        debug_assert_eq!(self.boundaries.len(), self.bin_size.len() + 1);
        debug_assert_eq!(self.zone_ids.len(), self.segment_count() - 1);
        debug_assert_eq!(self.active.len(), self.boundaries.len());
        debug_assert!(
            self.boundaries.windows(2).all(|w| w[0] < w[1]),
            "boundaries strictly increasing: {:?}",
            self.boundaries
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(mode: PrismMode) -> BoundaryManager {
        manager_with(vec![0.0, 100.0, 250.0, 400.0], 400.0, mode)
    }

    fn manager_with(x_bins: Vec<f64>, plot_width: f64, mode: PrismMode) -> BoundaryManager {
        BoundaryManager::new(
            vec![0.0, 10.0, 100.0, 1000.0],
            x_bins,
            vec![2.0, 20.0, 200.0],
            mode,
            PrismMetrics {
                width: 20.0,
                apex_offset: 5.0,
                hover_zone_width: 12.0,
                geometry: PrismGeometry::Flat,
            },
            BoundaryLimits {
                plot_width,
                min_gap: 50.0,
                resolution: 50.0,
            },
        )
    }

    #[test]
    fn drag_clamps_between_neighbours() {
        let mut m = manager(PrismMode::Install);
        assert_eq!(m.drag_bounds(1), Some((50.0, 180.0)));
        assert_eq!(m.drag_boundary(1, 10.0), Some(50.0));
        assert_eq!(m.drag_boundary(1, 500.0), Some(180.0));
        assert_eq!(m.drag_boundary(1, 120.0), Some(120.0));
        assert_eq!(m.x_bins(), &[0.0, 120.0, 250.0, 400.0]);
        assert_eq!(m.boundaries(), &[0.0, 10.0, 100.0, 1000.0]);
    }

    #[test]
    fn drag_rejects_outer_boundaries_and_tight_layouts() {
        let mut m = manager(PrismMode::Install);
        assert_eq!(m.drag_boundary(0, 10.0), None);
        assert_eq!(m.drag_boundary(3, 10.0), None);

        // Neighbours 100px apart leave no room for two 50px gaps plus the zone.
        let mut m = manager_with(vec![0.0, 100.0, 150.0, 200.0], 200.0, PrismMode::Install);
        assert_eq!(m.drag_bounds(1), Some((50.0, 80.0)));
        assert_eq!(m.drag_bounds(2), None);
        assert_eq!(m.drag_boundary(2, 160.0), None);
        assert_eq!(m.x_bins(), &[0.0, 100.0, 150.0, 200.0]);
    }

    #[test]
    fn insert_redistributes_and_resets() {
        let mut m = manager(PrismMode::Hover);
        m.zone_event(1, ZoneEvent::PointerEnter, true);
        assert_eq!(m.zone_state(1), Some(ZoneState::Hovering));

        assert_eq!(m.insert_boundary(50.0), Ok(2));
        assert_eq!(m.boundaries(), &[0.0, 10.0, 50.0, 100.0, 1000.0]);
        assert_eq!(m.x_bins(), &[0.0, 100.0, 200.0, 300.0, 400.0]);
        assert_eq!(m.bin_size(), &[0.2, 0.8, 1.0, 18.0]);
        assert_eq!(m.zone_count(), 3);
        assert!(m
            .zone_states()
            .iter()
            .all(|&s| s == ZoneState::Collapsed));
    }

    #[test]
    fn insert_rejects_outside_and_duplicates() {
        let mut m = manager(PrismMode::Install);
        assert!(matches!(
            m.insert_boundary(0.0),
            Err(ChartError::SplitOutOfRange { .. })
        ));
        assert!(matches!(
            m.insert_boundary(2000.0),
            Err(ChartError::SplitOutOfRange { .. })
        ));
        assert_eq!(m.insert_boundary(10.0), Err(ChartError::DuplicateBoundary(10.0)));
        assert_eq!(m.segment_count(), 3);
    }

    #[test]
    fn remove_merges_segments_and_keeps_other_zones() {
        let mut m = manager(PrismMode::Hover);
        m.zone_event(2, ZoneEvent::PointerEnter, true);

        assert_eq!(m.remove_boundary(1), Ok(10.0));
        assert_eq!(m.boundaries(), &[0.0, 100.0, 1000.0]);
        assert_eq!(m.x_bins(), &[0.0, 250.0, 400.0]);
        assert_eq!(m.bin_size(), &[20.0, 200.0]);
        assert_eq!(m.zone_states(), vec![ZoneState::Hovering]);
        assert_eq!(m.active(), &[false, true, false]);

        assert!(matches!(
            m.remove_boundary(0),
            Err(ChartError::NotInterior { .. })
        ));
        assert_eq!(m.remove_boundary(1), Ok(100.0));
        assert_eq!(m.remove_boundary(1), Err(ChartError::LastSegment));
        assert_eq!(m.segment_count(), 1);
    }

    #[test]
    fn insert_then_remove_restores_segment_count() {
        let mut m = manager(PrismMode::Install);
        let before = m.segment_count();
        let at = m.insert_boundary(500.0).expect("split inside domain");
        assert_eq!(m.index_of(500.0), Some(at));
        m.remove_boundary(at).expect("interior boundary");
        assert_eq!(m.segment_count(), before);
    }

    #[test]
    fn install_mode_activates_every_zone() {
        let mut m = manager(PrismMode::Install);
        assert_eq!(m.active(), &[false, true, true, false]);
        assert_eq!(
            m.zone_states(),
            vec![ZoneState::Installed, ZoneState::Installed]
        );

        m.set_mode(PrismMode::Hover);
        assert_eq!(m.active(), &[false, false, false, false]);
        m.set_activation(1, ZoneState::Hovering);
        assert_eq!(m.active(), &[false, true, false, false]);

        m.set_activation(2, ZoneState::Installed);
        assert_eq!(m.mode(), PrismMode::Install);
        assert_eq!(m.active(), &[false, true, true, false]);
    }

    #[test]
    fn install_mode_drops_stored_hover() {
        let mut m = manager(PrismMode::Hover);
        assert_eq!(
            m.zone_event(1, ZoneEvent::PointerEnter, true),
            Some(ZoneState::Hovering)
        );
        assert!(m.is_zone_active(1));

        m.set_mode(PrismMode::Install);
        m.set_mode(PrismMode::Hover);
        assert_eq!(m.zone_state(1), Some(ZoneState::Collapsed));
        assert!(!m.is_zone_active(1));
        assert_eq!(m.active(), &[false, false, false, false]);
    }

    #[test]
    fn dragging_zone_is_inactive_in_hover_mode() {
        let mut m = manager(PrismMode::Hover);
        m.zone_event(1, ZoneEvent::PointerEnter, true);
        assert_eq!(
            m.zone_event(1, ZoneEvent::DragStart, true),
            Some(ZoneState::Dragging)
        );
        assert!(!m.is_zone_active(1));
        assert_eq!(
            m.zone_event(1, ZoneEvent::PointerLeave, false),
            Some(ZoneState::Dragging)
        );
        assert_eq!(
            m.zone_event(1, ZoneEvent::DragEnd, true),
            Some(ZoneState::Hovering)
        );
        assert!(m.is_zone_active(1));
    }
}
