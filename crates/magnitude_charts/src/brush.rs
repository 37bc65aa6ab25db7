/// 1D brush gesture over the plot's x axis, in plot pixels.
///
/// Kept in pixel space: the domain interval depends on the current segment
/// layout and is derived by [`crate::SelectionMapper`] when the gesture ends.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrushX {
    active: bool,
    start_px: f64,
    cur_px: f64,
    /// Allowed pixel extent `(min, max)`; positions are clamped into it.
    extent: Option<(f64, f64)>,
}

impl BrushX {
    pub fn with_extent(min: f64, max: f64) -> Self {
        Self {
            extent: Some((min.min(max), min.max(max))),
            ..Self::default()
        }
    }

    fn clamp(&self, x: f64) -> f64 {
        match self.extent {
            Some((lo, hi)) => x.clamp(lo, hi),
            None => x,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn begin(&mut self, x_px: f64) {
        if !x_px.is_finite() {
            return;
        }
        let x = self.clamp(x_px);
        self.active = true;
        self.start_px = x;
        self.cur_px = x;
    }

    pub fn update(&mut self, x_px: f64) {
        if self.active && x_px.is_finite() {
            self.cur_px = self.clamp(x_px);
        }
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    pub fn range_px(&self) -> Option<(f64, f64)> {
        if !self.active {
            return None;
        }
        let (a, b) = (self.start_px, self.cur_px);
        Some(if a <= b { (a, b) } else { (b, a) })
    }

    /// End the gesture. A zero-width range counts as a click and clears.
    pub fn take_final_px(&mut self) -> Option<(f64, f64)> {
        let r = self.range_px().filter(|(a, b)| b > a);
        self.active = false;
        r
    }
}
