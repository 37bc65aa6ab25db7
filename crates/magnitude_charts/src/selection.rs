//! Brush selection and the `filter` notification sent back to the host.

use serde::{Deserialize, Serialize};

use crate::segmented::SegmentedScale;
use crate::view::Domain1D;

/// Payload of the host `filter` notification.
///
/// Serializes as `{"selection":[left,right]}`, or `{}` once cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct FilterEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<[f64; 2]>,
}

impl FilterEvent {
    pub fn cleared() -> Self {
        Self::default()
    }

    pub fn selected(domain: Domain1D) -> Self {
        Self {
            selection: Some([domain.min, domain.max]),
        }
    }
}

pub type FilterHandler = Box<dyn FnMut(&FilterEvent) + Send>;

/// Two-way binding between the brush's pixel interval and a domain interval.
#[derive(Default)]
pub struct SelectionMapper {
    selection: Option<Domain1D>,
    highlight: Option<(f64, f64)>,
    handlers: Vec<FilterHandler>,
}

impl std::fmt::Debug for SelectionMapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionMapper")
            .field("selection", &self.selection)
            .field("highlight", &self.highlight)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl SelectionMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored domain interval.
    pub fn selection(&self) -> Option<Domain1D> {
        self.selection
    }

    /// Pixel interval the brush and highlight region should show.
    pub fn highlight(&self) -> Option<(f64, f64)> {
        self.highlight
    }

    /// Register a `filter` handler.
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: FnMut(&FilterEvent) + Send + 'static,
    {
        self.handlers.push(Box::new(handler));
    }

    fn notify(&mut self, event: FilterEvent) {
        tracing::debug!(selection = ?event.selection, "filter");
        for handler in &mut self.handlers {
            handler(&event);
        }
    }

    /// Apply a user brush interval in plot pixels and notify the host; `None` clears.
    pub fn on_brush_change(
        &mut self,
        px: Option<(f64, f64)>,
        xs: &SegmentedScale<'_>,
    ) -> Option<Domain1D> {
        let px = px.filter(|(a, b)| a.is_finite() && b.is_finite());
        self.selection = px.map(|(a, b)| Domain1D::sorted(xs.inverse(a), xs.inverse(b)));
        self.apply_stored_selection(xs);

        let event = self
            .selection
            .map(FilterEvent::selected)
            .unwrap_or_else(FilterEvent::cleared);
        self.notify(event);
        self.selection
    }

    /// Recompute the pixel highlight from the stored domain interval.
    ///
    /// Runs after layout changes and never notifies the host.
    pub fn apply_stored_selection(&mut self, xs: &SegmentedScale<'_>) {
        self.highlight = self
            .selection
            .map(|d| (xs.forward(d.min), xs.forward(d.max)));
    }
}
