//! Transition zones ("prisms") between adjacent segments.
//!
//! Each interior boundary owns one zone. A zone's stored state is driven by
//! pointer events through a [`StateMachine`]; install mode is a global flag
//! layered on top and never stored per zone.

use magnitude_core::StateMachine;
use serde::{Deserialize, Serialize};

/// How an active zone claims pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrismGeometry {
    /// Zone overlays the tail of the left segment; segments keep their pixel ranges.
    #[default]
    Flat,
    /// Zone displaces the start of the right segment by its width.
    Offset,
}

/// Global activation mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrismMode {
    /// Every zone is shown.
    #[default]
    Install,
    /// Zones collapse until the pointer hovers them.
    Hover,
}

impl PrismMode {
    pub fn toggled(self) -> Self {
        match self {
            PrismMode::Install => PrismMode::Hover,
            PrismMode::Hover => PrismMode::Install,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneState {
    Collapsed,
    Hovering,
    /// Reported for non-dragging zones while install mode is on; never stored.
    Installed,
    Dragging,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ZoneEvent {
    /// Pointer entered the zone's hover affordance.
    PointerEnter,
    /// Pointer left the zone's shape.
    PointerLeave,
    /// Pointer pressed on the zone's shape and started moving.
    DragStart,
    /// Pointer released after a drag.
    DragEnd,
}

/// What the guards see when a zone event is dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneContext {
    pub mode: PrismMode,
    /// Whether the pointer is over the zone when the event fires.
    pub pointer_inside: bool,
}

pub type ZoneMachine = StateMachine<ZoneState, ZoneEvent, ZoneContext>;

/// Per-zone machine. Starts collapsed.
///
/// Hover only engages in hover mode; a drag ends hovering if the pointer is
/// still over the zone (and hover mode is on), collapsed otherwise. Leaving
/// the shape while dragging is ignored.
pub fn zone_machine() -> ZoneMachine {
    use ZoneEvent::*;
    use ZoneState::*;

    StateMachine::builder(Collapsed)
        .on_if(Collapsed, PointerEnter, Hovering, |c: &ZoneContext| {
            c.mode == PrismMode::Hover
        })
        .on(Hovering, PointerLeave, Collapsed)
        .on(Collapsed, DragStart, Dragging)
        .on(Hovering, DragStart, Dragging)
        .on_if(Dragging, DragEnd, Hovering, |c: &ZoneContext| {
            c.mode == PrismMode::Hover && c.pointer_inside
        })
        .on(Dragging, DragEnd, Collapsed)
        .build()
}

/// State as the renderer should see it, folding in install mode.
pub fn effective_state(stored: ZoneState, mode: PrismMode) -> ZoneState {
    match (stored, mode) {
        (ZoneState::Dragging, _) => ZoneState::Dragging,
        (_, PrismMode::Install) => ZoneState::Installed,
        (s, PrismMode::Hover) => s,
    }
}

/// Whether a zone reserves space and blends Y scales.
pub fn is_active(stored: ZoneState, mode: PrismMode) -> bool {
    mode == PrismMode::Install || stored == ZoneState::Hovering
}

/// Axis-aligned rectangle in plot coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ZoneRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ZoneRect {
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }
}

/// Fixed pixel metrics shared by every zone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PrismMetrics {
    pub width: f64,
    pub apex_offset: f64,
    pub hover_zone_width: f64,
    pub geometry: PrismGeometry,
}

impl PrismMetrics {
    /// Top of the value range.
    pub fn top_y(&self) -> f64 {
        match self.geometry {
            PrismGeometry::Flat => 0.0,
            PrismGeometry::Offset => self.apex_offset,
        }
    }

    /// Hover affordance left of the boundary at pixel `x_boundary`.
    pub fn hover_zone(&self, x_boundary: f64, plot_height: f64) -> ZoneRect {
        ZoneRect {
            x: x_boundary - self.hover_zone_width,
            y: 0.0,
            width: self.hover_zone_width,
            height: plot_height,
        }
    }

    fn left_edge(&self, x_boundary: f64, active: bool) -> f64 {
        if active && self.geometry == PrismGeometry::Flat {
            x_boundary - self.width
        } else {
            x_boundary
        }
    }

    /// Zone outline polygon: top-left, bottom-left, lowered bottom-right, top-right.
    pub fn outline(&self, x_boundary: f64, active: bool, plot_height: f64) -> [[f64; 2]; 4] {
        let x = self.left_edge(x_boundary, active);
        let top = self.top_y();
        [
            [x, top],
            [x, plot_height],
            [x + self.width, plot_height + self.apex_offset * 2.0],
            [x + self.width, top],
        ]
    }

    /// Bounding box of [`Self::outline`], used for pointer hit tests.
    pub fn bounds(&self, x_boundary: f64, active: bool, plot_height: f64) -> ZoneRect {
        let x = self.left_edge(x_boundary, active);
        let top = self.top_y();
        ZoneRect {
            x,
            y: top,
            width: self.width,
            height: plot_height + self.apex_offset * 2.0 - top,
        }
    }

    /// Boundary pixel implied by a pointer dragging the zone at `pointer_x`.
    pub fn drag_candidate(&self, pointer_x: f64) -> f64 {
        let x = pointer_x - self.width / 2.0;
        match self.geometry {
            PrismGeometry::Flat => x + self.width,
            PrismGeometry::Offset => x,
        }
    }
}
