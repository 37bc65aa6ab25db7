//! Chart error types

use thiserror::Error;

/// Errors raised by chart construction and rejected mutations.
///
/// A rejected mutation never changes chart state.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChartError {
    /// Fewer than two distinct finite boundaries after auto-extension
    #[error("a chart needs at least two distinct boundaries, got {0}")]
    TooFewBoundaries(usize),

    /// Plot width/height missing, non-finite or non-positive
    #[error("invalid plot geometry: {0}")]
    InvalidGeometry(String),

    /// Split value is not strictly inside the current domain
    #[error("split value {value} is outside ({min}, {max})")]
    SplitOutOfRange { value: f64, min: f64, max: f64 },

    /// Split value already is a boundary
    #[error("{0} is already a segment boundary")]
    DuplicateBoundary(f64),

    /// Only interior boundaries carry a transition zone and can be removed or dragged
    #[error("boundary {index} is not interior (valid: 1..={last})")]
    NotInterior { index: usize, last: usize },

    /// Removing a boundary would leave no segment
    #[error("cannot remove the last segment")]
    LastSegment,

    /// Per-segment list has the wrong length
    #[error("expected {expected} bin sizes, got {got}")]
    BinSizeLength { expected: usize, got: usize },

    /// The shared chart handle was poisoned by a panicking holder
    #[error("chart handle is poisoned")]
    Poisoned,
}

/// Result type for chart operations
pub type Result<T> = std::result::Result<T, ChartError>;
