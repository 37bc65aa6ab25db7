//! magnitude_charts
//!
//! Engine behind segmented "magnitude" histograms: a value axis split into
//! independently scaled segments joined by transition zones ("prisms").
//!
//! Rendering is left to the host. The engine keeps the segment layout,
//! bins samples per segment, scales counts per segment, blends scales inside
//! active zones and maps a pixel brush back to a domain interval.
//!
//! ```
//! use magnitude_charts::prelude::*;
//!
//! let config = ChartConfig::new(
//!     vec![5.0, 50.0, 500.0, 5000.0],
//!     vec![0.0, 10.0, 100.0, 1000.0, 10000.0],
//! )
//! .with_bin_size(vec![2.0, 20.0, 200.0, 2000.0]);
//! let chart = MagnitudeChart::new(config).unwrap();
//!
//! let bin = chart.bins().find(50.0).unwrap();
//! assert_eq!((bin.x0, bin.x1), (40.0, 60.0));
//! assert_eq!(chart.scale().segment_index_of(100.0), 2);
//! ```

mod brush;
mod interpolate;
mod scale;
mod view;

pub mod binning;
pub mod boundary;
pub mod chart;
pub mod config;
pub mod error;
pub mod guides;
pub mod prism;
pub mod segmented;
pub mod selection;
pub mod series;
pub mod stats;
pub mod y_scale;

pub use binning::{make_bins, Bin, BinSet, MAX_BINS_PER_SEGMENT};
pub use boundary::{BoundaryLimits, BoundaryManager};
pub use brush::BrushX;
pub use chart::{ChartSnapshot, GuideSet, MagnitudeChart, MagnitudeChartHandle, Phase};
pub use config::{ChartConfig, DomainAuto, GeometryConfig, PrismConfig, SeriesKind};
pub use error::{ChartError, Result};
pub use interpolate::{lerp, unlerp};
pub use prism::{PrismGeometry, PrismMode, ZoneEvent, ZoneState};
pub use scale::LinearScale;
pub use segmented::SegmentedScale;
pub use selection::{FilterEvent, SelectionMapper};
pub use series::{BarRect, DerivedSeries};
pub use view::{Domain1D, PlotLayout};
pub use y_scale::{BinScale, SegmentYScales};

/// Common imports for chart users.
pub mod prelude {
    pub use crate::chart::{ChartSnapshot, MagnitudeChart, MagnitudeChartHandle};
    pub use crate::config::{ChartConfig, GeometryConfig, PrismConfig, SeriesKind};
    pub use crate::error::ChartError;
    pub use crate::prism::{PrismGeometry, PrismMode, ZoneState};
    pub use crate::selection::FilterEvent;
    pub use crate::view::Domain1D;
}
