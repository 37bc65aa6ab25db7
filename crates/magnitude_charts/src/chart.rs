//! Chart controller: owns all state of one magnitude chart and runs the
//! recompute pipeline after every mutation.

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::binning::{make_bins, BinSet};
use crate::boundary::{BoundaryLimits, BoundaryManager};
use crate::brush::BrushX;
use crate::config::{ChartConfig, SeriesKind};
use crate::error::{ChartError, Result};
use crate::guides::{GuideLine, Guides};
use crate::prism::{PrismGeometry, PrismMetrics, PrismMode, ZoneEvent, ZoneState};
use crate::segmented::SegmentedScale;
use crate::selection::{FilterEvent, SelectionMapper};
use crate::series::{derive, DerivedSeries};
use crate::stats::Overview;
use crate::view::{Domain1D, PlotLayout};
use crate::y_scale::SegmentYScales;

/// Recompute stages, in pipeline order. Running from a stage runs every later
/// one; the brush highlight is re-projected after any of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Primary and foreground bins, overview fractions.
    Rebin,
    /// Per-segment count scales.
    YScales,
    /// Derived series and guide lines.
    Geometry,
}

/// Guide lines the host asked for; re-laid out on every recompute.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GuideSpec {
    pub grid_x: Vec<f64>,
    pub grid_counts: Vec<f64>,
    pub horizontal: Vec<f64>,
    pub vertical: Vec<f64>,
}

/// Guide geometry for the current layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GuideSet {
    pub grid: Vec<GuideLine>,
    pub horizontal: Vec<Vec<[f64; 2]>>,
    pub vertical: Vec<GuideLine>,
    pub connectors: Vec<GuideLine>,
}

impl GuideSet {
    fn compute(g: &Guides<'_>, spec: &GuideSpec) -> Self {
        Self {
            grid: g.custom_grid_line(&spec.grid_x, &spec.grid_counts),
            horizontal: g.horizontal_lines(&spec.horizontal),
            vertical: g.vertical_lines(&spec.vertical),
            connectors: g.prism_connectors(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ZoneSnapshot {
    pub index: usize,
    pub state: ZoneState,
    pub active: bool,
    pub outline: [[f64; 2]; 4],
}

/// Serializable view of everything a renderer needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSnapshot {
    pub layout: PlotLayout,
    pub boundaries: Vec<f64>,
    pub x_bins: Vec<f64>,
    pub bin_size: Vec<f64>,
    pub mode: PrismMode,
    pub geometry: PrismGeometry,
    pub zones: Vec<ZoneSnapshot>,
    pub bins: BinSet,
    pub foreground_bins: BinSet,
    pub max_counts: Vec<f64>,
    #[serde(rename = "type")]
    pub kind: SeriesKind,
    pub series: DerivedSeries,
    pub foreground_series: DerivedSeries,
    pub guides: GuideSet,
    pub overview: Overview,
    pub selection: Option<[f64; 2]>,
    pub highlight: Option<(f64, f64)>,
}

pub struct MagnitudeChart {
    /// Finite primary samples, ascending.
    data: Vec<f64>,
    foreground: Option<Vec<f64>>,
    kind: SeriesKind,
    layout: PlotLayout,
    boundaries: BoundaryManager,

    bins: BinSet,
    foreground_bins: BinSet,
    y_scales: SegmentYScales,
    series: DerivedSeries,
    foreground_series: DerivedSeries,
    guide_spec: GuideSpec,
    guides: GuideSet,
    overview: Overview,

    selection: SelectionMapper,
    brush: BrushX,
    dragging: Option<usize>,
}

fn finite_sorted(values: Vec<f64>, what: &str) -> Vec<f64> {
    let total = values.len();
    let mut out: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    if out.len() != total {
        tracing::warn!(dropped = total - out.len(), "ignoring non-finite {what}");
    }
    out.sort_by(f64::total_cmp);
    out
}

/// Sort and de-duplicate configured boundaries, then extend them to the data range.
fn resolve_boundaries(config: &ChartConfig, data: &[f64]) -> Result<Vec<f64>> {
    let mut domains = finite_sorted(config.domains.clone(), "domains");
    let before = domains.len();
    domains.dedup();
    if domains.len() != before || domains != config.domains {
        tracing::warn!(?domains, "domains were not strictly increasing, normalized");
    }

    if let (Some(&min), Some(&max)) = (data.first(), data.last()) {
        if config.domain_auto.min && domains.first().map_or(true, |&b| min < b) {
            domains.insert(0, min);
        }
        if config.domain_auto.max && domains.last().map_or(true, |&b| max > b) {
            domains.push(max);
        }
        domains.dedup();
    }

    if domains.len() < 2 {
        return Err(ChartError::TooFewBoundaries(domains.len()));
    }
    Ok(domains)
}

/// Pixel boundaries from width fractions, padded with 0 and 1.
///
/// Falls back to an even layout when the fractions do not describe one pixel
/// boundary per domain boundary.
fn resolve_x_bins(fractions: &[f64], boundaries: usize, width: f64) -> Vec<f64> {
    let even = || -> Vec<f64> {
        let n = (boundaries - 1) as f64;
        (0..boundaries).map(|i| i as f64 * width / n).collect()
    };
    if fractions.is_empty() {
        return even();
    }

    let mut f: Vec<f64> = fractions.to_vec();
    if !f.contains(&0.0) {
        f.insert(0, 0.0);
    }
    if !f.contains(&1.0) {
        f.push(1.0);
    }
    let valid = f.len() == boundaries
        && f.iter().all(|v| (0.0..=1.0).contains(v))
        && f.windows(2).all(|w| w[0] < w[1]);
    if !valid {
        tracing::warn!(x_bins = ?fractions, boundaries, "x_bins do not match domains, using even layout");
        return even();
    }
    f.into_iter().map(|v| v * width).collect()
}

fn resolve_bin_size(sizes: &[f64], boundaries: &[f64], resolution: f64) -> Vec<f64> {
    let n = boundaries.len() - 1;
    if !sizes.is_empty() && sizes.len() != n {
        tracing::warn!(got = sizes.len(), expected = n, "bin_size length mismatch, filling");
    }
    boundaries
        .windows(2)
        .enumerate()
        .map(|(i, w)| sizes.get(i).copied().unwrap_or((w[1] - w[0]) / resolution))
        .collect()
}

impl MagnitudeChart {
    pub fn new(config: ChartConfig) -> Result<Self> {
        let layout = PlotLayout::from_config(&config.geometry);
        if !layout.is_valid() {
            return Err(ChartError::InvalidGeometry(format!(
                "plot size {}x{}",
                layout.width, layout.height
            )));
        }
        let prism = config.prism;
        if !(prism.width.is_finite() && prism.width >= 0.0) {
            return Err(ChartError::InvalidGeometry(format!(
                "prism width {}",
                prism.width
            )));
        }
        let resolution = if prism.resolution.is_finite() && prism.resolution > 0.0 {
            prism.resolution
        } else {
            tracing::warn!(resolution = prism.resolution, "invalid resolution, using 50");
            50.0
        };

        let data = finite_sorted(config.data.clone(), "samples");
        let boundaries = resolve_boundaries(&config, &data)?;
        let x_bins = resolve_x_bins(&config.x_bins, boundaries.len(), layout.width);
        let bin_size = resolve_bin_size(&config.bin_size, &boundaries, resolution);

        let metrics = PrismMetrics {
            width: prism.width,
            apex_offset: prism.apex_offset,
            hover_zone_width: prism.hover_zone_width,
            geometry: prism.geometry,
        };
        let limits = BoundaryLimits {
            plot_width: layout.width,
            min_gap: prism.min_gap,
            resolution,
        };
        let boundaries = BoundaryManager::new(boundaries, x_bins, bin_size, prism.mode, metrics, limits);

        let mut chart = Self {
            overview: Overview::compute(&data, boundaries.boundaries()),
            data,
            foreground: None,
            kind: config.kind,
            brush: BrushX::with_extent(0.0, layout.width),
            layout,
            boundaries,
            bins: BinSet::empty(),
            foreground_bins: BinSet::empty(),
            y_scales: SegmentYScales::default(),
            series: DerivedSeries::default(),
            foreground_series: DerivedSeries::default(),
            guide_spec: GuideSpec::default(),
            guides: GuideSet::default(),
            selection: SelectionMapper::new(),
            dragging: None,
        };
        chart.recompute(Phase::Rebin);
        tracing::debug!(
            segments = chart.boundaries.segment_count(),
            samples = chart.data.len(),
            "magnitude chart created"
        );
        Ok(chart)
    }

    /// Run the pipeline from `from` to the end.
    pub fn recompute(&mut self, from: Phase) {
        tracing::debug!(?from, "recompute");
        let n = self.boundaries.segment_count();

        if from <= Phase::Rebin {
            let b = self.boundaries.boundaries();
            let sizes = self.boundaries.bin_size();
            self.bins = make_bins(&self.data, b, sizes);
            self.foreground_bins = self
                .foreground
                .as_deref()
                .map(|fg| make_bins(fg, b, sizes))
                .unwrap_or_default();
            self.overview = Overview::compute(&self.data, b);
        }

        if from <= Phase::YScales {
            let top = self.boundaries.metrics().top_y();
            self.y_scales = SegmentYScales::compute(&self.bins, n, self.layout.height, top);
        }

        let xs = self.boundaries.scale();
        if from <= Phase::Geometry {
            let h = self.layout.height;
            self.series = derive(self.kind, &self.bins, &xs, &self.y_scales, h);
            self.foreground_series = derive(self.kind, &self.foreground_bins, &xs, &self.y_scales, h);
            let guides = Guides {
                xs: &xs,
                ys: &self.y_scales,
                metrics: self.boundaries.metrics(),
                plot_height: h,
            };
            self.guides = GuideSet::compute(&guides, &self.guide_spec);
        }

        self.selection.apply_stored_selection(&xs);
    }

    // Host operations

    /// Bin a secondary dataset on the current geometry; `None` clears it.
    pub fn crossfilter(&mut self, filtered: Option<Vec<f64>>) {
        self.foreground = filtered.map(|v| finite_sorted(v, "crossfilter samples"));
        let b = self.boundaries.boundaries();
        let sizes = self.boundaries.bin_size();
        self.foreground_bins = self
            .foreground
            .as_deref()
            .map(|fg| make_bins(fg, b, sizes))
            .unwrap_or_default();
        self.recompute(Phase::Geometry);
    }

    pub fn set_type(&mut self, kind: SeriesKind) {
        self.kind = kind;
        self.recompute(Phase::Geometry);
    }

    pub fn set_bin_size(&mut self, sizes: Vec<f64>) -> Result<()> {
        self.boundaries.set_bin_size(sizes)?;
        self.recompute(Phase::Rebin);
        Ok(())
    }

    /// Insert a boundary at `value`; returns its index.
    pub fn split(&mut self, value: f64) -> Result<usize> {
        let at = self.boundaries.insert_boundary(value)?;
        self.dragging = None;
        self.recompute(Phase::Rebin);
        Ok(at)
    }

    pub fn add_prism(&mut self, value: f64) -> Result<usize> {
        self.split(value)
    }

    /// Remove interior boundary `index`; returns its value.
    pub fn remove_prism(&mut self, index: usize) -> Result<f64> {
        let value = self.boundaries.remove_boundary(index)?;
        self.dragging = None;
        self.recompute(Phase::Rebin);
        Ok(value)
    }

    /// Move pixel boundary `index` directly, clamped. Returns the applied position.
    pub fn drag_boundary(&mut self, index: usize, px: f64) -> Option<f64> {
        let x = self.boundaries.drag_boundary(index, px)?;
        self.recompute(Phase::YScales);
        Some(x)
    }

    pub fn set_prism_mode(&mut self, mode: PrismMode) {
        self.boundaries.set_mode(mode);
        self.recompute(Phase::YScales);
    }

    pub fn toggle_prism_mode(&mut self) -> PrismMode {
        let mode = self.boundaries.mode().toggled();
        self.set_prism_mode(mode);
        mode
    }

    pub fn set_prism_geometry(&mut self, geometry: PrismGeometry) {
        self.boundaries.set_geometry(geometry);
        self.recompute(Phase::YScales);
    }

    pub fn set_zone_activation(&mut self, index: usize, state: ZoneState) -> Option<ZoneState> {
        let s = self.boundaries.set_activation(index, state)?;
        self.recompute(Phase::YScales);
        Some(s)
    }

    /// Register a `filter` handler.
    ///
    /// Handlers run synchronously inside the mutating call; through a
    /// [`MagnitudeChartHandle`] they run with the chart locked and must not
    /// call back into the handle.
    pub fn on_filter<F>(&mut self, handler: F)
    where
        F: FnMut(&FilterEvent) + Send + 'static,
    {
        self.selection.subscribe(handler);
    }

    pub fn custom_grid_line(&mut self, xs: Vec<f64>, counts: Vec<f64>) {
        self.guide_spec.grid_x = xs;
        self.guide_spec.grid_counts = counts;
        self.recompute(Phase::Geometry);
    }

    pub fn horizontal_lines(&mut self, counts: Vec<f64>) {
        self.guide_spec.horizontal = counts;
        self.recompute(Phase::Geometry);
    }

    pub fn vertical_lines(&mut self, values: Vec<f64>) {
        self.guide_spec.vertical = values;
        self.recompute(Phase::Geometry);
    }

    // Pointer input, plot coordinates

    /// Hover tracking for hover mode. Returns true when any zone changed activation.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> bool {
        if self.boundaries.mode() != PrismMode::Hover {
            return false;
        }
        let h = self.layout.height;
        let metrics = *self.boundaries.metrics();
        let mut changed = false;
        for i in 1..self.boundaries.segment_count() {
            let xb = self.boundaries.x_bins()[i];
            let over = metrics.hover_zone(xb, h).contains(x, y)
                || metrics.bounds(xb, true, h).contains(x, y);
            let event = match self.boundaries.zone_state(i) {
                Some(ZoneState::Collapsed) if metrics.hover_zone(xb, h).contains(x, y) => {
                    ZoneEvent::PointerEnter
                }
                Some(ZoneState::Hovering) if !over => ZoneEvent::PointerLeave,
                _ => continue,
            };
            let before = self.boundaries.is_zone_active(i);
            self.boundaries.zone_event(i, event, over);
            changed |= before != self.boundaries.is_zone_active(i);
        }
        if changed {
            self.recompute(Phase::YScales);
        }
        changed
    }

    /// Start dragging the active zone under the pointer, if any.
    pub fn begin_prism_drag(&mut self, x: f64, y: f64) -> Option<usize> {
        let h = self.layout.height;
        let metrics = *self.boundaries.metrics();
        let i = (1..self.boundaries.segment_count()).find(|&i| {
            self.boundaries.is_zone_active(i)
                && metrics
                    .bounds(self.boundaries.x_bins()[i], true, h)
                    .contains(x, y)
        })?;
        self.boundaries.zone_event(i, ZoneEvent::DragStart, true);
        self.dragging = Some(i);
        self.recompute(Phase::YScales);
        Some(i)
    }

    pub fn drag_prism(&mut self, x: f64) -> Option<f64> {
        let i = self.dragging?;
        let candidate = self.boundaries.metrics().drag_candidate(x);
        self.drag_boundary(i, candidate)
    }

    pub fn end_prism_drag(&mut self, x: f64, y: f64) {
        let Some(i) = self.dragging.take() else {
            return;
        };
        let h = self.layout.height;
        let metrics = *self.boundaries.metrics();
        let xb = self.boundaries.x_bins()[i];
        let inside =
            metrics.hover_zone(xb, h).contains(x, y) || metrics.bounds(xb, true, h).contains(x, y);
        self.boundaries.zone_event(i, ZoneEvent::DragEnd, inside);
        self.recompute(Phase::YScales);
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    pub fn brush_start(&mut self, x: f64) {
        self.brush.begin(x);
    }

    /// Live brush update; notifies the host like a finished brush.
    pub fn brush_move(&mut self, x: f64) -> Option<Domain1D> {
        self.brush.update(x);
        let px = self.brush.range_px().filter(|(a, b)| b > a)?;
        self.brush(Some(px))
    }

    pub fn brush_end(&mut self) -> Option<Domain1D> {
        let px = self.brush.take_final_px();
        self.brush(px)
    }

    /// Apply a complete brush interval in plot pixels as user input; `None` clears.
    pub fn brush(&mut self, px: Option<(f64, f64)>) -> Option<Domain1D> {
        let xs = self.boundaries.scale();
        self.selection.on_brush_change(px, &xs)
    }

    // Queries

    pub fn scale(&self) -> SegmentedScale<'_> {
        self.boundaries.scale()
    }

    pub fn boundary_manager(&self) -> &BoundaryManager {
        &self.boundaries
    }

    pub fn boundaries(&self) -> &[f64] {
        self.boundaries.boundaries()
    }

    pub fn x_bins(&self) -> &[f64] {
        self.boundaries.x_bins()
    }

    pub fn bin_size(&self) -> &[f64] {
        self.boundaries.bin_size()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    pub fn layout(&self) -> &PlotLayout {
        &self.layout
    }

    pub fn bins(&self) -> &BinSet {
        &self.bins
    }

    pub fn foreground_bins(&self) -> &BinSet {
        &self.foreground_bins
    }

    pub fn y_scales(&self) -> &SegmentYScales {
        &self.y_scales
    }

    pub fn series(&self) -> &DerivedSeries {
        &self.series
    }

    pub fn foreground_series(&self) -> &DerivedSeries {
        &self.foreground_series
    }

    pub fn guides(&self) -> &GuideSet {
        &self.guides
    }

    pub fn overview(&self) -> &Overview {
        &self.overview
    }

    pub fn selection(&self) -> Option<Domain1D> {
        self.selection.selection()
    }

    pub fn highlight(&self) -> Option<(f64, f64)> {
        self.selection.highlight()
    }

    pub fn snapshot(&self) -> ChartSnapshot {
        let b = &self.boundaries;
        let metrics = b.metrics();
        let zones = (1..b.segment_count())
            .filter_map(|i| {
                let state = b.zone_state(i)?;
                let active = b.is_zone_active(i);
                Some(ZoneSnapshot {
                    index: i,
                    state,
                    active,
                    outline: metrics.outline(b.x_bins()[i], active, self.layout.height),
                })
            })
            .collect();
        ChartSnapshot {
            layout: self.layout,
            boundaries: b.boundaries().to_vec(),
            x_bins: b.x_bins().to_vec(),
            bin_size: b.bin_size().to_vec(),
            mode: b.mode(),
            geometry: metrics.geometry,
            zones,
            bins: self.bins.clone(),
            foreground_bins: self.foreground_bins.clone(),
            max_counts: self.y_scales.max_counts(),
            kind: self.kind,
            series: self.series.clone(),
            foreground_series: self.foreground_series.clone(),
            guides: self.guides.clone(),
            overview: self.overview.clone(),
            selection: self.selection().map(|d| [d.min, d.max]),
            highlight: self.highlight(),
        }
    }
}

/// Shared handle a host keeps to drive one chart.
#[derive(Clone)]
pub struct MagnitudeChartHandle(pub Arc<Mutex<MagnitudeChart>>);

impl MagnitudeChartHandle {
    pub fn new(chart: MagnitudeChart) -> Self {
        Self(Arc::new(Mutex::new(chart)))
    }

    pub fn from_config(config: ChartConfig) -> Result<Self> {
        MagnitudeChart::new(config).map(Self::new)
    }

    fn with<R>(&self, f: impl FnOnce(&mut MagnitudeChart) -> R) -> Result<R> {
        let mut chart = self.0.lock().map_err(|_| ChartError::Poisoned)?;
        Ok(f(&mut *chart))
    }

    pub fn crossfilter(&self, filtered: Option<Vec<f64>>) -> Result<()> {
        self.with(|c| c.crossfilter(filtered))
    }

    pub fn set_type(&self, kind: SeriesKind) -> Result<()> {
        self.with(|c| c.set_type(kind))
    }

    pub fn kind(&self) -> Result<SeriesKind> {
        self.with(|c| c.kind())
    }

    pub fn bin_size(&self, sizes: Vec<f64>) -> Result<()> {
        self.with(|c| c.set_bin_size(sizes))?
    }

    pub fn split(&self, value: f64) -> Result<usize> {
        self.with(|c| c.split(value))?
    }

    pub fn add_prism(&self, value: f64) -> Result<usize> {
        self.with(|c| c.add_prism(value))?
    }

    pub fn remove_prism(&self, index: usize) -> Result<f64> {
        self.with(|c| c.remove_prism(index))?
    }

    pub fn toggle_prism_mode(&self) -> Result<PrismMode> {
        self.with(|c| c.toggle_prism_mode())
    }

    pub fn set_prism_mode(&self, mode: PrismMode) -> Result<()> {
        self.with(|c| c.set_prism_mode(mode))
    }

    pub fn set_prism_geometry(&self, geometry: PrismGeometry) -> Result<()> {
        self.with(|c| c.set_prism_geometry(geometry))
    }

    pub fn drag_boundary(&self, index: usize, px: f64) -> Result<Option<f64>> {
        self.with(|c| c.drag_boundary(index, px))
    }

    pub fn custom_grid_line(&self, xs: Vec<f64>, counts: Vec<f64>) -> Result<()> {
        self.with(|c| c.custom_grid_line(xs, counts))
    }

    pub fn horizontal_lines(&self, counts: Vec<f64>) -> Result<()> {
        self.with(|c| c.horizontal_lines(counts))
    }

    pub fn vertical_lines(&self, values: Vec<f64>) -> Result<()> {
        self.with(|c| c.vertical_lines(values))
    }

    /// Map domain values to `(segment, pixel)`.
    pub fn forward(&self, values: &[f64]) -> Result<Vec<(usize, f64)>> {
        self.with(|c| {
            let xs = c.scale();
            values
                .iter()
                .map(|&v| (xs.segment_index_of(v), xs.forward(v)))
                .collect()
        })
    }

    pub fn inverse(&self, pixels: &[f64]) -> Result<Vec<f64>> {
        self.with(|c| {
            let xs = c.scale();
            pixels.iter().map(|&p| xs.inverse(p)).collect()
        })
    }

    pub fn on_filter<F>(&self, handler: F) -> Result<()>
    where
        F: FnMut(&FilterEvent) + Send + 'static,
    {
        self.with(|c| c.on_filter(handler))
    }

    pub fn brush(&self, px: Option<(f64, f64)>) -> Result<Option<Domain1D>> {
        self.with(|c| c.brush(px))
    }

    pub fn snapshot(&self) -> Result<ChartSnapshot> {
        self.with(|c| c.snapshot())
    }
}
