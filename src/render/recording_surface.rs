use std::cell::Cell;
use std::rc::Rc;

use crate::core::{TimeScale, Viewport, VisibleRange};
use crate::error::{ChartError, ChartResult};
use crate::extensions::markers::SignalMarker;
use crate::render::{ChartSurface, SeriesData, SeriesHandle, SeriesSpec, SurfaceFactory};

/// One call received by a `RecordingSurface`, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    AddSeries { title: String },
    SetSeriesData { series: SeriesHandle, len: usize },
    SetMarkers { series: SeriesHandle, len: usize },
    FitContent,
    SetVisibleRange(VisibleRange),
    Relayout(Viewport),
    Release,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSeries {
    pub spec: SeriesSpec,
    pub data: Option<SeriesData>,
    pub markers: Vec<SignalMarker>,
}

/// Creation and release counters shared by a factory and its surfaces.
#[derive(Debug, Default)]
pub struct SurfaceStats {
    created: Cell<usize>,
    released: Cell<usize>,
}

impl SurfaceStats {
    #[must_use]
    pub fn created(&self) -> usize {
        self.created.get()
    }

    #[must_use]
    pub fn released(&self) -> usize {
        self.released.get()
    }

    /// Surfaces created and not yet released.
    #[must_use]
    pub fn live(&self) -> usize {
        self.created() - self.released()
    }
}

/// Headless surface used by tests and tooling.
///
/// It keeps the last payload of every series and tracks its own time axis so
/// `fit_content` and `set_visible_range` can be observed.
#[derive(Debug)]
pub struct RecordingSurface {
    viewport: Viewport,
    series: Vec<RecordedSeries>,
    time_scale: TimeScale,
    calls: Vec<SurfaceCall>,
    released: bool,
    stats: Rc<SurfaceStats>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self::with_stats(viewport, Rc::default())
    }

    fn with_stats(viewport: Viewport, stats: Rc<SurfaceStats>) -> Self {
        stats.created.set(stats.created.get() + 1);
        Self {
            viewport,
            series: Vec::new(),
            time_scale: TimeScale::new(),
            calls: Vec::new(),
            released: false,
            stats,
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn series(&self) -> &[RecordedSeries] {
        &self.series
    }

    #[must_use]
    pub fn series_titled(&self, title: &str) -> Option<&RecordedSeries> {
        self.series.iter().find(|series| series.spec.title == title)
    }

    #[must_use]
    pub fn calls(&self) -> &[SurfaceCall] {
        &self.calls
    }

    #[must_use]
    pub fn time_scale(&self) -> TimeScale {
        self.time_scale
    }

    #[must_use]
    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.time_scale.visible_range()
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.released
    }

    fn ensure_live(&self) -> ChartResult<()> {
        if self.released {
            return Err(ChartError::SurfaceUnavailable);
        }
        Ok(())
    }

    fn series_mut(&mut self, series: SeriesHandle) -> ChartResult<&mut RecordedSeries> {
        self.series
            .get_mut(series.0)
            .ok_or_else(|| ChartError::InvalidData(format!("unknown series handle {}", series.0)))
    }
}

impl ChartSurface for RecordingSurface {
    fn add_series(&mut self, spec: &SeriesSpec) -> ChartResult<SeriesHandle> {
        self.ensure_live()?;
        spec.color.validate()?;
        self.calls.push(SurfaceCall::AddSeries {
            title: spec.title.clone(),
        });
        self.series.push(RecordedSeries {
            spec: spec.clone(),
            data: None,
            markers: Vec::new(),
        });
        Ok(SeriesHandle(self.series.len() - 1))
    }

    fn set_series_data(&mut self, series: SeriesHandle, data: SeriesData) -> ChartResult<()> {
        self.ensure_live()?;
        let len = data.len();
        let target = self.series_mut(series)?;
        if target.spec.kind != data.kind() {
            return Err(ChartError::InvalidData(format!(
                "series `{}` expects {:?} data, got {:?}",
                target.spec.title,
                target.spec.kind,
                data.kind()
            )));
        }
        target.data = Some(data);
        self.calls.push(SurfaceCall::SetSeriesData { series, len });
        Ok(())
    }

    fn set_markers(&mut self, series: SeriesHandle, markers: &[SignalMarker]) -> ChartResult<()> {
        self.ensure_live()?;
        self.series_mut(series)?.markers = markers.to_vec();
        self.calls.push(SurfaceCall::SetMarkers {
            series,
            len: markers.len(),
        });
        Ok(())
    }

    fn fit_content(&mut self) -> ChartResult<()> {
        self.ensure_live()?;
        let dates = self
            .series
            .iter()
            .filter_map(|series| series.data.as_ref())
            .flat_map(SeriesData::dates)
            .collect::<Vec<_>>();
        self.time_scale.fit_to_dates(dates);
        self.calls.push(SurfaceCall::FitContent);
        Ok(())
    }

    fn set_visible_range(&mut self, range: VisibleRange) -> ChartResult<()> {
        self.ensure_live()?;
        self.time_scale.set_visible_range(range);
        self.calls.push(SurfaceCall::SetVisibleRange(range));
        Ok(())
    }

    fn relayout(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.ensure_live()?;
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.viewport = viewport;
        self.calls.push(SurfaceCall::Relayout(viewport));
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.calls.push(SurfaceCall::Release);
        self.stats.released.set(self.stats.released.get() + 1);
    }
}

/// Factory for `RecordingSurface`s. Clones share one `SurfaceStats`.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurfaceFactory {
    stats: Rc<SurfaceStats>,
    limit: Option<usize>,
}

impl RecordingSurfaceFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose `create` always fails, for exercising error paths.
    #[must_use]
    pub fn refusing() -> Self {
        Self::limited(0)
    }

    /// A factory that refuses once `max_created` surfaces exist in total.
    #[must_use]
    pub fn limited(max_created: usize) -> Self {
        Self {
            limit: Some(max_created),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn stats(&self) -> &SurfaceStats {
        &self.stats
    }
}

impl SurfaceFactory for RecordingSurfaceFactory {
    type Surface = RecordingSurface;

    fn create(&mut self, viewport: Viewport) -> ChartResult<Self::Surface> {
        if self.limit.is_some_and(|max| self.stats.created() >= max) {
            return Err(ChartError::SurfaceFailure(
                "surface creation refused".to_owned(),
            ));
        }
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(RecordingSurface::with_stats(viewport, Rc::clone(&self.stats)))
    }
}
