mod primitives;
mod recording_surface;

pub use primitives::{Color, LineStrokeStyle};
pub use recording_surface::{
    RecordedSeries, RecordingSurface, RecordingSurfaceFactory, SurfaceCall, SurfaceStats,
};

use serde::{Deserialize, Serialize};

use crate::core::{Candle, HistogramPoint, LinePoint, Viewport, VisibleRange};
use crate::error::ChartResult;
use crate::extensions::markers::SignalMarker;

/// Opaque id of a series inside one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesHandle(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    Candlestick,
    Line,
    Histogram,
}

/// Static description of a series, fixed for the surface's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub kind: SeriesKind,
    pub title: String,
    pub color: Color,
    pub line_style: LineStrokeStyle,
}

impl SeriesSpec {
    #[must_use]
    pub fn new(kind: SeriesKind, title: impl Into<String>, color: Color) -> Self {
        Self {
            kind,
            title: title.into(),
            color,
            line_style: LineStrokeStyle::Solid,
        }
    }

    #[must_use]
    pub fn with_line_style(mut self, line_style: LineStrokeStyle) -> Self {
        self.line_style = line_style;
        self
    }
}

/// Full replacement payload for one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SeriesData {
    Candles(Vec<Candle>),
    Line(Vec<LinePoint>),
    Histogram(Vec<HistogramPoint>),
}

impl SeriesData {
    #[must_use]
    pub fn kind(&self) -> SeriesKind {
        match self {
            Self::Candles(_) => SeriesKind::Candlestick,
            Self::Line(_) => SeriesKind::Line,
            Self::Histogram(_) => SeriesKind::Histogram,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Candles(points) => points.len(),
            Self::Line(points) => points.len(),
            Self::Histogram(points) => points.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dates of every sample, in series order.
    pub fn dates(&self) -> Box<dyn Iterator<Item = chrono::NaiveDate> + '_> {
        match self {
            Self::Candles(points) => Box::new(points.iter().map(|point| point.date)),
            Self::Line(points) => Box::new(points.iter().map(|point| point.date)),
            Self::Histogram(points) => Box::new(points.iter().map(|point| point.date)),
        }
    }
}

/// Contract of an external charting surface.
///
/// Every `set_*` call replaces the previous content of its target. After
/// `release` the surface must not be used again.
pub trait ChartSurface {
    fn add_series(&mut self, spec: &SeriesSpec) -> ChartResult<SeriesHandle>;
    fn set_series_data(&mut self, series: SeriesHandle, data: SeriesData) -> ChartResult<()>;
    fn set_markers(&mut self, series: SeriesHandle, markers: &[SignalMarker]) -> ChartResult<()>;
    fn fit_content(&mut self) -> ChartResult<()>;
    fn set_visible_range(&mut self, range: VisibleRange) -> ChartResult<()>;
    fn relayout(&mut self, viewport: Viewport) -> ChartResult<()>;
    fn release(&mut self);
}

/// Creates surfaces for the charts that own them.
pub trait SurfaceFactory {
    type Surface: ChartSurface;

    fn create(&mut self, viewport: Viewport) -> ChartResult<Self::Surface>;
}
