use chrono::NaiveDate;
use tracing::{debug, trace};

use crate::core::{Bar, MovingAverageLine, Signal, Viewport, VisibleRange};
use crate::error::{ChartError, ChartResult};
use crate::extensions::markers::markers_from_signals;
use crate::render::{
    ChartSurface, Color, SeriesData, SeriesHandle, SeriesKind, SeriesSpec, SurfaceFactory,
};

use super::engine_config::DEFAULT_FOCUS_HALF_WINDOW_DAYS;
use super::lifecycle::{MountedSurface, SurfaceState};
use super::series_projection::{
    VOLUME_ALPHA, project_candles, project_moving_average, project_volume,
};

/// Series installed on a mounted price surface. Markers overlay `candles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSeriesHandles {
    pub candles: SeriesHandle,
    pub ma_short: SeriesHandle,
    pub ma_long: SeriesHandle,
    pub volume: SeriesHandle,
}

#[must_use]
pub fn moving_average_title(window: u32) -> String {
    format!("MA({window})")
}

/// Price panel: candles, both moving averages, volume and trade markers.
///
/// Inputs are held independently so bars and signals can arrive in either
/// order; every change is pushed to the surface in one reconciliation pass.
pub struct PriceChart<F: SurfaceFactory> {
    factory: F,
    viewport: Viewport,
    short_window: u32,
    long_window: u32,
    focus_half_window_days: u32,
    bars: Vec<Bar>,
    signals: Vec<Signal>,
    focus: Option<NaiveDate>,
    state: SurfaceState<F::Surface, PriceSeriesHandles>,
}

impl<F: SurfaceFactory> PriceChart<F> {
    pub fn new(
        factory: F,
        viewport: Viewport,
        short_window: u32,
        long_window: u32,
    ) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(Self {
            factory,
            viewport,
            short_window,
            long_window,
            focus_half_window_days: DEFAULT_FOCUS_HALF_WINDOW_DAYS,
            bars: Vec::new(),
            signals: Vec::new(),
            focus: None,
            state: SurfaceState::Unmounted,
        })
    }

    #[must_use]
    pub fn with_focus_half_window_days(mut self, days: u32) -> Self {
        self.focus_half_window_days = days;
        self
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn windows(&self) -> (u32, u32) {
        (self.short_window, self.long_window)
    }

    #[must_use]
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    #[must_use]
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    #[must_use]
    pub fn focused_date(&self) -> Option<NaiveDate> {
        self.focus
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.state.is_mounted()
    }

    #[must_use]
    pub fn surface(&self) -> Option<&F::Surface> {
        self.state.mounted().map(MountedSurface::surface)
    }

    #[must_use]
    pub fn handles(&self) -> Option<PriceSeriesHandles> {
        self.state.mounted().map(|mounted| *mounted.handles())
    }

    /// Allocates the surface (releasing any previous one) and pushes the
    /// current inputs.
    pub fn mount(&mut self) -> ChartResult<()> {
        self.state.unmount();
        let (short_window, long_window) = (self.short_window, self.long_window);
        let mounted = MountedSurface::mount(&mut self.factory, self.viewport, |surface| {
            install_price_series(surface, short_window, long_window)
        })?;
        self.state.replace(mounted);
        self.reconcile()
    }

    pub fn unmount(&mut self) {
        if self.state.is_mounted() {
            debug!("unmounting price surface");
        }
        self.state.unmount();
    }

    /// Window sizes title the MA series, so a change remounts the surface.
    pub fn set_windows(&mut self, short_window: u32, long_window: u32) -> ChartResult<()> {
        if (short_window, long_window) == (self.short_window, self.long_window) {
            return Ok(());
        }
        self.short_window = short_window;
        self.long_window = long_window;
        if self.state.is_mounted() {
            debug!(short_window, long_window, "window sizes changed, remounting");
            self.mount()?;
        }
        Ok(())
    }

    pub fn set_bars(&mut self, bars: Vec<Bar>) -> ChartResult<()> {
        self.bars = bars;
        self.reconcile()
    }

    pub fn set_signals(&mut self, signals: Vec<Signal>) -> ChartResult<()> {
        self.signals = signals;
        self.reconcile()
    }

    /// Replaces both inputs with a single reconciliation pass.
    pub fn set_data(&mut self, bars: Vec<Bar>, signals: Vec<Signal>) -> ChartResult<()> {
        self.bars = bars;
        self.signals = signals;
        self.reconcile()
    }

    /// Narrows the view to `[date - half, date + half]` without touching
    /// series data. Dates outside the data extent are shown letterboxed.
    pub fn focus(&mut self, date: NaiveDate) -> ChartResult<()> {
        self.focus = Some(date);
        let range = VisibleRange::around(date, self.focus_half_window_days);
        if let Some(mounted) = self.state.mounted_mut() {
            trace!(%date, "focusing price surface");
            mounted.surface_mut().set_visible_range(range)?;
        }
        Ok(())
    }

    /// Drops any focus and refits to the full data extent.
    pub fn clear(&mut self) -> ChartResult<()> {
        self.focus = None;
        if let Some(mounted) = self.state.mounted_mut() {
            mounted.surface_mut().fit_content()?;
        }
        Ok(())
    }

    /// Relayouts in place; the mount state does not change.
    pub fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        self.viewport = viewport;
        if let Some(mounted) = self.state.mounted_mut() {
            mounted.surface_mut().relayout(viewport)?;
        }
        Ok(())
    }

    /// Window the chart shows: the focus window when focused, otherwise the
    /// extent of the bars.
    #[must_use]
    pub fn visible_range(&self) -> Option<VisibleRange> {
        match self.focus {
            Some(date) => Some(VisibleRange::around(date, self.focus_half_window_days)),
            None => VisibleRange::spanning(self.bars.iter().map(|bar| bar.date)),
        }
    }

    fn reconcile(&mut self) -> ChartResult<()> {
        let Some(mounted) = self.state.mounted_mut() else {
            return Ok(());
        };
        let (surface, handles) = mounted.parts_mut();

        let candles = project_candles(&self.bars);
        let ma_short = project_moving_average(&self.bars, MovingAverageLine::Short);
        let ma_long = project_moving_average(&self.bars, MovingAverageLine::Long);
        let volume = project_volume(&self.bars);
        let markers = markers_from_signals(&self.signals);
        debug!(
            candles = candles.len(),
            ma_short = ma_short.len(),
            ma_long = ma_long.len(),
            volume = volume.len(),
            markers = markers.len(),
            "reconciling price surface"
        );

        surface.set_series_data(handles.candles, SeriesData::Candles(candles))?;
        surface.set_series_data(handles.ma_short, SeriesData::Line(ma_short))?;
        surface.set_series_data(handles.ma_long, SeriesData::Line(ma_long))?;
        surface.set_series_data(handles.volume, SeriesData::Histogram(volume))?;
        surface.set_markers(handles.candles, &markers)?;

        match self.focus {
            Some(date) => surface.set_visible_range(VisibleRange::around(
                date,
                self.focus_half_window_days,
            )),
            None => surface.fit_content(),
        }
    }
}

fn install_price_series<S: ChartSurface>(
    surface: &mut S,
    short_window: u32,
    long_window: u32,
) -> ChartResult<PriceSeriesHandles> {
    Ok(PriceSeriesHandles {
        candles: surface.add_series(&SeriesSpec::new(
            SeriesKind::Candlestick,
            "Price",
            Color::UP,
        ))?,
        ma_short: surface.add_series(&SeriesSpec::new(
            SeriesKind::Line,
            moving_average_title(short_window),
            Color::MA_SHORT,
        ))?,
        ma_long: surface.add_series(&SeriesSpec::new(
            SeriesKind::Line,
            moving_average_title(long_window),
            Color::MA_LONG,
        ))?,
        volume: surface.add_series(&SeriesSpec::new(
            SeriesKind::Histogram,
            "Volume",
            Color::UP.with_alpha(VOLUME_ALPHA),
        ))?,
    })
}
