use tracing::debug;

use crate::core::{PerformanceSeries, Viewport, VisibleRange};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    ChartSurface, Color, LineStrokeStyle, SeriesData, SeriesHandle, SeriesKind, SeriesSpec,
    SurfaceFactory,
};

use super::lifecycle::{MountedSurface, SurfaceState};
use super::series_projection::project_performance;

pub const STRATEGY_TITLE: &str = "Strategy (Normalized)";
pub const BENCHMARK_TITLE: &str = "Buy & Hold";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceSeriesHandles {
    pub strategy: SeriesHandle,
    pub benchmark: SeriesHandle,
}

/// Equity-curve panel: strategy and buy-and-hold on one time axis.
///
/// Always fitted to content after an update; focus applies to the price
/// panel only.
pub struct PerformanceChart<F: SurfaceFactory> {
    factory: F,
    viewport: Viewport,
    performance: PerformanceSeries,
    state: SurfaceState<F::Surface, PerformanceSeriesHandles>,
}

impl<F: SurfaceFactory> PerformanceChart<F> {
    pub fn new(factory: F, viewport: Viewport) -> ChartResult<Self> {
        if !viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: viewport.width,
                height: viewport.height,
            });
        }
        Ok(Self {
            factory,
            viewport,
            performance: PerformanceSeries::default(),
            state: SurfaceState::Unmounted,
        })
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    #[must_use]
    pub fn performance(&self) -> &PerformanceSeries {
        &self.performance
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
    pub fn handles(&self) -> Option<PerformanceSeriesHandles> {
        self.state.mounted().map(|mounted| *mounted.handles())
    }

    pub fn mount(&mut self) -> ChartResult<()> {
        self.state.unmount();
        let mounted = MountedSurface::mount(
            &mut self.factory,
            self.viewport,
            install_performance_series,
        )?;
        self.state.replace(mounted);
        self.reconcile()
    }

    /// Releases the surface and forgets the curves it showed.
    pub fn unmount(&mut self) {
        if self.state.is_mounted() {
            debug!("unmounting performance surface");
        }
        self.state.unmount();
        self.performance = PerformanceSeries::default();
    }

    /// `None` renders both lines empty.
    pub fn set_performance(&mut self, performance: Option<PerformanceSeries>) -> ChartResult<()> {
        self.performance = performance.unwrap_or_default();
        self.reconcile()
    }

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

    /// Extent of both curves together.
    #[must_use]
    pub fn visible_range(&self) -> Option<VisibleRange> {
        VisibleRange::spanning(
            self.performance
                .strategy
                .iter()
                .chain(&self.performance.benchmark)
                .map(|point| point.date),
        )
    }

    fn reconcile(&mut self) -> ChartResult<()> {
        let Some(mounted) = self.state.mounted_mut() else {
            return Ok(());
        };
        let (surface, handles) = mounted.parts_mut();

        let strategy = project_performance(&self.performance.strategy);
        let benchmark = project_performance(&self.performance.benchmark);
        debug!(
            strategy = strategy.len(),
            benchmark = benchmark.len(),
            "reconciling performance surface"
        );

        surface.set_series_data(handles.strategy, SeriesData::Line(strategy))?;
        surface.set_series_data(handles.benchmark, SeriesData::Line(benchmark))?;
        surface.fit_content()
    }
}

fn install_performance_series<S: ChartSurface>(
    surface: &mut S,
) -> ChartResult<PerformanceSeriesHandles> {
    Ok(PerformanceSeriesHandles {
        strategy: surface.add_series(&SeriesSpec::new(
            SeriesKind::Line,
            STRATEGY_TITLE,
            Color::STRATEGY,
        ))?,
        benchmark: surface.add_series(
            &SeriesSpec::new(SeriesKind::Line, BENCHMARK_TITLE, Color::BENCHMARK)
                .with_line_style(LineStrokeStyle::Dashed),
        )?,
    })
}
