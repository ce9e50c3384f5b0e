use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::{
    CompiledQueries, Compiler, FormState, SignalsQuery, StockDataQuery,
    form::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW},
};
use crate::core::{MarketSummary, PerformanceSeries, Viewport};
use crate::error::{ChartResult, DashboardError, FetchError};
use crate::feed::{
    CodeCatalog, CodeItem, DataSource, SignalsMeta, SignalsPayload, StockDataView,
    strategy_assumptions,
};
use crate::render::SurfaceFactory;

use super::engine_config::DashboardConfig;
use super::performance_chart::PerformanceChart;
use super::price_chart::PriceChart;

/// A compiled query stamped with the generation it was issued under.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTicket<Q> {
    generation: u64,
    query: Q,
}

impl<Q> QueryTicket<Q> {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn query(&self) -> &Q {
        &self.query
    }
}

/// Tickets for both query kinds of one accepted submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub signals: QueryTicket<SignalsQuery>,
    pub stock_data: QueryTicket<StockDataQuery>,
}

/// What happened to a resolved fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Data pushed to the charts.
    Applied,
    /// The fetch failed; the error is published and the affected series are
    /// emptied.
    Failed,
    /// A newer submission superseded the ticket; nothing changed.
    Stale,
}

/// One dashboard session: the configuration compiler, both charts and the
/// error channel.
///
/// Fetches for the two query kinds resolve independently and in any order.
/// Each kind keeps its own latest generation and results for older tickets
/// are discarded, so a slow response never overwrites a newer one.
pub struct Dashboard<F: SurfaceFactory + Clone> {
    config: DashboardConfig,
    compiler: Compiler,
    catalog: CodeCatalog,
    price: PriceChart<F>,
    performance: PerformanceChart<F>,
    queries: Option<CompiledQueries>,
    signals_generation: u64,
    stock_data_generation: u64,
    signals_meta: Option<SignalsMeta>,
    stock_meta: Option<Map<String, Value>>,
    validation_error: Option<DashboardError>,
    stock_data_error: Option<DashboardError>,
    signals_error: Option<DashboardError>,
    surface_error: Option<DashboardError>,
    catalog_error: Option<DashboardError>,
}

impl<F: SurfaceFactory + Clone> Dashboard<F> {
    /// Validates `config` and mounts the price chart.
    pub fn new(factory: F, config: DashboardConfig) -> ChartResult<Self> {
        config.validate()?;

        let short_window = u32::try_from(DEFAULT_SHORT_WINDOW).unwrap_or(1);
        let long_window = u32::try_from(DEFAULT_LONG_WINDOW).unwrap_or(2);
        let mut price = PriceChart::new(
            factory.clone(),
            config.price_viewport,
            short_window,
            long_window,
        )?
        .with_focus_half_window_days(config.focus_half_window_days);
        price.mount()?;
        let performance = PerformanceChart::new(factory, config.performance_viewport)?;

        Ok(Self {
            compiler: config.compiler(),
            catalog: CodeCatalog::from_fetch_or(Ok(Vec::new()), config.fallback_codes.clone()),
            config,
            price,
            performance,
            queries: None,
            signals_generation: 0,
            stock_data_generation: 0,
            signals_meta: None,
            stock_meta: None,
            validation_error: None,
            stock_data_error: None,
            signals_error: None,
            surface_error: None,
            catalog_error: None,
        })
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    #[must_use]
    pub fn catalog(&self) -> &CodeCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn price_chart(&self) -> &PriceChart<F> {
        &self.price
    }

    #[must_use]
    pub fn performance_chart(&self) -> &PerformanceChart<F> {
        &self.performance
    }

    /// Queries of the latest accepted submission.
    #[must_use]
    pub fn queries(&self) -> Option<&CompiledQueries> {
        self.queries.as_ref()
    }

    #[must_use]
    pub fn signals_meta(&self) -> Option<&SignalsMeta> {
        self.signals_meta.as_ref()
    }

    #[must_use]
    pub fn stock_meta(&self) -> Option<&Map<String, Value>> {
        self.stock_meta.as_ref()
    }

    #[must_use]
    pub fn strategy_assumptions(&self) -> Option<&Value> {
        strategy_assumptions(self.stock_meta.as_ref())
    }

    #[must_use]
    pub fn summary(&self) -> MarketSummary {
        MarketSummary::from_data(self.price.bars(), self.price.signals())
    }

    /// Error of the last rejected form, cleared by the next accepted one.
    #[must_use]
    pub fn validation_error(&self) -> Option<&DashboardError> {
        self.validation_error.as_ref()
    }

    /// Most relevant outstanding fetch or surface error: stock data first,
    /// then signals, then surfaces, then the code list.
    #[must_use]
    pub fn last_error(&self) -> Option<&DashboardError> {
        self.stock_data_error
            .as_ref()
            .or(self.signals_error.as_ref())
            .or(self.surface_error.as_ref())
            .or(self.catalog_error.as_ref())
    }

    /// Installs the code list. Failures and empty lists fall back to the
    /// configured defaults.
    pub fn load_codes(&mut self, result: Result<Vec<CodeItem>, FetchError>) {
        self.catalog_error = result.as_ref().err().cloned().map(DashboardError::from);
        self.catalog = CodeCatalog::from_fetch_or(result, self.config.fallback_codes.clone());
    }

    /// Compiles `form` and issues new tickets for both query kinds.
    ///
    /// A rejected form leaves the charts and outstanding tickets untouched.
    /// An accepted one drops any focus and brings the charts in line with the
    /// new structure, then supersedes every earlier ticket. If a surface
    /// fails along the way, earlier tickets stay current.
    pub fn submit(&mut self, form: &FormState) -> Result<Submission, DashboardError> {
        let compiled = match self.compiler.compile(form) {
            Ok(compiled) => compiled,
            Err(err) => {
                let err = DashboardError::from(err);
                self.validation_error = Some(err.clone());
                return Err(err);
            }
        };
        self.validation_error = None;
        self.signals_error = None;
        self.stock_data_error = None;
        self.surface_error = None;

        let common = compiled.signals.common();
        let result = self
            .price
            .set_windows(common.short_window(), common.long_window())
            .and_then(|()| self.price.clear());
        self.record_chart(result)?;
        if compiled.stock_data.include_performance() {
            if !self.performance.is_mounted() {
                let result = self.performance.mount();
                self.record_chart(result)?;
            }
        } else {
            self.performance.unmount();
        }

        self.signals_generation += 1;
        self.stock_data_generation += 1;
        debug!(
            signals_generation = self.signals_generation,
            stock_data_generation = self.stock_data_generation,
            "submitted dashboard queries"
        );

        let submission = Submission {
            signals: QueryTicket {
                generation: self.signals_generation,
                query: compiled.signals.clone(),
            },
            stock_data: QueryTicket {
                generation: self.stock_data_generation,
                query: compiled.stock_data.clone(),
            },
        };
        self.queries = Some(compiled);
        Ok(submission)
    }

    pub fn resolve_signals(
        &mut self,
        ticket: &QueryTicket<SignalsQuery>,
        result: Result<SignalsPayload, FetchError>,
    ) -> ChartResult<Resolution> {
        if ticket.generation != self.signals_generation {
            debug!(
                ticket = ticket.generation,
                latest = self.signals_generation,
                "discarding stale signals response"
            );
            return Ok(Resolution::Stale);
        }

        match result {
            Ok(payload) => {
                self.signals_error = None;
                self.signals_meta = Some(payload.meta);
                let result = self.price.set_signals(payload.data);
                self.record_chart(result)?;
                Ok(Resolution::Applied)
            }
            Err(err) => {
                warn!(error = %err, "signals fetch failed");
                self.signals_error = Some(err.into());
                self.signals_meta = None;
                let result = self.price.set_signals(Vec::new());
                self.record_chart(result)?;
                Ok(Resolution::Failed)
            }
        }
    }

    pub fn resolve_stock_data(
        &mut self,
        ticket: &QueryTicket<StockDataQuery>,
        result: Result<StockDataView, FetchError>,
    ) -> ChartResult<Resolution> {
        if ticket.generation != self.stock_data_generation {
            debug!(
                ticket = ticket.generation,
                latest = self.stock_data_generation,
                "discarding stale stock-data response"
            );
            return Ok(Resolution::Stale);
        }

        match result {
            Ok(view) => {
                self.stock_data_error = None;
                self.stock_meta = view.meta;
                let result = self.price.set_bars(view.bars);
                self.record_chart(result)?;
                self.apply_performance(view.performance)?;
                Ok(Resolution::Applied)
            }
            Err(err) => {
                warn!(error = %err, "stock-data fetch failed");
                self.stock_data_error = Some(err.into());
                self.stock_meta = None;
                let result = self.price.set_bars(Vec::new());
                self.record_chart(result)?;
                self.apply_performance(None)?;
                Ok(Resolution::Failed)
            }
        }
    }

    /// Submits `form` and resolves both queries through `source`, stock data
    /// first.
    pub fn fetch_with<D: DataSource>(
        &mut self,
        form: &FormState,
        source: &mut D,
    ) -> Result<(Resolution, Resolution), DashboardError> {
        let submission = self.submit(form)?;
        let stock_data = source.stock_data(submission.stock_data.query());
        let stock_resolution = self.resolve_stock_data(&submission.stock_data, stock_data)?;
        let signals = source.signals(submission.signals.query());
        let signals_resolution = self.resolve_signals(&submission.signals, signals)?;
        Ok((signals_resolution, stock_resolution))
    }

    /// Fetches the code list through `source`.
    pub fn refresh_codes<D: DataSource>(&mut self, source: &mut D) {
        self.load_codes(source.codes());
    }

    /// Focuses the price chart around `date`.
    pub fn focus(&mut self, date: NaiveDate) -> ChartResult<()> {
        let result = self.price.focus(date);
        self.record_chart(result)
    }

    /// Drops the price chart's focus and refits it.
    pub fn clear(&mut self) -> ChartResult<()> {
        let result = self.price.clear();
        self.record_chart(result)
    }

    pub fn resize_price(&mut self, viewport: Viewport) -> ChartResult<()> {
        let result = self.price.resize(viewport);
        self.record_chart(result)
    }

    pub fn resize_performance(&mut self, viewport: Viewport) -> ChartResult<()> {
        let result = self.performance.resize(viewport);
        self.record_chart(result)
    }

    fn apply_performance(&mut self, performance: Option<PerformanceSeries>) -> ChartResult<()> {
        let result = self.performance.set_performance(performance);
        self.record_chart(result)
    }

    fn record_chart<T>(&mut self, result: ChartResult<T>) -> ChartResult<T> {
        if let Err(err) = &result {
            warn!(error = %err, "surface update failed");
            self.surface_error = Some(DashboardError::Chart(err.clone()));
        }
        result
    }
}
