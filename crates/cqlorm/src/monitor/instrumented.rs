use super::config::MonitorConfig;
use super::logger::QueryLogger;
use super::monitors::NoopMonitor;
use super::types::{QueryContext, QueryMonitor, QueryResult};
use crate::client::CqlClient;
use crate::config::SessionConfig;
use crate::error::OrmResult;
use crate::row::Row;
use crate::statement::Statement;
use crate::value::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A client wrapper that reports every statement to a [`QueryMonitor`].
///
/// Monitoring must be explicitly enabled via `MonitorConfig::enable_monitoring()` (or
/// [`InstrumentedClient::enable_monitoring`]); [`logged`] does both for the query log sink.
pub struct InstrumentedClient<C> {
    client: C,
    monitor: Arc<dyn QueryMonitor>,
    logger: Option<Arc<QueryLogger>>,
    config: MonitorConfig,
}

/// Wrap `client` with an enabled [`QueryLogger`], reachable through
/// [`InstrumentedClient::logger`].
pub fn logged<C: CqlClient>(client: C) -> InstrumentedClient<C> {
    InstrumentedClient::new(client)
        .with_logger(Arc::new(QueryLogger::new()))
        .enable_monitoring()
}

/// Wrap `client` with a [`QueryLogger`] and the monitoring switches of the `[logging]` section.
///
/// This is how [`connect_logged`](crate::connect_logged) installs the sink on a live session.
pub fn logged_with_config<C: CqlClient>(client: C, config: &SessionConfig) -> InstrumentedClient<C> {
    InstrumentedClient::new(client)
        .with_config(config.monitor_config())
        .with_logger(Arc::new(QueryLogger::new()))
}

impl<C: CqlClient> InstrumentedClient<C> {
    /// Create a new instrumented client with no monitoring.
    pub fn new(client: C) -> Self {
        Self {
            client,
            monitor: Arc::new(NoopMonitor),
            logger: None,
            config: MonitorConfig::default(),
        }
    }

    /// Set the monitor configuration.
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the query monitor.
    pub fn with_monitor<M: QueryMonitor + 'static>(self, monitor: M) -> Self {
        self.with_monitor_arc(Arc::new(monitor))
    }

    /// Set the query monitor from an Arc.
    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self.logger = None;
        self
    }

    /// Use `logger` as the monitor and keep a handle to it for runtime toggling.
    pub fn with_logger(mut self, logger: Arc<QueryLogger>) -> Self {
        self.monitor = logger.clone();
        self.logger = Some(logger);
        self
    }

    /// The installed query log sink, if the monitor is a [`QueryLogger`].
    ///
    /// ```ignore
    /// if let Some(logger) = client.logger() {
    ///     logger.disable();
    /// }
    /// ```
    pub fn logger(&self) -> Option<&QueryLogger> {
        self.logger.as_deref()
    }

    /// Enable monitoring.
    pub fn enable_monitoring(mut self) -> Self {
        self.config.monitoring_enabled = true;
        self
    }

    /// Check if monitoring is enabled.
    pub fn is_monitoring_enabled(&self) -> bool {
        self.config.monitoring_enabled
    }

    /// Get the current configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Get a reference to the inner client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Get the inner client, consuming this wrapper.
    pub fn into_inner(self) -> C {
        self.client
    }

    fn report_start(&self, ctx: &QueryContext) {
        if self.config.monitoring_enabled {
            self.monitor.on_query_start(ctx);
        }
    }

    fn report_result(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        if !self.config.monitoring_enabled {
            return;
        }

        self.monitor.on_query_complete(ctx, duration, result);

        if self.config.is_slow(duration) {
            self.monitor.on_slow_query(ctx, duration);
        }
    }
}

fn result_of<T>(result: &OrmResult<T>, ok: impl FnOnce(&T) -> QueryResult) -> QueryResult {
    match result {
        Ok(v) => ok(v),
        Err(e) => QueryResult::error(e.to_string()),
    }
}

impl<C: CqlClient> CqlClient for InstrumentedClient<C> {
    async fn execute(&self, cql: &str, params: &[Value]) -> OrmResult<()> {
        let ctx = QueryContext::new(cql, params);
        self.report_start(&ctx);

        let start = Instant::now();
        let result = self.client.execute(cql, params).await;
        let duration = start.elapsed();

        self.report_result(&ctx, duration, &result_of(&result, |_| QueryResult::Applied));
        result
    }

    async fn query(&self, cql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        let ctx = QueryContext::new(cql, params);
        self.report_start(&ctx);

        let start = Instant::now();
        let result = self.client.query(cql, params).await;
        let duration = start.elapsed();

        self.report_result(
            &ctx,
            duration,
            &result_of(&result, |rows| QueryResult::Rows(rows.len())),
        );
        result
    }

    async fn batch(&self, statements: &[Statement]) -> OrmResult<()> {
        let total = statements.len();
        for (i, stmt) in statements.iter().enumerate() {
            let ctx = QueryContext::new(&stmt.cql, &stmt.params)
                .with_field("batch", format!("{}/{total}", i + 1));
            self.report_start(&ctx);
        }

        let ctx = QueryContext::batch(statements.len());
        let start = Instant::now();
        let result = self.client.batch(statements).await;
        let duration = start.elapsed();

        self.report_result(
            &ctx,
            duration,
            &result_of(&result, |_| QueryResult::Batch(statements.len())),
        );
        result
    }
}
