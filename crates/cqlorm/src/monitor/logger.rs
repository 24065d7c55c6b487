use super::types::{QueryContext, QueryMonitor, QueryResult};
use chrono::{SecondsFormat, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Query log sink.
///
/// Emits one `tracing` event per statement at target `cqlorm.query` with the CQL text, its
/// bound values and an RFC 3339 timestamp. Batches log every entry before submission, each
/// marked with its position (`fields=batch=1/3`). Logging is on by default and can be toggled
/// at runtime from any thread; it never fails.
///
/// ```ignore
/// let client = cqlorm::logged(session);
/// if let Some(logger) = client.logger() {
///     logger.disable();
/// }
/// ```
#[derive(Debug)]
pub struct QueryLogger {
    enabled: AtomicBool,
}

impl Default for QueryLogger {
    fn default() -> Self {
        Self {
            enabled: AtomicBool::new(true),
        }
    }
}

impl QueryLogger {
    /// Create an enabled logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a disabled logger.
    pub fn disabled() -> Self {
        Self {
            enabled: AtomicBool::new(false),
        }
    }

    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
        tracing::info!(target: "cqlorm.query", "query logging enabled");
    }

    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
        tracing::info!(target: "cqlorm.query", "query logging disabled");
    }

    pub fn set_enabled(&self, enabled: bool) {
        if enabled {
            self.enable();
        } else {
            self.disable();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

impl QueryMonitor for QueryLogger {
    fn on_query_start(&self, ctx: &QueryContext) {
        if !self.is_enabled() {
            return;
        }
        tracing::info!(
            target: "cqlorm.query",
            query_type = ?ctx.query_type,
            fields = %ctx.fields_display(),
            query = %ctx.cql,
            params = %ctx.params_display(),
            time = %Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            "query"
        );
    }

    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        if !self.is_enabled() {
            return;
        }
        match result {
            QueryResult::Error(err) => tracing::warn!(
                target: "cqlorm.query",
                query_type = ?ctx.query_type,
                query = %ctx.cql,
                ?duration,
                error = %err,
                "query failed"
            ),
            _ => tracing::debug!(
                target: "cqlorm.query",
                query_type = ?ctx.query_type,
                ?duration,
                result = %result,
                "query completed"
            ),
        }
    }

    fn on_slow_query(&self, ctx: &QueryContext, duration: Duration) {
        if !self.is_enabled() {
            return;
        }
        tracing::warn!(
            target: "cqlorm.query",
            query_type = ?ctx.query_type,
            query = %ctx.cql,
            ?duration,
            "slow query"
        );
    }
}
