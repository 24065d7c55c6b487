use crate::config::LoggingConfig;
use std::time::Duration;

/// When an [`InstrumentedClient`](super::InstrumentedClient) reports statements, and which of
/// them count as slow.
///
/// Off by default. Built from the `[logging]` section of `cqlorm.toml`: `queries` switches
/// reporting on and `slow_query_ms` sets the slow-statement threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Statements running longer than this trigger `on_slow_query`.
    pub slow_query_threshold: Option<Duration>,
    /// Whether statements are reported at all.
    pub monitoring_enabled: bool,
}

impl MonitorConfig {
    /// Reporting off, no slow threshold.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn enable_monitoring(mut self) -> Self {
        self.monitoring_enabled = true;
        self
    }

    /// Whether a statement that took `elapsed` is over the slow threshold.
    pub fn is_slow(&self, elapsed: Duration) -> bool {
        self.slow_query_threshold
            .is_some_and(|threshold| elapsed > threshold)
    }
}

impl From<&LoggingConfig> for MonitorConfig {
    fn from(logging: &LoggingConfig) -> Self {
        Self {
            slow_query_threshold: logging.slow_query_ms.map(Duration::from_millis),
            monitoring_enabled: logging.queries,
        }
    }
}
