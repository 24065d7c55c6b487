//! Query monitoring and the query log sink.
//!
//! This module provides:
//! - [`QueryMonitor`], the callback trait invoked around every statement
//! - [`QueryLogger`], the log sink (`tracing` target `cqlorm.query`)
//! - [`StatsMonitor`] and [`CompositeMonitor`] for metrics and fan-out
//! - [`InstrumentedClient`], a [`CqlClient`](crate::CqlClient) wrapper that drives the monitors
//!
//! # Example
//!
//! ```rust,ignore
//! use cqlorm::monitor::{CompositeMonitor, InstrumentedClient, MonitorConfig, QueryLogger, StatsMonitor};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let stats = Arc::new(StatsMonitor::new());
//! let config = MonitorConfig::new()
//!     .with_slow_query_threshold(Duration::from_millis(200))
//!     .enable_monitoring();
//!
//! let client = InstrumentedClient::new(session)
//!     .with_config(config)
//!     .with_monitor(CompositeMonitor::new().add(QueryLogger::new()).add_arc(stats.clone()));
//! ```

mod config;
mod instrumented;
mod logger;
mod monitors;
mod types;


pub use config::MonitorConfig;
pub use instrumented::{InstrumentedClient, logged, logged_with_config};
pub use logger::QueryLogger;
pub use monitors::{CompositeMonitor, NoopMonitor, QueryStats, StatsMonitor};
pub use types::{QueryContext, QueryMonitor, QueryResult, QueryType};
