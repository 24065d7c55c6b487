//! Convenient imports for typical `cqlorm` usage.
//!
//! ```ignore
//! use cqlorm::prelude::*;
//! ```

pub use crate::{
    Batch, CqlClient, FromRow, InstrumentedClient, OrmError, OrmResult, QueryBuilder, QueryLogger,
    Record, Row, RowExt, SessionConfig, Value, batch, logged, table,
};

#[cfg(feature = "scylla")]
pub use crate::{ScyllaClient, connect, connect_logged};
