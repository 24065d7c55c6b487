use crate::statement::{StatementKind, starts_with_keyword};
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// The type of CQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// Logged batch of mutations
    Batch,
    /// Other CQL (DDL, USE, …)
    Other,
}

impl QueryType {
    /// Detect query type from CQL text.
    pub fn from_cql(cql: &str) -> Self {
        let trimmed = cql.trim_start();
        if starts_with_keyword(trimmed, "SELECT") {
            QueryType::Select
        } else if starts_with_keyword(trimmed, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(trimmed, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(trimmed, "DELETE") {
            QueryType::Delete
        } else if starts_with_keyword(trimmed, "BEGIN") {
            QueryType::Batch
        } else {
            QueryType::Other
        }
    }
}

impl From<StatementKind> for QueryType {
    fn from(kind: StatementKind) -> Self {
        match kind {
            StatementKind::Select => QueryType::Select,
            StatementKind::Insert => QueryType::Insert,
            StatementKind::Update => QueryType::Update,
            StatementKind::Delete => QueryType::Delete,
        }
    }
}

/// Context information about the statement being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// CQL text sent to the store (for a batch, a summary line).
    pub cql: String,
    /// Bound values in placeholder order.
    pub params: Vec<Value>,
    /// Detected query type.
    pub query_type: QueryType,
    /// Structured fields for observability (low-cardinality), e.g. `batch = "2/3"` for the
    /// second entry of a three-statement batch.
    pub fields: BTreeMap<String, String>,
}

impl QueryContext {
    /// Create a new query context.
    pub fn new(cql: &str, params: &[Value]) -> Self {
        Self {
            cql: cql.to_string(),
            params: params.to_vec(),
            query_type: QueryType::from_cql(cql),
            fields: BTreeMap::new(),
        }
    }

    /// Context for a whole batch submission of `statements` entries.
    pub fn batch(statements: usize) -> Self {
        Self {
            cql: format!("BEGIN BATCH ({statements} statements) APPLY BATCH"),
            params: Vec::new(),
            query_type: QueryType::Batch,
            fields: BTreeMap::new(),
        }
    }

    /// Add a structured field (low-cardinality).
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Number of bound values.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Fields rendered for logs as `key=value` pairs, e.g. `batch=1/2`; `-` when empty.
    pub fn fields_display(&self) -> String {
        if self.fields.is_empty() {
            return "-".to_string();
        }
        self.fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Bound values rendered for logs, e.g. `[1, 'Alice']`.
    pub fn params_display(&self) -> String {
        Value::List(self.params.clone()).to_string()
    }
}

/// Maximum length for error messages in `QueryResult::Error`.
const MAX_ERROR_LEN: usize = 512;

/// Result of a statement execution for monitoring purposes.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Query returned rows.
    Rows(usize),
    /// Mutation or DDL applied.
    Applied,
    /// Batch of n statements applied.
    Batch(usize),
    /// Query failed with an error (truncated to 512 bytes).
    Error(String),
}

impl QueryResult {
    /// Create an error result, truncating the message to avoid monitoring data explosion.
    pub fn error(msg: String) -> Self {
        if msg.len() <= MAX_ERROR_LEN {
            return Self::Error(msg);
        }
        let mut end = MAX_ERROR_LEN;
        while end > 0 && !msg.is_char_boundary(end) {
            end -= 1;
        }
        Self::Error(format!("{}...", &msg[..end]))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Error(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Applied => f.write_str("applied"),
            QueryResult::Batch(n) => write!(f, "batch of {n} applied"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Trait for monitoring CQL execution.
///
/// Implement this trait to collect metrics, log queries, or integrate
/// with observability systems.
pub trait QueryMonitor: Send + Sync {
    /// Called before a statement is sent. For batches, called once per entry.
    ///
    /// Default implementation does nothing.
    fn on_query_start(&self, _ctx: &QueryContext) {}

    /// Called after a statement (or a whole batch) completes, success or failure.
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult);

    /// Called when a slow query is detected.
    ///
    /// Default implementation does nothing. Override to add alerting.
    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {}
}
