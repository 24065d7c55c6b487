use super::where_clause::WhereClause;
use crate::client::CqlClient;
use crate::error::{OrmError, OrmResult};
use crate::record::Record;
use crate::row::{FromRow, Row, RowMapper};
use crate::statement::{self, Connector, Statement};
use crate::value::{IntoParams, Value};

/// Chainable query builder bound to one table.
///
/// Predicate and option methods return `&mut Self` and never fail; problems such as a
/// placeholder/value mismatch are recorded and reported by the terminal operation
/// (`insert`, `update`, `select`, `delete`) before the store is touched.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryBuilder {
    /// Target table, fixed for the builder's lifetime
    table: String,
    /// WHERE predicates and their values
    where_clause: WhereClause,
    /// LIMIT (None/0 = unlimited)
    limit: Option<u32>,
    /// ALLOW FILTERING
    allow_filtering: bool,
}

/// Start a builder for `table`.
pub fn table(name: &str) -> QueryBuilder {
    QueryBuilder::new(name)
}

impl QueryBuilder {
    /// Create a new query builder.
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            where_clause: WhereClause::new(),
            limit: None,
            allow_filtering: false,
        }
    }

    /// Target table.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    // ==================== Conditions ====================

    /// Add a raw condition with `?` placeholders.
    ///
    /// A `?` inside a `'…'` string literal is text, not a placeholder. A second bare `filter`
    /// is joined to the previous condition with `AND` rather than concatenated as written;
    /// use [`QueryBuilder::or`] for a disjunction.
    ///
    /// ```ignore
    /// qb.filter("id = ?", (id,));
    /// qb.filter("age > ? AND age < ?", (18, 65));
    /// ```
    pub fn filter<P: IntoParams>(&mut self, condition: &str, params: P) -> &mut Self {
        self.where_clause
            .push(None, condition, params.into_params());
        self
    }

    /// Add a condition prefixed with `AND`.
    ///
    /// The prefix is written even when this is the first condition.
    pub fn and<P: IntoParams>(&mut self, condition: &str, params: P) -> &mut Self {
        self.where_clause
            .push(Some(Connector::And), condition, params.into_params());
        self
    }

    /// Add a condition prefixed with `OR`.
    pub fn or<P: IntoParams>(&mut self, condition: &str, params: P) -> &mut Self {
        self.where_clause
            .push(Some(Connector::Or), condition, params.into_params());
        self
    }

    /// Add `column IN (?, ?, …)`, one placeholder per value.
    pub fn in_list<I, T>(&mut self, column: &str, values: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.where_clause.push_in(column, values);
        self
    }

    // ==================== Options ====================

    /// Cap the number of rows returned by `select`. `0` means no limit.
    pub fn limit(&mut self, n: u32) -> &mut Self {
        self.limit = (n > 0).then_some(n);
        self
    }

    /// Permit predicates on non-indexed columns (`ALLOW FILTERING`).
    pub fn allow_filtering(&mut self) -> &mut Self {
        if !self.allow_filtering {
            tracing::warn!(
                target: "cqlorm.query",
                table = %self.table,
                "ALLOW FILTERING enabled; this query may scan the whole table"
            );
        }
        self.allow_filtering = true;
        self
    }

    /// Reset predicates, bound values, limit and filtering so the builder can be reused.
    pub fn clear_where(&mut self) -> &mut Self {
        self.where_clause.clear();
        self.limit = None;
        self.allow_filtering = false;
        self
    }

    // ==================== Rendering ====================

    /// Rendered SELECT text, for inspection.
    pub fn to_cql(&self) -> String {
        self.build_select_unchecked().cql
    }

    /// Values bound to the WHERE placeholders, in order.
    pub fn params(&self) -> &[Value] {
        self.where_clause.params()
    }

    /// Number of WHERE predicates.
    pub fn predicate_count(&self) -> usize {
        self.where_clause.len()
    }

    /// Current LIMIT, if any.
    pub fn current_limit(&self) -> Option<u32> {
        self.limit
    }

    /// Whether `ALLOW FILTERING` will be rendered.
    pub fn is_filtering_allowed(&self) -> bool {
        self.allow_filtering
    }

    /// Validate builder state.
    pub fn validate(&self) -> OrmResult<()> {
        self.where_clause.validate()
    }

    fn build_select_unchecked(&self) -> Statement {
        statement::render_select(
            &self.table,
            &self.where_clause.build_clause(),
            self.where_clause.params(),
            self.limit,
            self.allow_filtering,
        )
    }

    /// Render the SELECT statement.
    pub fn build_select(&self) -> OrmResult<Statement> {
        self.validate()?;
        Ok(self.build_select_unchecked())
    }

    /// Render an INSERT of `record`. Predicates are not used.
    pub fn build_insert(&self, record: &Record, ttl: u32) -> OrmResult<Statement> {
        require_columns("INSERT", &self.table, record)?;
        Ok(statement::render_insert(&self.table, record, ttl))
    }

    /// Render an UPDATE of `record` restricted by the current predicates.
    pub fn build_update(&self, record: &Record, ttl: u32) -> OrmResult<Statement> {
        self.where_clause.require("UPDATE", &self.table)?;
        require_columns("UPDATE", &self.table, record)?;
        Ok(statement::render_update(
            &self.table,
            record,
            &self.where_clause.build_clause(),
            self.where_clause.params(),
            ttl,
        ))
    }

    /// Render a DELETE restricted by the current predicates.
    pub fn build_delete(&self) -> OrmResult<Statement> {
        self.where_clause.require("DELETE", &self.table)?;
        Ok(statement::render_delete(
            &self.table,
            &self.where_clause.build_clause(),
            self.where_clause.params(),
        ))
    }

    // ==================== Execution ====================

    /// Insert `record`; `ttl > 0` sets the row's time-to-live in seconds.
    pub async fn insert(
        &self,
        conn: &impl CqlClient,
        record: &Record,
        ttl: u32,
    ) -> OrmResult<()> {
        let stmt = self.build_insert(record, ttl)?;
        conn.execute(&stmt.cql, &stmt.params).await
    }

    /// Update the rows matched by the current predicates.
    pub async fn update(
        &self,
        conn: &impl CqlClient,
        record: &Record,
        ttl: u32,
    ) -> OrmResult<()> {
        let stmt = self.build_update(record, ttl)?;
        conn.execute(&stmt.cql, &stmt.params).await
    }

    /// Delete the rows matched by the current predicates.
    pub async fn delete(&self, conn: &impl CqlClient) -> OrmResult<()> {
        let stmt = self.build_delete()?;
        conn.execute(&stmt.cql, &stmt.params).await
    }

    /// Run the SELECT and return raw rows.
    pub async fn rows(&self, conn: &impl CqlClient) -> OrmResult<Vec<Row>> {
        let stmt = self.build_select()?;
        conn.query(&stmt.cql, &stmt.params).await
    }

    /// Run the SELECT and map every row into `T`.
    pub async fn select<T: FromRow>(&self, conn: &impl CqlClient) -> OrmResult<Vec<T>> {
        let mut out = Vec::new();
        self.select_into(conn, &mut out).await?;
        Ok(out)
    }

    /// Run the SELECT and append mapped rows to `dest` in store order.
    ///
    /// `dest` is untouched when the query fails.
    pub async fn select_into<T: FromRow>(
        &self,
        conn: &impl CqlClient,
        dest: &mut Vec<T>,
    ) -> OrmResult<()> {
        let rows = self.rows(conn).await?;
        RowMapper::<T>::new().map_into(&rows, dest);
        Ok(())
    }
}

pub(crate) fn require_columns(operation: &str, table: &str, record: &Record) -> OrmResult<()> {
    if record.is_empty() {
        return Err(OrmError::validation(format!(
            "{operation} on '{table}' requires at least one column"
        )));
    }
    Ok(())
}
