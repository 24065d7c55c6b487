//! Shared WHERE clause state for SELECT, UPDATE, DELETE and batch entries.

use crate::error::{OrmError, OrmResult};
use crate::statement::{Connector, Predicate, count_placeholders, in_fragment, render_where};
use crate::value::Value;

/// Ordered predicates plus the values bound to their `?` placeholders.
///
/// A fragment whose placeholder count disagrees with its values is not recorded; the mismatch
/// is kept as a build error and reported by [`WhereClause::validate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    predicates: Vec<Predicate>,
    params: Vec<Value>,
    build_error: Option<String>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if any predicates have been added.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Number of predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Bound values in placeholder order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Get the build error, if any.
    pub fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref()
    }

    /// Build the WHERE body (without the `WHERE` keyword).
    pub fn build_clause(&self) -> String {
        render_where(&self.predicates)
    }

    /// Append a fragment with its values.
    pub fn push(&mut self, connector: Option<Connector>, fragment: &str, values: Vec<Value>) {
        let placeholder_count = count_placeholders(fragment);
        if placeholder_count != values.len() {
            self.build_error = Some(format!(
                "param mismatch: condition '{}' has {} '?', but {} values provided",
                fragment,
                placeholder_count,
                values.len()
            ));
            return;
        }

        self.predicates.push(Predicate {
            connector,
            fragment: fragment.to_string(),
        });
        self.params.extend(values);
    }

    /// Append `column IN (?, …)` with one placeholder per value.
    pub fn push_in(&mut self, column: &str, values: Vec<Value>) {
        if values.is_empty() {
            self.build_error = Some(format!("IN list for column '{column}' is empty"));
            return;
        }
        self.predicates
            .push(Predicate::new(in_fragment(column, values.len())));
        self.params.extend(values);
    }

    /// Drop every predicate, value and pending build error.
    pub fn clear(&mut self) {
        self.predicates.clear();
        self.params.clear();
        self.build_error = None;
    }

    /// Surface a recorded build error.
    pub fn validate(&self) -> OrmResult<()> {
        match &self.build_error {
            Some(err) => Err(OrmError::Validation(err.clone())),
            None => Ok(()),
        }
    }

    /// Validate and require at least one predicate (UPDATE/DELETE).
    pub fn require(&self, operation: &str, table: &str) -> OrmResult<()> {
        self.validate()?;
        if self.is_empty() {
            return Err(OrmError::validation(format!(
                "{operation} on '{table}' requires at least one WHERE condition"
            )));
        }
        Ok(())
    }
}
