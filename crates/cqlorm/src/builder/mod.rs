//! Chainable CQL query builder.
//!
//! ## Design
//!
//! - Conditions are explicit CQL fragments with `?` placeholders; values are bound positionally.
//! - Builder methods chain on `&mut Self` and never fail. Misuse (placeholder/value mismatch,
//!   empty IN list, UPDATE/DELETE without WHERE) is reported by the terminal call, before the
//!   store is contacted.
//! - Fragments are kept in insertion order. Bare fragments are joined with `AND`; fragments
//!   added with [`QueryBuilder::and`] / [`QueryBuilder::or`] carry their own connector.

mod query;
mod where_clause;

pub use query::{QueryBuilder, table};
pub use where_clause::WhereClause;

pub(crate) use query::require_columns;

#[cfg(test)]
mod tests;
