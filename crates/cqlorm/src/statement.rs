//! Statement rendering.
//!
//! Pure functions that turn a table name, a [`Record`], WHERE predicates and options into CQL
//! text plus an ordered parameter list. Nothing here talks to the store.

use crate::record::Record;
use crate::value::Value;
use std::fmt;

/// Kind of a rendered statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        })
    }
}

/// A fully rendered statement: CQL text and the values for its `?` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub table: String,
    pub cql: String,
    pub params: Vec<Value>,
}

impl Statement {
    /// Number of `?` placeholders in the CQL text.
    pub fn placeholder_count(&self) -> usize {
        count_placeholders(&self.cql)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cql)
    }
}

/// Logical connector written in front of a predicate fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    fn keyword(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// One WHERE fragment, e.g. `age > ?`, optionally prefixed with a connector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub connector: Option<Connector>,
    pub fragment: String,
}

impl Predicate {
    pub fn new(fragment: impl Into<String>) -> Self {
        Self {
            connector: None,
            fragment: fragment.into(),
        }
    }

    pub fn with_connector(connector: Connector, fragment: impl Into<String>) -> Self {
        Self {
            connector: Some(connector),
            fragment: fragment.into(),
        }
    }

    fn render(&self) -> String {
        match self.connector {
            Some(c) => format!("{} {}", c.keyword(), self.fragment),
            None => self.fragment.clone(),
        }
    }

    /// Whether the rendered predicate already opens with AND/OR.
    fn has_leading_connector(&self) -> bool {
        self.connector.is_some()
            || starts_with_keyword(&self.fragment, "AND")
            || starts_with_keyword(&self.fragment, "OR")
    }
}

/// Count `?` placeholders in a CQL fragment, ignoring any inside `'…'` string literals.
pub fn count_placeholders(cql: &str) -> usize {
    CqlChars::new(cql)
        .filter(|&(c, quoted)| c == '?' && !quoted)
        .count()
}

/// Character walk over CQL text that tracks single-quoted string literals.
///
/// Yields `(char, quoted)`; the opening and closing quotes count as quoted. Inside a literal
/// `''` is an escaped quote and does not end it.
pub(crate) struct CqlChars<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    in_literal: bool,
    escaped_quote: bool,
}

impl<'a> CqlChars<'a> {
    pub(crate) fn new(cql: &'a str) -> Self {
        Self {
            chars: cql.chars().peekable(),
            in_literal: false,
            escaped_quote: false,
        }
    }

    pub(crate) fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Consume the rest of the current line. Returns whether a newline was consumed.
    pub(crate) fn skip_line(&mut self) -> bool {
        self.chars.by_ref().any(|c| c == '\n')
    }
}

impl Iterator for CqlChars<'_> {
    type Item = (char, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.chars.next()?;
        if !self.in_literal {
            if c == '\'' {
                self.in_literal = true;
                return Some((c, true));
            }
            return Some((c, false));
        }

        if c == '\'' {
            if self.escaped_quote {
                self.escaped_quote = false;
            } else if self.chars.peek() == Some(&'\'') {
                self.escaped_quote = true;
            } else {
                self.in_literal = false;
            }
        }
        Some((c, true))
    }
}

/// Check whether `s` starts with `keyword` (ASCII case-insensitive) as a whole word.
pub(crate) fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    let s = s.trim_start();
    let Some(head) = s.get(..keyword.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(keyword) {
        return false;
    }
    s[keyword.len()..]
        .chars()
        .next()
        .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
}

/// Join predicates into a WHERE body (without the `WHERE` keyword).
///
/// Predicates are kept in order. A predicate that already carries a connector (or whose text
/// opens with `AND`/`OR`) is appended after a single space; any other predicate after the first
/// is joined with `AND`. The first predicate is written as-is, connector included.
pub fn render_where(predicates: &[Predicate]) -> String {
    let mut out = String::new();
    for (i, p) in predicates.iter().enumerate() {
        if i > 0 {
            out.push_str(if p.has_leading_connector() { " " } else { " AND " });
        }
        out.push_str(&p.render());
    }
    out
}

/// `?, ?, ?` with `n` placeholders.
pub fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// `column IN (?, ?, …)` with one placeholder per value.
pub fn in_fragment(column: &str, n: usize) -> String {
    format!("{} IN ({})", column, placeholders(n))
}

fn ttl_clause(ttl: u32) -> String {
    if ttl > 0 {
        format!(" USING TTL {ttl}")
    } else {
        String::new()
    }
}

/// `INSERT INTO t (c1, c2) VALUES (?, ?)[ USING TTL n]`
pub fn render_insert(table: &str, record: &Record, ttl: u32) -> Statement {
    let columns: Vec<&str> = record.columns().collect();
    let cql = format!(
        "INSERT INTO {} ({}) VALUES ({}){}",
        table,
        columns.join(", "),
        placeholders(columns.len()),
        ttl_clause(ttl)
    );
    Statement {
        kind: StatementKind::Insert,
        table: table.to_string(),
        cql,
        params: record.values().cloned().collect(),
    }
}

/// `UPDATE t[ USING TTL n] SET c1 = ?, c2 = ? WHERE …`
///
/// SET values come first in the parameter list, then `where_params`.
pub fn render_update(
    table: &str,
    record: &Record,
    where_clause: &str,
    where_params: &[Value],
    ttl: u32,
) -> Statement {
    let set_clause = record
        .columns()
        .map(|c| format!("{c} = ?"))
        .collect::<Vec<_>>()
        .join(", ");
    let cql = format!(
        "UPDATE {}{} SET {} WHERE {}",
        table,
        ttl_clause(ttl),
        set_clause,
        where_clause
    );
    let mut params: Vec<Value> = record.values().cloned().collect();
    params.extend_from_slice(where_params);
    Statement {
        kind: StatementKind::Update,
        table: table.to_string(),
        cql,
        params,
    }
}

/// `DELETE FROM t WHERE …`
pub fn render_delete(table: &str, where_clause: &str, where_params: &[Value]) -> Statement {
    Statement {
        kind: StatementKind::Delete,
        table: table.to_string(),
        cql: format!("DELETE FROM {table} WHERE {where_clause}"),
        params: where_params.to_vec(),
    }
}

/// `SELECT * FROM t[ WHERE …][ LIMIT n][ ALLOW FILTERING]`
pub fn render_select(
    table: &str,
    where_clause: &str,
    where_params: &[Value],
    limit: Option<u32>,
    allow_filtering: bool,
) -> Statement {
    let mut cql = format!("SELECT * FROM {table}");
    if !where_clause.is_empty() {
        cql.push_str(" WHERE ");
        cql.push_str(where_clause);
    }
    if let Some(n) = limit.filter(|n| *n > 0) {
        cql.push_str(&format!(" LIMIT {n}"));
    }
    if allow_filtering {
        cql.push_str(" ALLOW FILTERING");
    }
    Statement {
        kind: StatementKind::Select,
        table: table.to_string(),
        cql,
        params: where_params.to_vec(),
    }
}
