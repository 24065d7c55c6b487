//! Row mapping traits and utilities

use crate::error::{OrmError, OrmResult};
use crate::value::{FromValue, Value};

/// A single result row: column names paired with their values, in the order the store
/// returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    /// Create a row from `(column, value)` pairs.
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Get a column value by exact name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Column names in store order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(c, _)| c.as_str())
    }

    /// `(column, value)` pairs in store order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning OrmError::Decode on failure
    fn try_get_column<T: FromValue>(&self, column: &str) -> OrmResult<T>;
}

impl RowExt for Row {
    fn try_get_column<T: FromValue>(&self, column: &str) -> OrmResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| OrmError::decode(column, "column not present in row"))?;
        T::from_value(value).ok_or_else(|| {
            OrmError::decode(
                column,
                format!(
                    "cannot read {} value as {}",
                    value.type_name(),
                    std::any::type_name::<T>()
                ),
            )
        })
    }
}

/// Normalize a column or field name into the key used for matching.
///
/// Word separators are dropped and letters case-folded, so `created_at`, `createdAt` and
/// `CreatedAt` all map to `createdat`.
pub fn normalize_column(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Setter for one destination field. Returns `false` when the value could not be assigned.
pub type FieldSetter<T> = fn(&mut T, &Value) -> bool;

/// One entry of a type's column binding table.
pub struct FieldBinding<T: 'static> {
    /// Rust field name.
    pub field: &'static str,
    /// Normalized key matched against normalized column names.
    pub key: &'static str,
    /// Assigns a column value to the field.
    pub set: FieldSetter<T>,
}

impl<T: 'static> FieldBinding<T> {
    pub const fn new(field: &'static str, key: &'static str, set: FieldSetter<T>) -> Self {
        Self { field, key, set }
    }
}

impl<T: 'static> std::fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding")
            .field("field", &self.field)
            .field("key", &self.key)
            .finish()
    }
}

/// Assign `value` to `slot` if it converts; used by generated setters.
pub fn assign<T: FromValue>(slot: &mut T, value: &Value) -> bool {
    match T::from_value(value) {
        Some(v) => {
            *slot = v;
            true
        }
        None => false,
    }
}

/// Trait for converting a database row into a Rust struct.
///
/// Implementations expose a static column binding table; mapping starts from
/// `Self::default()` and fills every field whose key matches a column. This trait should
/// typically be derived using `#[derive(FromRow)]` from the `cqlorm-derive` crate.
///
/// # Example
///
/// ```ignore
/// use cqlorm::FromRow;
///
/// #[derive(Debug, Default, FromRow)]
/// struct User {
///     id: uuid::Uuid,
///     name: String,
///     #[orm(column = "years")]
///     age: i32,
/// }
/// ```
pub trait FromRow: Default + Sized + 'static {
    /// Column binding table for this type.
    const FIELDS: &'static [FieldBinding<Self>];

    /// Convert a database row into Self
    fn from_row(row: &Row) -> Self {
        RowMapper::<Self>::new().map(row)
    }
}

/// Result of checking a column set against a type's binding table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingReport {
    /// Columns no field is bound to (dropped during mapping).
    pub unmatched_columns: Vec<String>,
    /// Fields no column is bound to (left at their default value).
    pub unbound_fields: Vec<&'static str>,
}

impl BindingReport {
    /// Whether every column and every field found a partner.
    pub fn is_exact(&self) -> bool {
        self.unmatched_columns.is_empty() && self.unbound_fields.is_empty()
    }
}

/// Maps rows into `T` using its binding table.
#[derive(Debug)]
pub struct RowMapper<T: FromRow> {
    fields: &'static [FieldBinding<T>],
}

impl<T: FromRow> Default for RowMapper<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromRow> RowMapper<T> {
    pub fn new() -> Self {
        Self { fields: T::FIELDS }
    }

    fn binding_for(&self, column: &str) -> Option<&'static FieldBinding<T>> {
        let key = normalize_column(column);
        self.fields.iter().find(|b| b.key == key)
    }

    /// Map one row. Unknown columns and unassignable values are skipped.
    pub fn map(&self, row: &Row) -> T {
        let mut out = T::default();
        for (column, value) in row.iter() {
            if let Some(binding) = self.binding_for(column) {
                (binding.set)(&mut out, value);
            }
        }
        out
    }

    /// Map every row and append to `dest`, preserving row order.
    pub fn map_into<'r>(&self, rows: impl IntoIterator<Item = &'r Row>, dest: &mut Vec<T>) {
        dest.extend(rows.into_iter().map(|row| self.map(row)));
    }

    /// Check a column set (e.g. a table's columns) against the binding table.
    pub fn check_columns<S: AsRef<str>>(&self, columns: &[S]) -> BindingReport {
        let mut report = BindingReport::default();
        let mut bound = vec![false; self.fields.len()];

        for column in columns {
            let key = normalize_column(column.as_ref());
            match self.fields.iter().position(|b| b.key == key) {
                Some(i) => bound[i] = true,
                None => report.unmatched_columns.push(column.as_ref().to_string()),
            }
        }

        report.unbound_fields = self
            .fields
            .iter()
            .zip(bound)
            .filter(|(_, hit)| !hit)
            .map(|(b, _)| b.field)
            .collect();
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Debug, Default, PartialEq)]
    struct Event {
        created_at: Option<DateTime<Utc>>,
        attempts: i64,
    }

    impl FromRow for Event {
        const FIELDS: &'static [FieldBinding<Self>] = &[
            FieldBinding::new("created_at", "createdat", |r: &mut Self, v: &Value| {
                assign(&mut r.created_at, v)
            }),
            FieldBinding::new("attempts", "attempts", |r: &mut Self, v: &Value| {
                assign(&mut r.attempts, v)
            }),
        ];
    }

    #[test]
    fn normalizes_separators_and_case() {
        assert_eq!(normalize_column("created_at"), "createdat");
        assert_eq!(normalize_column("CreatedAt"), "createdat");
        assert_eq!(normalize_column("createdAt"), "createdat");
        assert_eq!(normalize_column("id"), "id");
    }

    #[test]
    fn maps_known_columns_and_drops_unknown() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let row: Row = [
            ("created_at", Value::Timestamp(t)),
            ("unknown_col", Value::Int(5)),
        ]
        .into_iter()
        .collect();

        let event = Event::from_row(&row);
        assert_eq!(event.created_at, Some(t));
        assert_eq!(event.attempts, 0);
    }

    #[test]
    fn unassignable_value_leaves_default() {
        let row: Row = [("attempts", Value::Text("many".into()))].into_iter().collect();
        assert_eq!(Event::from_row(&row), Event::default());
    }

    #[test]
    fn integer_columns_widen_into_fields() {
        let row: Row = [("attempts", Value::Int(3))].into_iter().collect();
        assert_eq!(Event::from_row(&row).attempts, 3);
    }

    #[test]
    fn map_into_appends_in_order() {
        let rows: Vec<Row> = (1..=3)
            .map(|n| [("attempts", Value::BigInt(n))].into_iter().collect())
            .collect();
        let mut dest = vec![Event::default()];
        RowMapper::<Event>::new().map_into(&rows, &mut dest);
        assert_eq!(
            dest.iter().map(|e| e.attempts).collect::<Vec<_>>(),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn check_columns_reports_both_sides() {
        let report = RowMapper::<Event>::new().check_columns(&["created_at", "unknown_col"]);
        assert_eq!(report.unmatched_columns, vec!["unknown_col".to_string()]);
        assert_eq!(report.unbound_fields, vec!["attempts"]);
        assert!(!report.is_exact());

        let exact = RowMapper::<Event>::new().check_columns(&["CreatedAt", "attempts"]);
        assert!(exact.is_exact());
    }

    #[test]
    fn try_get_column_errors_name_the_column() {
        let row: Row = [("age", Value::Text("x".into()))].into_iter().collect();
        let err = row.try_get_column::<i32>("age").unwrap_err();
        assert!(err.to_string().contains("age"));
        assert!(row.try_get_column::<i32>("missing").is_err());
        assert_eq!(row.try_get_column::<String>("age").unwrap(), "x");
    }
}
