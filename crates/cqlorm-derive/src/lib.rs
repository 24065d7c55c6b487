//! Derive macros for cqlorm
//!
//! Provides `#[derive(FromRow)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod from_row;

/// Derive `FromRow` for a struct with named fields.
///
/// The struct must implement `Default`: mapping starts from the default value and fills
/// every field whose column is present and assignable.
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
///     #[orm(skip)]
///     cached: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(skip)]` - Never fill this field from a row
///
/// Column and field names are compared after dropping `_`, `-` and spaces and lowercasing,
/// so `created_at` matches a field named `created_at` or `createdAt`.
#[proc_macro_derive(FromRow, attributes(orm))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
