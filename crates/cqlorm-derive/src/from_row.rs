//! FromRow derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use std::collections::BTreeMap;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, LitStr, Result};

struct FieldAttrs {
    column: Option<String>,
    skip: bool,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let generics = &input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "FromRow can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "FromRow can only be derived for structs",
            ));
        }
    };

    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    let mut bindings = Vec::new();

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = parse_field_attrs(field)?;
        if attrs.skip {
            continue;
        }

        let field_name = ident.unraw().to_string();
        let key = normalize_column(attrs.column.as_deref().unwrap_or(&field_name));
        if key.is_empty() {
            return Err(syn::Error::new_spanned(field, "column name is empty"));
        }
        if let Some(other) = seen.insert(key.clone(), field_name.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("fields `{other}` and `{field_name}` both match column key `{key}`"),
            ));
        }

        bindings.push(quote! {
            ::cqlorm::row::FieldBinding::new(
                #field_name,
                #key,
                |row: &mut Self, value: &::cqlorm::value::Value| {
                    ::cqlorm::row::assign(&mut row.#ident, value)
                },
            )
        });
    }

    Ok(quote! {
        impl #impl_generics ::cqlorm::row::FromRow for #name #ty_generics #where_clause {
            const FIELDS: &'static [::cqlorm::row::FieldBinding<Self>] = &[
                #(#bindings),*
            ];
        }
    })
}

fn parse_field_attrs(field: &syn::Field) -> Result<FieldAttrs> {
    let mut attrs = FieldAttrs {
        column: None,
        skip: false,
    };
    for attr in &field.attrs {
        if !attr.path().is_ident("orm") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                attrs.column = Some(lit.value());
                Ok(())
            } else if meta.path.is_ident("skip") {
                attrs.skip = true;
                Ok(())
            } else {
                Err(meta.error("unsupported orm attribute, expected `column = \"...\"` or `skip`"))
            }
        })?;
    }
    Ok(attrs)
}

/// Must stay in sync with `cqlorm::row::normalize_column`.
fn normalize_column(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_binding_per_field() {
        let input: DeriveInput = syn::parse_quote! {
            struct User {
                id: i64,
                #[orm(column = "user_name")]
                name: String,
                #[orm(skip)]
                cache: Option<String>,
            }
        };
        let out = expand(input).unwrap().to_string();
        assert!(out.contains("\"id\""));
        assert!(out.contains("\"username\""));
        assert!(!out.contains("cache"));
    }

    #[test]
    fn rejects_colliding_keys() {
        let input: DeriveInput = syn::parse_quote! {
            struct Event {
                created_at: i64,
                createdAt: i64,
            }
        };
        let err = expand(input).unwrap_err().to_string();
        assert!(err.contains("createdat"));
    }

    #[test]
    fn rejects_tuple_structs_and_unknown_attrs() {
        let tuple: DeriveInput = syn::parse_quote! { struct Pair(i32, i32); };
        assert!(expand(tuple).is_err());

        let unknown: DeriveInput = syn::parse_quote! {
            struct T { #[orm(rename = "x")] a: i32 }
        };
        assert!(expand(unknown).is_err());
    }
}
