#![recursion_limit = "128"]
//! # Docket Derive Macros
//!
//! This crate provides `#[derive(Entity)]`, which implements
//! `docket::repository::Entity` for a serde struct.
//!
//! ## Attributes
//!
//! - `#[entity(name = "...")]` sets the default collection name. Without
//!   it the struct name is used.
//! - `#[entity(id(field = "..."))]` names the struct field holding the
//!   identifier. Without it a field named `id` or `_id` is used.
//! - `#[entity(id(native))]` stores the identifier as a native ObjectId.
//!   The field must be a `String` or `Option<String>`.
//!
//! The stored field name follows the field's `#[serde(rename = "...")]`.
//!
//! # Examples
//!
//! ```rust,ignore
//! use docket_derive::Entity;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Entity, Serialize, Deserialize)]
//! #[entity(name = "people", id(field = "id", native))]
//! pub struct Person {
//!     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
//!     pub id: Option<String>,
//!     pub name: String,
//! }
//!
//! #[derive(Entity, Serialize, Deserialize)]
//! pub struct Sku {
//!     #[serde(rename = "_id")]
//!     pub id: Option<i64>,
//!     pub label: String,
//! }
//! ```

extern crate proc_macro;
mod entity;

use crate::entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives `docket::repository::Entity`.
///
/// # Supported Types
///
/// - Structs with named fields only
/// - Enums and unions are not supported
///
/// # Errors
///
/// Returns a compile error if:
/// - Applied to an enum, a union, a tuple struct or a unit struct
/// - No identifier field is named and none is called `id` or `_id`
/// - The named identifier field does not exist
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_entity_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => {
                let error = syn::Error::new(
                    e.span(),
                    format!(
                        "Failed to derive Entity for struct '{}': {}.\n\
                         Example: #[derive(Entity)] #[entity(id(field = \"id\"))] pub struct MyEntity {{ id: Option<String> }}",
                        ast.ident, e
                    ),
                );
                error.to_compile_error().into()
            }
        },
        Data::Enum(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive Entity for enums. Only structs with named fields are supported.",
            );
            error.to_compile_error().into()
        }
        Data::Union(_) => {
            let error = syn::Error::new_spanned(
                &ast,
                "Cannot derive Entity for unions. Only structs with named fields are supported.",
            );
            error.to_compile_error().into()
        }
    }
}
