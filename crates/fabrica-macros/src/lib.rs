//! Procedural macros for fabrica.
//!
//! This crate provides the `#[derive(Factory)]` macro, which generates the
//! by-name field assignment and capability routing a record needs to be
//! registered as a prototype.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod factory_derive;

/// Derives `Fields` and `Factory` for a struct with named fields.
///
/// # Attributes
///
/// ## Struct-level attributes
///
/// - `#[factory(sql)]` - the record saves through `SqlFactory`
/// - `#[factory(document)]` - the record saves through `DocumentFactory`
///
/// Without either, the record can be registered and built but not saved.
///
/// ## Field-level attributes
///
/// - `#[factory(rename = "name")]` - accept overlays under another name
/// - `#[factory(skip)]` - the field cannot be overlaid
///
/// # Example
///
/// ```ignore
/// use fabrica::prelude::*;
///
/// #[derive(Debug, Clone, Default, Factory)]
/// #[factory(sql)]
/// pub struct Person {
///     pub id: i64,
///     pub name: String,
///     #[factory(rename = "years")]
///     pub age: i32,
///     #[factory(skip)]
///     pub cache: Option<std::sync::Arc<String>>,
/// }
/// ```
///
/// This generates:
///
/// ```ignore
/// impl fabrica::Fields for Person {
///     const FIELDS: &'static [&'static str] = &["id", "name", "years"];
///
///     fn set_field(&mut self, name: &str, value: serde_json::Value) -> fabrica::FactoryResult<()> {
///         match name {
///             "id" => self.id = fabrica::decode_field(name, value)?,
///             "name" => self.name = fabrica::decode_field(name, value)?,
///             "years" => self.age = fabrica::decode_field(name, value)?,
///             _ => return Err(fabrica::FactoryError::unknown_field::<Self>(name)),
///         }
///         Ok(())
///     }
/// }
///
/// impl fabrica::Factory for Person {
///     fn capability(&mut self) -> fabrica::Capability<'_> {
///         fabrica::Capability::Sql(self)
///     }
/// }
/// ```
#[proc_macro_derive(Factory, attributes(factory))]
pub fn derive_factory(input: TokenStream) -> TokenStream {
	let input = parse_macro_input!(input as DeriveInput);
	factory_derive::derive_factory_impl(input)
		.unwrap_or_else(|err| err.to_compile_error())
		.into()
}
