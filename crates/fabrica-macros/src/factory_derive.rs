//! Implementation of `#[derive(Factory)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr};

/// Persistence capability selected by the struct-level attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CapabilityKind {
	Sql,
	Document,
	Unsupported,
}

/// A field that accepts overlays.
struct OverlayField {
	ident: Ident,
	name: String,
}

pub(crate) fn derive_factory_impl(input: DeriveInput) -> syn::Result<TokenStream> {
	let struct_name = &input.ident;

	let fields = match &input.data {
		Data::Struct(data_struct) => match &data_struct.fields {
			Fields::Named(fields) => &fields.named,
			_ => {
				return Err(syn::Error::new_spanned(
					struct_name,
					"Factory can only be derived for structs with named fields",
				));
			}
		},
		_ => {
			return Err(syn::Error::new_spanned(
				struct_name,
				"Factory can only be derived for structs",
			));
		}
	};

	let capability = parse_struct_attrs(&input.attrs)?;

	let mut overlay_fields = Vec::new();
	for field in fields {
		let Some(ident) = field.ident.clone() else {
			continue;
		};
		if let Some(name) = parse_field_attrs(&ident, &field.attrs)? {
			if overlay_fields
				.iter()
				.any(|existing: &OverlayField| existing.name == name)
			{
				return Err(syn::Error::new_spanned(
					&ident,
					format!("duplicate factory field name `{}`", name),
				));
			}
			overlay_fields.push(OverlayField { ident, name });
		}
	}

	let fields_impl = generate_fields_impl(&input, &overlay_fields);
	let factory_impl = generate_factory_impl(&input, capability);

	Ok(quote! {
		#fields_impl
		#factory_impl
	})
}

/// Reads `#[factory(sql)]` or `#[factory(document)]` from the struct.
fn parse_struct_attrs(attrs: &[syn::Attribute]) -> syn::Result<CapabilityKind> {
	let mut capability = CapabilityKind::Unsupported;

	for attr in attrs {
		if !attr.path().is_ident("factory") {
			continue;
		}
		attr.parse_nested_meta(|meta| {
			let kind = if meta.path.is_ident("sql") {
				CapabilityKind::Sql
			} else if meta.path.is_ident("document") {
				CapabilityKind::Document
			} else {
				return Err(meta.error("expected `sql` or `document`"));
			};
			if capability != CapabilityKind::Unsupported && capability != kind {
				return Err(meta.error("a factory has at most one capability"));
			}
			capability = kind;
			Ok(())
		})?;
	}

	Ok(capability)
}

/// Returns the overlay name of a field, or `None` for `#[factory(skip)]`.
fn parse_field_attrs(ident: &Ident, attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
	let mut name = ident.to_string();
	let mut skip = false;

	for attr in attrs {
		if !attr.path().is_ident("factory") {
			continue;
		}
		attr.parse_nested_meta(|meta| {
			if meta.path.is_ident("skip") {
				skip = true;
				Ok(())
			} else if meta.path.is_ident("rename") {
				let lit: LitStr = meta.value()?.parse()?;
				name = lit.value();
				Ok(())
			} else {
				Err(meta.error("expected `skip` or `rename = \"...\"`"))
			}
		})?;
	}

	Ok((!skip).then_some(name))
}

fn generate_fields_impl(input: &DeriveInput, fields: &[OverlayField]) -> TokenStream {
	let struct_name = &input.ident;
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	let names: Vec<_> = fields.iter().map(|field| field.name.as_str()).collect();

	let body = if fields.is_empty() {
		quote! {
			let _ = value;
			Err(::fabrica::FactoryError::unknown_field::<Self>(name))
		}
	} else {
		let arms = fields.iter().map(|field| {
			let ident = &field.ident;
			let name = &field.name;
			quote! {
				#name => self.#ident = ::fabrica::decode_field(name, value)?,
			}
		});
		quote! {
			match name {
				#(#arms)*
				_ => return Err(::fabrica::FactoryError::unknown_field::<Self>(name)),
			}
			Ok(())
		}
	};

	quote! {
		impl #impl_generics ::fabrica::Fields for #struct_name #ty_generics #where_clause {
			const FIELDS: &'static [&'static str] = &[#(#names),*];

			fn set_field(
				&mut self,
				name: &str,
				value: ::fabrica::__private::serde_json::Value,
			) -> ::fabrica::FactoryResult<()> {
				#body
			}
		}
	}
}

fn generate_factory_impl(input: &DeriveInput, capability: CapabilityKind) -> TokenStream {
	let struct_name = &input.ident;
	let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

	let capability_fn = match capability {
		CapabilityKind::Sql => quote! {
			fn capability(&mut self) -> ::fabrica::Capability<'_> {
				::fabrica::Capability::Sql(self)
			}
		},
		CapabilityKind::Document => quote! {
			fn capability(&mut self) -> ::fabrica::Capability<'_> {
				::fabrica::Capability::Document(self)
			}
		},
		CapabilityKind::Unsupported => quote! {},
	};

	quote! {
		impl #impl_generics ::fabrica::Factory for #struct_name #ty_generics #where_clause {
			#capability_fn
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use syn::parse_quote;

	// Token spacing is not stable across versions; compare without it.
	fn expand(input: DeriveInput) -> String {
		derive_factory_impl(input)
			.unwrap()
			.to_string()
			.replace(' ', "")
	}

	fn expand_err(input: DeriveInput) -> String {
		derive_factory_impl(input).unwrap_err().to_string()
	}

	#[test]
	fn test_generates_match_arm_per_field() {
		let output = expand(parse_quote! {
			struct Person {
				id: i64,
				name: String,
			}
		});

		assert!(output.contains("\"id\"=>self.id=::fabrica::decode_field"));
		assert!(output.contains("\"name\"=>self.name=::fabrica::decode_field"));
		assert!(output.contains("constFIELDS:&'static[&'staticstr]=&[\"id\",\"name\"]"));
	}

	#[test]
	fn test_rename_and_skip() {
		let output = expand(parse_quote! {
			struct Person {
				#[factory(rename = "years")]
				age: i32,
				#[factory(skip)]
				cache: Vec<u8>,
			}
		});

		assert!(output.contains("\"years\"=>self.age"));
		assert!(!output.contains("cache"));
	}

	#[test]
	fn test_capability_selection() {
		let sql = expand(parse_quote! {
			#[factory(sql)]
			struct Person { id: i64 }
		});
		let document = expand(parse_quote! {
			#[factory(document)]
			struct Note { body: String }
		});
		let plain = expand(parse_quote! {
			struct Plain { id: i64 }
		});

		assert!(sql.contains("::fabrica::Capability::Sql(self)"));
		assert!(document.contains("::fabrica::Capability::Document(self)"));
		assert!(!plain.contains("fncapability"));
	}

	#[test]
	fn test_empty_struct_rejects_every_name() {
		let output = expand(parse_quote! {
			struct Empty {}
		});

		assert!(output.contains("let_=value;"));
		assert!(!output.contains("matchname"));
	}

	#[test]
	fn test_rejects_tuple_struct() {
		let message = expand_err(parse_quote! {
			struct Pair(i64, String);
		});
		assert_eq!(
			message,
			"Factory can only be derived for structs with named fields"
		);
	}

	#[test]
	fn test_rejects_enum() {
		let message = expand_err(parse_quote! {
			enum Kind { A, B }
		});
		assert_eq!(message, "Factory can only be derived for structs");
	}

	#[test]
	fn test_rejects_conflicting_capabilities() {
		let message = expand_err(parse_quote! {
			#[factory(sql, document)]
			struct Person { id: i64 }
		});
		assert_eq!(message, "a factory has at most one capability");
	}

	#[test]
	fn test_rejects_duplicate_names() {
		let message = expand_err(parse_quote! {
			struct Person {
				name: String,
				#[factory(rename = "name")]
				nickname: String,
			}
		});
		assert_eq!(message, "duplicate factory field name `name`");
	}

	#[test]
	fn test_rejects_unknown_attribute() {
		let message = expand_err(parse_quote! {
			struct Person {
				#[factory(faker = "name")]
				name: String,
			}
		});
		assert_eq!(message, "expected `skip` or `rename = \"...\"`");
	}
}
