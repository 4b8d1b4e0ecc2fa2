//! Attribute overlays.
//!
//! [`Attrs`] maps field names to replacement values. An overlay is applied
//! to a clone, never to the registered prototype.
//!
//! Applying is deterministic: every name is checked against the record's
//! declared fields before any value is decoded, then values are decoded in
//! name order. An overlay with several bad entries always reports the same
//! one.

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde_json::Value;

use crate::error::{FactoryError, FactoryResult};
use crate::prototype::Prototype;

/// Field-name to value mapping applied to a clone before it is saved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attrs(BTreeMap<String, Value>);

impl Attrs {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds a field override, builder style.
	///
	/// ```
	/// use fabrica::Attrs;
	///
	/// let attrs = Attrs::new().set("name", "John").set("age", 1);
	/// assert_eq!(attrs.len(), 2);
	/// ```
	pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
		self.insert(field, value);
		self
	}

	/// Adds a field override, replacing any previous value for `field`.
	pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.0.insert(field.into(), value.into())
	}

	pub fn get(&self, field: &str) -> Option<&Value> {
		self.0.get(field)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
		self.0.iter()
	}

	/// Parses an overlay from a JSON object, as found in fixture files.
	///
	/// ```
	/// use fabrica::Attrs;
	///
	/// let attrs = Attrs::from_json_str(r#"{"name": "John", "age": 1}"#).unwrap();
	/// assert_eq!(attrs.get("age"), Some(&serde_json::json!(1)));
	/// ```
	pub fn from_json_str(json: &str) -> FactoryResult<Self> {
		Ok(Self(serde_json::from_str(json)?))
	}

	/// Converts a JSON object into an overlay.
	///
	/// Fails with [`FactoryError::InvalidAttrs`](crate::FactoryError::InvalidAttrs)
	/// when `value` is not an object.
	pub fn from_json_value(value: Value) -> FactoryResult<Self> {
		Ok(Self(serde_json::from_value(value)?))
	}

	/// Writes every override into `factory` by field name.
	///
	/// Fails with [`FactoryError::UnknownField`] for the first undeclared
	/// name, in name order, before any value is written.
	pub(crate) fn apply(self, factory: &mut dyn Prototype) -> FactoryResult<()> {
		let declared = factory.field_names();
		if let Some(field) = self.0.keys().find(|field| !declared.contains(&field.as_str())) {
			return Err(FactoryError::UnknownField {
				type_name: factory.record_type(),
				field: field.clone(),
			});
		}

		for (field, value) in self.0 {
			tracing::trace!(factory = factory.record_type(), field = %field, "overlaying field");
			factory.write_field(&field, value)?;
		}
		Ok(())
	}
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Attrs {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(field, value)| (field.into(), value.into()))
				.collect(),
		)
	}
}

impl IntoIterator for Attrs {
	type Item = (String, Value);
	type IntoIter = btree_map::IntoIter<String, Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// Builds an [`Attrs`] overlay.
///
/// Values are converted with `serde_json::json!`, so any serializable
/// expression is accepted.
///
/// ```
/// use fabrica::attrs;
///
/// let attrs = attrs! {
///     "name" => "John",
///     "age" => 1,
/// };
/// assert_eq!(attrs.len(), 2);
/// ```
#[macro_export]
macro_rules! attrs {
	() => {
		$crate::Attrs::new()
	};
	($($field:expr => $value:expr),+ $(,)?) => {{
		let mut attrs = $crate::Attrs::new();
		$(
			attrs.insert($field, $crate::__private::serde_json::json!($value));
		)+
		attrs
	}};
}
