//! In-memory document store.

use std::collections::{BTreeMap, HashMap};

use fabrica::{DocumentStore, Store, StoreError};
use serde_json::Value;
use uuid::Uuid;

/// Field holding the generated id of an inserted document.
pub const ID_FIELD: &str = "_id";

/// Document store keeping JSON objects per collection.
///
/// Inserted documents get a random UUID stored under [`ID_FIELD`].
#[derive(Debug, Default)]
pub struct MemoryDocuments {
	collections: HashMap<String, BTreeMap<String, Value>>,
}

impl MemoryDocuments {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of documents in `collection`.
	pub fn count(&self, collection: &str) -> usize {
		self.collections.get(collection).map_or(0, BTreeMap::len)
	}

	/// All documents in `collection`, ordered by id.
	pub fn documents(&self, collection: &str) -> Vec<&Value> {
		self.collections
			.get(collection)
			.map(|documents| documents.values().collect())
			.unwrap_or_default()
	}
}

impl DocumentStore for MemoryDocuments {
	fn insert_one(&mut self, collection: &str, document: Value) -> Result<String, StoreError> {
		let mut fields = match document {
			Value::Object(fields) => fields,
			other => {
				return Err(StoreError::TypeError(format!(
					"document must be a JSON object, got {}",
					other
				)));
			}
		};

		let id = Uuid::new_v4().to_string();
		fields.insert(ID_FIELD.to_string(), Value::String(id.clone()));
		tracing::trace!(collection, id = %id, "inserting document");

		self.collections
			.entry(collection.to_string())
			.or_default()
			.insert(id.clone(), Value::Object(fields));
		Ok(id)
	}

	fn find_one(&mut self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
		Ok(self
			.collections
			.get(collection)
			.and_then(|documents| documents.get(id))
			.cloned())
	}
}

impl Store for MemoryDocuments {
	fn store_name(&self) -> &'static str {
		"MemoryDocuments"
	}

	fn as_document(&mut self) -> Option<&mut dyn DocumentStore> {
		Some(self)
	}
}
