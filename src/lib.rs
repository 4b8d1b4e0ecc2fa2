//! # Fabrica
//!
//! Prototype-based test fixture factories.
//!
//! Register a named prototype record once, then ask for fresh clones of it,
//! optionally overriding fields by name, saved through a pluggable store and
//! copied back into a variable you own. The registered prototype is never
//! mutated by use.
//!
//! ## Quick Start
//!
//! ```ignore
//! use fabrica::prelude::*;
//!
//! #[derive(Debug, Clone, Default, Factory)]
//! #[factory(sql)]
//! struct Person {
//!     id: i64,
//!     name: String,
//!     age: i32,
//! }
//!
//! impl SqlFactory for Person {
//!     fn save(&mut self, db: &mut dyn SqlStore) -> Result<Saved, BoxError> {
//!         let mut stmt = db.prepare("INSERT INTO person (name, age) VALUES ($1, $2) RETURNING id")?;
//!         self.id = stmt.query_row(&[self.name.clone().into(), self.age.into()])?.get("id")?;
//!         Ok(Saved::new(self.clone()))
//!     }
//! }
//!
//! let registry = Registry::new();
//! registry.define("a_person", Person { name: "Bob".into(), age: 15, ..Default::default() })?;
//!
//! let mut person = Person::default();
//! registry
//!     .create_into("a_person", &mut person)
//!     .with(attrs! { "name" => "John", "age" => 1 })
//!     .exec(&mut db)?;
//! assert_eq!(person.name, "John");
//! ```
//!
//! ## Architecture
//!
//! - [`Registry`] - named prototypes, insert-once
//! - [`Prototype`] / [`Factory`] - clone engine and by-name field assignment
//! - [`Attrs`] - field overlays applied to clones
//! - [`Capability`] - closed set of persistence protocols, routed by [`capability::dispatch`]
//! - [`Executor`] - one create, overlay, exec chain with result assignment
//! - [`AutoExecutor`] - sequential executor keeping the first failure
//! - [`context`] - optional process-wide registry with `init`/`reset`
//!
//! ## Features
//!
//! - `macros` - `#[derive(Factory)]` (enabled by default)

extern crate self as fabrica;

pub mod attrs;
pub mod auto;
pub mod capability;
pub mod context;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod prototype;
pub mod registry;
pub mod store;

pub use attrs::Attrs;
pub use auto::AutoExecutor;
pub use capability::{Capability, DocumentFactory, Saved, SqlFactory};
pub use context::{create, create_into, create_with, define, init, init_with, lookup, reset};
pub use error::{BoxError, FactoryError, FactoryResult};
pub use executor::{Executor, Output};
pub use prototype::{Factory, Fields, Prototype, decode_field};
pub use registry::Registry;
pub use store::{
	DocumentStore, ExecResult, Row, SqlStore, SqlValue, Statement, Store, StoreError,
};

#[cfg(feature = "macros")]
pub use fabrica_macros::Factory;

#[doc(hidden)]
pub mod __private {
	pub use serde_json;
}
