//! Convenience re-exports for common usage.
//!
//! ```ignore
//! use fabrica::prelude::*;
//!
//! // Now you have access to:
//! // - Registry, Executor, AutoExecutor
//! // - Factory traits and the derive macro
//! // - Capability and store traits
//! // - Error types
//! ```

// Error types
pub use crate::error::{BoxError, FactoryError, FactoryResult};

// Registry and executors
pub use crate::auto::AutoExecutor;
pub use crate::executor::{Executor, Output};
pub use crate::registry::Registry;

// Factory types
pub use crate::attrs::Attrs;
pub use crate::prototype::{Factory, Fields, Prototype, decode_field};

// Capabilities and stores
pub use crate::capability::{Capability, DocumentFactory, Saved, SqlFactory};
pub use crate::store::{
	DocumentStore, ExecResult, Row, SqlStore, SqlValue, Statement, Store, StoreError,
};

// Macros
pub use crate::attrs;

#[cfg(feature = "macros")]
pub use fabrica_macros::Factory;
