//! Testing utilities for fabrica.
//!
//! - [`MemoryDatabase`] - in-memory SQLite store with a statement log
//! - [`MemoryDocuments`] - in-memory document store
//! - [`rescue`] / [`RescueExt`] - panic on factory failure with a `[fabrica]` prefix
//! - [`logging`] - test subscriber setup and log capture
//!
//! ```
//! use fabrica::Registry;
//! use fabrica_test::{MemoryDatabase, RescueExt};
//!
//! let registry = Registry::new();
//! let mut db = MemoryDatabase::new()
//!     .with_schema("CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT NOT NULL)");
//! let auto = registry.auto(&mut db);
//! auto.into_result().rescue();
//! ```

pub mod database;
pub mod documents;
pub mod logging;
pub mod rescue;

pub use database::MemoryDatabase;
pub use documents::MemoryDocuments;
pub use logging::{capture_logs, init_test_logging};
pub use rescue::{RESCUE_PREFIX, RescueExt, rescue};
