//! Store handles consumed by persistence capabilities.
//!
//! A store is whatever object the caller hands to
//! [`Executor::exec`](crate::Executor::exec). The engine never talks to a
//! database itself; it asks the store for the shape a capability needs
//! ([`SqlStore`] or [`DocumentStore`]) and passes that view to the
//! factory's save routine.

use std::collections::HashMap;

use thiserror::Error;

/// Errors raised by store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
	/// The statement could not be parsed or prepared.
	#[error("Query error: {0}")]
	Query(String),

	/// The statement referenced a table the store does not have.
	#[error("Table not found: {0}")]
	TableNotFound(String),

	/// A row did not contain the requested column.
	#[error("Column not found: {0}")]
	ColumnNotFound(String),

	/// A value could not be converted to the requested type.
	#[error("Type error: {0}")]
	TypeError(String),

	/// A single-row query produced no rows.
	#[error("No rows in result set")]
	NoRows,

	/// A statement was executed after the store was closed.
	#[error("Store is closed")]
	Closed,
}

/// SQL parameter and column values.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	String(String),
	Bytes(Vec<u8>),
}

impl From<&str> for SqlValue {
	fn from(s: &str) -> Self {
		SqlValue::String(s.to_string())
	}
}

impl From<String> for SqlValue {
	fn from(s: String) -> Self {
		SqlValue::String(s)
	}
}

impl From<i64> for SqlValue {
	fn from(i: i64) -> Self {
		SqlValue::Int(i)
	}
}

impl From<i32> for SqlValue {
	fn from(i: i32) -> Self {
		SqlValue::Int(i as i64)
	}
}

impl From<f64> for SqlValue {
	fn from(f: f64) -> Self {
		SqlValue::Float(f)
	}
}

impl From<bool> for SqlValue {
	fn from(b: bool) -> Self {
		SqlValue::Bool(b)
	}
}

impl From<Vec<u8>> for SqlValue {
	fn from(b: Vec<u8>) -> Self {
		SqlValue::Bytes(b)
	}
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(SqlValue::Null, Into::into)
	}
}

impl TryFrom<SqlValue> for i64 {
	type Error = StoreError;

	fn try_from(value: SqlValue) -> Result<Self, Self::Error> {
		match value {
			SqlValue::Int(i) => Ok(i),
			_ => Err(StoreError::TypeError(format!(
				"Cannot convert {:?} to i64",
				value
			))),
		}
	}
}

impl TryFrom<SqlValue> for i32 {
	type Error = StoreError;

	fn try_from(value: SqlValue) -> Result<Self, Self::Error> {
		match value {
			SqlValue::Int(i) => i32::try_from(i)
				.map_err(|_| StoreError::TypeError(format!("Value {} out of range for i32", i))),
			_ => Err(StoreError::TypeError(format!(
				"Cannot convert {:?} to i32",
				value
			))),
		}
	}
}

impl TryFrom<SqlValue> for String {
	type Error = StoreError;

	fn try_from(value: SqlValue) -> Result<Self, Self::Error> {
		match value {
			SqlValue::String(s) => Ok(s),
			_ => Err(StoreError::TypeError(format!(
				"Cannot convert {:?} to String",
				value
			))),
		}
	}
}

impl TryFrom<SqlValue> for bool {
	type Error = StoreError;

	fn try_from(value: SqlValue) -> Result<Self, Self::Error> {
		match value {
			SqlValue::Bool(b) => Ok(b),
			_ => Err(StoreError::TypeError(format!(
				"Cannot convert {:?} to bool",
				value
			))),
		}
	}
}

impl TryFrom<SqlValue> for f64 {
	type Error = StoreError;

	fn try_from(value: SqlValue) -> Result<Self, Self::Error> {
		match value {
			SqlValue::Float(f) => Ok(f),
			SqlValue::Int(i) => Ok(i as f64),
			_ => Err(StoreError::TypeError(format!(
				"Cannot convert {:?} to f64",
				value
			))),
		}
	}
}

/// Outcome of a statement that does not return rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecResult {
	pub rows_affected: u64,
	pub last_insert_id: Option<i64>,
}

/// Row returned by a single-row query, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
	pub data: HashMap<String, SqlValue>,
}

impl Row {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&mut self, column: impl Into<String>, value: SqlValue) {
		self.data.insert(column.into(), value);
	}

	/// Reads `column` converted to `T`.
	pub fn get<T>(&self, column: &str) -> Result<T, StoreError>
	where
		T: TryFrom<SqlValue, Error = StoreError>,
	{
		self.data
			.get(column)
			.cloned()
			.ok_or_else(|| StoreError::ColumnNotFound(column.to_string()))
			.and_then(T::try_from)
	}
}

/// A prepared statement bound to the store that produced it.
pub trait Statement {
	/// Runs the statement and reports affected rows.
	fn execute(&mut self, params: &[SqlValue]) -> Result<ExecResult, StoreError>;

	/// Runs the statement and returns its first row.
	///
	/// Fails with [`StoreError::NoRows`] when the result set is empty.
	fn query_row(&mut self, params: &[SqlValue]) -> Result<Row, StoreError>;
}

/// Store shape required by the SQL capability: statement preparation and
/// execution.
pub trait SqlStore {
	fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement + '_>, StoreError>;

	fn execute(&mut self, query: &str, params: &[SqlValue]) -> Result<ExecResult, StoreError>;

	fn close(&mut self) -> Result<(), StoreError> {
		Ok(())
	}
}

/// Store shape required by the document capability.
pub trait DocumentStore {
	/// Inserts `document` into `collection` and returns its generated id.
	fn insert_one(
		&mut self,
		collection: &str,
		document: serde_json::Value,
	) -> Result<String, StoreError>;

	/// Finds a document by id.
	fn find_one(
		&mut self,
		collection: &str,
		id: &str,
	) -> Result<Option<serde_json::Value>, StoreError>;
}

/// An opaque store handle.
///
/// Implementors expose the capability shapes they support by overriding
/// the matching accessor; the defaults report the shape as unsupported.
///
/// ```ignore
/// impl Store for PgPool {
///     fn as_sql(&mut self) -> Option<&mut dyn SqlStore> {
///         Some(self)
///     }
/// }
/// ```
pub trait Store {
	/// Name used in [`FactoryError::InvalidStore`](crate::FactoryError::InvalidStore).
	fn store_name(&self) -> &'static str {
		std::any::type_name::<Self>()
	}

	fn as_sql(&mut self) -> Option<&mut dyn SqlStore> {
		None
	}

	fn as_document(&mut self) -> Option<&mut dyn DocumentStore> {
		None
	}
}
