//! In-memory SQL store backed by SQLite.
//!
//! [`MemoryDatabase`] holds one `sqlite::memory:` connection and a
//! current-thread runtime that drives it, so factory save routines run real
//! SQL through the synchronous [`SqlStore`] interface. The schema is created
//! up front with [`MemoryDatabase::with_schema`]:
//!
//! ```
//! use fabrica::{SqlStore, SqlValue};
//! use fabrica_test::MemoryDatabase;
//!
//! let mut db = MemoryDatabase::new()
//!     .with_schema("CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT NOT NULL)");
//! let result = db
//!     .execute("INSERT INTO person (name) VALUES ($1)", &[SqlValue::from("Bob")])
//!     .unwrap();
//! assert_eq!(result.last_insert_id, Some(1));
//! assert_eq!(db.count("person").unwrap(), 1);
//! ```

use fabrica::{ExecResult, Row, SqlStore, SqlValue, Statement, Store, StoreError};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnection, SqliteRow};
use sqlx::{Column as _, Connection as _, Executor as _, Row as _, TypeInfo as _, ValueRef as _};
use tokio::runtime::{Builder, Runtime};

const MEMORY_URL: &str = "sqlite::memory:";

/// SQL store backed by a private in-memory SQLite database.
pub struct MemoryDatabase {
	runtime: Runtime,
	conn: Option<SqliteConnection>,
	executed: Vec<String>,
}

impl MemoryDatabase {
	/// Opens an empty in-memory database.
	///
	/// # Panics
	///
	/// Panics if SQLite cannot be opened. Use [`MemoryDatabase::connect`] to
	/// handle the error instead.
	pub fn new() -> Self {
		Self::connect().expect("Failed to open in-memory SQLite database")
	}

	/// Opens an empty in-memory database.
	pub fn connect() -> Result<Self, StoreError> {
		let runtime = Builder::new_current_thread()
			.enable_all()
			.build()
			.map_err(|err| StoreError::Query(err.to_string()))?;
		let conn = runtime
			.block_on(SqliteConnection::connect(MEMORY_URL))
			.map_err(store_error)?;
		tracing::debug!(url = MEMORY_URL, "opened test database");

		Ok(Self {
			runtime,
			conn: Some(conn),
			executed: Vec::new(),
		})
	}

	/// Runs `schema`, one or more `;`-separated statements.
	///
	/// # Panics
	///
	/// Panics if the schema fails to apply.
	pub fn with_schema(mut self, schema: &str) -> Self {
		if let Err(err) = self.apply_schema(schema) {
			panic!("Failed to apply test schema: {}", err);
		}
		self
	}

	/// Runs `schema`, one or more `;`-separated statements.
	///
	/// Schema statements are not recorded in [`MemoryDatabase::executed`].
	pub fn apply_schema(&mut self, schema: &str) -> Result<(), StoreError> {
		let (runtime, conn) = self.parts()?;
		runtime
			.block_on(sqlx::raw_sql(schema).execute(conn))
			.map(|_| ())
			.map_err(store_error)
	}

	/// Number of rows in `table`.
	pub fn count(&mut self, table: &str) -> Result<usize, StoreError> {
		let query = format!("SELECT COUNT(*) AS count FROM \"{}\"", table.replace('"', "\"\""));
		let (runtime, conn) = self.parts()?;
		let row = runtime
			.block_on(sqlx::query(&query).fetch_one(conn))
			.map_err(store_error)?;
		let count: i64 = row.try_get("count").map_err(store_error)?;
		usize::try_from(count).map_err(|err| StoreError::TypeError(err.to_string()))
	}

	/// Every statement run through [`SqlStore`] so far, in order.
	pub fn executed(&self) -> &[String] {
		&self.executed
	}

	pub fn is_closed(&self) -> bool {
		self.conn.is_none()
	}

	fn parts(&mut self) -> Result<(&Runtime, &mut SqliteConnection), StoreError> {
		match self.conn.as_mut() {
			Some(conn) => Ok((&self.runtime, conn)),
			None => Err(StoreError::Closed),
		}
	}

	fn run(&mut self, query: &str, params: &[SqlValue]) -> Result<ExecResult, StoreError> {
		tracing::trace!(query, params = params.len(), "executing statement");
		self.executed.push(query.trim().to_string());

		let (runtime, conn) = self.parts()?;
		let result = runtime
			.block_on(bind_all(sqlx::query(query), params).execute(conn))
			.map_err(store_error)?;
		Ok(ExecResult {
			rows_affected: result.rows_affected(),
			last_insert_id: Some(result.last_insert_rowid()),
		})
	}

	fn fetch(&mut self, query: &str, params: &[SqlValue]) -> Result<Row, StoreError> {
		tracing::trace!(query, params = params.len(), "querying row");
		self.executed.push(query.trim().to_string());

		let (runtime, conn) = self.parts()?;
		let row = runtime
			.block_on(bind_all(sqlx::query(query), params).fetch_optional(conn))
			.map_err(store_error)?
			.ok_or(StoreError::NoRows)?;
		convert_row(&row)
	}
}

impl Default for MemoryDatabase {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for MemoryDatabase {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryDatabase")
			.field("closed", &self.is_closed())
			.field("executed", &self.executed.len())
			.finish()
	}
}

impl Drop for MemoryDatabase {
	fn drop(&mut self) {
		if let Some(conn) = self.conn.take() {
			let _ = self.runtime.block_on(conn.close());
		}
	}
}

impl SqlStore for MemoryDatabase {
	/// Compiles `query` against the current schema, so unknown tables and
	/// syntax errors are reported here.
	fn prepare(&mut self, query: &str) -> Result<Box<dyn Statement + '_>, StoreError> {
		let (runtime, conn) = self.parts()?;
		runtime
			.block_on(conn.prepare(query))
			.map_err(store_error)?;
		Ok(Box::new(MemoryStatement {
			db: self,
			query: query.to_string(),
		}))
	}

	fn execute(&mut self, query: &str, params: &[SqlValue]) -> Result<ExecResult, StoreError> {
		self.run(query, params)
	}

	fn close(&mut self) -> Result<(), StoreError> {
		match self.conn.take() {
			Some(conn) => self.runtime.block_on(conn.close()).map_err(store_error),
			None => Ok(()),
		}
	}
}

impl Store for MemoryDatabase {
	fn store_name(&self) -> &'static str {
		"MemoryDatabase"
	}

	fn as_sql(&mut self) -> Option<&mut dyn SqlStore> {
		Some(self)
	}
}

/// Prepared statement over a [`MemoryDatabase`].
struct MemoryStatement<'a> {
	db: &'a mut MemoryDatabase,
	query: String,
}

impl Statement for MemoryStatement<'_> {
	fn execute(&mut self, params: &[SqlValue]) -> Result<ExecResult, StoreError> {
		self.db.run(&self.query, params)
	}

	fn query_row(&mut self, params: &[SqlValue]) -> Result<Row, StoreError> {
		self.db.fetch(&self.query, params)
	}
}

fn bind_all<'q>(
	mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
	params: &[SqlValue],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
	for param in params {
		query = match param {
			SqlValue::Null => query.bind(None::<i64>),
			SqlValue::Bool(value) => query.bind(*value),
			SqlValue::Int(value) => query.bind(*value),
			SqlValue::Float(value) => query.bind(*value),
			SqlValue::String(value) => query.bind(value.clone()),
			SqlValue::Bytes(value) => query.bind(value.clone()),
		};
	}
	query
}

/// Converts a SQLite row by the storage class of each value.
fn convert_row(row: &SqliteRow) -> Result<Row, StoreError> {
	let mut converted = Row::new();
	for column in row.columns() {
		let index = column.ordinal();
		let raw = row.try_get_raw(index).map_err(store_error)?;
		let value = if raw.is_null() {
			SqlValue::Null
		} else {
			let storage = raw.type_info().name().to_string();
			match storage.as_str() {
				"INTEGER" => SqlValue::Int(row.try_get(index).map_err(store_error)?),
				"REAL" => SqlValue::Float(row.try_get(index).map_err(store_error)?),
				"TEXT" => SqlValue::String(row.try_get(index).map_err(store_error)?),
				"BLOB" => SqlValue::Bytes(row.try_get(index).map_err(store_error)?),
				other => {
					return Err(StoreError::TypeError(format!(
						"unsupported SQLite type {} in column {}",
						other,
						column.name()
					)));
				}
			}
		};
		converted.insert(column.name(), value);
	}
	Ok(converted)
}

fn store_error(err: sqlx::Error) -> StoreError {
	match err {
		sqlx::Error::RowNotFound => StoreError::NoRows,
		sqlx::Error::ColumnNotFound(column) => StoreError::ColumnNotFound(column),
		sqlx::Error::Database(err) => match err.message().strip_prefix("no such table: ") {
			Some(table) => StoreError::TableNotFound(table.to_string()),
			None => StoreError::Query(err.message().to_string()),
		},
		other => StoreError::Query(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::{fixture, rstest};

	const PERSON_TABLE: &str =
		"CREATE TABLE person (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER NOT NULL)";

	#[fixture]
	fn db() -> MemoryDatabase {
		MemoryDatabase::new().with_schema(PERSON_TABLE)
	}

	fn insert(db: &mut MemoryDatabase, name: &str, age: i64) -> i64 {
		let mut stmt = db
			.prepare("INSERT INTO person (name, age) VALUES ($1, $2) RETURNING id")
			.unwrap();
		stmt.query_row(&[name.into(), age.into()])
			.unwrap()
			.get("id")
			.unwrap()
	}

	#[rstest]
	fn test_insert_returning_assigns_sequential_ids(mut db: MemoryDatabase) {
		// Act
		let first = insert(&mut db, "Bob", 15);
		let second = insert(&mut db, "John", 1);

		// Assert
		assert_eq!((first, second), (1, 2));
		assert_eq!(db.count("person").unwrap(), 2);
	}

	#[rstest]
	fn test_select_where(mut db: MemoryDatabase) {
		// Arrange
		insert(&mut db, "Bob", 15);
		let id = insert(&mut db, "John", 1);

		// Act
		let mut stmt = db
			.prepare("SELECT name, age FROM person WHERE id = $1")
			.unwrap();
		let row = stmt.query_row(&[id.into()]).unwrap();

		// Assert
		assert_eq!(row.get::<String>("name").unwrap(), "John");
		assert_eq!(row.get::<i64>("age").unwrap(), 1);
		assert!(matches!(row.get::<i64>("id"), Err(StoreError::ColumnNotFound(_))));
	}

	#[rstest]
	fn test_select_without_match_has_no_rows(mut db: MemoryDatabase) {
		let mut stmt = db.prepare("SELECT * FROM person WHERE id = $1").unwrap();
		let result = stmt.query_row(&[99_i64.into()]);
		assert!(matches!(result, Err(StoreError::NoRows)));
	}

	#[rstest]
	fn test_values_keep_their_storage_class(mut db: MemoryDatabase) {
		// Arrange
		db.apply_schema("CREATE TABLE sample (flag BOOLEAN, ratio REAL, data BLOB, note TEXT)")
			.unwrap();

		// Act
		db.execute("INSERT INTO sample VALUES ($1, $2, $3, $4)", &[
			true.into(),
			0.5_f64.into(),
			vec![1_u8, 2].into(),
			SqlValue::Null,
		])
		.unwrap();
		let row = db
			.prepare("SELECT flag, ratio, data, note FROM sample")
			.unwrap()
			.query_row(&[])
			.unwrap();

		// Assert
		assert_eq!(row.data["flag"], SqlValue::Int(1));
		assert_eq!(row.get::<f64>("ratio").unwrap(), 0.5);
		assert_eq!(row.data["data"], SqlValue::Bytes(vec![1, 2]));
		assert_eq!(row.data["note"], SqlValue::Null);
	}

	#[rstest]
	fn test_delete_reports_affected_rows(mut db: MemoryDatabase) {
		insert(&mut db, "Bob", 15);
		insert(&mut db, "Ann", 30);

		let result = db.execute("DELETE FROM person", &[]).unwrap();

		assert_eq!(result.rows_affected, 2);
		assert_eq!(db.count("person").unwrap(), 0);
	}

	#[rstest]
	fn test_insert_after_max_id_does_not_overflow(mut db: MemoryDatabase) {
		// Arrange
		db.execute("INSERT INTO person (id, name, age) VALUES ($1, $2, $3)", &[
			i64::MAX.into(),
			"Max".into(),
			1_i64.into(),
		])
		.unwrap();

		// Act
		let result = db.execute("INSERT INTO person (name, age) VALUES ($1, $2)", &[
			"Next".into(),
			2_i64.into(),
		]);

		// Assert
		let result = result.unwrap();
		assert_ne!(result.last_insert_id, Some(i64::MAX));
		assert_eq!(db.count("person").unwrap(), 2);
	}

	#[rstest]
	fn test_unknown_table_fails_on_prepare(mut db: MemoryDatabase) {
		let result = db.prepare("INSERT INTO pet (name) VALUES ($1)").map(|_| ());
		assert!(matches!(result, Err(StoreError::TableNotFound(ref name)) if name == "pet"));
		assert!(db.executed().is_empty());
	}

	#[rstest]
	fn test_invalid_sql_is_a_query_error(mut db: MemoryDatabase) {
		let result = db.prepare("INSERT INTO person VALUES (").map(|_| ());
		assert!(matches!(result, Err(StoreError::Query(_))));
	}

	#[rstest]
	fn test_closed_database_rejects_statements(mut db: MemoryDatabase) {
		db.close().unwrap();
		assert!(db.is_closed());
		assert!(matches!(
			db.execute("DELETE FROM person", &[]),
			Err(StoreError::Closed)
		));
		assert!(db.close().is_ok());
	}

	#[rstest]
	fn test_records_executed_statements(mut db: MemoryDatabase) {
		insert(&mut db, "Bob", 15);
		db.execute("DELETE FROM person", &[]).unwrap();
		assert_eq!(db.executed(), [
			"INSERT INTO person (name, age) VALUES ($1, $2) RETURNING id",
			"DELETE FROM person",
		]);
	}
}
