//! Row transport between the GeoJSON engine and external table storage.
//!
//! The engine never talks to a database directly: the reader pushes rows
//! into a [`RowSink`] and the writer pulls rows out of a [`RowSource`].
//! [`MemoryTable`] implements both and backs the CLI and the tests.

use crate::{GeoValue, Geometry, SqlType, TableSchema};
use anyhow::{Result, bail};

/// One feature's worth of data: the geometry (if any) plus property values
/// in schema order (geometry column excluded).
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
	pub geometry: Option<Geometry>,
	pub values: Vec<GeoValue>,
}

/// Destination of an import.
pub trait RowSink {
	/// Creates the destination table with the inferred column list.
	fn create_table(&mut self, schema: &TableSchema) -> Result<()>;

	/// Inserts one row. Called once per feature, in file order.
	fn insert_row(&mut self, row: Row) -> Result<()>;

	/// Applies the final geometry type and SRID constraint after all rows
	/// are loaded, once the file is known to be single-typed or mixed.
	fn set_geometry_constraint(&mut self, type_token: &str, srid: i32) -> Result<()>;
}

/// Source of an export.
pub trait RowSource {
	fn schema(&self) -> &TableSchema;

	/// Visits every row in order; the callback's error aborts the walk.
	fn for_each_row(&mut self, callback: &mut dyn FnMut(&Row) -> Result<()>) -> Result<()>;
}

/// An in-memory table holding a schema and its rows.
#[derive(Clone, Debug, Default)]
pub struct MemoryTable {
	schema: TableSchema,
	rows: Vec<Row>,
}

impl MemoryTable {
	#[must_use]
	pub fn new() -> Self {
		MemoryTable::default()
	}

	#[must_use]
	pub fn from_parts(schema: TableSchema, rows: Vec<Row>) -> Self {
		MemoryTable { schema, rows }
	}

	#[must_use]
	pub fn table_schema(&self) -> &TableSchema {
		&self.schema
	}

	#[must_use]
	pub fn rows(&self) -> &[Row] {
		&self.rows
	}
}

impl RowSink for MemoryTable {
	fn create_table(&mut self, schema: &TableSchema) -> Result<()> {
		self.schema = schema.clone();
		self.rows.clear();
		Ok(())
	}

	fn insert_row(&mut self, row: Row) -> Result<()> {
		self.rows.push(row);
		Ok(())
	}

	fn set_geometry_constraint(&mut self, type_token: &str, srid: i32) -> Result<()> {
		let Some(index) = self.schema.geometry_index() else {
			bail!("the table does not contain a geometry column");
		};
		self.schema.columns[index].sql_type = SqlType::Geometry {
			type_token: type_token.to_string(),
			srid,
		};
		Ok(())
	}
}

impl RowSource for MemoryTable {
	fn schema(&self) -> &TableSchema {
		&self.schema
	}

	fn for_each_row(&mut self, callback: &mut dyn FnMut(&Row) -> Result<()>) -> Result<()> {
		for row in &self.rows {
			callback(row)?;
		}
		Ok(())
	}
}
