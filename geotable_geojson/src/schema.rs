//! SQL-ish column model for imported tables.
//!
//! Schema inference only produces `Varchar`, `Boolean`, `Double`, `Int` and
//! `Geometry`; the remaining variants exist for the export path, which must
//! accept arbitrary source tables and reject the types GeoJSON properties
//! cannot carry.

use std::fmt::{Debug, Display};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SqlType {
	Varchar,
	Char,
	NChar,
	Boolean,
	Smallint,
	Int,
	Bigint,
	Float,
	Double,
	Date,
	Time,
	Timestamp,
	Blob,
	Geometry { type_token: String, srid: i32 },
}

impl SqlType {
	#[must_use]
	pub fn is_geometry(&self) -> bool {
		matches!(self, SqlType::Geometry { .. })
	}

	/// True if a column of this type can be written as a GeoJSON property.
	#[must_use]
	pub fn is_supported_in_geojson(&self) -> bool {
		use SqlType::*;
		matches!(
			self,
			Varchar | Char | NChar | Boolean | Smallint | Int | Bigint | Float | Double | Date
		)
	}
}

impl Display for SqlType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use SqlType::*;
		match self {
			Varchar => write!(f, "VARCHAR"),
			Char => write!(f, "CHAR"),
			NChar => write!(f, "NCHAR"),
			Boolean => write!(f, "BOOLEAN"),
			Smallint => write!(f, "SMALLINT"),
			Int => write!(f, "INT"),
			Bigint => write!(f, "BIGINT"),
			Float => write!(f, "FLOAT"),
			Double => write!(f, "DOUBLE"),
			Date => write!(f, "DATE"),
			Time => write!(f, "TIME"),
			Timestamp => write!(f, "TIMESTAMP"),
			Blob => write!(f, "BLOB"),
			Geometry { type_token, srid } => write!(f, "GEOMETRY({type_token},{srid})"),
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnSpec {
	pub name: String,
	pub sql_type: SqlType,
	pub primary_key: bool,
}

impl ColumnSpec {
	pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
		ColumnSpec {
			name: name.into(),
			sql_type,
			primary_key: false,
		}
	}

	#[must_use]
	pub fn primary_key(mut self) -> Self {
		self.primary_key = true;
		self
	}
}

impl Display for ColumnSpec {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {}", self.name, self.sql_type)?;
		if self.primary_key {
			write!(f, " PRIMARY KEY")?;
		}
		Ok(())
	}
}

/// The ordered column list derived from the first feature of a collection.
///
/// Built once per import and immutable afterwards, except for the final
/// geometry constraint update once the whole file is known to be
/// single-typed or mixed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableSchema {
	pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
	#[must_use]
	pub fn new(columns: Vec<ColumnSpec>) -> Self {
		TableSchema { columns }
	}

	/// Index of the geometry column, if one exists.
	#[must_use]
	pub fn geometry_index(&self) -> Option<usize> {
		self.columns.iter().position(|c| c.sql_type.is_geometry())
	}

	/// The SRID carried by the geometry column, 0 if unspecified.
	#[must_use]
	pub fn srid(&self) -> i32 {
		self
			.columns
			.iter()
			.find_map(|c| match &c.sql_type {
				SqlType::Geometry { srid, .. } => Some(*srid),
				_ => None,
			})
			.unwrap_or(0)
	}

	/// All non-geometry columns in schema order. Their position in this
	/// iteration equals the value index inside a [`Row`](crate::Row).
	pub fn property_columns(&self) -> impl Iterator<Item = &ColumnSpec> {
		self.columns.iter().filter(|c| !c.sql_type.is_geometry())
	}

	/// Value index of a property column, matched case-insensitively.
	#[must_use]
	pub fn property_index(&self, name: &str) -> Option<usize> {
		self.property_columns().position(|c| c.name.eq_ignore_ascii_case(name))
	}
}

impl Display for TableSchema {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "(")?;
		for (i, column) in self.columns.iter().enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{column}")?;
		}
		write!(f, ")")
	}
}
