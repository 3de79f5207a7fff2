//! Streaming GeoJSON export of a relational table.
//!
//! The schema is validated up front: if any property column has a type
//! GeoJSON cannot carry, the export fails before a single byte reaches the
//! sink. A non-zero SRID is emitted as a name-form CRS member so a
//! re-import recovers it.

use super::{
	encode::{escape_json_string, write_geometry, write_value},
	reader::check_extension,
};
use crate::{GeoJsonError, RowSource, TableSchema};
use anyhow::{Context, Result, bail};
use flate2::{Compression, write::GzEncoder};
use geotable_derive::context;
use std::{
	fs::File,
	io::{BufWriter, Write},
	path::Path,
};

/// Writes `source` as a FeatureCollection into `sink`.
///
/// Property keys are the column names as they appear in the schema.
#[context("while writing GeoJSON")]
pub fn write_geojson(sink: &mut dyn Write, source: &mut dyn RowSource) -> Result<()> {
	let schema = source.schema().clone();
	validate_schema(&schema)?;

	write!(sink, "{{\"type\":\"FeatureCollection\"")?;
	let srid = schema.srid();
	if srid != 0 {
		write!(
			sink,
			",\"crs\":{{\"type\":\"name\",\"properties\":{{\"name\":\"urn:ogc:def:crs:EPSG::{srid}\"}}}}"
		)?;
	}
	write!(sink, ",\"features\":[")?;

	let mut first = true;
	source.for_each_row(&mut |row| {
		if first {
			first = false;
		} else {
			write!(sink, ",")?;
		}
		write!(sink, "{{\"type\":\"Feature\",\"geometry\":")?;
		match &row.geometry {
			Some(geometry) => write_geometry(sink, geometry)?,
			None => write!(sink, "null")?,
		}
		write!(sink, ",\"properties\":{{")?;
		for (index, column) in schema.property_columns().enumerate() {
			if index > 0 {
				write!(sink, ",")?;
			}
			write!(sink, "\"{}\":", escape_json_string(&column.name))?;
			write_value(sink, &row.values[index])?;
		}
		write!(sink, "}}}}")?;
		Ok(())
	})?;

	write!(sink, "]}}")?;
	Ok(())
}

/// Writes `source` as a GeoJSON file, gzipped if the name ends in `.gz`.
///
/// Existing files are only replaced with `overwrite` set.
#[context("while exporting to '{}'", path.display())]
pub fn write_geojson_file(path: &Path, source: &mut dyn RowSource, overwrite: bool) -> Result<()> {
	let gzipped = check_extension(path)?;
	if path.exists() && !overwrite {
		bail!("file '{}' already exists, use overwrite to replace it", path.display());
	}
	// Reject unsupported column types before touching the filesystem.
	validate_schema(source.schema())?;

	let file = File::create(path).with_context(|| format!("creating '{}'", path.display()))?;
	if gzipped {
		let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
		write_geojson(&mut encoder, source)?;
		encoder.finish()?;
	} else {
		let mut writer = BufWriter::new(file);
		write_geojson(&mut writer, source)?;
		writer.flush()?;
	}
	Ok(())
}

fn validate_schema(schema: &TableSchema) -> Result<()> {
	if schema.geometry_index().is_none() {
		bail!("the table does not contain a geometry column");
	}
	for column in schema.property_columns() {
		if !column.sql_type.is_supported_in_geojson() {
			return Err(GeoJsonError::UnsupportedType {
				column: column.name.clone(),
				sql_type: column.sql_type.to_string(),
			}
			.into());
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{ColumnSpec, Coordinate, GeoValue, Geometry, MemoryTable, Row, SqlType, read_geojson_file};
	use geotable_core::progress::get_progress_bar;
	use pretty_assertions::assert_eq;

	fn point_table(srid: i32) -> MemoryTable {
		MemoryTable::from_parts(
			TableSchema::new(vec![
				ColumnSpec::new(
					"THE_GEOM",
					SqlType::Geometry {
						type_token: "POINT".to_string(),
						srid,
					},
				),
				ColumnSpec::new("PROP0", SqlType::Varchar),
			]),
			vec![
				Row {
					geometry: Some(Geometry::Point(Coordinate::new(102.0, 0.5))),
					values: vec![GeoValue::from("value0")],
				},
				Row {
					geometry: Some(Geometry::Point(Coordinate::new(103.0, 1.5))),
					values: vec![GeoValue::from("value1")],
				},
			],
		)
	}

	fn export(table: &mut MemoryTable) -> Result<String> {
		let mut buffer = Vec::new();
		write_geojson(&mut buffer, table)?;
		Ok(String::from_utf8(buffer)?)
	}

	#[test]
	fn test_export_two_points() {
		let text = export(&mut point_table(0)).unwrap();
		assert_eq!(
			text,
			r##"{"type":"FeatureCollection","features":[{"type":"Feature","geometry":{"type":"Point","coordinates":[102.0,0.5]},"properties":{"PROP0":"value0"}},{"type":"Feature","geometry":{"type":"Point","coordinates":[103.0,1.5]},"properties":{"PROP0":"value1"}}]}"##
		);
	}

	#[test]
	fn test_export_emits_crs_for_non_zero_srid() {
		let text = export(&mut point_table(4326)).unwrap();
		assert!(text.contains(r##""crs":{"type":"name","properties":{"name":"urn:ogc:def:crs:EPSG::4326"}}"##));
	}

	#[test]
	fn test_null_geometry_is_written_as_null() {
		let mut table = MemoryTable::from_parts(
			TableSchema::new(vec![
				ColumnSpec::new(
					"THE_GEOM",
					SqlType::Geometry {
						type_token: "POINT".to_string(),
						srid: 0,
					},
				),
				ColumnSpec::new("A", SqlType::Int),
			]),
			vec![Row {
				geometry: None,
				values: vec![GeoValue::Int(7)],
			}],
		);
		let text = export(&mut table).unwrap();
		assert!(text.contains(r##""geometry":null,"properties":{"A":7}"##));
	}

	#[test]
	fn test_unsupported_column_type_fails_before_writing() {
		let mut table = MemoryTable::from_parts(
			TableSchema::new(vec![
				ColumnSpec::new(
					"THE_GEOM",
					SqlType::Geometry {
						type_token: "POINT".to_string(),
						srid: 0,
					},
				),
				ColumnSpec::new("RAW", SqlType::Blob),
			]),
			vec![],
		);

		let mut buffer = Vec::new();
		let err = write_geojson(&mut buffer, &mut table).unwrap_err();
		assert_eq!(
			err.root_cause().downcast_ref::<GeoJsonError>(),
			Some(&GeoJsonError::UnsupportedType {
				column: "RAW".to_string(),
				sql_type: "BLOB".to_string()
			})
		);
		assert!(buffer.is_empty());
	}

	#[test]
	fn test_existing_file_requires_overwrite() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("out.geojson");
		std::fs::write(&path, "x").unwrap();

		let err = write_geojson_file(&path, &mut point_table(0), false).unwrap_err();
		assert!(format!("{err:#}").contains("already exists"));

		write_geojson_file(&path, &mut point_table(0), true).unwrap();
		assert!(std::fs::read_to_string(&path).unwrap().starts_with("{\"type\":\"FeatureCollection\""));
	}

	#[test]
	fn test_export_import_roundtrip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("roundtrip.geojson");
		let mut table = point_table(4326);
		write_geojson_file(&path, &mut table, false).unwrap();

		let mut reimported = MemoryTable::new();
		let report = read_geojson_file(&path, &mut reimported, get_progress_bar().as_ref()).unwrap();

		assert_eq!(report.srid, 4326);
		assert_eq!(reimported.table_schema(), table.table_schema());
		assert_eq!(reimported.rows(), table.rows());
	}

	#[test]
	fn test_gzipped_export_roundtrip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("compressed.geojson.gz");
		let mut table = point_table(0);
		write_geojson_file(&path, &mut table, false).unwrap();

		let mut reimported = MemoryTable::new();
		read_geojson_file(&path, &mut reimported, get_progress_bar().as_ref()).unwrap();
		assert_eq!(reimported.rows(), table.rows());
	}
}
