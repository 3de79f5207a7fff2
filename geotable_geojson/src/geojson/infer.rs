//! Schema inference from the FeatureCollection envelope and its first
//! feature.
//!
//! The envelope is strict: `type` must come first and be
//! `FeatureCollection`, an optional `crs` may follow, and the next member
//! must be `features`. The column list is derived from the first feature
//! alone; later features with extra properties lose them, later features
//! with fewer properties get nulls.

use super::{ParseContext, crs::parse_crs, parse_feature};
use crate::{ColumnSpec, GeoJsonError, GeoValue, SqlType, TableSchema};
use anyhow::Result;
use geotable_core::byte_iterator::{
	ByteIterator, expect_char, expect_object_key, parse_next_entry, parse_object_key, parse_quoted_json_string,
};
use geotable_derive::context;
use log::warn;

/// Name of the geometry column every inferred schema starts with.
pub const GEOMETRY_COLUMN: &str = "THE_GEOM";

/// Parses the envelope up to and including the `features` key, so the
/// cursor stops right before the feature array's `[`.
#[context("while parsing the FeatureCollection envelope")]
pub(crate) fn parse_envelope(iter: &mut ByteIterator, ctx: &mut ParseContext) -> Result<()> {
	expect_char(iter, b'{')?;
	iter.skip_whitespace();
	expect_object_key(iter, "type")?;
	let marker = parse_quoted_json_string(iter)?;
	if !marker.eq_ignore_ascii_case("FeatureCollection") {
		return Err(GeoJsonError::malformed("FeatureCollection", marker).into());
	}

	loop {
		if !parse_next_entry(iter, b'}')? {
			return Err(GeoJsonError::malformed("features", "end of object").into());
		}
		let key = parse_object_key(iter)?;
		match key.to_ascii_lowercase().as_str() {
			"crs" => ctx.srid = parse_crs(iter)?,
			"features" => return Ok(()),
			_ => return Err(GeoJsonError::malformed("features", key).into()),
		}
	}
}

/// Derives the table schema from the first feature of the file.
///
/// The geometry column comes first, typed with the first feature's
/// geometry kind and the envelope's SRID. When the first feature carries
/// no mappable properties, a sequential `ID INT PRIMARY KEY` column is
/// generated instead.
#[context("while inferring the table schema")]
pub fn infer_schema(iter: &mut ByteIterator, ctx: &mut ParseContext) -> Result<TableSchema> {
	parse_envelope(iter, ctx)?;
	expect_char(iter, b'[')?;
	iter.skip_whitespace();
	if iter.expect_peeked_byte()? == b']' {
		return Err(GeoJsonError::NoGeometry.into());
	}

	let feature = parse_feature(iter, ctx)?;
	let Some(geometry) = feature.geometry else {
		return Err(GeoJsonError::NoGeometry.into());
	};

	let mut columns = vec![ColumnSpec::new(
		GEOMETRY_COLUMN,
		SqlType::Geometry {
			type_token: geometry.sql_token().to_string(),
			srid: ctx.srid,
		},
	)];
	ctx.record_geometry(&geometry);

	for (name, value) in feature.properties.unwrap_or_default() {
		let sql_type = match value {
			Some(GeoValue::String(_) | GeoValue::Null) => SqlType::Varchar,
			Some(GeoValue::Bool(_)) => SqlType::Boolean,
			Some(GeoValue::Double(_)) => SqlType::Double,
			Some(GeoValue::Int(_)) => SqlType::Int,
			None => {
				warn!("property '{name}' has no column type, skipping it");
				continue;
			}
		};
		columns.push(ColumnSpec::new(name.to_uppercase(), sql_type));
	}

	if columns.len() == 1 {
		columns.push(ColumnSpec::new("ID", SqlType::Int).primary_key());
		ctx.synthetic_id = true;
	}

	Ok(TableSchema::new(columns))
}
