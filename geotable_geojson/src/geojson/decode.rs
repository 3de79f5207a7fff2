//! Decoding productions for features and the seven geometry kinds.
//!
//! Geometry objects follow a strict positional grammar: `type` must come
//! first, followed by exactly the coordinate payload (`coordinates`, or
//! `geometries` for collections), and nothing else. Deviations fail loudly
//! with the expected and the found token. Feature objects are slightly
//! looser, matching real-world files: `type` must come first, but
//! `geometry` and `properties` may appear in either order and unknown
//! members (`id`, `bbox`) are skipped.

use super::ParseContext;
use crate::{Coordinate, GeoJsonError, GeoValue, Geometry, Ring};
use anyhow::Result;
use geotable_core::byte_iterator::{
	ByteIterator, expect_char, expect_object_key, parse_array_entries, parse_next_entry, parse_number_as,
	parse_number_as_string, parse_object_entries, parse_object_key, parse_quoted_json_string, parse_tag,
	skip_json_value,
};
use geotable_derive::context;

/// One decoded feature: the geometry (or `None` for `"geometry": null`)
/// and the properties in file order. A property value of `None` marks a
/// kind that does not map to a column (nested array or object).
#[derive(Debug)]
pub struct ParsedFeature {
	pub geometry: Option<Geometry>,
	pub properties: Option<Vec<(String, Option<GeoValue>)>>,
}

/// Parses one Feature object.
#[context("while parsing a feature")]
pub fn parse_feature(iter: &mut ByteIterator, ctx: &mut ParseContext) -> Result<ParsedFeature> {
	expect_char(iter, b'{')?;
	iter.skip_whitespace();
	expect_object_key(iter, "type")?;
	let marker = parse_quoted_json_string(iter)?;
	if !marker.eq_ignore_ascii_case("Feature") {
		return Err(GeoJsonError::malformed("Feature", marker).into());
	}

	let mut geometry = None;
	let mut properties = None;
	while parse_next_entry(iter, b'}')? {
		let key = parse_object_key(iter)?;
		match key.to_ascii_lowercase().as_str() {
			"geometry" => geometry = parse_geometry(iter, ctx)?,
			"properties" => properties = Some(parse_properties(iter)?),
			_ => skip_json_value(iter)?,
		}
	}

	Ok(ParsedFeature { geometry, properties })
}

/// Parses a geometry object, or `null` as `None`.
#[context("while parsing a geometry")]
pub fn parse_geometry(iter: &mut ByteIterator, ctx: &mut ParseContext) -> Result<Option<Geometry>> {
	iter.skip_whitespace();
	if iter.expect_peeked_byte()? == b'n' {
		parse_tag(iter, "null")?;
		return Ok(None);
	}

	expect_char(iter, b'{')?;
	iter.skip_whitespace();
	expect_object_key(iter, "type")?;
	let type_name = parse_quoted_json_string(iter)?;

	let geometry = match type_name.to_ascii_lowercase().as_str() {
		"point" => {
			expect_char(iter, b',')?;
			expect_object_key(iter, "coordinates")?;
			Geometry::Point(parse_coordinate(iter, ctx)?)
		}
		"multipoint" => {
			expect_char(iter, b',')?;
			expect_object_key(iter, "coordinates")?;
			Geometry::MultiPoint(parse_coordinate_array(iter, ctx)?)
		}
		"linestring" => {
			expect_char(iter, b',')?;
			expect_object_key(iter, "coordinates")?;
			Geometry::LineString(parse_coordinate_array(iter, ctx)?)
		}
		"multilinestring" => {
			expect_char(iter, b',')?;
			expect_object_key(iter, "coordinates")?;
			Geometry::MultiLineString(parse_array_entries(iter, |iter2| parse_coordinate_array(iter2, ctx))?)
		}
		"polygon" => {
			expect_char(iter, b',')?;
			expect_object_key(iter, "coordinates")?;
			Geometry::Polygon(parse_rings(iter, ctx)?)
		}
		"multipolygon" => {
			expect_char(iter, b',')?;
			expect_object_key(iter, "coordinates")?;
			Geometry::MultiPolygon(parse_array_entries(iter, |iter2| parse_rings(iter2, ctx))?)
		}
		"geometrycollection" => {
			expect_char(iter, b',')?;
			expect_object_key(iter, "geometries")?;
			let geometries = parse_array_entries(iter, |iter2| {
				parse_geometry(iter2, ctx)?
					.ok_or_else(|| iter2.format_error("a geometry collection must not contain null geometries"))
			})?;
			Geometry::GeometryCollection(geometries)
		}
		_ => return Err(GeoJsonError::malformed("a GeoJSON geometry type", type_name).into()),
	};

	expect_char(iter, b'}')?;
	Ok(Some(geometry))
}

/// Parses one position: `[x, y]` or `[x, y, z]`.
///
/// A third coordinate flips the context to 3D for the whole import.
fn parse_coordinate(iter: &mut ByteIterator, ctx: &mut ParseContext) -> Result<Coordinate> {
	expect_char(iter, b'[')?;
	let x = parse_coordinate_number(iter)?;
	expect_char(iter, b',')?;
	let y = parse_coordinate_number(iter)?;

	iter.skip_whitespace();
	match iter.expect_next_byte()? {
		b']' => Ok(Coordinate::new(x, y)),
		b',' => {
			let z = parse_coordinate_number(iter)?;
			expect_char(iter, b']')?;
			ctx.has_z = true;
			Ok(Coordinate::new_3d(x, y, z))
		}
		found => Err(iter.format_error(&format!("expected ',' or ']', found '{}'", found as char))),
	}
}

fn parse_coordinate_number(iter: &mut ByteIterator) -> Result<f64> {
	iter.skip_whitespace();
	let next = iter.expect_peeked_byte()?;
	if !next.is_ascii_digit() && next != b'-' && next != b'+' && next != b'.' {
		return Err(iter.format_error(&format!(
			"expected a number while parsing coordinates, found '{}'",
			next as char
		)));
	}
	parse_number_as::<f64>(iter)
}

fn parse_coordinate_array(iter: &mut ByteIterator, ctx: &mut ParseContext) -> Result<Vec<Coordinate>> {
	parse_array_entries(iter, |iter2| parse_coordinate(iter2, ctx))
}

/// Parses a polygon's ring list; at least one non-empty ring is required.
fn parse_rings(iter: &mut ByteIterator, ctx: &mut ParseContext) -> Result<Vec<Ring>> {
	let rings = parse_array_entries(iter, |iter2| parse_coordinate_array(iter2, ctx))?;
	if rings.is_empty() {
		return Err(iter.format_error("a polygon must contain at least one ring"));
	}
	if rings.iter().any(|ring| ring.is_empty()) {
		return Err(iter.format_error("a polygon ring must not be empty"));
	}
	Ok(rings)
}

/// Parses the `properties` object into key/value pairs in file order.
#[context("while parsing feature properties")]
fn parse_properties(iter: &mut ByteIterator) -> Result<Vec<(String, Option<GeoValue>)>> {
	let mut list = Vec::new();
	parse_object_entries(iter, |key, iter2| {
		iter2.skip_whitespace();
		let value = match iter2.expect_peeked_byte()? {
			b'"' => Some(GeoValue::from(parse_quoted_json_string(iter2)?)),
			d if d.is_ascii_digit() || d == b'-' || d == b'+' || d == b'.' => Some(parse_property_number(iter2)?),
			b't' => {
				parse_tag(iter2, "true")?;
				Some(GeoValue::Bool(true))
			}
			b'f' => {
				parse_tag(iter2, "false")?;
				Some(GeoValue::Bool(false))
			}
			b'n' => {
				parse_tag(iter2, "null")?;
				Some(GeoValue::Null)
			}
			b'[' | b'{' => {
				skip_json_value(iter2)?;
				None
			}
			c => return Err(iter2.format_error(&format!("unexpected character '{}' in properties", c as char))),
		};
		list.push((key, value));
		Ok(())
	})?;
	Ok(list)
}

/// Numbers with a fraction or exponent become doubles, the rest integers.
fn parse_property_number(iter: &mut ByteIterator) -> Result<GeoValue> {
	let number = parse_number_as_string(iter)?;
	if number.contains(['.', 'e', 'E']) {
		Ok(GeoValue::Double(
			number.parse::<f64>().map_err(|_| iter.format_error("invalid double"))?,
		))
	} else {
		match number.parse::<i64>() {
			Ok(value) => Ok(GeoValue::Int(value)),
			// Integral but beyond i64 range.
			Err(_) => Ok(GeoValue::Double(
				number.parse::<f64>().map_err(|_| iter.format_error("invalid number"))?,
			)),
		}
	}
}
