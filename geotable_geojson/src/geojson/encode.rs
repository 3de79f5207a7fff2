//! Encoding of values and geometries back into GeoJSON text.
//!
//! Doubles are written via their `Debug` form so integral values keep a
//! trailing `.0` and re-import as doubles, not integers. A coordinate's z
//! component is only written when it is a real number; the NaN sentinel of
//! a 2D position never reaches the output.

use crate::{Coordinate, GeoValue, Geometry};
use anyhow::Result;
use std::io::Write;

pub fn escape_json_string(input: &str) -> String {
	input
		.chars()
		.map(|c| match c {
			'"' => "\\\"".to_string(),
			'\\' => "\\\\".to_string(),
			'\n' => "\\n".to_string(),
			'\r' => "\\r".to_string(),
			'\t' => "\\t".to_string(),
			'\u{08}' => "\\b".to_string(),
			'\u{0c}' => "\\f".to_string(),
			c if c.is_control() => format!("\\u{:04x}", c as u32),
			c => c.to_string(),
		})
		.collect()
}

/// Writes one property value as a JSON scalar.
pub fn write_value(sink: &mut dyn Write, value: &GeoValue) -> Result<()> {
	match value {
		GeoValue::Bool(v) => write!(sink, "{v}")?,
		GeoValue::Double(v) => write!(sink, "{v:?}")?,
		GeoValue::Int(v) => write!(sink, "{v}")?,
		GeoValue::Null => write!(sink, "null")?,
		GeoValue::String(v) => write!(sink, "\"{}\"", escape_json_string(v))?,
	}
	Ok(())
}

/// Writes one geometry as a GeoJSON geometry object.
pub fn write_geometry(sink: &mut dyn Write, geometry: &Geometry) -> Result<()> {
	match geometry {
		Geometry::GeometryCollection(members) => {
			write!(sink, "{{\"type\":\"GeometryCollection\",\"geometries\":[")?;
			for (index, member) in members.iter().enumerate() {
				if index > 0 {
					write!(sink, ",")?;
				}
				write_geometry(sink, member)?;
			}
			write!(sink, "]}}")?;
		}
		_ => {
			write!(sink, "{{\"type\":\"{}\",\"coordinates\":", geometry.type_name())?;
			match geometry {
				Geometry::Point(c) => write_coordinate(sink, c)?,
				Geometry::MultiPoint(list) | Geometry::LineString(list) => write_coordinate_array(sink, list)?,
				Geometry::MultiLineString(lists) | Geometry::Polygon(lists) => {
					write_nested(sink, lists, |sink2, list| write_coordinate_array(sink2, list))?;
				}
				Geometry::MultiPolygon(polygons) => {
					write_nested(sink, polygons, |sink2, rings| {
						write_nested(sink2, rings, |sink3, ring| write_coordinate_array(sink3, ring))
					})?;
				}
				Geometry::GeometryCollection(_) => unreachable!(),
			}
			write!(sink, "}}")?;
		}
	}
	Ok(())
}

fn write_coordinate(sink: &mut dyn Write, coordinate: &Coordinate) -> Result<()> {
	if coordinate.has_z() {
		write!(sink, "[{:?},{:?},{:?}]", coordinate.x, coordinate.y, coordinate.z)?;
	} else {
		write!(sink, "[{:?},{:?}]", coordinate.x, coordinate.y)?;
	}
	Ok(())
}

fn write_coordinate_array(sink: &mut dyn Write, coordinates: &[Coordinate]) -> Result<()> {
	write!(sink, "[")?;
	for (index, coordinate) in coordinates.iter().enumerate() {
		if index > 0 {
			write!(sink, ",")?;
		}
		write_coordinate(sink, coordinate)?;
	}
	write!(sink, "]")?;
	Ok(())
}

fn write_nested<T>(
	sink: &mut dyn Write,
	entries: &[T],
	mut write_entry: impl FnMut(&mut dyn Write, &T) -> Result<()>,
) -> Result<()> {
	write!(sink, "[")?;
	for (index, entry) in entries.iter().enumerate() {
		if index > 0 {
			write!(sink, ",")?;
		}
		write_entry(sink, entry)?;
	}
	write!(sink, "]")?;
	Ok(())
}
