//! CRS declarations in the FeatureCollection envelope.
//!
//! Only the pre-RFC-7946 `name` form with an EPSG URN is mapped to an SRID.
//! The `link` form is explicitly unsupported: it logs a warning and yields
//! SRID 0 rather than failing the import.

use crate::GeoJsonError;
use anyhow::Result;
use geotable_core::byte_iterator::{ByteIterator, parse_object_entries, parse_quoted_json_string, skip_json_value};
use geotable_derive::context;
use log::warn;

const EPSG_URN_PREFIX: &str = "urn:ogc:def:crs:epsg::";
const CRS84_URN: &str = "urn:ogc:def:crs:ogc:1.3:crs84";

/// Parses the `crs` member of the envelope and returns the SRID.
#[context("while parsing the CRS element")]
pub fn parse_crs(iter: &mut ByteIterator) -> Result<i32> {
	let mut crs_type: Option<String> = None;
	let mut name: Option<String> = None;

	parse_object_entries(iter, |key, iter2| {
		match key.as_str() {
			"type" => crs_type = Some(parse_quoted_json_string(iter2)?),
			"properties" => parse_object_entries(iter2, |key2, iter3| {
				if key2 == "name" {
					name = Some(parse_quoted_json_string(iter3)?);
					Ok(())
				} else {
					skip_json_value(iter3)
				}
			})?,
			_ => skip_json_value(iter2)?,
		};
		Ok(())
	})?;

	match crs_type.as_deref() {
		Some(t) if t.eq_ignore_ascii_case("name") => Ok(srid_from_name(name.as_deref().unwrap_or(""))),
		Some(t) if t.eq_ignore_ascii_case("link") => {
			warn!("linked CRS references are not supported, using SRID 0");
			Ok(0)
		}
		other => Err(
			GeoJsonError::malformed("a CRS type of 'name' or 'link'", other.unwrap_or("no CRS type")).into(),
		),
	}
}

/// Maps a name-form CRS URN to an SRID, 0 for anything unrecognized.
fn srid_from_name(name: &str) -> i32 {
	let lower = name.to_ascii_lowercase();
	if let Some(code) = lower.strip_prefix(EPSG_URN_PREFIX) {
		code.parse().unwrap_or_else(|_| {
			warn!("invalid EPSG code in CRS name '{name}', using SRID 0");
			0
		})
	} else if lower == CRS84_URN {
		// WGS84 in longitude/latitude order, same axis order as EPSG:4326
		// data in practice.
		4326
	} else {
		warn!("unsupported CRS name '{name}', using SRID 0");
		0
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::io::Cursor;

	fn parse(json: &str) -> Result<i32> {
		let mut iter = ByteIterator::from_reader(Cursor::new(json), true);
		parse_crs(&mut iter)
	}

	#[test]
	fn test_name_form_epsg_urn() {
		let json = r##"{"type":"name","properties":{"name":"urn:ogc:def:crs:EPSG::4326"}}"##;
		assert_eq!(parse(json).unwrap(), 4326);
	}

	#[test]
	fn test_link_form_is_unsupported_but_not_fatal() {
		let json = r##"{"type":"link","properties":{"href":"http://example.com/crs/42","type":"proj4"}}"##;
		assert_eq!(parse(json).unwrap(), 0);
	}

	#[test]
	fn test_missing_type_is_malformed() {
		let json = r##"{"properties":{"name":"urn:ogc:def:crs:epsg::4326"}}"##;
		assert!(parse(json).is_err());
	}

	#[rstest]
	#[case("urn:ogc:def:crs:epsg::4326", 4326)]
	#[case("URN:OGC:DEF:CRS:EPSG::27572", 27572)]
	#[case("urn:ogc:def:crs:OGC:1.3:CRS84", 4326)]
	#[case("urn:ogc:def:crs:epsg::not-a-number", 0)]
	#[case("EPSG:4326", 0)]
	#[case("", 0)]
	fn test_srid_from_name(#[case] name: &str, #[case] expected: i32) {
		assert_eq!(srid_from_name(name), expected);
	}
}
