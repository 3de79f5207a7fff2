//! Streaming two-pass GeoJSON import.
//!
//! Pass one reads the envelope and the first feature to infer the table
//! schema; pass two re-reads the whole file and pushes one row per feature
//! into the sink. Both passes run the same grammar productions over the
//! same cursor type, so a file that survives pass one cannot surprise pass
//! two with different parse behavior.

use super::{ParseContext, infer::parse_envelope, infer_schema, parse_feature};
use crate::{GeoJsonError, GeoValue, Row, RowSink, TableSchema};
use anyhow::{Context, Result, bail};
use flate2::read::GzDecoder;
use geotable_core::{
	byte_iterator::{ByteIterator, expect_char, parse_next_entry},
	progress::ProgressTrait,
};
use geotable_derive::context;
use log::debug;
use std::{
	fs::File,
	io::{BufReader, Read},
	path::Path,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
};

/// Progress is reported roughly this many times per file, independent of
/// file size.
const PROGRESS_STEPS: u64 = 100;

/// Summary of a completed import.
#[derive(Debug, PartialEq, Eq)]
pub struct ImportReport {
	pub feature_count: u64,
	pub srid: i32,
	pub geometry_type: String,
}

/// Imports a `.geojson`, `.json` or gzipped (`.gz`) file into `sink`.
///
/// The sink receives `create_table` once, then one `insert_row` per
/// feature in file order, then `set_geometry_constraint` with the final
/// geometry type token and SRID. Cancellation is polled between features;
/// a canceled import fails with [`GeoJsonError::Canceled`] and leaves the
/// rows inserted so far in the sink.
#[context("while importing '{}'", path.display())]
pub fn read_geojson_file(path: &Path, sink: &mut dyn RowSink, progress: &dyn ProgressTrait) -> Result<ImportReport> {
	let gzipped = check_extension(path)?;
	let file_len = path
		.metadata()
		.with_context(|| format!("reading metadata of '{}'", path.display()))?
		.len();

	// Pass 1: schema from the envelope and the first feature.
	let mut ctx = ParseContext::new();
	let schema = {
		let (reader, _) = open_input(path, gzipped)?;
		let mut iter = ByteIterator::from_reader(reader, true);
		infer_schema(&mut iter, &mut ctx)?
	};
	sink.create_table(&schema)?;

	// Pass 2: all rows.
	let file_name = path.file_name().map_or_else(String::new, |n| n.to_string_lossy().into_owned());
	progress.init(&format!("importing {file_name}"), file_len);
	let step = (file_len / PROGRESS_STEPS).max(1);
	let mut next_report = step;

	let (reader, offset) = open_input(path, gzipped)?;
	let mut iter = ByteIterator::from_reader(reader, true);
	parse_envelope(&mut iter, &mut ctx)?;
	expect_char(&mut iter, b'[')?;
	iter.skip_whitespace();

	loop {
		if progress.is_canceled() {
			return Err(GeoJsonError::Canceled.into());
		}

		let feature = parse_feature(&mut iter, &mut ctx)?;
		if let Some(geometry) = &feature.geometry {
			ctx.record_geometry(geometry);
		}
		sink.insert_row(build_row(feature, &schema, &ctx))?;
		ctx.feature_count += 1;

		let position = offset.load(Ordering::Relaxed);
		if position >= next_report {
			progress.set_position(position);
			next_report = position + step;
		}

		if !parse_next_entry(&mut iter, b']')? {
			break;
		}
	}
	iter.skip_whitespace();
	expect_char(&mut iter, b'}')?;

	let geometry_type = ctx.final_type_token();
	sink.set_geometry_constraint(&geometry_type, ctx.srid)?;
	progress.finish();

	Ok(ImportReport {
		feature_count: ctx.feature_count,
		srid: ctx.srid,
		geometry_type,
	})
}

/// Validates the file extension; returns true if the content is gzipped.
pub(crate) fn check_extension(path: &Path) -> Result<bool> {
	let name = path
		.file_name()
		.map_or_else(String::new, |n| n.to_string_lossy().to_lowercase());
	let (stem, gzipped) = match name.strip_suffix(".gz") {
		Some(stem) => (stem, true),
		None => (name.as_str(), false),
	};
	if stem.ends_with(".geojson") || stem.ends_with(".json") {
		Ok(gzipped)
	} else {
		bail!(
			"unsupported file extension in '{}', expected .geojson, .json or a .gz variant",
			path.display()
		)
	}
}

/// Counts the bytes read from the wrapped reader.
///
/// Sits directly on the file so the shared offset tracks the on-disk
/// position even when a decompressor consumes the stream above it; progress
/// reporting stays in compressed bytes, matching the file length the bar
/// was initialized with.
struct CountingReader<R> {
	inner: R,
	offset: Arc<AtomicU64>,
}

impl<R: Read> Read for CountingReader<R> {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		let n = self.inner.read(buf)?;
		self.offset.fetch_add(n as u64, Ordering::Relaxed);
		Ok(n)
	}
}

fn open_input(path: &Path, gzipped: bool) -> Result<(Box<dyn Read>, Arc<AtomicU64>)> {
	let file = File::open(path).with_context(|| format!("opening '{}'", path.display()))?;
	let offset = Arc::new(AtomicU64::new(0));
	let counted = BufReader::new(CountingReader {
		inner: file,
		offset: offset.clone(),
	});
	let reader: Box<dyn Read> = if gzipped {
		Box::new(GzDecoder::new(counted))
	} else {
		Box::new(counted)
	};
	Ok((reader, offset))
}

/// Maps a decoded feature onto the column layout of the schema.
///
/// Missing properties stay null, properties unknown to the schema are
/// dropped. With a synthetic ID column the row carries the next sequence
/// value instead of file data.
fn build_row(feature: super::ParsedFeature, schema: &TableSchema, ctx: &ParseContext) -> Row {
	let mut values = vec![GeoValue::Null; schema.property_columns().count()];

	if ctx.synthetic_id {
		if let Some(index) = schema.property_index("ID") {
			values[index] = GeoValue::Int(i64::try_from(ctx.feature_count + 1).unwrap_or(i64::MAX));
		}
	} else {
		for (name, value) in feature.properties.unwrap_or_default() {
			let Some(value) = value else { continue };
			if let Some(index) = schema.property_index(&name) {
				values[index] = value;
			} else {
				debug!("dropping property '{name}' not present in the first feature");
			}
		}
	}

	Row {
		geometry: feature.geometry,
		values,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{Geometry, MemoryTable};
	use flate2::{Compression, write::GzEncoder};
	use geotable_core::progress::{ProgressDrain, get_progress_bar};
	use std::io::Write;

	const COLLECTION: &str = r##"{"type":"FeatureCollection","crs":{"type":"name","properties":{"name":"urn:ogc:def:crs:epsg::4326"}},"features":[
		{"type":"Feature","geometry":{"type":"Point","coordinates":[102.0,0.5]},"properties":{"prop0":"value0"}},
		{"type":"Feature","geometry":{"type":"Point","coordinates":[103.0,1.5]},"properties":{"prop0":"value1"}}
	]}"##;

	fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
		let path = dir.path().join(name);
		std::fs::write(&path, content).unwrap();
		path
	}

	fn import(path: &Path) -> Result<(MemoryTable, ImportReport)> {
		let mut table = MemoryTable::new();
		let report = read_geojson_file(path, &mut table, get_progress_bar().as_ref())?;
		Ok((table, report))
	}

	#[test]
	fn test_import_two_points() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_file(&dir, "points.geojson", COLLECTION);
		let (table, report) = import(&path).unwrap();

		assert_eq!(
			report,
			ImportReport {
				feature_count: 2,
				srid: 4326,
				geometry_type: "POINT".to_string()
			}
		);
		assert_eq!(
			table.table_schema().to_string(),
			"(THE_GEOM GEOMETRY(POINT,4326), PROP0 VARCHAR)"
		);
		assert_eq!(table.rows().len(), 2);
		assert_eq!(table.rows()[1].values, vec![GeoValue::from("value1")]);
	}

	#[test]
	fn test_import_gzipped_file() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("points.geojson.gz");
		let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
		encoder.write_all(COLLECTION.as_bytes()).unwrap();
		encoder.finish().unwrap();

		let (table, report) = import(&path).unwrap();
		assert_eq!(report.feature_count, 2);
		assert_eq!(table.rows().len(), 2);
	}

	#[test]
	fn test_offset_counts_compressed_bytes_under_a_decoder() {
		use std::io::{Cursor, Read};

		let payload = "0123456789".repeat(5000);
		let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
		encoder.write_all(payload.as_bytes()).unwrap();
		let compressed = encoder.finish().unwrap();
		assert!(compressed.len() < payload.len());

		let offset = Arc::new(AtomicU64::new(0));
		let counted = CountingReader {
			inner: Cursor::new(&compressed),
			offset: offset.clone(),
		};
		let mut decoder = GzDecoder::new(BufReader::new(counted));
		let mut decoded = String::new();
		decoder.read_to_string(&mut decoded).unwrap();

		assert_eq!(decoded.len(), payload.len());
		assert_eq!(offset.load(Ordering::Relaxed), compressed.len() as u64);
	}

	#[test]
	fn test_progress_positions_stay_within_the_file_length() {
		struct RecordingProgress {
			len: AtomicU64,
			max_seen: AtomicU64,
		}

		impl geotable_core::progress::ProgressTrait for RecordingProgress {
			fn init(&self, _message: &str, max_value: u64) {
				self.len.store(max_value, Ordering::Relaxed);
			}
			fn set_position(&self, value: u64) {
				self.max_seen.fetch_max(value, Ordering::Relaxed);
			}
			fn inc(&self, _value: u64) {}
			fn finish(&self) {}
			fn cancel(&self) {}
			fn is_canceled(&self) -> bool {
				false
			}
		}

		let features: Vec<String> = (0..500)
			.map(|i| {
				format!(
					r##"{{"type":"Feature","geometry":{{"type":"Point","coordinates":[{i}.0,0.5]}},"properties":{{"prop0":"value{i}"}}}}"##
				)
			})
			.collect();
		let collection = format!(
			r##"{{"type":"FeatureCollection","features":[{}]}}"##,
			features.join(",")
		);

		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("many.geojson.gz");
		let mut encoder = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
		encoder.write_all(collection.as_bytes()).unwrap();
		encoder.finish().unwrap();

		let progress = RecordingProgress {
			len: AtomicU64::new(0),
			max_seen: AtomicU64::new(0),
		};
		let mut table = MemoryTable::new();
		read_geojson_file(&path, &mut table, &progress).unwrap();

		let file_len = path.metadata().unwrap().len();
		assert_eq!(progress.len.load(Ordering::Relaxed), file_len);
		assert!(progress.max_seen.load(Ordering::Relaxed) <= file_len);
		assert_eq!(table.rows().len(), 500);
	}

	#[test]
	fn test_mixed_geometries_downgrade_the_constraint() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_file(
			&dir,
			"mixed.geojson",
			r##"{"type":"FeatureCollection","features":[
				{"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{"a":1}},
				{"type":"Feature","geometry":{"type":"LineString","coordinates":[[1.0,2.0],[3.0,4.0]]},"properties":{"a":2}}
			]}"##,
		);
		let (table, report) = import(&path).unwrap();

		assert_eq!(report.geometry_type, "GEOMETRY");
		assert_eq!(table.table_schema().to_string(), "(THE_GEOM GEOMETRY(GEOMETRY,0), A INT)");
	}

	#[test]
	fn test_synthetic_ids_are_sequential() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_file(
			&dir,
			"bare.geojson",
			r##"{"type":"FeatureCollection","features":[
				{"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]}},
				{"type":"Feature","geometry":{"type":"Point","coordinates":[3.0,4.0]}},
				{"type":"Feature","geometry":{"type":"Point","coordinates":[5.0,6.0]}}
			]}"##,
		);
		let (table, _) = import(&path).unwrap();

		let ids: Vec<_> = table.rows().iter().map(|r| r.values[0].clone()).collect();
		assert_eq!(ids, vec![GeoValue::Int(1), GeoValue::Int(2), GeoValue::Int(3)]);
	}

	#[test]
	fn test_later_features_follow_the_first_schema() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_file(
			&dir,
			"ragged.geojson",
			r##"{"type":"FeatureCollection","features":[
				{"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{"a":"x","b":1}},
				{"type":"Feature","geometry":{"type":"Point","coordinates":[3.0,4.0]},"properties":{"b":2,"extra":true}}
			]}"##,
		);
		let (table, _) = import(&path).unwrap();

		assert_eq!(table.rows()[1].values, vec![GeoValue::Null, GeoValue::Int(2)]);
	}

	#[test]
	fn test_null_geometry_after_the_first_feature_is_allowed() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_file(
			&dir,
			"nulls.geojson",
			r##"{"type":"FeatureCollection","features":[
				{"type":"Feature","geometry":{"type":"Point","coordinates":[1.0,2.0]},"properties":{"a":1}},
				{"type":"Feature","geometry":null,"properties":{"a":2}}
			]}"##,
		);
		let (table, report) = import(&path).unwrap();

		assert_eq!(report.geometry_type, "POINT");
		assert_eq!(table.rows()[0].geometry, Some(Geometry::Point(crate::Coordinate::new(1.0, 2.0))));
		assert_eq!(table.rows()[1].geometry, None);
	}

	#[test]
	fn test_missing_first_geometry_creates_no_table() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_file(
			&dir,
			"broken.geojson",
			r##"{"type":"FeatureCollection","features":[
				{"type":"Feature","properties":{"a":1}}
			]}"##,
		);
		let mut table = MemoryTable::new();
		let err = read_geojson_file(&path, &mut table, get_progress_bar().as_ref()).unwrap_err();

		assert_eq!(
			err.root_cause().downcast_ref::<GeoJsonError>(),
			Some(&GeoJsonError::NoGeometry)
		);
		assert!(table.table_schema().columns.is_empty());
		assert!(table.rows().is_empty());
	}

	#[test]
	fn test_cancellation_between_features() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_file(&dir, "points.geojson", COLLECTION);

		let progress = ProgressDrain::new();
		progress.cancel();
		let mut table = MemoryTable::new();
		let err = read_geojson_file(&path, &mut table, &progress).unwrap_err();

		assert_eq!(
			err.root_cause().downcast_ref::<GeoJsonError>(),
			Some(&GeoJsonError::Canceled)
		);
		assert!(table.rows().is_empty());
	}

	#[test]
	fn test_unsupported_extension_is_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let path = write_file(&dir, "points.txt", COLLECTION);
		let err = import(&path).unwrap_err();
		assert!(format!("{err:#}").contains("unsupported file extension"));
	}

	#[test]
	fn test_check_extension() {
		assert!(!check_extension(Path::new("a.geojson")).unwrap());
		assert!(!check_extension(Path::new("a.JSON")).unwrap());
		assert!(check_extension(Path::new("a.geojson.gz")).unwrap());
		assert!(check_extension(Path::new("dir/b.json.GZ")).unwrap());
		assert!(check_extension(Path::new("a.gz")).is_err());
		assert!(check_extension(Path::new("a.shp")).is_err());
	}
}
