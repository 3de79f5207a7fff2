//! Streaming GeoJSON import/export engine.
//!
//! The import side infers a relational schema from the first Feature of a
//! FeatureCollection, then streams every feature as one row into a
//! [`RowSink`]. The export side walks a [`RowSource`] and emits one GeoJSON
//! Feature per row. Both sides share the byte-level cursor and grammar
//! primitives from `geotable_core`.

mod error;
mod geo;
pub mod geojson;
mod schema;
mod table;

pub use error::GeoJsonError;
pub use geo::*;
pub use geojson::{ImportReport, read_geojson_file, write_geojson, write_geojson_file};
pub use schema::*;
pub use table::*;
