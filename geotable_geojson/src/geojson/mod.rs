//! The GeoJSON 1.0 grammar: geometry/feature decoding, encoding, CRS
//! handling, schema inference and the streaming reader/writer.
//!
//! Every production is a function over the shared byte cursor, so the
//! schema pass and the data pass run the exact same grammar code.

mod context;
mod crs;
mod decode;
mod encode;
mod infer;
mod reader;
mod writer;

pub use context::ParseContext;
pub use decode::{ParsedFeature, parse_feature, parse_geometry};
pub use encode::{escape_json_string, write_geometry, write_value};
pub use infer::infer_schema;
pub use reader::{ImportReport, read_geojson_file};
pub use writer::{write_geojson, write_geojson_file};
