use thiserror::Error;

/// Error taxonomy of the GeoJSON engine.
///
/// All variants are fatal for the current import or export; they exist as a
/// typed enum (wrapped in `anyhow::Error`) so callers can downcast and
/// distinguish a user-initiated cancellation from a malformed file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeoJsonError {
	/// A required token or member was missing or out of place.
	#[error("malformed GeoJSON file, expected '{expected}', found '{found}'")]
	Malformed { expected: String, found: String },

	/// The first feature of the collection carries no geometry, so no
	/// schema can be inferred.
	#[error("the first feature must contain a geometry field")]
	NoGeometry,

	/// Export found a column whose SQL type cannot be represented in
	/// GeoJSON properties.
	#[error("field type {sql_type} of column '{column}' is not supported in GeoJSON")]
	UnsupportedType { column: String, sql_type: String },

	/// The operation was canceled through the progress handle.
	#[error("canceled by user")]
	Canceled,
}

impl GeoJsonError {
	pub fn malformed(expected: impl Into<String>, found: impl Into<String>) -> Self {
		GeoJsonError::Malformed {
			expected: expected.into(),
			found: found.into(),
		}
	}
}
