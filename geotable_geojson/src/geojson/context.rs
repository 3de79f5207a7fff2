use crate::Geometry;

/// Mutable state threaded through the grammar productions of one import.
///
/// Both passes share one context: the schema pass fills `srid`, the first
/// geometry baseline and the synthetic-id decision; the data pass updates
/// dimensionality, mixed-geometry detection and the feature counter.
#[derive(Debug, Default)]
pub struct ParseContext {
	/// SRID from the envelope's CRS declaration, 0 if unspecified.
	pub srid: i32,
	/// True once any position with a third coordinate was parsed.
	pub has_z: bool,
	/// Geometry type baseline established by the first feature.
	pub first_geometry_token: Option<&'static str>,
	/// True once a feature's geometry type differs from the baseline.
	pub mixed_geometries: bool,
	/// Rows emitted so far; also drives the synthetic ID.
	pub feature_count: u64,
	/// True if the first feature had no usable properties, so rows carry a
	/// generated sequential ID instead.
	pub synthetic_id: bool,
}

impl ParseContext {
	#[must_use]
	pub fn new() -> Self {
		ParseContext::default()
	}

	/// Compares a feature's geometry against the baseline, establishing it
	/// on first call and flagging mixed content afterwards.
	pub fn record_geometry(&mut self, geometry: &Geometry) {
		let token = geometry.sql_token();
		match self.first_geometry_token {
			None => self.first_geometry_token = Some(token),
			Some(first) => {
				if first != token {
					self.mixed_geometries = true;
				}
			}
		}
	}

	/// The geometry type token for the final column constraint.
	///
	/// Mixed files downgrade to plain `GEOMETRY`; single-typed files keep
	/// the baseline, with a `Z` suffix when 3D positions were seen.
	#[must_use]
	pub fn final_type_token(&self) -> String {
		if self.mixed_geometries {
			return "GEOMETRY".to_string();
		}
		let token = self.first_geometry_token.unwrap_or("GEOMETRY");
		if self.has_z && token != "GEOMETRY" {
			format!("{token}Z")
		} else {
			token.to_string()
		}
	}
}
