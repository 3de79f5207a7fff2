use super::Coordinate;
use std::fmt::Debug;

/// A closed sequence of positions bounding a polygon's exterior or a hole.
pub type Ring = Vec<Coordinate>;

/// The seven GeoJSON geometry kinds.
///
/// A `Polygon` holds its rings in order: the first is the exterior, the
/// rest are holes. Ring vectors are never empty once parsed.
#[derive(Clone, PartialEq)]
pub enum Geometry {
	Point(Coordinate),
	MultiPoint(Vec<Coordinate>),
	LineString(Vec<Coordinate>),
	MultiLineString(Vec<Vec<Coordinate>>),
	Polygon(Vec<Ring>),
	MultiPolygon(Vec<Vec<Ring>>),
	GeometryCollection(Vec<Geometry>),
}

impl Geometry {
	/// The GeoJSON `type` member for this variant.
	#[must_use]
	pub fn type_name(&self) -> &'static str {
		match self {
			Geometry::Point(_) => "Point",
			Geometry::MultiPoint(_) => "MultiPoint",
			Geometry::LineString(_) => "LineString",
			Geometry::MultiLineString(_) => "MultiLineString",
			Geometry::Polygon(_) => "Polygon",
			Geometry::MultiPolygon(_) => "MultiPolygon",
			Geometry::GeometryCollection(_) => "GeometryCollection",
		}
	}

	/// The SQL geometry type token used for column constraints.
	///
	/// A collection reports the generic `GEOMETRY` token because it may mix
	/// types and dimensionality internally; downstream constraint logic
	/// relies on this.
	#[must_use]
	pub fn sql_token(&self) -> &'static str {
		match self {
			Geometry::Point(_) => "POINT",
			Geometry::MultiPoint(_) => "MULTIPOINT",
			Geometry::LineString(_) => "LINESTRING",
			Geometry::MultiLineString(_) => "MULTILINESTRING",
			Geometry::Polygon(_) => "POLYGON",
			Geometry::MultiPolygon(_) => "MULTIPOLYGON",
			Geometry::GeometryCollection(_) => "GEOMETRY",
		}
	}
}

impl Debug for Geometry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner: &dyn Debug = match self {
			Geometry::Point(g) => g,
			Geometry::MultiPoint(g) => g,
			Geometry::LineString(g) => g,
			Geometry::MultiLineString(g) => g,
			Geometry::Polygon(g) => g,
			Geometry::MultiPolygon(g) => g,
			Geometry::GeometryCollection(g) => g,
		};
		f.debug_tuple(self.type_name()).field(inner).finish()
	}
}
