use std::fmt::Debug;

/// A single position with 2 or 3 dimensions.
///
/// A missing z is stored as `f64::NAN`; the encoder emits a third
/// coordinate only when z is not NaN, so 2D positions survive a round trip
/// without inventing an elevation.
#[derive(Clone, Copy)]
pub struct Coordinate {
	pub x: f64,
	pub y: f64,
	pub z: f64,
}

impl Coordinate {
	#[must_use]
	pub fn new(x: f64, y: f64) -> Self {
		Coordinate { x, y, z: f64::NAN }
	}

	#[must_use]
	pub fn new_3d(x: f64, y: f64, z: f64) -> Self {
		Coordinate { x, y, z }
	}

	/// True if this position carries an elevation.
	#[must_use]
	pub fn has_z(&self) -> bool {
		!self.z.is_nan()
	}
}

impl PartialEq for Coordinate {
	fn eq(&self, other: &Self) -> bool {
		// NaN z values compare equal so 2D positions are comparable.
		self.x == other.x && self.y == other.y && (self.z == other.z || (self.z.is_nan() && other.z.is_nan()))
	}
}

impl Debug for Coordinate {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.has_z() {
			write!(f, "[{:?}, {:?}, {:?}]", self.x, self.y, self.z)
		} else {
			write!(f, "[{:?}, {:?}]", self.x, self.y)
		}
	}
}
