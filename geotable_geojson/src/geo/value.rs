use std::fmt::Debug;

/// A scalar property value, covering exactly the JSON value kinds that
/// schema inference maps to columns.
#[derive(Clone, PartialEq)]
pub enum GeoValue {
	Bool(bool),
	Double(f64),
	Int(i64),
	Null,
	String(String),
}

impl Debug for GeoValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
			Self::Double(v) => f.debug_tuple("Double").field(v).finish(),
			Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
			Self::Null => f.debug_tuple("Null").finish(),
			Self::String(v) => f.debug_tuple("String").field(v).finish(),
		}
	}
}

impl From<&str> for GeoValue {
	fn from(value: &str) -> Self {
		GeoValue::String(value.to_string())
	}
}

impl From<String> for GeoValue {
	fn from(value: String) -> Self {
		GeoValue::String(value)
	}
}

impl From<bool> for GeoValue {
	fn from(value: bool) -> Self {
		GeoValue::Bool(value)
	}
}

impl From<i64> for GeoValue {
	fn from(value: i64) -> Self {
		GeoValue::Int(value)
	}
}

impl From<f64> for GeoValue {
	fn from(value: f64) -> Self {
		GeoValue::Double(value)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_from_impls() {
		assert_eq!(GeoValue::from("value0"), GeoValue::String("value0".to_string()));
		assert_eq!(GeoValue::from(true), GeoValue::Bool(true));
		assert_eq!(GeoValue::from(42i64), GeoValue::Int(42));
		assert_eq!(GeoValue::from(0.5), GeoValue::Double(0.5));
	}
}
