mod coordinate;
mod geometry;
mod value;

pub use coordinate::*;
pub use geometry::*;
pub use value::*;
