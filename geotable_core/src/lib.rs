//! Low-level building blocks shared across the geotable workspace: a
//! byte-level pull-parser cursor with JSON token primitives, and progress
//! reporting with cooperative cancellation.

pub mod byte_iterator;
pub mod progress;
