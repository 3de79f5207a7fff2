//! A forward-only byte cursor over any `Read` source plus the JSON token
//! primitives built on top of it.
//!
//! The cursor ([`ByteIterator`]) owns the parse position exclusively; every
//! grammar production in the workspace is written as a function taking
//! `&mut ByteIterator`, so parser state stays explicit and testable.

mod basics;
mod iterator;

pub use basics::*;
pub use iterator::*;
