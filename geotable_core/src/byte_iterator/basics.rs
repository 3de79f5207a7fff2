//! JSON token primitives built on [`ByteIterator`](super::iterator::ByteIterator).
//!
//! Two groups of helpers live here:
//! - free-form primitives (`parse_tag`, `parse_quoted_json_string`,
//!   `parse_number_as_string`, `parse_object_entries`, `parse_array_entries`,
//!   `skip_json_value`) that parse whatever value comes next, and
//! - positional primitives (`expect_char`, `parse_object_key`,
//!   `expect_object_key`, `parse_next_entry`) for grammars that require
//!   specific members at specific positions and must report expected vs.
//!   found on deviation.
//!
//! All helpers leave the iterator positioned at the next token and use
//! [`#[context]`](geotable_derive::context) to annotate their errors.

use super::iterator::ByteIterator;
use anyhow::{Error, Result, bail};
use geotable_derive::context;
use std::str::FromStr;

/// Match a fixed ASCII tag (`true`, `false`, `null`) at the current position.
#[context("while parsing tag '{}'", tag)]
pub fn parse_tag(iter: &mut ByteIterator, tag: &str) -> Result<()> {
	for c in tag.bytes() {
		match iter.expect_next_byte()? {
			b if b == c => {}
			_ => return Err(iter.format_error(&format!("unexpected character while parsing tag '{tag}'"))),
		}
	}
	Ok(())
}

/// Parse a JSON string literal, including `\uXXXX` and the standard escapes.
///
/// Leaves the iterator after the closing quote.
#[context("while parsing a quoted JSON string")]
pub fn parse_quoted_json_string(iter: &mut ByteIterator) -> Result<String> {
	iter.skip_whitespace();
	if iter.expect_next_byte()? != b'"' {
		bail!(iter.format_error("expected '\"' while parsing a string"));
	}

	let mut bytes = Vec::with_capacity(32);

	loop {
		match iter.expect_next_byte()? {
			b'"' => break,
			b'\\' => match iter.expect_next_byte()? {
				b'"' => bytes.push(b'"'),
				b'\\' => bytes.push(b'\\'),
				b'/' => bytes.push(b'/'),
				b'b' => bytes.push(b'\x08'),
				b'f' => bytes.push(b'\x0C'),
				b'n' => bytes.push(b'\n'),
				b'r' => bytes.push(b'\r'),
				b't' => bytes.push(b'\t'),
				b'u' => {
					let code_point = parse_hex_code_point(iter)?;
					// A high surrogate must be paired with a following
					// low surrogate escape to form one code point.
					let units = if (0xD800..=0xDBFF).contains(&code_point) {
						if iter.expect_next_byte()? != b'\\' || iter.expect_next_byte()? != b'u' {
							return Err(iter.format_error("expected a low surrogate escape after a high surrogate"));
						}
						vec![code_point, parse_hex_code_point(iter)?]
					} else {
						vec![code_point]
					};
					bytes.extend_from_slice(
						&String::from_utf16(&units)
							.map_err(|_| iter.format_error("invalid unicode code point"))?
							.into_bytes(),
					);
				}
				c => bytes.push(c),
			},
			c => bytes.push(c),
		}
	}
	String::from_utf8(bytes).map_err(Error::from)
}

/// Read the four hex digits of a `\uXXXX` escape as one UTF-16 unit.
fn parse_hex_code_point(iter: &mut ByteIterator) -> Result<u16> {
	let mut hex = [0u8; 4];
	for i in &mut hex {
		*i = iter.expect_next_byte()?;
	}
	u16::from_str_radix(
		std::str::from_utf8(&hex).map_err(|_| iter.format_error("invalid unicode code point"))?,
		16,
	)
	.map_err(|_| iter.format_error("invalid unicode code point"))
}

/// Parse a JSON number and return its textual form.
///
/// Accepts the JSON number grammar (optional sign, integer, fraction,
/// exponent) and leaves the iterator at the first non-number byte.
#[context("while parsing a number")]
pub fn parse_number_as_string(iter: &mut ByteIterator) -> Result<String> {
	let mut number = Vec::with_capacity(16);

	if let Some(b'+' | b'-') = iter.peek() {
		number.push(iter.expect_next_byte()?);
	}

	let mut has_digits = false;
	while let Some(b'0'..=b'9') = iter.peek() {
		has_digits = true;
		number.push(iter.expect_next_byte()?);
	}
	if !has_digits {
		return Err(iter.format_error("expected digits in number"));
	}

	if let Some(b'.') = iter.peek() {
		number.push(iter.expect_next_byte()?);
		let mut fractional_digits = false;
		while let Some(b'0'..=b'9') = iter.peek() {
			fractional_digits = true;
			number.push(iter.expect_next_byte()?);
		}
		if !fractional_digits {
			return Err(iter.format_error("expected digits after decimal point"));
		}
		if let Some(b'.') = iter.peek() {
			return Err(iter.format_error("unexpected '.' in number"));
		}
	}

	if let Some(b'e' | b'E') = iter.peek() {
		number.push(iter.expect_next_byte()?);
		if let Some(b'+' | b'-') = iter.peek() {
			number.push(iter.expect_next_byte()?);
		}
		let mut exponent_digits = false;
		while let Some(b'0'..=b'9') = iter.peek() {
			exponent_digits = true;
			number.push(iter.expect_next_byte()?);
		}
		if !exponent_digits {
			return Err(iter.format_error("expected digits after exponent"));
		}
	}

	String::from_utf8(number).map_err(Error::from)
}

/// Parse a JSON number directly into `R`.
pub fn parse_number_as<R: FromStr>(iter: &mut ByteIterator) -> Result<R> {
	parse_number_as_string(iter)?
		.parse::<R>()
		.map_err(|_| iter.format_error("invalid number"))
}

/// Consume a single expected byte, skipping leading whitespace.
///
/// The error names both the expected and the found character.
pub fn expect_char(iter: &mut ByteIterator, expected: u8) -> Result<()> {
	iter.skip_whitespace();
	let found = iter.expect_next_byte()?;
	if found != expected {
		return Err(iter.format_error(&format!(
			"expected '{}', found '{}'",
			expected as char, found as char
		)));
	}
	Ok(())
}

/// Parse an object member key (quoted string followed by `:`) and return it.
#[context("while parsing an object key")]
pub fn parse_object_key(iter: &mut ByteIterator) -> Result<String> {
	let key = parse_quoted_json_string(iter)?;
	expect_char(iter, b':')?;
	iter.skip_whitespace();
	Ok(key)
}

/// Parse an object member key and require it to match `expected`
/// (ASCII case-insensitive).
///
/// Positional grammars use this to fail loudly when a required member is
/// out of place; the error names expected vs. found.
pub fn expect_object_key(iter: &mut ByteIterator, expected: &str) -> Result<()> {
	let key = parse_object_key(iter)?;
	if !key.eq_ignore_ascii_case(expected) {
		return Err(iter.format_error(&format!("expected '{expected}', found '{key}'")));
	}
	Ok(())
}

/// After a member value, consume either `,` (more entries follow, returns
/// `true`) or the closing `end` byte (returns `false`).
pub fn parse_next_entry(iter: &mut ByteIterator, end: u8) -> Result<bool> {
	iter.skip_whitespace();
	let found = iter.expect_next_byte()?;
	if found == b',' {
		iter.skip_whitespace();
		Ok(true)
	} else if found == end {
		Ok(false)
	} else {
		Err(iter.format_error(&format!(
			"expected ',' or '{}', found '{}'",
			end as char, found as char
		)))
	}
}

/// Consume one well-formed JSON value of any kind, discarding it.
///
/// Used to skip members the grammar does not care about (feature `id`,
/// `bbox`, nested property values).
#[context("while skipping a JSON value")]
pub fn skip_json_value(iter: &mut ByteIterator) -> Result<()> {
	iter.skip_whitespace();
	match iter.expect_peeked_byte()? {
		b'[' => parse_array_entries(iter, skip_json_value).map(|_| ()),
		b'{' => parse_object_entries(iter, |_, iter2| skip_json_value(iter2)),
		b'"' => parse_quoted_json_string(iter).map(|_| ()),
		d if d.is_ascii_digit() || d == b'.' || d == b'-' || d == b'+' => {
			parse_number_as_string(iter).map(|_| ())
		}
		b't' => parse_tag(iter, "true"),
		b'f' => parse_tag(iter, "false"),
		b'n' => parse_tag(iter, "null"),
		c => Err(iter.format_error(&format!("unexpected character '{}'", c as char))),
	}
}

/// Iterate over JSON object entries, invoking `parse_value` for each key.
///
/// The closure receives the key and the iterator positioned at the start of
/// the value and must consume exactly that value.
#[context("while parsing object entries")]
pub fn parse_object_entries<R>(
	iter: &mut ByteIterator,
	mut parse_value: impl FnMut(String, &mut ByteIterator) -> Result<R>,
) -> Result<()> {
	iter.skip_whitespace();
	if iter.expect_next_byte()? != b'{' {
		bail!(iter.format_error("expected '{' while parsing an object"));
	}

	loop {
		iter.skip_whitespace();
		match iter.expect_peeked_byte()? {
			b'}' => {
				iter.advance();
				break;
			}
			b'"' => {
				let key = parse_quoted_json_string(iter)?;

				iter.skip_whitespace();
				if iter.expect_next_byte()? != b':' {
					return Err(iter.format_error("expected ':'"));
				}

				iter.skip_whitespace();
				parse_value(key, iter)?;

				iter.skip_whitespace();
				match iter.expect_next_byte()? {
					b',' => continue,
					b'}' => break,
					_ => return Err(iter.format_error("expected ',' or '}'")),
				}
			}
			_ => return Err(iter.format_error("parsing object, expected '\"' or '}'")),
		}
	}
	Ok(())
}

/// Iterate over JSON array entries, collecting the results of `parse_value`.
#[context("while parsing array entries")]
pub fn parse_array_entries<R>(
	iter: &mut ByteIterator,
	mut parse_value: impl FnMut(&mut ByteIterator) -> Result<R>,
) -> Result<Vec<R>> {
	iter.skip_whitespace();
	if iter.expect_next_byte()? != b'[' {
		bail!(iter.format_error("expected '[' while parsing an array"));
	}

	let mut result = Vec::new();

	iter.skip_whitespace();
	if let Some(b']') = iter.peek() {
		iter.advance();
		return Ok(result);
	}

	result.push(parse_value(iter)?);

	loop {
		iter.skip_whitespace();
		match iter.expect_next_byte()? {
			b']' => break,
			b',' => {
				iter.skip_whitespace();
				result.push(parse_value(iter)?);
			}
			_ => return Err(iter.format_error("parsing array, expected ',' or ']'")),
		}
	}

	Ok(result)
}
