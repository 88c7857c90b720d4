// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Base64 VLQ decoding of source map `mappings`.
//!
//! Lines are separated by `;`, segments by `,`. A segment holds 1, 4 or 5
//! values, each delta-encoded against the previous segment:
//! generated column (reset every line), source index, original line,
//! original column, name index. A 1-value segment marks generated code
//! that has no original position.

use crate::error::{Result, SymbolicateError};

const BASE64_CHARS: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const CONTINUATION_BIT: u8 = 0b10_0000;
const VALUE_MASK: u8 = 0b01_1111;

fn decode_char(ch: u8) -> Result<u8> {
	BASE64_CHARS
		.iter()
		.position(|&c| c == ch)
		.map(|pos| pos as u8)
		.ok_or(SymbolicateError::InvalidVlqChar(ch as char))
}

/// Decode one segment into its signed values.
pub fn decode_segment(segment: &str) -> Result<Vec<i64>> {
	let mut values = Vec::with_capacity(5);
	let mut accumulated = 0i64;
	let mut shift = 0u32;

	for ch in segment.bytes() {
		let digit = decode_char(ch)?;

		if shift > 31 {
			return Err(SymbolicateError::VlqOverflow(segment.to_string()));
		}
		accumulated |= i64::from(digit & VALUE_MASK) << shift;

		if digit & CONTINUATION_BIT != 0 {
			shift += 5;
			continue;
		}

		// Lowest bit carries the sign.
		let magnitude = accumulated >> 1;
		values.push(if accumulated & 1 == 1 {
			-magnitude
		} else {
			magnitude
		});
		accumulated = 0;
		shift = 0;
	}

	if shift != 0 {
		return Err(SymbolicateError::InvalidSegment {
			segment: segment.to_string(),
			reason: "unterminated value",
		});
	}

	Ok(values)
}

/// Where a generated position came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalRef {
	pub source_index: u32,
	/// 0-indexed.
	pub line: u32,
	/// 0-indexed.
	pub column: u32,
	pub name_index: Option<u32>,
}

/// One decoded segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
	/// 0-indexed.
	pub generated_line: u32,
	/// 0-indexed.
	pub generated_column: u32,
	/// `None` for generated code with no original position.
	pub original: Option<OriginalRef>,
}

/// Decoded mappings sorted by generated position.
#[derive(Debug, Clone, Default)]
pub struct DecodedMappings {
	mappings: Vec<Mapping>,
}

impl DecodedMappings {
	/// Closest mapping at or before `column` on `line` (both 0-indexed).
	///
	/// Mappings never carry over from a previous line.
	pub fn find(&self, line: u32, column: u32) -> Option<&Mapping> {
		let start = self.mappings.partition_point(|m| m.generated_line < line);
		let end = self.mappings.partition_point(|m| m.generated_line <= line);
		let on_line = &self.mappings[start..end];

		match on_line.partition_point(|m| m.generated_column <= column) {
			0 => None,
			idx => Some(&on_line[idx - 1]),
		}
	}

	pub fn len(&self) -> usize {
		self.mappings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.mappings.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Mapping> {
		self.mappings.iter()
	}
}

/// Running delta state across segments.
#[derive(Default)]
struct DeltaState {
	source: i64,
	line: i64,
	column: i64,
	name: i64,
}

fn to_index(value: i64, segment: &str, reason: &'static str) -> Result<u32> {
	u32::try_from(value).map_err(|_| SymbolicateError::InvalidSegment {
		segment: segment.to_string(),
		reason,
	})
}

/// Decode a full `mappings` string.
pub fn decode_mappings(mappings: &str) -> Result<DecodedMappings> {
	let mut decoded = Vec::new();
	let mut state = DeltaState::default();

	for (generated_line, line) in mappings.split(';').enumerate() {
		let generated_line = to_index(generated_line as i64, line, "too many lines")?;
		let mut generated_column = 0i64;

		for segment in line.split(',').filter(|s| !s.is_empty()) {
			let values = decode_segment(segment)?;

			let original = match values.as_slice() {
				[column] => {
					generated_column += column;
					None
				}
				[column, source, original_line, original_column, rest @ ..] if rest.len() <= 1 => {
					generated_column += column;
					state.source += source;
					state.line += original_line;
					state.column += original_column;

					let name_index = match rest.first() {
						Some(name) => {
							state.name += name;
							Some(to_index(state.name, segment, "negative name index")?)
						}
						None => None,
					};

					Some(OriginalRef {
						source_index: to_index(state.source, segment, "negative source index")?,
						line: to_index(state.line, segment, "negative original line")?,
						column: to_index(state.column, segment, "negative original column")?,
						name_index,
					})
				}
				_ => {
					return Err(SymbolicateError::InvalidSegment {
						segment: segment.to_string(),
						reason: "expected 1, 4 or 5 values",
					})
				}
			};

			decoded.push(Mapping {
				generated_line,
				generated_column: to_index(generated_column, segment, "negative generated column")?,
				original,
			});
		}
	}

	// Producers normally emit ascending columns; sort so lookups stay correct
	// when they do not.
	decoded.sort_by_key(|m| (m.generated_line, m.generated_column));

	Ok(DecodedMappings { mappings: decoded })
}
