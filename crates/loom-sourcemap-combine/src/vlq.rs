// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! VLQ (Variable-Length Quantity) codec for source map mappings.
//!
//! Source maps use Base64 VLQ encoding for compact storage of line/column mappings.
//! This module decodes a `mappings` string into [`Mapping`] records and encodes
//! records back, following the source map v3 accumulation rules:
//!
//! - the generated column resets at the start of every generated line;
//! - source index, original line, original column and name index are
//!   cumulative across the whole string.

use crate::error::{CombineError, Result};

/// Base64 character set used in VLQ encoding.
const BASE64_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_CONTINUATION_BIT: i64 = 0b100000;
const VLQ_VALUE_MASK: i64 = 0b011111;

/// Largest shift before a decoded value would no longer fit a `u32` position.
const VLQ_MAX_SHIFT: u32 = 32;

/// Decode a Base64 character to its 6-bit value.
fn decode_char(ch: u8) -> Option<i64> {
	BASE64_CHARS
		.iter()
		.position(|&c| c == ch)
		.map(|pos| pos as i64)
}

/// Decode a VLQ-encoded segment into a vector of signed integers.
///
/// Each segment represents one or more values:
/// - Minimum 1 value: generated column offset
/// - Optional 4 more values: source index, original line, original column, name index
pub fn decode_vlq_segment(segment: &str) -> Result<Vec<i64>> {
	decode_segment_at(segment, 0)
}

fn decode_segment_at(segment: &str, offset: usize) -> Result<Vec<i64>> {
	let mut values = Vec::new();
	let mut value = 0i64;
	let mut shift = 0u32;
	let mut pending = false;

	for ch in segment.bytes() {
		let digit = decode_char(ch)
			.ok_or_else(|| CombineError::malformed(offset, segment, "invalid base64 digit"))?;

		if shift > VLQ_MAX_SHIFT {
			return Err(CombineError::malformed(offset, segment, "value overflows"));
		}

		// Continuation bit is the 6th bit (0b100000 = 32)
		let continuation = digit & VLQ_CONTINUATION_BIT != 0;
		value += (digit & VLQ_VALUE_MASK) << shift;
		shift += 5;
		pending = continuation;

		if !continuation {
			// The lowest bit carries the sign: 1 = negative, 0 = positive
			let negated = value & 1 != 0;
			value >>= 1;
			if negated {
				value = -value;
			}
			values.push(value);
			value = 0;
			shift = 0;
		}
	}

	if pending {
		return Err(CombineError::malformed(
			offset,
			segment,
			"continuation bit set on last digit",
		));
	}

	Ok(values)
}

/// Position in an original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OriginalLocation {
	/// Index into the `sources` array of the owning map.
	pub source_index: u32,
	/// Line in the original source (1-indexed).
	pub line: u32,
	/// Column in the original source (0-indexed).
	pub column: u32,
}

/// A single decoded mapping record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mapping {
	/// Line in the generated file (1-indexed).
	pub generated_line: u32,
	/// Column in the generated file (0-indexed).
	pub generated_column: u32,
	/// Original position, absent for generated-only mappings.
	pub original: Option<OriginalLocation>,
	/// Optional index into the names array.
	pub name_index: Option<u32>,
}

impl Mapping {
	/// Index of the source this record points at, if any.
	pub fn source_index(&self) -> Option<u32> {
		self.original.map(|o| o.source_index)
	}
}

/// Running values carried across a whole `mappings` string.
///
/// Only `generated_column` is reset per line; every other field accumulates
/// across line boundaries.
#[derive(Debug, Default)]
struct DecodeState {
	generated_column: i64,
	source_index: i64,
	original_line: i64,
	original_column: i64,
	name_index: i64,
}

impl DecodeState {
	fn start_line(&mut self) {
		self.generated_column = 0;
	}

	fn apply(
		&mut self,
		values: &[i64],
		generated_line: u32,
		offset: usize,
		segment: &str,
	) -> Result<Mapping> {
		let malformed = |reason| CombineError::malformed(offset, segment, reason);

		match values.len() {
			1 | 4 | 5 => {}
			0 => return Err(malformed("empty field group")),
			2 | 3 => return Err(malformed("field group must have 1, 4 or 5 values")),
			_ => return Err(malformed("field group has more than 5 values")),
		}

		self.generated_column += values[0];
		let generated_column =
			to_u32(self.generated_column).ok_or_else(|| malformed("negative generated column"))?;

		if values.len() == 1 {
			return Ok(Mapping {
				generated_line,
				generated_column,
				original: None,
				name_index: None,
			});
		}

		self.source_index += values[1];
		self.original_line += values[2];
		self.original_column += values[3];

		let original = OriginalLocation {
			source_index: to_u32(self.source_index)
				.ok_or_else(|| malformed("negative source index"))?,
			line: to_u32(self.original_line)
				.and_then(|line| line.checked_add(1))
				.ok_or_else(|| malformed("negative original line"))?,
			column: to_u32(self.original_column)
				.ok_or_else(|| malformed("negative original column"))?,
		};

		let name_index = if values.len() == 5 {
			self.name_index += values[4];
			Some(to_u32(self.name_index).ok_or_else(|| malformed("negative name index"))?)
		} else {
			None
		};

		Ok(Mapping {
			generated_line,
			generated_column,
			original: Some(original),
			name_index,
		})
	}
}

fn to_u32(value: i64) -> Option<u32> {
	u32::try_from(value).ok()
}

/// Decode VLQ-encoded source map mappings string into structured form.
///
/// The mappings string format:
/// - Lines are separated by semicolons (;)
/// - Segments within a line are separated by commas (,)
/// - Each segment contains 1, 4, or 5 VLQ-encoded values
///
/// Records are returned in the order they appear in the string.
pub fn decode_mappings(mappings: &str) -> Result<Vec<Mapping>> {
	let mut result = Vec::new();
	let mut state = DecodeState::default();
	let mut generated_line = 1u32;
	let mut offset = 0usize;

	for line in mappings.split(';') {
		state.start_line();

		for segment in line.split(',') {
			if !segment.is_empty() {
				let values = decode_segment_at(segment, offset)?;
				result.push(state.apply(&values, generated_line, offset, segment)?);
			}
			offset += segment.len() + 1;
		}

		generated_line = generated_line.saturating_add(1);
	}

	Ok(result)
}

/// Append the VLQ encoding of a single signed value.
fn encode_vlq(value: i64, out: &mut String) {
	let mut vlq = if value < 0 {
		((-value) << 1) | 1
	} else {
		value << 1
	};

	loop {
		let mut digit = vlq & VLQ_VALUE_MASK;
		vlq >>= 5;
		if vlq > 0 {
			digit |= VLQ_CONTINUATION_BIT;
		}
		out.push(BASE64_CHARS[digit as usize] as char);
		if vlq == 0 {
			break;
		}
	}
}

/// Encode a list of signed values as one VLQ segment.
pub fn encode_vlq_segment(values: &[i64]) -> String {
	let mut out = String::new();
	for &value in values {
		encode_vlq(value, &mut out);
	}
	out
}

/// Encode mapping records whose indices already refer to the final arrays.
pub fn encode_mappings(mappings: &[Mapping]) -> String {
	encode_mappings_with(mappings, |idx| idx, |idx| idx)
}

/// Encode mapping records into a compact `mappings` string.
///
/// `source_index_of` and `name_index_of` translate each record's source and
/// name indices into indices of the arrays the string will be emitted with.
///
/// Records are grouped by generated line; lines without records become empty
/// groups. Records sharing a line keep their relative order.
pub fn encode_mappings_with<S, N>(
	mappings: &[Mapping],
	source_index_of: S,
	name_index_of: N,
) -> String
where
	S: Fn(u32) -> u32,
	N: Fn(u32) -> u32,
{
	let mut ordered: Vec<&Mapping> = mappings.iter().collect();
	ordered.sort_by_key(|m| m.generated_line.max(1));

	let mut out = String::new();
	let mut current_line = 1u32;
	let mut first_in_line = true;

	let mut prev_column = 0i64;
	let mut prev_source = 0i64;
	let mut prev_original_line = 0i64;
	let mut prev_original_column = 0i64;
	let mut prev_name = 0i64;

	for mapping in ordered {
		let line = mapping.generated_line.max(1);
		while current_line < line {
			out.push(';');
			current_line += 1;
			first_in_line = true;
			prev_column = 0;
		}

		if !first_in_line {
			out.push(',');
		}
		first_in_line = false;

		let column = i64::from(mapping.generated_column);
		encode_vlq(column - prev_column, &mut out);
		prev_column = column;

		let Some(original) = mapping.original else {
			continue;
		};

		let source = i64::from(source_index_of(original.source_index));
		let original_line = i64::from(original.line.saturating_sub(1));
		let original_column = i64::from(original.column);

		encode_vlq(source - prev_source, &mut out);
		encode_vlq(original_line - prev_original_line, &mut out);
		encode_vlq(original_column - prev_original_column, &mut out);
		prev_source = source;
		prev_original_line = original_line;
		prev_original_column = original_column;

		if let Some(name) = mapping.name_index {
			let name = i64::from(name_index_of(name));
			encode_vlq(name - prev_name, &mut out);
			prev_name = name;
		}
	}

	out
}
