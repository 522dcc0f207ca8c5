// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for source map combination.

use thiserror::Error;

/// Errors that can occur while decoding or merging source maps.
#[derive(Debug, Error)]
pub enum CombineError {
	/// The compact `mappings` string could not be decoded.
	///
	/// `offset` is the byte offset of the offending field group within the
	/// mappings string and `segment` is its raw text.
	#[error("Malformed mapping at byte {offset} ({segment:?}): {reason}")]
	MalformedMapping {
		offset: usize,
		segment: String,
		reason: &'static str,
	},

	#[error("Unable to resolve source path: {0}")]
	UnresolvableSource(String),

	#[error("Invalid source map JSON: {0}")]
	InvalidSourceMapJson(#[from] serde_json::Error),

	#[error("Invalid source map version: expected 3, got {0}")]
	InvalidSourceMapVersion(u32),

	#[error("Invalid base64 payload: {0}")]
	InvalidBase64(#[from] base64::DecodeError),

	#[error("Inline source map payload is not valid UTF-8")]
	InvalidUtf8,

	#[error("No inline source map comment found")]
	MissingSourceMapComment,
}

impl CombineError {
	pub(crate) fn malformed(offset: usize, segment: &str, reason: &'static str) -> Self {
		Self::MalformedMapping {
			offset,
			segment: segment.to_string(),
			reason,
		}
	}

	/// Whether this is a decoding failure of the mappings string itself.
	pub fn is_malformed_mapping(&self) -> bool {
		matches!(self, Self::MalformedMapping { .. })
	}
}

pub type Result<T> = std::result::Result<T, CombineError>;
