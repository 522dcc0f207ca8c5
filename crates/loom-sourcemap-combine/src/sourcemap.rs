// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map v3 documents and their textual projections.
//!
//! A [`SourceMapDoc`] can be exchanged as plain JSON, as a standalone base64
//! string, or as a `sourceMappingURL` comment embedding that base64 string.
//! All three carry the same document and convert losslessly into each other.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::comment::find_inline_payload;
use crate::error::{CombineError, Result};
use crate::vlq::{decode_mappings, Mapping};

/// Source map format version produced and accepted by this crate.
pub const SOURCE_MAP_VERSION: u32 = 3;

/// Prefix of the data URL used for inline source maps.
pub const DATA_URL_PREFIX: &str = "data:application/json;charset=utf-8;base64,";

/// Comment syntax used when embedding a source map in generated text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentStyle {
	/// `//# sourceMappingURL=...`
	#[default]
	Line,
	/// `/*# sourceMappingURL=... */`, for CSS and other block-comment languages.
	Block,
}

/// Source map v3 document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapDoc {
	pub version: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub file: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_root: Option<String>,
	/// Source paths; `None` entries stand for sources without identity.
	#[serde(default, deserialize_with = "nullable_vec")]
	pub sources: Vec<Option<String>>,
	#[serde(default, deserialize_with = "nullable_vec")]
	pub names: Vec<String>,
	#[serde(default)]
	pub mappings: String,
	/// Embedded source content, parallel to `sources`.
	#[serde(default, deserialize_with = "nullable_vec")]
	pub sources_content: Vec<Option<String>>,
}

/// Accept a `null` array as an empty list.
fn nullable_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
	D: serde::Deserializer<'de>,
	T: Deserialize<'de>,
{
	Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for SourceMapDoc {
	fn default() -> Self {
		Self {
			version: SOURCE_MAP_VERSION,
			file: None,
			source_root: None,
			sources: Vec::new(),
			names: Vec::new(),
			mappings: String::new(),
			sources_content: Vec::new(),
		}
	}
}

impl SourceMapDoc {
	/// Parse a source map from JSON bytes.
	pub fn from_bytes(data: &[u8]) -> Result<Self> {
		let doc: SourceMapDoc = serde_json::from_slice(data)?;

		if doc.version != SOURCE_MAP_VERSION {
			return Err(CombineError::InvalidSourceMapVersion(doc.version));
		}

		Ok(doc)
	}

	/// Parse a source map from a JSON string.
	pub fn from_json(data: &str) -> Result<Self> {
		Self::from_bytes(data.as_bytes())
	}

	/// Parse a source map from the base64 encoding of its JSON text.
	pub fn from_base64(payload: &str) -> Result<Self> {
		let bytes = STANDARD.decode(payload.trim())?;
		let json = String::from_utf8(bytes).map_err(|_| CombineError::InvalidUtf8)?;
		Self::from_json(&json)
	}

	/// Parse the last inline source map comment found in `text`.
	pub fn from_comment(text: &str) -> Result<Self> {
		let payload = find_inline_payload(text).ok_or(CombineError::MissingSourceMapComment)?;
		Self::from_base64(payload)
	}

	/// Serialize to compact JSON.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string(self)?)
	}

	/// Base64 encoding of the JSON text.
	pub fn to_base64(&self) -> Result<String> {
		Ok(STANDARD.encode(self.to_json()?))
	}

	/// `sourceMappingURL` comment embedding the document as a data URL.
	pub fn to_comment(&self, style: CommentStyle) -> Result<String> {
		let url = format!("{DATA_URL_PREFIX}{}", self.to_base64()?);
		Ok(match style {
			CommentStyle::Line => format!("//# sourceMappingURL={url}"),
			CommentStyle::Block => format!("/*# sourceMappingURL={url} */"),
		})
	}

	/// Decode the `mappings` string into records.
	pub fn decode(&self) -> Result<Vec<Mapping>> {
		decode_mappings(&self.mappings)
	}

	/// Content for the source at `index`, treating empty text as missing.
	pub fn source_content(&self, index: usize) -> Option<&str> {
		self.sources_content
			.get(index)
			.and_then(|c| c.as_deref())
			.filter(|c| !c.is_empty())
	}

	/// The `sourceRoot`, with an empty root treated as absent.
	pub fn effective_source_root(&self) -> Option<&str> {
		self.source_root.as_deref().filter(|root| !root.is_empty())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample_source_map() -> &'static str {
		r#"{
			"version": 3,
			"file": "foo.js",
			"sourceRoot": "",
			"sources": ["foo.coffee"],
			"names": [],
			"mappings": ";AAAA;CAAA;CAAA,CAAA,CAAA,IAAO,GAAK;CAAZ",
			"sourcesContent": ["console.log(require './bar.js')\n"]
		}"#
	}

	#[test]
	fn test_parse_source_map() {
		let sm = SourceMapDoc::from_json(sample_source_map()).unwrap();

		assert_eq!(sm.version, 3);
		assert_eq!(sm.file.as_deref(), Some("foo.js"));
		assert_eq!(sm.sources, vec![Some("foo.coffee".to_string())]);
		assert_eq!(sm.source_content(0), Some("console.log(require './bar.js')\n"));
		assert_eq!(sm.effective_source_root(), None);
		assert_eq!(sm.decode().unwrap().len(), 8);
	}

	#[test]
	fn test_invalid_version() {
		let json = r#"{"version": 2, "sources": [], "names": [], "mappings": ""}"#;
		let result = SourceMapDoc::from_json(json);
		assert!(matches!(
			result,
			Err(CombineError::InvalidSourceMapVersion(2))
		));
	}

	#[test]
	fn test_null_entries() {
		let json = r#"{
			"version": 3,
			"sources": [null, "a.js"],
			"names": [],
			"mappings": "",
			"sourcesContent": null
		}"#;
		let sm = SourceMapDoc::from_json(json).unwrap();
		assert_eq!(sm.sources, vec![None, Some("a.js".to_string())]);
		assert!(sm.sources_content.is_empty());
		assert_eq!(sm.source_content(1), None);
	}

	#[test]
	fn test_null_arrays_are_empty() {
		let json = r#"{
			"version": 3,
			"sources": null,
			"names": null,
			"mappings": "",
			"sourcesContent": null
		}"#;
		let sm = SourceMapDoc::from_json(json).unwrap();
		assert!(sm.sources.is_empty());
		assert!(sm.names.is_empty());
		assert!(sm.sources_content.is_empty());
	}

	#[test]
	fn test_empty_content_counts_as_missing() {
		let sm = SourceMapDoc {
			sources: vec![Some("a.js".to_string()), Some("b.js".to_string())],
			sources_content: vec![Some(String::new()), Some("b".to_string())],
			..SourceMapDoc::default()
		};
		assert_eq!(sm.source_content(0), None);
		assert_eq!(sm.source_content(1), Some("b"));
		assert_eq!(sm.source_content(2), None);
	}

	#[test]
	fn test_projections_round_trip() {
		let sm = SourceMapDoc::from_json(sample_source_map()).unwrap();

		let json = sm.to_json().unwrap();
		assert_eq!(SourceMapDoc::from_json(&json).unwrap(), sm);

		let base64 = sm.to_base64().unwrap();
		assert_eq!(SourceMapDoc::from_base64(&base64).unwrap(), sm);

		for style in [CommentStyle::Line, CommentStyle::Block] {
			let comment = sm.to_comment(style).unwrap();
			assert_eq!(SourceMapDoc::from_comment(&comment).unwrap(), sm);
		}
	}

	#[test]
	fn test_comment_shapes() {
		let sm = SourceMapDoc::default();
		let line = sm.to_comment(CommentStyle::Line).unwrap();
		assert!(line.starts_with(
			"//# sourceMappingURL=data:application/json;charset=utf-8;base64,"
		));

		let block = sm.to_comment(CommentStyle::Block).unwrap();
		assert!(block.starts_with("/*# sourceMappingURL="));
		assert!(block.ends_with(" */"));
	}

	#[test]
	fn test_from_comment_without_comment() {
		assert!(matches!(
			SourceMapDoc::from_comment("var a = 1;"),
			Err(CombineError::MissingSourceMapComment)
		));
	}

	#[test]
	fn test_invalid_base64() {
		assert!(matches!(
			SourceMapDoc::from_base64("!!!"),
			Err(CombineError::InvalidBase64(_))
		));
	}
}
