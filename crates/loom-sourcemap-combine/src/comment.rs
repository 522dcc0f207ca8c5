// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Detection and removal of `sourceMappingURL` comments in generated text.

use regex::Regex;
use std::sync::LazyLock;

/// Inline data-URL comment; capture 1 is the base64 payload.
static INLINE_COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(concat!(
		r"(?m)^[ \t]*/[/*][@#][ \t]+sourceMappingURL=data:(?:application|text)/json",
		r"(?:;charset[:=][^;,\s]+)?;base64,([A-Za-z0-9+/=]*)[ \t]*(?:\*/)?[ \t\r]*$",
	))
	.unwrap()
});

/// URL-style comment in line or block form; capture 1 or 2 is the URL.
static MAP_FILE_COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(concat!(
		r#"(?m)(?://[@#][ \t]+sourceMappingURL=([^\s'"`]+?)[ \t\r]*$)"#,
		r"|(?:/\*[@#][ \t]+sourceMappingURL=([^*\s]+?)[ \t]*\*/[ \t\r]*$)",
	))
	.unwrap()
});

/// A source map reference found in generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddedMap<'a> {
	/// Base64 payload of an inline data URL.
	Inline(&'a str),
	/// URL of a map stored elsewhere.
	External(&'a str),
}

/// Base64 payload of the last inline source map comment in `text`.
pub fn find_inline_payload(text: &str) -> Option<&str> {
	INLINE_COMMENT_REGEX
		.captures_iter(text)
		.last()
		.and_then(|caps| caps.get(1))
		.map(|m| m.as_str())
}

/// Locate the source map referenced by `text`.
///
/// Inline maps take precedence over URL references. When several comments of
/// the same kind are present, the last one wins.
pub fn find_embedded_map(text: &str) -> Option<EmbeddedMap<'_>> {
	if let Some(payload) = find_inline_payload(text) {
		return Some(EmbeddedMap::Inline(payload));
	}

	let url = MAP_FILE_COMMENT_REGEX
		.captures_iter(text)
		.last()
		.and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
		.map(|m| m.as_str())?;

	// Data URLs that are not base64 JSON are not supported.
	if url.starts_with("data:") {
		return None;
	}

	Some(EmbeddedMap::External(url))
}

/// Whether `text` carries any source map comment.
pub fn has_comment(text: &str) -> bool {
	INLINE_COMMENT_REGEX.is_match(text) || MAP_FILE_COMMENT_REGEX.is_match(text)
}

/// Remove every inline and URL-style source map comment from `text`.
///
/// Removal repeats until no comment remains, so the result is stable under a
/// second call.
pub fn remove_comments(text: &str) -> String {
	let mut current = text.to_string();
	loop {
		let stripped = INLINE_COMMENT_REGEX.replace_all(&current, "");
		let stripped = MAP_FILE_COMMENT_REGEX.replace_all(&stripped, "").into_owned();
		if stripped == current {
			return current;
		}
		current = stripped;
	}
}
