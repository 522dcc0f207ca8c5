// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resolution of source entries to the paths used in the combined map.
//!
//! Paths are treated as `/`-separated URL paths regardless of platform, which
//! is how source maps spell them.

use tracing::warn;

use crate::error::{CombineError, Result};

/// A source of a per-file map, after the missing-content fallback is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEntry {
	/// Original source with retained content; `source` is the entry as written
	/// in the per-file map.
	Content { source: String, content: String },
	/// The generated file standing in as its own original.
	SelfReference { path: String },
}

/// Computes canonical source paths relative to the consuming generated file.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver {
	strict: bool,
}

impl PathResolver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Fail with [`CombineError::UnresolvableSource`] instead of passing
	/// unresolvable entries through unmodified.
	pub fn strict(strict: bool) -> Self {
		Self { strict }
	}

	/// Resolve a source entry as it is stored in the combined map.
	pub fn resolve_entry(
		&self,
		entry: &SourceEntry,
		source_root: Option<&str>,
		file: &str,
	) -> Result<String> {
		match entry {
			SourceEntry::SelfReference { path } => Ok(path.clone()),
			SourceEntry::Content { source, .. } => self.resolve(source, source_root, file),
		}
	}

	/// Resolve `source` from the map of `file`, honoring `source_root`.
	///
	/// The result is `normalize(dirname(file) / source_root / source)`. A
	/// source that names `file` itself, with or without `source_root`, is
	/// returned as `file` unchanged.
	pub fn resolve(&self, source: &str, source_root: Option<&str>, file: &str) -> Result<String> {
		if source == file {
			return Ok(file.to_string());
		}

		let source_root = source_root.filter(|root| !root.is_empty());
		if let Some(root) = source_root {
			if normalize(&join_all(&[root, source])) == normalize(file) {
				return Ok(file.to_string());
			}
		}

		if has_scheme(source) || source_root.is_some_and(has_scheme) {
			if self.strict {
				return Err(CombineError::UnresolvableSource(source.to_string()));
			}
			warn!(source = %source, file = %file, "Leaving unresolvable source path unmodified");
			return Ok(source.to_string());
		}

		let joined = join_all(&[directory_of(file), source_root.unwrap_or(""), source]);
		Ok(normalize(&joined))
	}
}

/// Directory part of a `/`-separated path, empty for bare file names.
pub fn directory_of(path: &str) -> &str {
	match path.rfind('/') {
		Some(0) => "/",
		Some(idx) => &path[..idx],
		None => "",
	}
}

/// Join path segments; an absolute segment discards everything before it.
fn join_all(parts: &[&str]) -> String {
	let mut joined = String::new();
	for part in parts.iter().filter(|p| !p.is_empty()) {
		if part.starts_with('/') {
			joined.clear();
		} else if !joined.is_empty() && !joined.ends_with('/') {
			joined.push('/');
		}
		joined.push_str(part);
	}
	joined
}

/// Collapse `.` and `..` segments and duplicate separators.
///
/// Leading `..` segments of a relative path are kept; `..` above the root of an
/// absolute path is dropped.
pub fn normalize(path: &str) -> String {
	let absolute = path.starts_with('/');
	let mut parts: Vec<&str> = Vec::new();

	for part in path.split('/') {
		match part {
			"" | "." => {}
			".." => match parts.last() {
				Some(&last) if last != ".." => {
					parts.pop();
				}
				_ if !absolute => parts.push(".."),
				_ => {}
			},
			_ => parts.push(part),
		}
	}

	let joined = parts.join("/");
	if absolute {
		format!("/{joined}")
	} else if joined.is_empty() {
		".".to_string()
	} else {
		joined
	}
}

/// Whether the path starts with a URL scheme or a drive letter (`C:`).
fn has_scheme(path: &str) -> bool {
	let Some(idx) = path.find(':') else {
		return false;
	};
	let scheme = &path[..idx];
	scheme.starts_with(|c: char| c.is_ascii_alphabetic())
		&& scheme
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_resolve_with_source_root() {
		let resolver = PathResolver::new();
		let resolved = resolver
			.resolve("sub/one.js", Some("../src/pkgA"), "gen/gen1.js")
			.unwrap();
		assert_eq!(resolved, "src/pkgA/sub/one.js");
	}

	#[test]
	fn test_resolve_without_source_root() {
		let resolver = PathResolver::new();
		assert_eq!(resolver.resolve("one.js", None, "gen/gen1.js").unwrap(), "gen/one.js");
		assert_eq!(resolver.resolve("foo.coffee", None, "foo.js").unwrap(), "foo.coffee");
		assert_eq!(resolver.resolve("./a/../b.js", Some(""), "x/y.js").unwrap(), "x/b.js");
	}

	#[test]
	fn test_resolve_same_as_file() {
		let resolver = PathResolver::new();
		assert_eq!(resolver.resolve("a/b/one.js", None, "a/b/one.js").unwrap(), "a/b/one.js");
	}

	#[test]
	fn test_resolve_same_as_file_under_source_root() {
		let resolver = PathResolver::new();
		let resolve = |source, root| resolver.resolve(source, Some(root), "a/b/one.js").unwrap();
		assert_eq!(resolve("b/one.js", "a"), "a/b/one.js");
		assert_eq!(resolve("one.js", "./a/b/"), "a/b/one.js");
		// A different file under the same root is still joined.
		assert_eq!(resolve("b/two.js", "a"), "a/b/a/b/two.js");
	}

	#[test]
	fn test_resolve_self_reference() {
		let resolver = PathResolver::new();
		let entry = SourceEntry::SelfReference {
			path: "gen/gen1.js".to_string(),
		};
		assert_eq!(
			resolver.resolve_entry(&entry, Some("../src"), "gen/gen1.js").unwrap(),
			"gen/gen1.js"
		);
	}

	#[test]
	fn test_resolve_absolute() {
		let resolver = PathResolver::new();
		let resolve = |source, root| resolver.resolve(source, root, "gen/gen1.js").unwrap();
		assert_eq!(resolve("/abs/one.js", None), "/abs/one.js");
		assert_eq!(resolve("one.js", Some("/src/")), "/src/one.js");
	}

	#[test]
	fn test_unresolvable_passthrough() {
		let resolver = PathResolver::new();
		assert_eq!(
			resolver.resolve("C:\\src\\one.js", None, "gen/gen1.js").unwrap(),
			"C:\\src\\one.js"
		);
		assert_eq!(
			resolver.resolve("webpack:///src/one.js", None, "gen/gen1.js").unwrap(),
			"webpack:///src/one.js"
		);
	}

	#[test]
	fn test_unresolvable_strict() {
		let resolver = PathResolver::strict(true);
		assert!(matches!(
			resolver.resolve("C:/src/one.js", None, "gen/gen1.js"),
			Err(CombineError::UnresolvableSource(_))
		));
	}

	#[test]
	fn test_normalize() {
		assert_eq!(normalize("a/./b/../c"), "a/c");
		assert_eq!(normalize("../../a"), "../../a");
		assert_eq!(normalize("a/../../b"), "../b");
		assert_eq!(normalize("/../a//b/"), "/a/b");
		assert_eq!(normalize("a/.."), ".");
	}

	#[test]
	fn test_directory_of() {
		assert_eq!(directory_of("gen/gen1.js"), "gen");
		assert_eq!(directory_of("gen1.js"), "");
		assert_eq!(directory_of("/gen1.js"), "/");
	}
}
