// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lookup of source maps referenced by URL instead of inlined.

use std::collections::HashMap;

use crate::path::{directory_of, normalize};

/// Provides the bytes of externally referenced source maps.
///
/// Implementations must have the data in memory; fetching from disk or the
/// network happens before a file is handed to the combiner.
pub trait ExternalMapLookup {
	/// Find the source map at `url` as referenced from the generated `file`.
	fn find_source_map(&self, url: &str, file: &str) -> Option<&[u8]>;
}

/// Lookup that never finds anything, so URL references use the fallback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExternalMaps;

impl ExternalMapLookup for NoExternalMaps {
	fn find_source_map(&self, _url: &str, _file: &str) -> Option<&[u8]> {
		None
	}
}

/// In-memory map store for testing and simple use cases.
#[derive(Debug, Default)]
pub struct InMemoryMaps {
	/// Maps a normalized path to source map JSON.
	maps: HashMap<String, Vec<u8>>,
}

impl InMemoryMaps {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, path: &str, data: Vec<u8>) {
		self.maps.insert(normalize(path), data);
	}
}

impl ExternalMapLookup for InMemoryMaps {
	fn find_source_map(&self, url: &str, file: &str) -> Option<&[u8]> {
		// Try the URL relative to the generated file first
		let relative = match directory_of(file) {
			"" => normalize(url),
			dir => normalize(&format!("{dir}/{url}")),
		};
		if let Some(data) = self.maps.get(&relative) {
			return Some(data.as_slice());
		}

		self.maps.get(&normalize(url)).map(Vec::as_slice)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_no_external_maps() {
		assert!(NoExternalMaps.find_source_map("a.js.map", "a.js").is_none());
	}

	#[test]
	fn test_in_memory_relative_to_file() {
		let mut maps = InMemoryMaps::new();
		maps.add("gen/a.js.map", b"{}".to_vec());

		assert_eq!(maps.find_source_map("a.js.map", "gen/a.js"), Some(&b"{}"[..]));
		assert_eq!(maps.find_source_map("./gen/a.js.map", "b.js"), Some(&b"{}"[..]));
		assert!(maps.find_source_map("a.js.map", "other/a.js").is_none());
	}
}
