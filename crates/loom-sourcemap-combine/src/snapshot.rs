// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Projection of the combined state into an emittable source map.

use crate::combine::CombinedState;
use crate::sourcemap::{SourceMapDoc, SOURCE_MAP_VERSION};
use crate::vlq::encode_mappings;

/// Build a source map from the current combined state.
///
/// This only reads the state, so it may be called again after more files are
/// added to get an updated map.
pub fn snapshot(state: &CombinedState, file: Option<&str>) -> SourceMapDoc {
	SourceMapDoc {
		version: SOURCE_MAP_VERSION,
		file: file.map(str::to_string),
		source_root: None,
		sources: state.sources().iter().cloned().map(Some).collect(),
		names: state.names().to_vec(),
		mappings: encode_mappings(state.mappings()),
		sources_content: state.sources_content().iter().cloned().map(Some).collect(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::combine::{Combiner, GeneratedFile, Offset};

	#[test]
	fn test_empty_snapshot() {
		let doc = snapshot(&CombinedState::default(), None);
		assert_eq!(doc.version, 3);
		assert!(doc.sources.is_empty());
		assert!(doc.sources_content.is_empty());
		assert_eq!(doc.mappings, "");
	}

	#[test]
	fn test_snapshot_is_incremental() {
		let mut combiner = Combiner::new();
		combiner
			.add_file(&GeneratedFile::new("a.js", "a\nb"), Offset::default())
			.unwrap();
		let first = combiner.snapshot_as("bundle.js");
		assert_eq!(first.file.as_deref(), Some("bundle.js"));
		assert_eq!(first.sources, vec![Some("a.js".to_string())]);
		assert_eq!(first.mappings, "AAAA;AACA");

		combiner
			.add_file(&GeneratedFile::new("b.js", "c"), Offset::lines(2))
			.unwrap();
		let second = combiner.snapshot_as("bundle.js");
		assert_eq!(second.sources.len(), 2);
		assert_eq!(second.mappings, "AAAA;AACA;ACDA");

		// Taking a snapshot does not change what the next one sees.
		assert_eq!(combiner.snapshot_as("bundle.js"), second);
	}

	#[test]
	fn test_snapshot_decodes_to_state() {
		let mut combiner = Combiner::new();
		combiner
			.add_file(&GeneratedFile::new("a.js", "a\nb\n"), Offset::lines(1))
			.unwrap();

		let doc = combiner.snapshot();
		assert_eq!(doc.decode().unwrap(), combiner.state().mappings());
	}
}
