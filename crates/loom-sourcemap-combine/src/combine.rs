// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The merge engine.
//!
//! A [`Combiner`] accumulates the maps of generated files in concatenation
//! order. For every file it:
//! 1. extracts the embedded map (or synthesizes one for the file itself),
//! 2. replaces sources without retained content by the generated file,
//! 3. resolves source paths against the file's location,
//! 4. shifts generated positions by the file's offset in the bundle,
//! 5. appends sources, names and mappings to the combined state.

use std::collections::HashMap;

use tracing::{debug, instrument, trace, warn};

use crate::comment::{find_embedded_map, EmbeddedMap};
use crate::config::CombineConfig;
use crate::error::Result;
use crate::lookup::{ExternalMapLookup, NoExternalMaps};
use crate::path::{PathResolver, SourceEntry};
use crate::snapshot::snapshot;
use crate::sourcemap::{CommentStyle, SourceMapDoc};
use crate::vlq::{Mapping, OriginalLocation};

/// A generated file to add to the combined map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
	/// Logical path of the generated file.
	pub path: String,
	/// Generated text, optionally ending in a source map comment.
	pub content: String,
}

impl GeneratedFile {
	pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			content: content.into(),
		}
	}
}

/// Position of a file's first character within the concatenated output.
///
/// `line` is added to every generated line; `column` only to positions on the
/// file's first line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset {
	pub line: u32,
	pub column: u32,
}

impl Offset {
	pub fn new(line: u32, column: u32) -> Self {
		Self { line, column }
	}

	pub fn lines(line: u32) -> Self {
		Self { line, column: 0 }
	}

	fn apply(&self, mapping: &Mapping) -> (u32, u32) {
		let column = if mapping.generated_line == 1 {
			mapping.generated_column.saturating_add(self.column)
		} else {
			mapping.generated_column
		};
		(mapping.generated_line.saturating_add(self.line), column)
	}
}

/// Accumulated sources, names and mappings of every file added so far.
///
/// Mapping indices refer to the combined `sources` and `names` arrays.
#[derive(Debug, Clone, Default)]
pub struct CombinedState {
	sources: Vec<String>,
	sources_content: Vec<String>,
	names: Vec<String>,
	mappings: Vec<Mapping>,
	source_indices: HashMap<String, u32>,
	name_indices: HashMap<String, u32>,
}

impl CombinedState {
	pub fn sources(&self) -> &[String] {
		&self.sources
	}

	/// Content of each source, aligned with [`CombinedState::sources`].
	pub fn sources_content(&self) -> &[String] {
		&self.sources_content
	}

	pub fn names(&self) -> &[String] {
		&self.names
	}

	pub fn mappings(&self) -> &[Mapping] {
		&self.mappings
	}

	/// Index of `path`, adding it with `content` if unseen. The first content
	/// recorded for a path is kept.
	fn intern_source(&mut self, path: String, content: &str) -> u32 {
		if let Some(&idx) = self.source_indices.get(&path) {
			return idx;
		}
		let idx = self.sources.len() as u32;
		self.source_indices.insert(path.clone(), idx);
		self.sources.push(path);
		self.sources_content.push(content.to_string());
		idx
	}

	fn intern_name(&mut self, name: &str) -> u32 {
		if let Some(&idx) = self.name_indices.get(name) {
			return idx;
		}
		let idx = self.names.len() as u32;
		self.name_indices.insert(name.to_string(), idx);
		self.names.push(name.to_string());
		idx
	}
}

/// Where mappings of a per-file source end up.
#[derive(Debug, Clone, Copy)]
enum SourceTarget {
	/// Kept, pointing at this combined source index.
	Combined(u32),
	/// Replaced by identity mappings of the generated file.
	Identity,
}

/// Combines the source maps of concatenated generated files.
#[derive(Debug)]
pub struct Combiner<L = NoExternalMaps> {
	state: CombinedState,
	resolver: PathResolver,
	file: Option<String>,
	lookup: L,
}

impl Default for Combiner {
	fn default() -> Self {
		Self::new()
	}
}

impl Combiner {
	/// Create an empty combiner with default configuration.
	pub fn new() -> Self {
		Self::with_config(CombineConfig::default())
	}

	pub fn with_config(config: CombineConfig) -> Self {
		Self {
			state: CombinedState::default(),
			resolver: PathResolver::strict(config.strict_paths),
			file: config.file,
			lookup: NoExternalMaps,
		}
	}
}

impl<L: ExternalMapLookup> Combiner<L> {
	/// Use `lookup` to load maps referenced by URL.
	pub fn with_lookup<M: ExternalMapLookup>(self, lookup: M) -> Combiner<M> {
		Combiner {
			state: self.state,
			resolver: self.resolver,
			file: self.file,
			lookup,
		}
	}

	pub fn state(&self) -> &CombinedState {
		&self.state
	}

	/// Add the next generated file of the concatenation.
	///
	/// `offset` is where the file starts in the combined output; callers track
	/// the running total themselves. On error the combined state is left
	/// untouched.
	#[instrument(
		skip(self, file),
		fields(path = %file.path, line = offset.line, column = offset.column)
	)]
	pub fn add_file(&mut self, file: &GeneratedFile, offset: Offset) -> Result<()> {
		let inner = match self.extract_map(file)? {
			Some(doc) if !doc.sources.is_empty() => doc,
			_ => {
				debug!("No usable embedded source map, mapping file onto itself");
				SourceMapDoc {
					sources: vec![Some(file.path.clone())],
					..SourceMapDoc::default()
				}
			}
		};

		let records = inner.decode()?;
		let entries = source_entries(&inner, file);
		let source_root = inner.effective_source_root();
		let resolved = entries
			.iter()
			.map(|entry| self.resolver.resolve_entry(entry, source_root, &file.path))
			.collect::<Result<Vec<_>>>()?;

		// Nothing below can fail, so the state is only touched once decoding
		// and resolution have succeeded.
		let mut targets = Vec::with_capacity(entries.len());
		let mut identity_source = None;
		for (entry, path) in entries.iter().zip(resolved) {
			match entry {
				SourceEntry::Content { content, .. } => {
					targets.push(SourceTarget::Combined(self.state.intern_source(path, content)));
				}
				SourceEntry::SelfReference { .. } => {
					let idx = self.state.intern_source(path, &file.content);
					identity_source = Some(idx);
					targets.push(SourceTarget::Identity);
				}
			}
		}

		let mut staged = Vec::with_capacity(records.len());

		if let Some(source_index) = identity_source {
			staged.extend(identity_mappings(&file.content, source_index, offset));
		}

		for record in &records {
			let original = match record.original {
				None => None,
				Some(original) => match targets.get(original.source_index as usize) {
					Some(SourceTarget::Combined(source_index)) => Some(OriginalLocation {
						source_index: *source_index,
						..original
					}),
					Some(SourceTarget::Identity) => continue,
					None => {
						warn!(
							source_index = original.source_index,
							"Dropping mapping with out of range source index"
						);
						continue;
					}
				},
			};

			let name_index = original
				.and(record.name_index)
				.and_then(|idx| inner.names.get(idx as usize))
				.map(|name| self.state.intern_name(name));

			let (generated_line, generated_column) = offset.apply(record);
			staged.push(Mapping {
				generated_line,
				generated_column,
				original,
				name_index,
			});
		}

		// Identity and kept mappings of one file interleave by line.
		staged.sort_by_key(|m| m.generated_line);
		self.state.mappings.extend(staged);

		trace!(
			sources = self.state.sources.len(),
			names = self.state.names.len(),
			mappings = self.state.mappings.len(),
			"Merged file into combined source map"
		);

		Ok(())
	}

	/// Find and parse the source map referenced by the file's content.
	fn extract_map(&self, file: &GeneratedFile) -> Result<Option<SourceMapDoc>> {
		match find_embedded_map(&file.content) {
			Some(EmbeddedMap::Inline(payload)) => SourceMapDoc::from_base64(payload).map(Some),
			Some(EmbeddedMap::External(url)) => match self.lookup.find_source_map(url, &file.path) {
				Some(data) => SourceMapDoc::from_bytes(data).map(Some),
				None => {
					debug!(url = %url, "External source map not available");
					Ok(None)
				}
			},
			None => Ok(None),
		}
	}

	/// Source map of everything added so far, named after the configured file.
	pub fn snapshot(&self) -> SourceMapDoc {
		snapshot(&self.state, self.file.as_deref())
	}

	/// Source map of everything added so far, named `file`.
	pub fn snapshot_as(&self, file: &str) -> SourceMapDoc {
		snapshot(&self.state, Some(file))
	}

	/// Base64 encoding of the current snapshot.
	pub fn base64(&self) -> Result<String> {
		self.snapshot().to_base64()
	}

	/// `sourceMappingURL` comment embedding the current snapshot.
	pub fn comment(&self, style: CommentStyle) -> Result<String> {
		self.snapshot().to_comment(style)
	}
}

/// Classify every source of `inner`; sources without content become the file.
fn source_entries(inner: &SourceMapDoc, file: &GeneratedFile) -> Vec<SourceEntry> {
	inner
		.sources
		.iter()
		.enumerate()
		.map(|(idx, source)| match (source, inner.source_content(idx)) {
			(Some(source), Some(content)) => SourceEntry::Content {
				source: source.clone(),
				content: content.to_string(),
			},
			_ => {
				debug!(source = ?source, "Source has no content, using generated file");
				SourceEntry::SelfReference {
					path: file.path.clone(),
				}
			}
		})
		.collect()
}

/// One mapping per line of `content`, each onto the same line of itself.
///
/// A trailing newline starts one more line, so `"a\n"` yields two mappings.
fn identity_mappings(
	content: &str,
	source_index: u32,
	offset: Offset,
) -> impl Iterator<Item = Mapping> {
	let line_count = content.matches('\n').count() as u32 + 1;
	(1..=line_count).map(move |line| Mapping {
		generated_line: line.saturating_add(offset.line),
		generated_column: 0,
		original: Some(OriginalLocation {
			source_index,
			line,
			column: 0,
		}),
		name_index: None,
	})
}
