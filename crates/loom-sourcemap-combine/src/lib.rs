// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map combination for concatenated bundles.
//!
//! This crate provides functionality for:
//! - Decoding and encoding source map v3 `mappings` strings
//! - Merging the maps of many generated files into one map for their
//!   concatenation, shifting each file by its position in the bundle
//! - Falling back to line-for-line identity mappings when a file has no
//!   usable map or no retained source content
//! - Emitting the result as JSON, base64, or a `sourceMappingURL` comment
//! - Stripping source map comments before concatenation
//!
//! # Example
//!
//! ```
//! use loom_sourcemap_combine::{remove_comments, Combiner, CommentStyle, GeneratedFile, Offset};
//!
//! let mut combiner = Combiner::new();
//!
//! // A file without an embedded map maps onto itself.
//! let first = GeneratedFile::new("gen/a.js", "var a = 1;\nvar b = 2;");
//! combiner.add_file(&first, Offset::default()).unwrap();
//!
//! // The second file starts on line 3 of the bundle.
//! let second = GeneratedFile::new("gen/b.js", "var c = 3;");
//! combiner.add_file(&second, Offset::lines(2)).unwrap();
//!
//! let bundle = format!(
//! 	"{}\n{}\n{}",
//! 	remove_comments(&first.content),
//! 	remove_comments(&second.content),
//! 	combiner.comment(CommentStyle::Line).unwrap(),
//! );
//! assert!(bundle.ends_with(&combiner.comment(CommentStyle::Line).unwrap()));
//! assert_eq!(combiner.snapshot().sources.len(), 2);
//! ```

pub mod combine;
pub mod comment;
pub mod config;
pub mod error;
pub mod lookup;
pub mod path;
pub mod snapshot;
pub mod sourcemap;
pub mod vlq;

// Re-export main types
pub use combine::{CombinedState, Combiner, GeneratedFile, Offset};
pub use comment::{find_embedded_map, has_comment, remove_comments, EmbeddedMap};
pub use config::{CombineConfig, CombineConfigLayer};
pub use error::{CombineError, Result};
pub use lookup::{ExternalMapLookup, InMemoryMaps, NoExternalMaps};
pub use path::{PathResolver, SourceEntry};
pub use snapshot::snapshot;
pub use sourcemap::{CommentStyle, SourceMapDoc};
pub use vlq::{decode_mappings, encode_mappings, encode_mappings_with, Mapping, OriginalLocation};
