// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Combiner configuration.
//!
//! Configuration is layered: partial [`CombineConfigLayer`]s (from defaults,
//! files or the environment) are merged and then finalized into a
//! [`CombineConfig`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CombineConfigLayer {
	pub strict_paths: Option<bool>,
	pub file: Option<String>,
}

impl CombineConfigLayer {
	/// Read `LOOM_SOURCEMAP_STRICT_PATHS` and `LOOM_SOURCEMAP_FILE`.
	pub fn from_env() -> Self {
		Self {
			strict_paths: env_bool("LOOM_SOURCEMAP_STRICT_PATHS"),
			file: env_var("LOOM_SOURCEMAP_FILE"),
		}
	}

	pub fn merge(&mut self, other: Self) {
		if other.strict_paths.is_some() {
			self.strict_paths = other.strict_paths;
		}
		if other.file.is_some() {
			self.file = other.file;
		}
	}

	pub fn finalize(self) -> CombineConfig {
		CombineConfig {
			strict_paths: self.strict_paths.unwrap_or(false),
			file: self.file,
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CombineConfig {
	/// Reject sources whose paths cannot be normalized.
	pub strict_paths: bool,
	/// Output file name recorded in snapshots.
	pub file: Option<String>,
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}
