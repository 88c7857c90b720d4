// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Partial configuration layers and their merge rules.

use serde::{Deserialize, Serialize};

/// One source's view of the configuration. Every field is optional; later
/// layers override earlier ones field by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub manifest: Option<ManifestConfigLayer>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub logging: Option<LoggingConfigLayer>,
}

impl ConfigLayer {
	pub fn merge(&mut self, other: Self) {
		merge_section(&mut self.manifest, other.manifest, ManifestConfigLayer::merge);
		merge_section(&mut self.logging, other.logging, LoggingConfigLayer::merge);
	}
}

fn merge_section<T>(base: &mut Option<T>, other: Option<T>, merge: fn(&mut T, T)) {
	let Some(other) = other else {
		return;
	};
	match base {
		Some(existing) => merge(existing, other),
		None => *base = Some(other),
	}
}

/// `[manifest]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ManifestConfigLayer {
	/// Regex selecting source map entries in an index or archive.
	pub map_pattern: Option<String>,
}

impl ManifestConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.map_pattern.is_some() {
			self.map_pattern = other.map_pattern;
		}
	}
}

/// `[logging]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfigLayer {
	/// `tracing` filter directive, e.g. `warn` or `unwind_symbolicate=debug`.
	pub level: Option<String>,
}

impl LoggingConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.level.is_some() {
			self.level = other.level;
		}
	}
}
