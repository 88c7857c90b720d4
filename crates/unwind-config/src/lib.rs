// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the unwind command line tool.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, user file,
//!   explicit file, environment)
//! - XDG Base Directory compliant path resolution
//! - Validation of the merged result
//!
//! # Usage
//!
//! ```ignore
//! use unwind_config::load_config;
//!
//! let config = load_config(None)?;
//! println!("map pattern: {}", config.manifest.map_pattern);
//! ```

pub mod error;
pub mod layer;
pub mod paths;
pub mod sources;

pub use error::{ConfigError, Result};
pub use layer::{ConfigLayer, LoggingConfigLayer, ManifestConfigLayer};
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use std::path::Path;

use regex::Regex;
use tracing::debug;

pub use unwind_symbolicate::DEFAULT_MAP_PATTERN;

/// Default `tracing` filter.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct UnwindConfig {
	pub manifest: ManifestConfig,
	pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManifestConfig {
	/// Validated regex source.
	pub map_pattern: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
	pub level: String,
}

impl Default for UnwindConfig {
	fn default() -> Self {
		Self {
			manifest: ManifestConfig {
				map_pattern: DEFAULT_MAP_PATTERN.to_string(),
			},
			logging: LoggingConfig {
				level: DEFAULT_LOG_LEVEL.to_string(),
			},
		}
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`UNWIND_*`)
/// 2. `explicit`, when given
/// 3. User config file (`$XDG_CONFIG_HOME/unwind/config.toml`)
/// 4. Built-in defaults
pub fn load_config(explicit: Option<&Path>) -> Result<UnwindConfig> {
	let mut sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(DefaultsSource)];
	if let Some(path) = paths::user_config_file() {
		sources.push(Box::new(TomlSource::user(path)));
	}
	if let Some(path) = explicit {
		sources.push(Box::new(TomlSource::explicit(path)));
	}
	sources.push(Box::new(EnvSource));

	load_from_sources(sources)
}

/// Merge `sources` in precedence order and finalize the result.
pub fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<UnwindConfig> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Apply defaults to a merged layer and validate it.
pub fn finalize(layer: ConfigLayer) -> Result<UnwindConfig> {
	let defaults = UnwindConfig::default();

	let map_pattern = layer
		.manifest
		.and_then(|m| m.map_pattern)
		.unwrap_or(defaults.manifest.map_pattern);
	if let Err(e) = Regex::new(&map_pattern) {
		return Err(ConfigError::invalid_value("manifest.map_pattern", e.to_string()));
	}

	let level = layer
		.logging
		.and_then(|l| l.level)
		.unwrap_or(defaults.logging.level);
	if level.trim().is_empty() {
		return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
	}

	debug!(map_pattern = %map_pattern, level = %level, "configuration loaded");

	Ok(UnwindConfig {
		manifest: ManifestConfig { map_pattern },
		logging: LoggingConfig { level },
	})
}
