// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: built-in defaults, TOML files, and environment
//! variables.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::{ConfigError, Result};
use crate::layer::{ConfigLayer, LoggingConfigLayer, ManifestConfigLayer};

/// Environment variable overriding `manifest.map_pattern`.
pub const ENV_MAP_PATTERN: &str = "UNWIND_MAP_PATTERN";

/// Environment variable overriding `logging.level`.
pub const ENV_LOG_LEVEL: &str = "UNWIND_LOG_LEVEL";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	UserFile = 20,
	ExplicitFile = 30,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ConfigLayer>;
}

/// Built-in defaults source.
///
/// Contributes nothing; defaults are applied when the merged layer is
/// finalized.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ConfigLayer> {
		debug!("loading defaults");
		Ok(ConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file contributes nothing.
pub struct TomlSource {
	path: PathBuf,
	precedence: Precedence,
}

impl TomlSource {
	/// The per-user file.
	pub fn user(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			precedence: Precedence::UserFile,
		}
	}

	/// A file named on the command line or by `UNWIND_CONFIG`.
	pub fn explicit(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			precedence: Precedence::ExplicitFile,
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		match self.precedence {
			Precedence::UserFile => "user-config",
			_ => "explicit-config",
		}
	}

	fn precedence(&self) -> Precedence {
		self.precedence
	}

	fn load(&self) -> Result<ConfigLayer> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ConfigLayer = toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
			path: self.path.clone(),
			source: e,
		})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: UNWIND_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ConfigLayer> {
		debug!("loading environment variables");
		Ok(layer_from_env(|name| std::env::var(name).ok()))
	}
}

/// Build a layer from environment lookups. Empty values count as unset.
pub(crate) fn layer_from_env(lookup: impl Fn(&str) -> Option<String>) -> ConfigLayer {
	let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

	ConfigLayer {
		manifest: Some(ManifestConfigLayer {
			map_pattern: var(ENV_MAP_PATTERN),
		}),
		logging: Some(LoggingConfigLayer {
			level: var(ENV_LOG_LEVEL),
		}),
	}
}
