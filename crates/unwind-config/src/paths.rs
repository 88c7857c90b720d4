// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! XDG Base Directory compliant path resolution.

use std::path::PathBuf;

/// Directory name under the config home.
pub const APP_DIR: &str = "unwind";

/// File name of the user config file.
pub const CONFIG_FILE: &str = "config.toml";

/// User config file: `$XDG_CONFIG_HOME/unwind/config.toml`, falling back to
/// `~/.config/unwind/config.toml`.
///
/// `None` when neither `XDG_CONFIG_HOME` nor a home directory is available.
pub fn user_config_file() -> Option<PathBuf> {
	let config_home = std::env::var_os("XDG_CONFIG_HOME")
		.filter(|v| !v.is_empty())
		.map(PathBuf::from)
		.or_else(|| dirs::home_dir().map(|home| home.join(".config")))?;

	let path = config_home.join(APP_DIR).join(CONFIG_FILE);
	tracing::debug!(path = %path.display(), "resolved user config file");
	Some(path)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_user_config_file_is_under_app_dir() {
		if let Some(path) = user_config_file() {
			assert!(path.ends_with("unwind/config.toml"));
		}
	}
}
