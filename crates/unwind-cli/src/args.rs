// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Command line arguments.
//!
//! The tool has always been invoked as `unwind-js -manifest <path> <query>`.
//! Single-dash long flags are rewritten to their `--` form before clap sees
//! them, so both spellings work.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::query::{InvalidQuery, Query};

pub const NAME: &str = "unwind-js";

pub const USAGE: &str = "\
unwind-js: [-manifest <path> | -map <path>] <filename:line:column>
unwind-js: -manifest <path> --stack <error.json> [--json]
";

const LEGACY_FLAGS: &[(&str, &str)] = &[
	("-manifest", "--manifest"),
	("-map", "--map"),
	("-stack", "--stack"),
	("-json", "--json"),
	("-config", "--config"),
];

/// Rebase V8 error positions onto original sources using source maps
#[derive(Parser, Debug)]
#[command(name = "unwind-js", version, about, long_about = None)]
pub struct Args {
	/// Manifest index file, or a .zip archive of source maps
	#[arg(long, value_name = "PATH", conflicts_with = "map")]
	pub manifest: Option<PathBuf>,

	/// A single source map file
	#[arg(long, value_name = "PATH")]
	pub map: Option<PathBuf>,

	/// Rebase a whole error stack document instead of a single position
	#[arg(long, value_name = "PATH", requires = "manifest", conflicts_with = "query")]
	pub stack: Option<PathBuf>,

	/// Print the rebased stack as JSON
	#[arg(long, requires = "stack")]
	pub json: bool,

	/// Path to a configuration file
	#[arg(short, long, env = "UNWIND_CONFIG", value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Generated position, as bundleFile:line:column
	#[arg(value_name = "QUERY")]
	pub query: Option<String>,
}

/// What the invocation asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
	/// Resolve one position through a manifest.
	ManifestQuery { manifest: PathBuf, query: Query },
	/// Resolve one position against a single map. The query's file is not
	/// used.
	MapQuery { map: PathBuf, query: Query },
	/// Rebase every frame of an error stack document.
	Stack {
		manifest: PathBuf,
		stack: PathBuf,
		json: bool,
	},
}

/// Arguments that parse but do not describe a runnable invocation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
	#[error("missing arguments")]
	MissingArguments,

	#[error("Please specify one of -manifest or -map.")]
	MissingSource,

	#[error(transparent)]
	InvalidQuery(#[from] InvalidQuery),
}

impl UsageError {
	/// Whether a message line precedes the usage text.
	pub fn has_message(&self) -> bool {
		!matches!(self, Self::MissingArguments)
	}
}

impl Args {
	pub fn mode(&self) -> Result<Mode, UsageError> {
		if let (Some(manifest), Some(stack)) = (&self.manifest, &self.stack) {
			return Ok(Mode::Stack {
				manifest: manifest.clone(),
				stack: stack.clone(),
				json: self.json,
			});
		}

		let Some(query) = self.query.as_deref() else {
			return Err(UsageError::MissingArguments);
		};

		match (&self.manifest, &self.map) {
			(Some(manifest), _) => Ok(Mode::ManifestQuery {
				manifest: manifest.clone(),
				query: query.parse()?,
			}),
			(None, Some(map)) => Ok(Mode::MapQuery {
				map: map.clone(),
				query: query.parse()?,
			}),
			(None, None) => Err(UsageError::MissingSource),
		}
	}
}

/// Rewrite single-dash long flags to their `--` form.
pub fn normalize_args<I, T>(argv: I) -> Vec<OsString>
where
	I: IntoIterator<Item = T>,
	T: Into<OsString>,
{
	argv
		.into_iter()
		.map(Into::into)
		.map(|arg| {
			LEGACY_FLAGS
				.iter()
				.find(|(legacy, _)| arg.as_os_str() == *legacy)
				.map(|(_, modern)| OsString::from(modern))
				.unwrap_or(arg)
		})
		.collect()
}
