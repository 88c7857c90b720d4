// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `<bundleFile:line:column>` query parsing.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

static QUERY_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^([^/]+):(\d+):(\d+)$").unwrap());

/// A generated-code position to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
	/// Bundle file name, without directories.
	pub file: String,
	/// 1-indexed.
	pub line: u32,
	/// 0-indexed.
	pub column: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Query must match \"filename:line:column\"")]
pub struct InvalidQuery(pub String);

impl FromStr for Query {
	type Err = InvalidQuery;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || InvalidQuery(s.to_string());
		let caps = QUERY_REGEX.captures(s).ok_or_else(invalid)?;

		Ok(Self {
			file: caps[1].to_string(),
			line: caps[2].parse().map_err(|_| invalid())?,
			column: caps[3].parse().map_err(|_| invalid())?,
		})
	}
}

impl fmt::Display for Query {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}:{}", self.file, self.line, self.column)
	}
}
