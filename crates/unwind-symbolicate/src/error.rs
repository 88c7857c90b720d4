// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for symbolication operations.

use thiserror::Error;
use unwind_core::ValidationError;

/// Errors that can occur while building a manifest or rebasing a stack.
#[derive(Debug, Error)]
pub enum SymbolicateError {
	/// A decoded document did not have the expected shape.
	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error("invalid JSON in {location}: {source}")]
	InvalidJson {
		location: String,
		#[source]
		source: serde_json::Error,
	},

	/// A manifest or archive has no entry for the requested key.
	#[error("bundle file [{key}] not found in [{location}]")]
	NotFound { key: String, location: String },

	#[error("could not find a mapping for [{file}:{line}:{column}]")]
	NoMappingFound {
		file: String,
		line: u32,
		column: u32,
	},

	/// Not a single frame of the stack could be rebased.
	#[error("the error stack could not be rebased")]
	RebaseFailed,

	#[error("invalid source map version: expected 3, got {0}")]
	InvalidSourceMapVersion(f64),

	#[error("invalid VLQ character: {0:?}")]
	InvalidVlqChar(char),

	#[error("VLQ value overflows in segment {0:?}")]
	VlqOverflow(String),

	#[error("invalid mapping segment {segment:?}: {reason}")]
	InvalidSegment {
		segment: String,
		reason: &'static str,
	},

	#[error("invalid source index: {0}")]
	InvalidSourceIndex(u32),

	#[error("invalid name index: {0}")]
	InvalidNameIndex(u32),

	#[error("invalid map pattern: {0}")]
	InvalidPattern(#[from] regex::Error),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("archive error: {0}")]
	Archive(#[from] zip::result::ZipError),
}

impl SymbolicateError {
	pub fn invalid_json(location: impl Into<String>, source: serde_json::Error) -> Self {
		Self::InvalidJson {
			location: location.into(),
			source,
		}
	}

	pub fn not_found(key: impl Into<String>, location: impl Into<String>) -> Self {
		Self::NotFound {
			key: key.into(),
			location: location.into(),
		}
	}
}

pub type Result<T> = std::result::Result<T, SymbolicateError>;
