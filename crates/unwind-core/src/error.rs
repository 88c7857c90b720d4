// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for structural validation.

use thiserror::Error;

use crate::validate::FieldType;

/// A decoded JSON value did not match the expected shape.
///
/// Every variant names the offending field using a dotted path
/// (`frames[2].lineNumber`), so the first problem found is reported
/// precisely and validation stops there.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("expecting field \"{0}\"")]
	MissingField(String),

	#[error("expecting type \"{expected}\" at \"{field}\"")]
	WrongType { field: String, expected: FieldType },

	#[error("expected number at \"{0}\"")]
	NotANumber(String),

	#[error("expected a non-negative integer at \"{field}\", got {value}")]
	OutOfRange { field: String, value: String },
}

impl ValidationError {
	/// The path of the field that failed validation.
	pub fn field(&self) -> &str {
		match self {
			Self::MissingField(field) | Self::NotANumber(field) => field,
			Self::WrongType { field, .. } | Self::OutOfRange { field, .. } => field,
		}
	}
}

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;
