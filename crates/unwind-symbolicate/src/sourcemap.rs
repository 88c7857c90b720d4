// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Position lookup against a source map.
//!
//! A [`ParsedSourceMap`] decodes a document's `mappings` once and then answers
//! any number of queries. Lines are 1-indexed, columns 0-indexed, on both the
//! generated and the original side.

use std::sync::LazyLock;

use regex::Regex;
use unwind_core::SourceMapDocument;

use crate::error::{Result, SymbolicateError};
use crate::vlq::{decode_mappings, DecodedMappings};

static ABSOLUTE_URL: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").unwrap());

/// Original location of a generated position.
///
/// Every field is optional. A position with no fields set means no mapping
/// covers the query, which is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginalPosition {
	pub source: Option<String>,
	pub name: Option<String>,
	/// 1-indexed.
	pub line: Option<u32>,
	/// 0-indexed.
	pub column: Option<u32>,
}

impl OriginalPosition {
	/// No mapping covers the queried position.
	pub fn none() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.source.is_none() && self.name.is_none() && self.line.is_none() && self.column.is_none()
	}
}

/// Resolves generated positions to original ones for one source map.
pub trait PositionResolver {
	/// Original position for a generated `line` (1-indexed) and `column`
	/// (0-indexed).
	fn original_position_for(&self, line: u32, column: u32) -> Result<OriginalPosition>;
}

/// Source map with decoded mappings, ready for lookups.
#[derive(Debug, Clone)]
pub struct ParsedSourceMap {
	/// Generated file this map describes.
	pub file: String,
	pub sources: Vec<String>,
	pub names: Vec<String>,
	/// Joined onto relative source paths.
	pub source_root: Option<String>,
	mappings: DecodedMappings,
}

impl ParsedSourceMap {
	/// Decode a validated document. Only version 3 maps are supported.
	pub fn from_document(document: &SourceMapDocument) -> Result<Self> {
		if document.version != 3.0 {
			return Err(SymbolicateError::InvalidSourceMapVersion(document.version));
		}

		let mappings = decode_mappings(&document.mappings)?;

		Ok(Self {
			file: document.file.clone(),
			sources: document.sources.clone(),
			names: document.names.clone(),
			source_root: document.source_root.clone(),
			mappings,
		})
	}

	/// Decode, validate and parse a source map from raw JSON.
	pub fn from_bytes(data: &[u8]) -> Result<Self> {
		let value: serde_json::Value =
			serde_json::from_slice(data).map_err(|e| SymbolicateError::invalid_json("source map", e))?;
		let document = SourceMapDocument::parse(&value)?;
		Self::from_document(&document)
	}

	/// Look up a generated position. `None` when no mapping covers it.
	pub fn lookup(&self, line: u32, column: u32) -> Result<Option<OriginalPosition>> {
		// Lines are 1-indexed; there is nothing before line 1.
		let Some(line_0indexed) = line.checked_sub(1) else {
			return Ok(None);
		};

		let original = match self.mappings.find(line_0indexed, column) {
			Some(mapping) => match mapping.original {
				Some(original) => original,
				None => return Ok(None),
			},
			None => return Ok(None),
		};

		let source = self
			.sources
			.get(original.source_index as usize)
			.ok_or(SymbolicateError::InvalidSourceIndex(original.source_index))?;

		let name = match original.name_index {
			Some(idx) => Some(
				self
					.names
					.get(idx as usize)
					.cloned()
					.ok_or(SymbolicateError::InvalidNameIndex(idx))?,
			),
			None => None,
		};

		Ok(Some(OriginalPosition {
			source: Some(self.resolve_source_path(source)),
			name,
			line: Some(original.line + 1),
			column: Some(original.column),
		}))
	}

	fn resolve_source_path(&self, source: &str) -> String {
		match &self.source_root {
			Some(root) if !root.is_empty() && !is_absolute(source) => {
				if root.ends_with('/') {
					format!("{root}{source}")
				} else {
					format!("{root}/{source}")
				}
			}
			_ => source.to_string(),
		}
	}

	pub fn source_count(&self) -> usize {
		self.sources.len()
	}

	pub fn mapping_count(&self) -> usize {
		self.mappings.len()
	}
}

/// Absolute paths and URLs are never joined onto `sourceRoot`.
fn is_absolute(source: &str) -> bool {
	source.starts_with('/') || ABSOLUTE_URL.is_match(source)
}

impl PositionResolver for ParsedSourceMap {
	fn original_position_for(&self, line: u32, column: u32) -> Result<OriginalPosition> {
		Ok(self.lookup(line, column)?.unwrap_or_default())
	}
}
