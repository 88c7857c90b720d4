// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Validated source map documents.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::validate::{FieldType, Scope};

/// A version-3 source map, validated but not decoded.
///
/// `mappings` stays in its encoded form; decoding belongs to the position
/// resolver in `unwind-symbolicate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapDocument {
	/// Generated file this map describes. Used as the manifest key.
	pub file: String,
	pub version: f64,
	/// Base64 VLQ encoded mappings.
	pub mappings: String,
	/// Original source paths.
	pub sources: Vec<String>,
	/// Original identifiers, empty when the map has none.
	pub names: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub source_root: Option<String>,
}

impl SourceMapDocument {
	/// Validate a decoded JSON document as a source map.
	///
	/// Required: `file` (string), `version` (number, numeric strings accepted),
	/// `mappings` (string), `sources` (array of strings). Optional, checked
	/// only when present: `names` (array of strings), `sourceRoot` (string).
	pub fn parse(value: &Value) -> Result<Self> {
		let root = Scope::root(value);

		let file = root.string("file")?.to_string();
		let version = root.number("version")?;
		let mappings = root.string("mappings")?.to_string();
		let sources = root.strings("sources")?;
		let names = root.optional_strings("names")?;
		let source_root = root
			.optional("sourceRoot", FieldType::String)?
			.and_then(Value::as_str)
			.map(str::to_string);

		Ok(Self {
			file,
			version,
			mappings,
			sources,
			names,
			source_root,
		})
	}
}

impl TryFrom<&Value> for SourceMapDocument {
	type Error = crate::error::ValidationError;

	fn try_from(value: &Value) -> Result<Self> {
		Self::parse(value)
	}
}
