// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Manifest resolution: from a set of candidate entries to a lookup table of
//! validated source maps keyed by generated file name.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use unwind_core::SourceMapDocument;

use crate::error::{Result, SymbolicateError};

/// Default pattern for entries that name a source map.
pub const DEFAULT_MAP_PATTERN: &str = r"\.js\.map$";

static DEFAULT_MAP_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(DEFAULT_MAP_PATTERN).unwrap());

/// Selects which index keys or archive members are source maps.
#[derive(Debug, Clone)]
pub struct MapPattern(Regex);

impl MapPattern {
	pub fn new(pattern: &str) -> Result<Self> {
		Ok(Self(Regex::new(pattern)?))
	}

	pub fn is_match(&self, entry: &str) -> bool {
		self.0.is_match(entry)
	}

	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}
}

impl Default for MapPattern {
	fn default() -> Self {
		Self(DEFAULT_MAP_REGEX.clone())
	}
}

/// Supplier of raw manifest entries.
///
/// Implemented by the directory-index and archive back-ends in
/// [`crate::loader`], and by [`InMemorySource`] for tests and embedding.
pub trait ManifestSource {
	/// Where the entries come from, for errors and logs.
	fn location(&self) -> String;

	/// Candidate entry keys: index keys or archive member paths.
	fn entries(&self) -> Result<Vec<String>>;

	/// Raw bytes of one entry.
	fn load(&mut self, entry: &str) -> Result<Vec<u8>>;
}

/// In-memory entry store.
#[derive(Debug, Default)]
pub struct InMemorySource {
	entries: BTreeMap<String, Vec<u8>>,
}

impl InMemorySource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn add(&mut self, entry: &str, data: Vec<u8>) {
		self.entries.insert(entry.to_string(), data);
	}
}

impl ManifestSource for InMemorySource {
	fn location(&self) -> String {
		"<memory>".to_string()
	}

	fn entries(&self) -> Result<Vec<String>> {
		Ok(self.entries.keys().cloned().collect())
	}

	fn load(&mut self, entry: &str) -> Result<Vec<u8>> {
		self
			.entries
			.get(entry)
			.cloned()
			.ok_or_else(|| SymbolicateError::not_found(entry, self.location()))
	}
}

/// Generated file name to validated source map.
///
/// Built once, then only read.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
	maps: HashMap<String, SourceMapDocument>,
	location: String,
}

impl Manifest {
	/// Empty manifest; `location` names where it was loaded from.
	pub fn new(location: impl Into<String>) -> Self {
		Self {
			maps: HashMap::new(),
			location: location.into(),
		}
	}

	/// Insert a document under its own `file` field. Returns the document it
	/// replaced, if any.
	pub fn insert(&mut self, document: SourceMapDocument) -> Option<SourceMapDocument> {
		self.maps.insert(document.file.clone(), document)
	}

	pub fn get(&self, file: &str) -> Option<&SourceMapDocument> {
		self.maps.get(file)
	}

	/// Like [`Manifest::get`], but a missing file is an error.
	pub fn require(&self, file: &str) -> Result<&SourceMapDocument> {
		self
			.get(file)
			.ok_or_else(|| SymbolicateError::not_found(file, &self.location))
	}

	pub fn location(&self) -> &str {
		&self.location
	}

	/// Generated file names, in no particular order.
	pub fn files(&self) -> impl Iterator<Item = &str> {
		self.maps.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.maps.len()
	}

	pub fn is_empty(&self) -> bool {
		self.maps.is_empty()
	}
}

/// Decode a JSON document, naming `location` on failure.
pub fn parse_json(data: &[u8], location: &str) -> Result<Value> {
	serde_json::from_slice(data).map_err(|e| SymbolicateError::invalid_json(location, e))
}

/// Build a manifest from every entry of `source` that matches `pattern`.
///
/// Each matching entry is loaded, decoded and validated; the first failure
/// aborts the build. Entries that do not match are ignored. Documents are
/// keyed by their own `file` field, not by the entry key.
#[instrument(skip_all, fields(location = %source.location(), pattern = %pattern.as_str()))]
pub fn build_manifest<S: ManifestSource + ?Sized>(
	source: &mut S,
	pattern: &MapPattern,
) -> Result<Manifest> {
	let location = source.location();
	let mut manifest = Manifest::new(location.clone());
	let mut origins: HashMap<String, String> = HashMap::new();

	for entry in source.entries()? {
		if !pattern.is_match(&entry) {
			debug!(entry = %entry, "ignoring entry");
			continue;
		}

		let data = source.load(&entry)?;
		let value = parse_json(&data, &entry)?;
		let document = SourceMapDocument::parse(&value).map_err(|e| {
			warn!(entry = %entry, error = %e, "invalid source map");
			e
		})?;

		debug!(entry = %entry, file = %document.file, "loaded source map");
		let file = document.file.clone();
		if manifest.insert(document).is_some() {
			warn!(
				entry = %entry,
				replaced = origins.get(&file).map(String::as_str).unwrap_or_default(),
				file = %file,
				"source map replaces an earlier map for the same file"
			);
		}
		origins.insert(file, entry);
	}

	info!(maps = manifest.len(), location = %location, "built manifest");
	Ok(manifest)
}
