// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Manifest back-ends and document loading from disk.
//!
//! Two suppliers feed [`build_manifest`]:
//! - [`DirectorySource`]: a JSON index file whose keys are map paths relative
//!   to the index's directory
//! - [`ArchiveSource`]: a zip archive whose member paths are the keys

use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;
use unwind_core::{ErrorStack, FieldType, SourceMapDocument, ValidationError};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Result, SymbolicateError};
use crate::manifest::{build_manifest, parse_json, Manifest, ManifestSource, MapPattern};

/// Read and decode a JSON file.
pub fn read_json(path: &Path) -> Result<Value> {
	let data = std::fs::read(path)?;
	parse_json(&data, &path.display().to_string())
}

/// Read and validate a single source map file.
pub fn load_source_map(path: &Path) -> Result<SourceMapDocument> {
	let value = read_json(path)?;
	Ok(SourceMapDocument::parse(&value)?)
}

/// Read and validate an error stack file.
pub fn load_error_stack(path: &Path) -> Result<ErrorStack> {
	let value = read_json(path)?;
	Ok(ErrorStack::parse(&value)?)
}

/// Whether `path` names a zip archive rather than an index file.
pub fn is_archive(path: &Path) -> bool {
	path
		.extension()
		.is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
}

/// Build a manifest from an index file or a `.zip` archive.
pub fn open_manifest(path: &Path, pattern: &MapPattern) -> Result<Manifest> {
	if is_archive(path) {
		let mut source = ArchiveSource::open(path)?;
		build_manifest(&mut source, pattern)
	} else {
		let mut source = DirectorySource::open(path)?;
		build_manifest(&mut source, pattern)
	}
}

/// Index file on disk. Keys are map paths relative to the index's directory;
/// values are not inspected.
#[derive(Debug)]
pub struct DirectorySource {
	index_path: PathBuf,
	root: PathBuf,
	index: Map<String, Value>,
}

impl DirectorySource {
	pub fn open(index_path: impl AsRef<Path>) -> Result<Self> {
		let index_path = index_path.as_ref().to_path_buf();
		let location = index_path.display().to_string();

		let index = match read_json(&index_path)? {
			Value::Object(index) => index,
			_ => {
				return Err(ValidationError::WrongType {
					field: location,
					expected: FieldType::Object,
				}
				.into())
			}
		};

		let root = index_path
			.parent()
			.map(Path::to_path_buf)
			.unwrap_or_default();

		debug!(index = %location, keys = index.len(), "opened manifest index");
		Ok(Self {
			index_path,
			root,
			index,
		})
	}
}

impl ManifestSource for DirectorySource {
	fn location(&self) -> String {
		self.index_path.display().to_string()
	}

	fn entries(&self) -> Result<Vec<String>> {
		Ok(self.index.keys().cloned().collect())
	}

	fn load(&mut self, entry: &str) -> Result<Vec<u8>> {
		let path = self.root.join(entry);
		debug!(path = %path.display(), "reading source map");
		Ok(std::fs::read(path)?)
	}
}

/// Zip archive whose member paths are manifest entries.
pub struct ArchiveSource<R: Read + Seek> {
	archive: ZipArchive<R>,
	location: String,
}

impl ArchiveSource<File> {
	pub fn open(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let file = File::open(path)?;
		Self::from_reader(file, path.display().to_string())
	}
}

impl<R: Read + Seek> ArchiveSource<R> {
	pub fn from_reader(reader: R, location: impl Into<String>) -> Result<Self> {
		let archive = ZipArchive::new(reader)?;
		let location = location.into();
		debug!(archive = %location, members = archive.len(), "opened manifest archive");
		Ok(Self { archive, location })
	}
}

impl<R: Read + Seek> ManifestSource for ArchiveSource<R> {
	fn location(&self) -> String {
		self.location.clone()
	}

	fn entries(&self) -> Result<Vec<String>> {
		Ok(self
			.archive
			.file_names()
			.filter(|name| !name.ends_with('/'))
			.map(str::to_string)
			.collect())
	}

	fn load(&mut self, entry: &str) -> Result<Vec<u8>> {
		let mut member = match self.archive.by_name(entry) {
			Ok(member) => member,
			Err(ZipError::FileNotFound) => {
				return Err(SymbolicateError::not_found(entry, &self.location))
			}
			Err(e) => return Err(e.into()),
		};

		let mut data = Vec::new();
		member.read_to_end(&mut data)?;
		Ok(data)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::{Cursor, Write};
	use tempfile::tempdir;
	use zip::write::SimpleFileOptions;
	use zip::{CompressionMethod, ZipWriter};

	const MAP: &str = r#"{"version": 3, "file": "bundle.js", "sources": ["src/app.ts"], "mappings": "AAAA"}"#;

	fn zip_bytes(members: &[(&str, &str)]) -> Vec<u8> {
		let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
		let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
		for (name, content) in members {
			writer.start_file(*name, options).unwrap();
			writer.write_all(content.as_bytes()).unwrap();
		}
		writer.finish().unwrap().into_inner()
	}

	#[test]
	fn directory_source_resolves_relative_to_index() {
		let dir = tempdir().unwrap();
		std::fs::create_dir_all(dir.path().join("js")).unwrap();
		std::fs::write(dir.path().join("js/bundle.js.map"), MAP).unwrap();
		std::fs::write(
			dir.path().join("manifest.json"),
			r#"{"js/bundle.js.map": "js/bundle.js.map", "publicPath": "/static/"}"#,
		)
		.unwrap();

		let manifest =
			open_manifest(&dir.path().join("manifest.json"), &MapPattern::default()).unwrap();
		assert_eq!(manifest.len(), 1);
		assert!(manifest.get("bundle.js").is_some());
	}

	#[test]
	fn directory_source_missing_map_is_io_error() {
		let dir = tempdir().unwrap();
		std::fs::write(dir.path().join("manifest.json"), r#"{"gone.js.map": 1}"#).unwrap();

		let err = open_manifest(&dir.path().join("manifest.json"), &MapPattern::default())
			.unwrap_err();
		assert!(matches!(err, SymbolicateError::Io(_)));
	}

	#[test]
	fn index_must_be_an_object() {
		let dir = tempdir().unwrap();
		std::fs::write(dir.path().join("manifest.json"), r#"["bundle.js.map"]"#).unwrap();

		let err = DirectorySource::open(dir.path().join("manifest.json")).unwrap_err();
		assert!(matches!(
			err,
			SymbolicateError::Validation(ValidationError::WrongType { .. })
		));
	}

	#[test]
	fn archive_source_lists_members() {
		let data = zip_bytes(&[
			("static/js/bundle.js.map", MAP),
			("static/js/bundle.js", "console.log(1)"),
		]);
		let source = ArchiveSource::from_reader(Cursor::new(data), "release.zip").unwrap();

		let mut entries = source.entries().unwrap();
		entries.sort();
		assert_eq!(entries, vec!["static/js/bundle.js", "static/js/bundle.js.map"]);
	}

	#[test]
	fn archive_manifest_keys_by_declared_file() {
		let data = zip_bytes(&[("static/js/bundle.js.map", MAP), ("README.md", "hi")]);
		let mut source = ArchiveSource::from_reader(Cursor::new(data), "release.zip").unwrap();

		let manifest = build_manifest(&mut source, &MapPattern::default()).unwrap();
		assert_eq!(manifest.files().collect::<Vec<_>>(), vec!["bundle.js"]);
		assert_eq!(manifest.location(), "release.zip");
	}

	#[test]
	fn archive_missing_member_is_not_found() {
		let data = zip_bytes(&[("a.js.map", MAP)]);
		let mut source = ArchiveSource::from_reader(Cursor::new(data), "release.zip").unwrap();

		assert!(matches!(
			source.load("b.js.map"),
			Err(SymbolicateError::NotFound { .. })
		));
	}

	#[test]
	fn open_manifest_detects_archives() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("release.ZIP");
		std::fs::write(&path, zip_bytes(&[("bundle.js.map", MAP)])).unwrap();

		assert!(is_archive(&path));
		let manifest = open_manifest(&path, &MapPattern::default()).unwrap();
		assert_eq!(manifest.len(), 1);
	}

	#[test]
	fn load_error_stack_validates() {
		let dir = tempdir().unwrap();
		let path = dir.path().join("error.json");
		std::fs::write(&path, r#"{"name": "Error", "message": "m", "frames": "nope"}"#).unwrap();

		assert!(matches!(
			load_error_stack(&path),
			Err(SymbolicateError::Validation(_))
		));
	}
}
