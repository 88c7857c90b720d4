// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! End-to-end symbolication: files on disk through to formatted output.

use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;

use proptest::prelude::*;
use tempfile::tempdir;
use unwind_core::{format_stack, ErrorFrame, ErrorStack, ValidationError};
use unwind_symbolicate::{
	load_error_stack, load_source_map, open_manifest, rebase, MapPattern, ParsedSourceMap,
	PositionResolver, RebaseSummary, SymbolicateError,
};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const BUNDLE_MAP: &str = r#"{
	"version": 3,
	"file": "bundle.js",
	"sources": ["src/app.ts"],
	"names": ["greet"],
	"mappings": "AAAA,SAASA;AACT"
}"#;

const VENDOR_MAP: &str = r#"{
	"version": 3,
	"file": "vendor.js",
	"sourceRoot": "node_modules/",
	"sources": ["lodash/lodash.js"],
	"mappings": "AAAA"
}"#;

const ERROR_JSON: &str = r#"{
	"name": "TypeError",
	"message": "x is not defined",
	"frames": [
		{ "functionName": "a", "fileName": "bundle.js", "lineNumber": "1", "columnNumber": 12 },
		{ "functionName": "b", "fileName": "bundle.js", "lineNumber": 2, "columnNumber": 3 },
		{ "functionName": "map", "fileName": "native", "isNative": true },
		{ "functionName": "c", "fileName": "third-party.js", "lineNumber": 7, "columnNumber": 1 }
	]
}"#;

const EXPECTED: &str = "TypeError: x is not defined
   at greet (src/app.ts:1:9)
   at <??> (src/app.ts:2:0)
   at map (native:?:?)
   at c (third-party.js:7:1)
";

fn write_directory_fixture(root: &Path) {
	fs::create_dir_all(root.join("static/js")).unwrap();
	fs::write(root.join("static/js/bundle.js.map"), BUNDLE_MAP).unwrap();
	fs::write(root.join("static/js/vendor.js.map"), VENDOR_MAP).unwrap();
	fs::write(
		root.join("asset-manifest.json"),
		r#"{
			"static/js/bundle.js": "static/js/bundle.js",
			"static/js/bundle.js.map": "static/js/bundle.js.map",
			"static/js/vendor.js.map": "static/js/vendor.js.map"
		}"#,
	)
	.unwrap();
	fs::write(root.join("error.json"), ERROR_JSON).unwrap();
}

fn write_archive(path: &Path, members: &[(&str, &str)]) {
	let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
	let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
	writer.add_directory("static/", options).unwrap();
	for (name, content) in members {
		writer.start_file(*name, options).unwrap();
		writer.write_all(content.as_bytes()).unwrap();
	}
	fs::write(path, writer.finish().unwrap().into_inner()).unwrap();
}

#[test]
fn directory_manifest_pipeline() {
	let dir = tempdir().unwrap();
	write_directory_fixture(dir.path());

	let manifest = open_manifest(
		&dir.path().join("asset-manifest.json"),
		&MapPattern::default(),
	)
	.unwrap();
	assert_eq!(manifest.len(), 2);

	let mut stack = load_error_stack(&dir.path().join("error.json")).unwrap();
	let summary = rebase(&mut stack, &manifest).unwrap();

	assert_eq!(
		summary,
		RebaseSummary {
			total: 4,
			rebased: 2,
			skipped: 2,
		}
	);
	assert_eq!(format_stack(&stack), EXPECTED);
}

#[test]
fn archive_manifest_pipeline() {
	let dir = tempdir().unwrap();
	let archive = dir.path().join("release.zip");
	write_archive(
		&archive,
		&[
			("static/js/bundle.js.map", BUNDLE_MAP),
			("static/js/vendor.js.map", VENDOR_MAP),
			("static/js/bundle.js", "console.log(1)"),
		],
	);
	fs::write(dir.path().join("error.json"), ERROR_JSON).unwrap();

	let manifest = open_manifest(&archive, &MapPattern::default()).unwrap();
	let mut stack = load_error_stack(&dir.path().join("error.json")).unwrap();
	rebase(&mut stack, &manifest).unwrap();

	assert_eq!(stack.to_string(), EXPECTED);
}

#[test]
fn source_root_is_applied_to_rebased_frames() {
	let dir = tempdir().unwrap();
	write_directory_fixture(dir.path());
	let manifest = open_manifest(
		&dir.path().join("asset-manifest.json"),
		&MapPattern::default(),
	)
	.unwrap();

	let mut stack = ErrorStack {
		name: "RangeError".to_string(),
		message: "too deep".to_string(),
		frames: vec![ErrorFrame::new("vendor.js", "chunk", 1, 40)],
	};
	rebase(&mut stack, &manifest).unwrap();

	assert_eq!(
		stack.frames[0],
		ErrorFrame::new("node_modules/lodash/lodash.js", "<??>", 1, 0)
	);
}

#[test]
fn stack_outside_the_manifest_fails_to_rebase() {
	let dir = tempdir().unwrap();
	write_directory_fixture(dir.path());
	let manifest = open_manifest(
		&dir.path().join("asset-manifest.json"),
		&MapPattern::default(),
	)
	.unwrap();

	let mut stack = ErrorStack {
		name: "Error".to_string(),
		message: "boom".to_string(),
		frames: vec![ErrorFrame::new("elsewhere.js", "f", 1, 0)],
	};

	let err = rebase(&mut stack, &manifest).unwrap_err();
	assert!(matches!(err, SymbolicateError::RebaseFailed));
	assert_eq!(err.to_string(), "the error stack could not be rebased");
}

#[test]
fn invalid_map_in_manifest_names_the_field() {
	let dir = tempdir().unwrap();
	fs::write(
		dir.path().join("bad.js.map"),
		r#"{"version": 3, "file": "bad.js", "sources": "src/a.ts", "mappings": ""}"#,
	)
	.unwrap();
	fs::write(dir.path().join("manifest.json"), r#"{"bad.js.map": true}"#).unwrap();

	let err = open_manifest(&dir.path().join("manifest.json"), &MapPattern::default())
		.unwrap_err();
	match err {
		SymbolicateError::Validation(ValidationError::WrongType { field, .. }) => {
			assert_eq!(field, "sources")
		}
		other => panic!("unexpected error: {other}"),
	}
}

#[test]
fn single_map_query() {
	let dir = tempdir().unwrap();
	let path = dir.path().join("bundle.js.map");
	fs::write(&path, BUNDLE_MAP).unwrap();

	let document = load_source_map(&path).unwrap();
	let resolver = ParsedSourceMap::from_document(&document).unwrap();
	let position = resolver.original_position_for(1, 10).unwrap();

	assert_eq!(position.source.as_deref(), Some("src/app.ts"));
	assert_eq!(position.line, Some(1));
	assert_eq!(position.column, Some(9));
}

proptest! {
	#[test]
	fn frames_outside_the_manifest_are_never_touched(
		file in "[a-z]{1,8}\\.js",
		line in 1u32..10_000,
		column in 0u32..10_000,
	) {
		prop_assume!(file != "bundle.js");

		let mut manifest = unwind_symbolicate::Manifest::new("test");
		manifest.insert(
			load_source_map_from_str(BUNDLE_MAP),
		);

		let outsider = ErrorFrame::new(file, "f", line, column);
		let mut stack = ErrorStack {
			name: "Error".to_string(),
			message: "m".to_string(),
			frames: vec![ErrorFrame::new("bundle.js", "a", 1, 0), outsider.clone()],
		};

		let summary = rebase(&mut stack, &manifest).unwrap();
		prop_assert_eq!(summary.rebased, 1);
		prop_assert_eq!(&stack.frames[1], &outsider);
	}
}

fn load_source_map_from_str(json: &str) -> unwind_core::SourceMapDocument {
	let value: serde_json::Value = serde_json::from_str(json).unwrap();
	unwind_core::SourceMapDocument::parse(&value).unwrap()
}
