// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Source map symbolication engine for unwind.
//!
//! This crate provides functionality for:
//! - Building a manifest of source maps from an index file or a zip archive
//! - Decoding version-3 source map mappings and resolving single positions
//! - Rebasing a V8 error stack onto original source positions
//!
//! # Example
//!
//! ```
//! use unwind_core::{ErrorFrame, ErrorStack};
//! use unwind_symbolicate::{build_manifest, rebase, InMemorySource, MapPattern};
//!
//! let mut source = InMemorySource::new();
//! source.add(
//!     "static/js/bundle.js.map",
//!     br#"{
//!         "version": 3,
//!         "file": "bundle.js",
//!         "sources": ["src/app.ts"],
//!         "names": ["greet"],
//!         "mappings": "AAAA,SAASA"
//!     }"#
//!     .to_vec(),
//! );
//! let manifest = build_manifest(&mut source, &MapPattern::default()).unwrap();
//!
//! let mut stack = ErrorStack {
//!     name: "TypeError".to_string(),
//!     message: "x is not defined".to_string(),
//!     frames: vec![ErrorFrame::new("bundle.js", "a", 1, 12)],
//! };
//! rebase(&mut stack, &manifest).unwrap();
//!
//! assert_eq!(stack.to_string(), "TypeError: x is not defined\n   at greet (src/app.ts:1:9)\n");
//! ```

pub mod error;
pub mod loader;
pub mod manifest;
pub mod rebase;
pub mod sourcemap;
pub mod vlq;

// Re-export main types
pub use error::{Result, SymbolicateError};
pub use loader::{
	is_archive, load_error_stack, load_source_map, open_manifest, read_json, ArchiveSource,
	DirectorySource,
};
pub use manifest::{
	build_manifest, parse_json, InMemorySource, Manifest, ManifestSource, MapPattern,
	DEFAULT_MAP_PATTERN,
};
pub use rebase::{rebase, rebase_with, RebaseSummary, UNKNOWN_FUNCTION, UNKNOWN_SOURCE};
pub use sourcemap::{OriginalPosition, ParsedSourceMap, PositionResolver};
pub use vlq::{decode_mappings, decode_segment, DecodedMappings, Mapping, OriginalRef};
