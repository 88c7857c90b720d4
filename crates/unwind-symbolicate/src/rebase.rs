// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Stack rebasing: rewriting generated-code frames to original positions.
//!
//! Frames are rewritten in place and in order. A frame is left untouched
//! when its file has no source map in the manifest, when it is native, when
//! it has no coordinates, or when the resolver finds no mapping for it.
//! Leaving some frames alone is normal; leaving all of them alone is a
//! failure, since the result would be no better than the input.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{debug, info, instrument};
use unwind_core::{ErrorFrame, ErrorStack, SourceMapDocument};

use crate::error::{Result, SymbolicateError};
use crate::manifest::Manifest;
use crate::sourcemap::{OriginalPosition, ParsedSourceMap, PositionResolver};

/// Placeholder file name when a mapping has no source.
pub const UNKNOWN_SOURCE: &str = "??";

/// Placeholder function name when a mapping has no name.
pub const UNKNOWN_FUNCTION: &str = "<??>";

/// Outcome of a successful rebase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebaseSummary {
	/// Frames in the stack.
	pub total: usize,
	/// Frames rewritten to original positions.
	pub rebased: usize,
	/// Frames left as they were.
	pub skipped: usize,
}

/// Rebase every eligible frame of `stack` using the source maps in
/// `manifest`.
///
/// Each distinct source map is decoded at most once. Fails with
/// [`SymbolicateError::RebaseFailed`] when no frame could be rebased.
pub fn rebase(stack: &mut ErrorStack, manifest: &Manifest) -> Result<RebaseSummary> {
	rebase_with(stack, manifest, ParsedSourceMap::from_document)
}

/// [`rebase`] with a caller-supplied resolver constructor.
///
/// `build` is called once per distinct manifest entry, and only for entries
/// that at least one frame needs.
#[instrument(skip_all, fields(error = %stack.name, frame_count = stack.frames.len()))]
pub fn rebase_with<R, F>(
	stack: &mut ErrorStack,
	manifest: &Manifest,
	mut build: F,
) -> Result<RebaseSummary>
where
	R: PositionResolver,
	F: FnMut(&SourceMapDocument) -> Result<R>,
{
	let mut resolvers: HashMap<String, R> = HashMap::new();
	let mut summary = RebaseSummary {
		total: stack.frames.len(),
		..RebaseSummary::default()
	};

	for (index, frame) in stack.frames.iter_mut().enumerate() {
		let Some(document) = manifest.get(&frame.file_name) else {
			debug!(index, file = %frame.file_name, "no source map for frame, skipping");
			summary.skipped += 1;
			continue;
		};

		let Some((line, column)) = frame.position() else {
			debug!(index, file = %frame.file_name, "frame is native or has no position, skipping");
			summary.skipped += 1;
			continue;
		};

		let resolver = match resolvers.entry(frame.file_name.clone()) {
			Entry::Occupied(entry) => entry.into_mut(),
			Entry::Vacant(entry) => entry.insert(build(document)?),
		};

		let original = resolver.original_position_for(line, column)?;
		if original.is_empty() {
			debug!(index, file = %frame.file_name, line, column, "no mapping for frame position");
			summary.skipped += 1;
			continue;
		}

		debug!(
			index,
			file = %frame.file_name,
			line,
			column,
			original_source = ?original.source,
			original_line = ?original.line,
			"rebased frame"
		);
		apply(frame, original);
		summary.rebased += 1;
	}

	if summary.rebased == 0 {
		return Err(SymbolicateError::RebaseFailed);
	}

	info!(
		rebased = summary.rebased,
		skipped = summary.skipped,
		"rebased error stack"
	);
	Ok(summary)
}

fn apply(frame: &mut ErrorFrame, original: OriginalPosition) {
	frame.file_name = original.source.unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
	frame.function_name = original.name.unwrap_or_else(|| UNKNOWN_FUNCTION.to_string());
	frame.line_number = Some(original.line.unwrap_or(0));
	frame.column_number = Some(original.column.unwrap_or(0));
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::{Cell, RefCell};

	fn document(file: &str) -> SourceMapDocument {
		SourceMapDocument {
			file: file.to_string(),
			version: 3.0,
			mappings: "AAAA,SAASA;AACT,K".to_string(),
			sources: vec![format!("src/{}.ts", file.trim_end_matches(".js"))],
			names: vec!["greet".to_string()],
			source_root: None,
		}
	}

	fn manifest(files: &[&str]) -> Manifest {
		let mut manifest = Manifest::new("test");
		for file in files {
			manifest.insert(document(file));
		}
		manifest
	}

	fn stack(frames: Vec<ErrorFrame>) -> ErrorStack {
		ErrorStack {
			name: "TypeError".to_string(),
			message: "x is not defined".to_string(),
			frames,
		}
	}

	/// Resolver that records its queries and answers with a fixed position.
	struct Recording<'a> {
		calls: &'a RefCell<Vec<(u32, u32)>>,
		answer: OriginalPosition,
	}

	impl PositionResolver for Recording<'_> {
		fn original_position_for(&self, line: u32, column: u32) -> Result<OriginalPosition> {
			self.calls.borrow_mut().push((line, column));
			Ok(self.answer.clone())
		}
	}

	#[test]
	fn rebases_frames_with_maps() {
		let manifest = manifest(&["bundle.js"]);
		let mut stack = stack(vec![ErrorFrame::new("bundle.js", "a", 1, 12)]);

		let summary = rebase(&mut stack, &manifest).unwrap();

		assert_eq!(summary.rebased, 1);
		assert_eq!(stack.frames[0], ErrorFrame::new("src/bundle.ts", "greet", 1, 9));
	}

	#[test]
	fn partial_rebase_succeeds() {
		let manifest = manifest(&["bundle.js"]);
		let vendor = ErrorFrame::new("vendor.js", "v", 3, 4);
		let native = ErrorFrame::native("native", "Array.forEach");
		let mut stack = stack(vec![
			vendor.clone(),
			ErrorFrame::new("bundle.js", "b", 2, 0),
			native.clone(),
		]);

		let summary = rebase(&mut stack, &manifest).unwrap();

		assert_eq!(
			summary,
			RebaseSummary {
				total: 3,
				rebased: 1,
				skipped: 2,
			}
		);
		assert_eq!(stack.frames[0], vendor);
		assert_eq!(stack.frames[1], ErrorFrame::new("src/bundle.ts", UNKNOWN_FUNCTION, 2, 0));
		assert_eq!(stack.frames[2], native);
	}

	#[test]
	fn zero_rebased_frames_is_an_error() {
		let manifest = manifest(&["bundle.js"]);
		let mut stack = stack(vec![
			ErrorFrame::new("vendor.js", "v", 1, 0),
			ErrorFrame::new("other.js", "o", 1, 0),
		]);
		let before = stack.clone();

		let err = rebase(&mut stack, &manifest).unwrap_err();

		assert!(matches!(err, SymbolicateError::RebaseFailed));
		assert_eq!(stack, before);
	}

	#[test]
	fn empty_stack_cannot_be_rebased() {
		let mut stack = stack(Vec::new());
		assert!(matches!(
			rebase(&mut stack, &manifest(&["bundle.js"])),
			Err(SymbolicateError::RebaseFailed)
		));
	}

	#[test]
	fn native_frames_never_reach_the_resolver() {
		let manifest = manifest(&["bundle.js"]);
		let calls = RefCell::new(Vec::new());
		let native = ErrorFrame {
			is_native: true,
			..ErrorFrame::new("bundle.js", "native", 9, 9)
		};
		let mut stack = stack(vec![native.clone(), ErrorFrame::new("bundle.js", "f", 1, 2)]);

		let summary = rebase_with(&mut stack, &manifest, |_| {
			Ok(Recording {
				calls: &calls,
				answer: OriginalPosition {
					source: Some("src/a.ts".to_string()),
					name: Some("f".to_string()),
					line: Some(3),
					column: Some(4),
				},
			})
		})
		.unwrap();

		assert_eq!(summary.rebased, 1);
		assert_eq!(*calls.borrow(), vec![(1, 2)]);
		assert_eq!(stack.frames[0], native);
	}

	#[test]
	fn no_match_is_not_counted() {
		let manifest = manifest(&["bundle.js"]);
		let calls = RefCell::new(Vec::new());
		let untouched = ErrorFrame::new("bundle.js", "f", 1, 2);
		let mut stack = stack(vec![untouched.clone()]);

		let err = rebase_with(&mut stack, &manifest, |_| {
			Ok(Recording {
				calls: &calls,
				answer: OriginalPosition::none(),
			})
		})
		.unwrap_err();

		assert!(matches!(err, SymbolicateError::RebaseFailed));
		assert_eq!(calls.borrow().len(), 1);
		assert_eq!(stack.frames[0], untouched);
	}

	#[test]
	fn no_match_alongside_a_match_is_skipped() {
		let manifest = manifest(&["bundle.js"]);
		// Line 2, column 5 hits an unmapped segment.
		let unmapped = ErrorFrame::new("bundle.js", "g", 2, 5);
		let mut stack = stack(vec![ErrorFrame::new("bundle.js", "f", 1, 0), unmapped.clone()]);

		let summary = rebase(&mut stack, &manifest).unwrap();

		assert_eq!(summary.rebased, 1);
		assert_eq!(summary.skipped, 1);
		assert_eq!(stack.frames[1], unmapped);
	}

	#[test]
	fn partial_positions_use_placeholders() {
		let manifest = manifest(&["bundle.js"]);
		let calls = RefCell::new(Vec::new());
		let mut stack = stack(vec![ErrorFrame::new("bundle.js", "f", 1, 2)]);

		rebase_with(&mut stack, &manifest, |_| {
			Ok(Recording {
				calls: &calls,
				answer: OriginalPosition {
					line: Some(7),
					..OriginalPosition::none()
				},
			})
		})
		.unwrap();

		assert_eq!(
			stack.frames[0],
			ErrorFrame::new(UNKNOWN_SOURCE, UNKNOWN_FUNCTION, 7, 0)
		);
	}

	#[test]
	fn resolvers_are_built_once_per_map() {
		let manifest = manifest(&["bundle.js", "chunk.js"]);
		let builds = Cell::new(0);
		let mut stack = stack(vec![
			ErrorFrame::new("bundle.js", "a", 1, 0),
			ErrorFrame::new("bundle.js", "b", 1, 9),
			ErrorFrame::new("chunk.js", "c", 2, 0),
			ErrorFrame::new("missing.js", "d", 1, 0),
		]);

		let summary = rebase_with(&mut stack, &manifest, |doc| {
			builds.set(builds.get() + 1);
			ParsedSourceMap::from_document(doc)
		})
		.unwrap();

		assert_eq!(builds.get(), 2);
		assert_eq!(summary.rebased, 3);
	}

	#[test]
	fn resolver_errors_propagate() {
		let mut manifest = Manifest::new("test");
		manifest.insert(SourceMapDocument {
			mappings: "!!!".to_string(),
			..document("bundle.js")
		});
		let mut stack = stack(vec![ErrorFrame::new("bundle.js", "f", 1, 0)]);

		assert!(matches!(
			rebase(&mut stack, &manifest),
			Err(SymbolicateError::InvalidVlqChar('!'))
		));
	}
}
