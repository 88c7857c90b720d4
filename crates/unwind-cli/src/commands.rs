// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tracing::{info, instrument};
use unwind_config::UnwindConfig;
use unwind_core::SourceMapDocument;
use unwind_symbolicate::{
	load_error_stack, load_source_map, open_manifest, rebase, MapPattern, OriginalPosition,
	ParsedSourceMap, PositionResolver, SymbolicateError, UNKNOWN_SOURCE,
};

use crate::args::Mode;
use crate::query::Query;

/// Run `mode`, writing results to `out`.
pub fn execute(mode: &Mode, config: &UnwindConfig, out: &mut dyn Write) -> Result<()> {
	match mode {
		Mode::ManifestQuery { manifest, query } => {
			let pattern = MapPattern::new(&config.manifest.map_pattern)?;
			let position = query_manifest(manifest, &pattern, query)?;
			print_position(out, &position)
		}
		Mode::MapQuery { map, query } => {
			let position = query_map(map, query)?;
			print_position(out, &position)
		}
		Mode::Stack {
			manifest,
			stack,
			json,
		} => {
			let pattern = MapPattern::new(&config.manifest.map_pattern)?;
			rebase_stack(manifest, &pattern, stack, *json, out)
		}
	}
}

/// Resolve `query` through the manifest at `manifest_path`.
#[instrument(skip_all, fields(manifest = %manifest_path.display(), query = %query))]
pub fn query_manifest(
	manifest_path: &Path,
	pattern: &MapPattern,
	query: &Query,
) -> unwind_symbolicate::Result<OriginalPosition> {
	let manifest = open_manifest(manifest_path, pattern)?;
	let document = manifest.require(&query.file)?;
	resolve(document, query)
}

/// Resolve `query` against the single map at `map_path`. The query's file
/// name is not checked against the map.
#[instrument(skip_all, fields(map = %map_path.display(), query = %query))]
pub fn query_map(map_path: &Path, query: &Query) -> unwind_symbolicate::Result<OriginalPosition> {
	let document = load_source_map(map_path)?;
	resolve(&document, query)
}

fn resolve(
	document: &SourceMapDocument,
	query: &Query,
) -> unwind_symbolicate::Result<OriginalPosition> {
	let resolver = ParsedSourceMap::from_document(document)?;
	let position = resolver.original_position_for(query.line, query.column)?;
	if position.is_empty() {
		return Err(SymbolicateError::NoMappingFound {
			file: query.file.clone(),
			line: query.line,
			column: query.column,
		});
	}
	Ok(position)
}

fn print_position(out: &mut dyn Write, position: &OriginalPosition) -> Result<()> {
	writeln!(
		out,
		"file: {}",
		position.source.as_deref().unwrap_or(UNKNOWN_SOURCE)
	)?;
	writeln!(out, "line: {}", position.line.unwrap_or(0))?;
	writeln!(out, "column: {}", position.column.unwrap_or(0))?;
	Ok(())
}

fn rebase_stack(
	manifest_path: &Path,
	pattern: &MapPattern,
	stack_path: &Path,
	json: bool,
	out: &mut dyn Write,
) -> Result<()> {
	let manifest = open_manifest(manifest_path, pattern)?;
	let mut stack = load_error_stack(stack_path)?;

	let summary = rebase(&mut stack, &manifest)?;
	info!(
		total = summary.total,
		rebased = summary.rebased,
		skipped = summary.skipped,
		"stack rebased"
	);

	if json {
		serde_json::to_writer_pretty(&mut *out, &stack)?;
		writeln!(out)?;
	} else {
		write!(out, "{stack}")?;
	}
	Ok(())
}
