// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The `unwind-js` command line tool.
//!
//! ```text
//! unwind-js -manifest dist/asset-manifest.json main.3f2a.js:1:4023
//! unwind-js -map dist/main.3f2a.js.map main.3f2a.js:1:4023
//! unwind-js -manifest dist/asset-manifest.json --stack error.json
//! ```
//!
//! Results go to stdout. Failures are reported as a single line on stderr
//! and a non-zero exit status. Incomplete or malformed arguments print the
//! usage text and exit successfully.

pub mod args;
pub mod commands;
pub mod query;
pub mod runtime;

use std::ffi::OsString;
use std::io::Write;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::debug;
use unwind_config::UnwindConfig;

pub use args::{normalize_args, Args, Mode, UsageError, NAME, USAGE};
pub use query::{InvalidQuery, Query};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;

/// Full invocation: parse `argv`, settle the mode, load configuration,
/// initialize the runtime, and execute.
/// Configuration is loaded only for runnable arguments.
pub fn run<I, T>(argv: I, out: &mut dyn Write, err: &mut dyn Write) -> u8
where
	I: IntoIterator<Item = T>,
	T: Into<OsString>,
{
	let Some(args) = parse_args(argv, out, err) else {
		return EXIT_SUCCESS;
	};

	let mode = match args.mode() {
		Ok(mode) => mode,
		Err(usage) => return print_usage(err, &usage),
	};

	let config = match unwind_config::load_config(args.config.as_deref()) {
		Ok(config) => config,
		Err(e) => return report(err, &e.into()),
	};

	runtime::install(&config);
	execute(&mode, &config, out, err)
}

/// Parse arguments. `None` when there is nothing to run: help or version
/// was printed, or the arguments were rejected and usage was printed.
pub fn parse_args<I, T>(argv: I, out: &mut dyn Write, err: &mut dyn Write) -> Option<Args>
where
	I: IntoIterator<Item = T>,
	T: Into<OsString>,
{
	match Args::try_parse_from(normalize_args(argv)) {
		Ok(args) => Some(args),
		Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
			let _ = write!(out, "{}", e.render());
			None
		}
		Err(e) => {
			debug!(error = %e, "rejected arguments");
			let reason = e.kind().as_str().unwrap_or("invalid arguments");
			let _ = writeln!(err, "{NAME}: {reason}");
			let _ = writeln!(err);
			let _ = write!(err, "{USAGE}");
			None
		}
	}
}

/// Run parsed arguments against a loaded configuration.
pub fn dispatch(
	args: &Args,
	config: &UnwindConfig,
	out: &mut dyn Write,
	err: &mut dyn Write,
) -> u8 {
	match args.mode() {
		Ok(mode) => execute(&mode, config, out, err),
		Err(usage) => print_usage(err, &usage),
	}
}

fn execute(mode: &Mode, config: &UnwindConfig, out: &mut dyn Write, err: &mut dyn Write) -> u8 {
	debug!(?mode, "dispatching");
	match commands::execute(mode, config, out) {
		Ok(()) => EXIT_SUCCESS,
		Err(e) => report(err, &e),
	}
}

fn print_usage(err: &mut dyn Write, usage: &UsageError) -> u8 {
	if usage.has_message() {
		let _ = writeln!(err, "{NAME}: {usage}");
		let _ = writeln!(err);
	}
	let _ = write!(err, "{USAGE}");
	EXIT_SUCCESS
}

fn report(err: &mut dyn Write, error: &anyhow::Error) -> u8 {
	let _ = writeln!(err, "{NAME}: {error}");
	EXIT_FAILURE
}
