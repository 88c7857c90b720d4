// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
	let stdout = io::stdout();
	let stderr = io::stderr();

	let code = unwind_cli::run(std::env::args_os(), &mut stdout.lock(), &mut stderr.lock());
	ExitCode::from(code)
}
