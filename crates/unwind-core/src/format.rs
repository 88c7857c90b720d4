// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! V8-style stack rendering.
//!
//! ```text
//! TypeError: x is not defined
//!    at foo (a.js:10:5)
//! ```
//!
//! Every frame is rendered as `at <function> (<file>:<line>:<column>)`,
//! native frames included. An absent coordinate is rendered as `?`.

use std::fmt;

use crate::stack::{ErrorFrame, ErrorStack};

/// Render a stack in V8 format. Every line ends with a newline.
pub fn format_stack(stack: &ErrorStack) -> String {
	stack.to_string()
}

impl fmt::Display for ErrorStack {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "{}: {}", self.name, self.message)?;
		for frame in &self.frames {
			writeln!(f, "   at {}", frame)?;
		}
		Ok(())
	}
}

impl fmt::Display for ErrorFrame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{} ({}:{}:{})",
			self.function_name,
			self.file_name,
			Coordinate(self.line_number),
			Coordinate(self.column_number)
		)
	}
}

struct Coordinate(Option<u32>);

impl fmt::Display for Coordinate {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.0 {
			Some(n) => write!(f, "{}", n),
			None => write!(f, "?"),
		}
	}
}
