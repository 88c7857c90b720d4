// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error stack types.
//!
//! An `ErrorStack` is one error occurrence as reported by a V8-style runtime:
//! the error name, its message and the call frames, outermost first.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::validate::{ElementType, Scope};

/// One error occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStack {
	/// Error class name, e.g. `TypeError`.
	pub name: String,
	pub message: String,
	/// Frames in call order. The order is preserved by every operation.
	pub frames: Vec<ErrorFrame>,
}

/// A single stack frame.
///
/// Frames built through [`ErrorStack::parse`], [`ErrorFrame::new`] or
/// [`ErrorFrame::native`] always carry both coordinates unless they are
/// native.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorFrame {
	/// Generated-code file identifier.
	pub file_name: String,
	pub function_name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub line_number: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub column_number: Option<u32>,
	/// Platform/runtime frame without source coordinates.
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub is_native: bool,
}

impl ErrorStack {
	/// Validate a decoded JSON document and build a typed stack from it.
	///
	/// Checks `name`, `message` and `frames`, then each frame in order. For a
	/// frame whose `isNative` is falsy, `lineNumber` and `columnNumber` must
	/// parse as numbers; numeric strings are accepted. The first failure is
	/// returned.
	pub fn parse(value: &Value) -> Result<Self> {
		let root = Scope::root(value);

		let name = root.string("name")?.to_string();
		let message = root.string("message")?.to_string();
		let frames = root
			.elements("frames", ElementType::Object)?
			.iter()
			.map(ErrorFrame::parse)
			.collect::<Result<Vec<_>>>()?;

		Ok(Self {
			name,
			message,
			frames,
		})
	}

	/// Number of frames that have source coordinates.
	pub fn positioned_frames(&self) -> usize {
		self
			.frames
			.iter()
			.filter(|f| f.position().is_some())
			.count()
	}
}

impl TryFrom<&Value> for ErrorStack {
	type Error = crate::error::ValidationError;

	fn try_from(value: &Value) -> Result<Self> {
		Self::parse(value)
	}
}

impl ErrorFrame {
	/// A frame with generated-code coordinates.
	pub fn new(
		file_name: impl Into<String>,
		function_name: impl Into<String>,
		line_number: u32,
		column_number: u32,
	) -> Self {
		Self {
			file_name: file_name.into(),
			function_name: function_name.into(),
			line_number: Some(line_number),
			column_number: Some(column_number),
			is_native: false,
		}
	}

	/// A native frame. It has no coordinates and is never rebased.
	pub fn native(file_name: impl Into<String>, function_name: impl Into<String>) -> Self {
		Self {
			file_name: file_name.into(),
			function_name: function_name.into(),
			line_number: None,
			column_number: None,
			is_native: true,
		}
	}

	fn parse(scope: &Scope<'_>) -> Result<Self> {
		let file_name = scope.string("fileName")?.to_string();
		let function_name = scope.string("functionName")?.to_string();

		if scope.truthy("isNative") {
			return Ok(Self::native(file_name, function_name));
		}

		let column_number = scope.coordinate("columnNumber")?;
		let line_number = scope.coordinate("lineNumber")?;

		Ok(Self::new(file_name, function_name, line_number, column_number))
	}

	/// `(line, column)` when the frame can be rebased.
	pub fn position(&self) -> Option<(u32, u32)> {
		if self.is_native {
			return None;
		}
		match (self.line_number, self.column_number) {
			(Some(line), Some(column)) => Some((line, column)),
			_ => None,
		}
	}
}
