// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for unwind stack symbolication.
//!
//! This crate provides the data model shared by the symbolication engine and
//! the command line tool:
//! - `ErrorStack` / `ErrorFrame`: a V8-style error stack as reported at runtime
//! - `SourceMapDocument`: a validated version-3 source map
//! - Structural validation of untrusted JSON into those types
//! - V8-style rendering of a stack back to text
//!
//! # Example
//!
//! ```
//! use unwind_core::ErrorStack;
//!
//! let json = serde_json::json!({
//!     "name": "TypeError",
//!     "message": "x is not defined",
//!     "frames": [
//!         { "functionName": "foo", "fileName": "a.js", "lineNumber": 10, "columnNumber": 5 }
//!     ]
//! });
//!
//! let stack = ErrorStack::parse(&json).unwrap();
//! assert_eq!(stack.to_string(), "TypeError: x is not defined\n   at foo (a.js:10:5)\n");
//! ```

pub mod document;
pub mod error;
pub mod format;
pub mod stack;
pub mod validate;

pub use document::SourceMapDocument;
pub use error::{Result, ValidationError};
pub use format::format_stack;
pub use stack::{ErrorFrame, ErrorStack};
pub use validate::{check_number, check_type, ElementType, FieldType, Scope};
