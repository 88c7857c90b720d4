// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structural type checking of decoded JSON.
//!
//! Error stacks, source maps and manifest indexes all arrive as untrusted JSON.
//! The primitives here check one field at a time and fail on the first field
//! that is missing or mistyped. Typed decoders (`ErrorStack::parse`,
//! `SourceMapDocument::parse`) are built from them through [`Scope`].
//!
//! Numeric fields are lenient in the way loosely typed producers expect:
//! `"42"` is accepted wherever `42` is, following `parseFloat` semantics.

use std::fmt;

use serde_json::Value;

use crate::error::{Result, ValidationError};

/// Element type of a homogeneous array field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
	String,
	Number,
	Boolean,
	Object,
}

impl ElementType {
	fn matches(self, value: &Value) -> bool {
		match self {
			Self::String => value.is_string(),
			Self::Number => value.is_number(),
			Self::Boolean => value.is_boolean(),
			Self::Object => value.is_object(),
		}
	}

	fn as_str(self) -> &'static str {
		match self {
			Self::String => "string",
			Self::Number => "number",
			Self::Boolean => "boolean",
			Self::Object => "object",
		}
	}
}

/// Expected runtime type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
	String,
	Number,
	Boolean,
	/// Any non-array object.
	Object,
	/// Any array; elements are not inspected.
	Array,
	/// An array whose every element matches the element type.
	ArrayOf(ElementType),
}

impl FieldType {
	/// Whether `value` has this runtime type.
	pub fn matches(self, value: &Value) -> bool {
		match self {
			Self::String => value.is_string(),
			Self::Number => value.is_number(),
			Self::Boolean => value.is_boolean(),
			Self::Object => value.is_object(),
			Self::Array => value.is_array(),
			Self::ArrayOf(element) => value
				.as_array()
				.is_some_and(|items| items.iter().all(|item| element.matches(item))),
		}
	}
}

impl fmt::Display for FieldType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::String => write!(f, "string"),
			Self::Number => write!(f, "number"),
			Self::Boolean => write!(f, "boolean"),
			Self::Object => write!(f, "object"),
			Self::Array => write!(f, "array"),
			Self::ArrayOf(element) => write!(f, "{}[]", element.as_str()),
		}
	}
}

/// Check that `value.field` exists and has the expected type.
///
/// A `value` that is not an object has no fields, so any lookup on it
/// reports the field as missing.
pub fn check_type<'v>(value: &'v Value, field: &str, expected: FieldType) -> Result<&'v Value> {
	Scope::root(value).require(field, expected)
}

/// Check that `value.field` parses as a finite number and return it.
pub fn check_number(value: &Value, field: &str) -> Result<f64> {
	Scope::root(value).number(field)
}

/// A position inside a JSON document, used to produce typed values and to
/// name fields in errors (`frames[1].fileName`).
#[derive(Debug, Clone)]
pub struct Scope<'v> {
	value: &'v Value,
	path: String,
}

impl<'v> Scope<'v> {
	/// Scope over the document root.
	pub fn root(value: &'v Value) -> Self {
		Self {
			value,
			path: String::new(),
		}
	}

	/// The value this scope looks at.
	pub fn value(&self) -> &'v Value {
		self.value
	}

	/// Dotted path of a field below this scope.
	pub fn path_of(&self, field: &str) -> String {
		if self.path.is_empty() {
			field.to_string()
		} else {
			format!("{}.{}", self.path, field)
		}
	}

	/// Required field of the given type.
	pub fn require(&self, field: &str, expected: FieldType) -> Result<&'v Value> {
		let item = self
			.value
			.get(field)
			.ok_or_else(|| ValidationError::MissingField(self.path_of(field)))?;

		if !expected.matches(item) {
			return Err(ValidationError::WrongType {
				field: self.path_of(field),
				expected,
			});
		}

		Ok(item)
	}

	/// Optional field; when present it must have the given type.
	pub fn optional(&self, field: &str, expected: FieldType) -> Result<Option<&'v Value>> {
		match self.value.get(field) {
			None | Some(Value::Null) => Ok(None),
			Some(_) => self.require(field, expected).map(Some),
		}
	}

	/// Required string field.
	pub fn string(&self, field: &str) -> Result<&'v str> {
		let item = self.require(field, FieldType::String)?;
		Ok(item.as_str().unwrap_or_default())
	}

	/// Required array-of-strings field.
	pub fn strings(&self, field: &str) -> Result<Vec<String>> {
		let item = self.require(field, FieldType::ArrayOf(ElementType::String))?;
		Ok(collect_strings(item))
	}

	/// Optional array-of-strings field, empty when absent.
	pub fn optional_strings(&self, field: &str) -> Result<Vec<String>> {
		let item = self.optional(field, FieldType::ArrayOf(ElementType::String))?;
		Ok(item.map(collect_strings).unwrap_or_default())
	}

	/// Required field that parses as a finite number.
	pub fn number(&self, field: &str) -> Result<f64> {
		let item = self
			.value
			.get(field)
			.ok_or_else(|| ValidationError::MissingField(self.path_of(field)))?;

		match parse_float(item) {
			Some(n) if n.is_finite() => Ok(n),
			_ => Err(ValidationError::NotANumber(self.path_of(field))),
		}
	}

	/// Required field that parses as a number usable as a line or column.
	///
	/// Fractional values are truncated; negative values and values beyond
	/// `u32::MAX` are rejected.
	pub fn coordinate(&self, field: &str) -> Result<u32> {
		let n = self.number(field)?;

		if n < 0.0 || n > f64::from(u32::MAX) {
			return Err(ValidationError::OutOfRange {
				field: self.path_of(field),
				value: n.to_string(),
			});
		}

		Ok(n.trunc() as u32)
	}

	/// Whether a field is truthy. Absent fields are falsy.
	pub fn truthy(&self, field: &str) -> bool {
		self.value.get(field).is_some_and(is_truthy)
	}

	/// Scopes over each element of a required array field.
	pub fn elements(&self, field: &str, element: ElementType) -> Result<Vec<Scope<'v>>> {
		let item = self.require(field, FieldType::ArrayOf(element))?;
		let base = self.path_of(field);

		Ok(item
			.as_array()
			.map(|items| {
				items
					.iter()
					.enumerate()
					.map(|(i, value)| Scope {
						value,
						path: format!("{}[{}]", base, i),
					})
					.collect()
			})
			.unwrap_or_default())
	}
}

fn collect_strings(value: &Value) -> Vec<String> {
	value
		.as_array()
		.map(|items| {
			items
				.iter()
				.filter_map(|s| s.as_str().map(str::to_string))
				.collect()
		})
		.unwrap_or_default()
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
	match value {
		Value::Null => false,
		Value::Bool(b) => *b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	}
}

/// `parseFloat` over a JSON value: numbers pass through, strings are parsed,
/// everything else is not a number.
pub fn parse_float(value: &Value) -> Option<f64> {
	match value {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => parse_float_str(s),
		_ => None,
	}
}

/// Parse the longest leading decimal literal of `s`, after leading whitespace.
///
/// `"42"`, `" 42"`, `"42px"` and `"4.2e1"` all yield 42. `"Infinity"` yields
/// an infinite value, which callers reject as non-finite.
pub fn parse_float_str(s: &str) -> Option<f64> {
	let s = s.trim_start();
	let bytes = s.as_bytes();
	let mut end = 0;

	if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
		end += 1;
	}

	if s[end..].starts_with("Infinity") {
		let negative = bytes.first() == Some(&b'-');
		return Some(if negative {
			f64::NEG_INFINITY
		} else {
			f64::INFINITY
		});
	}

	let int_start = end;
	while end < bytes.len() && bytes[end].is_ascii_digit() {
		end += 1;
	}
	let mut digits = end - int_start;

	if end < bytes.len() && bytes[end] == b'.' {
		let frac_start = end + 1;
		let mut frac_end = frac_start;
		while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
			frac_end += 1;
		}
		digits += frac_end - frac_start;
		if digits > 0 {
			end = frac_end;
		}
	}

	if digits == 0 {
		return None;
	}

	// Exponent only counts when at least one digit follows it.
	if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
		let mut exp_end = end + 1;
		if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
			exp_end += 1;
		}
		let exp_digits_start = exp_end;
		while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
			exp_end += 1;
		}
		if exp_end > exp_digits_start {
			end = exp_end;
		}
	}

	s[..end].parse::<f64>().ok()
}
