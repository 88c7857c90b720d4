// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-wide initialization: tracing subscriber and panic hook.
//!
//! Nothing here runs implicitly. `main` calls [`install`] once, after the
//! configuration is known.

use std::any::Any;
use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use unwind_config::{UnwindConfig, DEFAULT_LOG_LEVEL};

use crate::args::NAME;

static PANIC_HOOK: Once = Once::new();

/// Install logging and the panic hook.
///
/// Logs go to stderr so stdout carries only results. `RUST_LOG` takes
/// precedence over the configured level. Calling this more than once keeps
/// the first subscriber.
pub fn install(config: &UnwindConfig) {
	let (filter, rejected) = match EnvFilter::try_from_default_env() {
		Ok(filter) => (filter, None),
		Err(_) => match EnvFilter::try_new(&config.logging.level) {
			Ok(filter) => (filter, None),
			Err(e) => (EnvFilter::new(DEFAULT_LOG_LEVEL), Some(e)),
		},
	};

	let _ = tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_writer(std::io::stderr)
				.with_target(false),
		)
		.try_init();

	if let Some(e) = rejected {
		tracing::warn!(
			level = %config.logging.level,
			error = %e,
			"invalid log level, using default"
		);
	}

	PANIC_HOOK.call_once(|| {
		std::panic::set_hook(Box::new(|info| {
			let message = panic_message(info.payload());
			let location = info
				.location()
				.map(|l| format!(" at {}:{}", l.file(), l.line()))
				.unwrap_or_default();
			tracing::error!(%message, "panic{location}");
			eprintln!("{NAME}: internal error: {message}{location}");
		}));
	});
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
	if let Some(s) = payload.downcast_ref::<&str>() {
		(*s).to_string()
	} else if let Some(s) = payload.downcast_ref::<String>() {
		s.clone()
	} else {
		"unknown panic".to_string()
	}
}
