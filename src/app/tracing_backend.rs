// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! Configures a suitable default [`tracing`] implementation.
//!
//! The core logs through `tracing` only: the drain is spanned, samples
//! and state transitions are trace-level. This module installs a
//! console subscriber with a `RUST_LOG`-overridable filter, defaulting
//! to DEBUG in debug builds and INFO in release builds. If a `tracing`
//! backend is already configured, this does not overwrite it.

use std::error::Error;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

/// Install the default tracing subscriber, unless one is already set.
pub fn try_init_tracing() -> Result<(), Box<dyn Error>> {
    let default_level = if cfg!(debug_assertions) {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    // EnvFilter lets the user override the log level without
    // recompiling.
    let env_filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();

    // We skip the target: in firmware logs it only names the module a
    // log was defined in, and the message is the better locator.
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(console_layer).try_init()?;
    Ok(())
}

/// Install a test-friendly subscriber capturing output per test.
///
/// Errors (e.g. a subscriber installed by another test) are ignored.
pub fn try_init_test_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::TRACE.into())
        .with_env_var("RUST_LOG")
        .from_env_lossy();
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_test_writer()
                .with_filter(env_filter),
        )
        .try_init();
}
