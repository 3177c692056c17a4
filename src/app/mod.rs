// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! The device registry and its surroundings.

pub(crate) mod input_root;
mod tracing_backend;

pub use input_root::{FeedbackHandler, InputOptions, InputRoot};
pub use tracing_backend::{try_init_test_tracing, try_init_tracing};
