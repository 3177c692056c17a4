// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! Tools for exercising the input core without hardware or a renderer.
//!
//! [`TestScene`] is a small in-memory widget tree that records every
//! signal, event and focus operation the core asks of it; scripted
//! reactions stand in for widget callbacks (including destructive
//! ones). [`TestHarness`] wires a scene, a settable clock and one
//! [`QueueSource`] driver per device to an
//! [`InputRoot`](crate::app::InputRoot).
//!
//! These types are used by this crate's own tests and exported for
//! integrations that want to test widget behavior against the core.

mod harness;
mod scene;

pub use harness::{QueueSource, TestClock, TestHarness};
pub use scene::{Reaction, Record, Recording, TestScene};
