// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! The input-device processing core of the Trellis embedded UI toolkit.
//!
//! This crate turns raw samples from heterogeneous input hardware into
//! semantic widget events against a scene graph it does not own:
//!
//! - **Pointers** (touch panels, mice) are hit-tested against the
//!   scene's layers and run a press/release state machine producing
//!   press, pressing, click, long-press, long-press-repeat and
//!   press-lost, plus a drag engine with a dead-zone and an inertial
//!   "throw" continuation after release.
//! - **Keypads** route ENTER/NEXT/PREV and data keys through a focus
//!   group.
//! - **Encoders** step focus (or edit the focused widget) per detent
//!   and toggle edit mode on a long press of the knob.
//! - **Button arrays** map hardware buttons to screen points and reuse
//!   the pointer machine.
//!
//! The scene graph, focus groups, renderer invalidation queue, tick
//! source and hardware drivers are all consumed through traits — see
//! [`core::Scene`], [`core::TickSource`] and [`core::SampleSource`].
//! Registration and the periodic processing entry live on
//! [`app::InputRoot`].
//!
//! Processing is single-threaded and cooperative: the embedder's
//! scheduler calls [`InputRoot::process`](app::InputRoot::process) at a
//! fixed period and everything runs to completion inside it. Widget
//! callbacks run synchronously during processing and may mutate the
//! scene arbitrarily — destroying the widget under the pointer included
//! — as long as they report destructions through
//! [`EventCtx::request_reset`](core::EventCtx::request_reset).
//!
//! The crate does not render, lay out, or interpret widget-specific
//! gestures; each physical device is one logical pointer.

// TRELLIS LINT SET - lib.rs
// These lints shouldn't apply to examples or tests.
#![warn(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
#![warn(missing_docs)]

#[macro_use]
pub mod util;

pub mod app;
pub mod core;
pub mod testing;

mod passes;
