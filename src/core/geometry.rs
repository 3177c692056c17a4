// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! Integer pixel geometry.
//!
//! Trellis targets fixed-function displays, so all coordinates are whole
//! pixels. Integer math also matters for gesture processing: the drag
//! dead-zone and the throw decay are specified in integer arithmetic so
//! that inertial motion terminates deterministically instead of creeping
//! along on ever-smaller fractional deltas.

/// A position in absolute or parent-relative pixels.
pub type Point = euclid::default::Point2D<i32>;

/// A motion delta in pixels.
pub type Vector = euclid::default::Vector2D<i32>;

/// A widget size in pixels.
pub type Size = euclid::default::Size2D<i32>;

/// An axis-aligned pixel box; `min` is inclusive, `max` is exclusive.
pub type Bounds = euclid::default::Box2D<i32>;
