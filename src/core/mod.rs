// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! The types making up the input core's public surface.

mod contexts;
mod device;
mod events;
mod geometry;
mod time;
mod widget;

pub use contexts::EventCtx;
pub use device::{DeviceId, DeviceKind};
pub use events::{Key, Readout, Sample, SampleSource, SampleState, Signal, WidgetEvent};
pub use geometry::{Bounds, Point, Size, Vector};
pub use time::{TickSource, elapsed};
pub use widget::{ChildrenIds, GroupId, Scene, WidgetFlags, WidgetId};

pub(crate) use device::{KeyProc, PointerProc, ProcState, ProcVariant};
