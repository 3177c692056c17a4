// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! Samples read from input hardware and the signals/events derived from them.

use crate::core::geometry::Point;

/// The contact state carried by every [`Sample`].
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum SampleState {
    /// Nothing is touching / no key is held.
    #[default]
    Released,
    /// A contact or key is down.
    Pressed,
}

/// A logical key delivered by keypads and encoders.
///
/// The navigation and edit keys are interpreted by the input core; any
/// other payload is forwarded untouched to the focus group as data.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Key {
    /// Activate the focused widget.
    Enter,
    /// Focus the next widget in the group.
    Next,
    /// Focus the previous widget in the group.
    Prev,
    /// Decrease / move left inside the focused widget.
    Left,
    /// Increase / move right inside the focused widget.
    Right,
    /// Move up inside the focused widget.
    Up,
    /// Move down inside the focused widget.
    Down,
    /// Dismiss / leave the focused widget.
    Escape,
    /// A plain character, forwarded to the focused widget as data.
    Char(char),
}

/// One raw sample read from an input device.
///
/// The variant must match the kind the device was registered with.
/// Hardware is allowed to clear the key on the release edge (`key:
/// None`); the core restores the last pressed key in that case.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sample {
    /// A touch panel or mouse sample.
    Pointer {
        /// Contact state.
        state: SampleState,
        /// The sampled position, in absolute pixels.
        point: Point,
    },
    /// A keypad sample.
    Key {
        /// Contact state.
        state: SampleState,
        /// The key held, if the hardware still reports one.
        key: Option<Key>,
    },
    /// A rotary encoder sample.
    Encoder {
        /// Push-button state.
        state: SampleState,
        /// Detents turned since the previous read; sign is direction.
        diff: i32,
    },
    /// An external button array sample.
    Button {
        /// Contact state.
        state: SampleState,
        /// Index into the device's button→point table.
        index: usize,
    },
}

impl Sample {
    /// The contact state, regardless of variant.
    pub fn state(&self) -> SampleState {
        match self {
            Self::Pointer { state, .. }
            | Self::Key { state, .. }
            | Self::Encoder { state, .. }
            | Self::Button { state, .. } => *state,
        }
    }

    /// Short name for trace logs.
    pub(crate) fn short_name(&self) -> &'static str {
        match self {
            Self::Pointer { .. } => "Pointer",
            Self::Key { .. } => "Key",
            Self::Encoder { .. } => "Encoder",
            Self::Button { .. } => "Button",
        }
    }
}

/// The result of one HAL read.
#[derive(Clone, Copy, Debug)]
pub struct Readout {
    /// The sample just read.
    pub sample: Sample,
    /// `true` if the driver buffered further samples; the core keeps
    /// draining the device until this goes `false`.
    pub more: bool,
}

impl Readout {
    /// A readout with nothing buffered behind it.
    pub fn single(sample: Sample) -> Self {
        Self {
            sample,
            more: false,
        }
    }
}

/// The polling side of an input driver.
///
/// `read` must not block: it reports the device's current state (plus a
/// buffered backlog, if the driver keeps one) and returns immediately.
/// It is called from the periodic input pass only.
pub trait SampleSource {
    /// Read the next sample.
    fn read(&mut self) -> Readout;
}

impl<F: FnMut() -> Readout> SampleSource for F {
    fn read(&mut self) -> Readout {
        self()
    }
}

/// A state-machine transition reported to the widget that caused it.
///
/// Signals are the widget-internal channel: a widget reacts to them to
/// update its own visuals and may mutate the scene from the callback.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Signal {
    /// A press landed on the widget.
    Pressed,
    /// The press is still on the widget (sent every sample).
    Pressing,
    /// The press ended on the widget.
    Released,
    /// The press slid off or the hit now resolves elsewhere.
    PressLost,
    /// The press exceeded the long-press threshold.
    LongPress,
    /// Repeated while a long press keeps holding.
    LongPressRepeat,
    /// The widget started moving under a drag.
    DragBegin,
    /// Drag and inertial throw both finished.
    DragEnd,
}

/// A semantic event delivered to the widget's user-facing handlers.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum WidgetEvent {
    /// A press landed on the widget.
    Pressed,
    /// The press is still on the widget.
    Pressing,
    /// The press ended after a long press or drag.
    Released,
    /// The press ended with no long press and no drag.
    Clicked,
    /// The press exceeded the long-press threshold.
    LongPressed,
    /// Repeated while a long press keeps holding.
    LongPressedRepeat,
    /// The press slid off the widget.
    PressLost,
}
