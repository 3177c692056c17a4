// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! Device identity and per-device gesture processing state.

use crate::core::events::{Key, SampleState};
use crate::core::geometry::{Point, Vector};
use crate::core::widget::WidgetId;

/// A handle to a registered input device.
///
/// Devices persist from registration until shutdown, so the handle is
/// never invalidated.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct DeviceId(pub(crate) usize);

impl std::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "indev{}", self.0)
    }
}

/// The kind of physical input a device produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    /// Touch panel, mouse: absolute points plus a contact state.
    Pointer,
    /// Keypad: logical keys routed through a focus group.
    Keypad,
    /// Rotary encoder with push button: detent diffs plus a button state.
    Encoder,
    /// External button array: button indexes mapped to screen points.
    ButtonArray,
}

impl DeviceKind {
    /// Whether the kind is processed by the pointer state machine.
    pub(crate) fn is_pointer_family(self) -> bool {
        matches!(self, Self::Pointer | Self::ButtonArray)
    }
}

/// Gesture state for pointer-family devices (pointer, button array).
#[derive(Debug)]
pub(crate) struct PointerProc {
    /// The sample point currently being processed, absolute pixels.
    pub(crate) current_point: Point,
    /// The previous sample point.
    pub(crate) last_point: Point,
    /// The widget currently held pressed.
    pub(crate) pressed_widget: Option<WidgetId>,
    /// The most recently pressed widget; survives release to drive throw.
    pub(crate) last_pressed: Option<WidgetId>,
    /// Motion since the previous pressed sample.
    pub(crate) vector: Vector,
    /// Cumulative motion since the press, cleared on each new press.
    pub(crate) drag_sum: Vector,
    /// Low-pass velocity estimate, the throw's starting vector.
    pub(crate) throw_vector: Vector,
    /// Cumulative motion crossed the drag dead-zone.
    pub(crate) drag_limit_crossed: bool,
    /// The target is actually moving under the press (or throwing).
    pub(crate) drag_active: bool,
    /// Ignore every sample until the next release edge.
    pub(crate) wait_until_release: bool,
}

impl Default for PointerProc {
    fn default() -> Self {
        Self {
            current_point: Point::zero(),
            last_point: Point::zero(),
            pressed_widget: None,
            last_pressed: None,
            vector: Vector::zero(),
            drag_sum: Vector::zero(),
            throw_vector: Vector::zero(),
            drag_limit_crossed: false,
            drag_active: false,
            wait_until_release: false,
        }
    }
}

/// Edge-tracking state for key-family devices (keypad, encoder).
#[derive(Debug, Default)]
pub(crate) struct KeyProc {
    /// Contact state at the previous sample.
    pub(crate) last_state: SampleState,
    /// Last key seen while pressed; restores a key the hardware cleared
    /// on the release edge. Keypad only.
    pub(crate) last_key: Option<Key>,
}

/// The family-specific half of [`ProcState`].
///
/// Keyed by device kind at registration, so pointer fields cannot exist
/// on a keypad and vice versa.
#[derive(Debug)]
pub(crate) enum ProcVariant {
    Pointer(PointerProc),
    Key(KeyProc),
}

/// Per-device processing state, created with the device record and
/// mutated only inside the input pass while the device is active.
#[derive(Debug)]
pub(crate) struct ProcState {
    pub(crate) variant: ProcVariant,
    /// Tick of the most recent press edge.
    pub(crate) press_timestamp: u32,
    /// Tick of the last long-press / long-press-repeat emission.
    pub(crate) longpress_repeat_timestamp: u32,
    /// A long press was already emitted for the current press.
    pub(crate) longpress_sent: bool,
    /// A callback asked us to drop all references and restart clean.
    pub(crate) reset_pending: bool,
    /// The device is currently ignored by the input pass.
    pub(crate) disabled: bool,
}

impl ProcState {
    pub(crate) fn new(kind: DeviceKind) -> Self {
        let variant = if kind.is_pointer_family() {
            ProcVariant::Pointer(PointerProc::default())
        } else {
            ProcVariant::Key(KeyProc::default())
        };
        Self {
            variant,
            press_timestamp: 0,
            longpress_repeat_timestamp: 0,
            longpress_sent: false,
            reset_pending: false,
            disabled: false,
        }
    }

    /// Honor a pending reset query: drop every widget reference, zero
    /// the timers and gesture accumulators, restart clean.
    ///
    /// The sample points and `wait_until_release` deliberately survive:
    /// the next sample overwrites the points anyway, and a reset must
    /// not un-ask an explicit wait for the release edge.
    pub(crate) fn handle_reset(&mut self) {
        if !self.reset_pending {
            return;
        }
        self.press_timestamp = 0;
        self.longpress_repeat_timestamp = 0;
        self.longpress_sent = false;
        match &mut self.variant {
            ProcVariant::Pointer(pointer) => {
                pointer.pressed_widget = None;
                pointer.last_pressed = None;
                pointer.drag_limit_crossed = false;
                pointer.drag_active = false;
                pointer.drag_sum = Vector::zero();
                pointer.throw_vector = Vector::zero();
            }
            ProcVariant::Key(key) => {
                key.last_state = SampleState::Released;
                key.last_key = None;
            }
        }
        self.reset_pending = false;
    }
}
