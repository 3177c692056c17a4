// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! The device registry and the entry point of the periodic input pass.

use std::rc::Rc;

use tracing::warn;

use crate::core::{
    DeviceId, DeviceKind, GroupId, Key, Point, ProcState, ProcVariant, SampleSource, Scene, Signal,
    TickSource, Vector, WidgetId, elapsed,
};
use crate::passes::run_input_pass;

/// A hook observing every signal a device emits, e.g. to drive a buzzer
/// or haptic actuator.
pub type FeedbackHandler = Rc<dyn Fn(DeviceId, Signal)>;

/// Tunables of the input core.
///
/// The defaults match a 50 ms poll on a resistive touch panel; override
/// what the hardware needs and pass the result to [`InputRoot::new`].
#[derive(Clone, Copy, Debug)]
pub struct InputOptions {
    /// The period, in milliseconds, at which the embedder is expected to
    /// call [`InputRoot::process`]. Not consumed by the core itself.
    pub read_period: u32,
    /// How long a press must hold before **long-press** fires, in ms.
    pub long_press_time: u32,
    /// The period of **long-press-repeat** after a long press, in ms.
    pub long_press_repeat_time: u32,
    /// Cumulative motion, in pixels, below which a press is not a drag.
    pub drag_limit: i32,
    /// Percent of throw velocity lost per tick, clamped to `1..=100`.
    pub drag_throw: i32,
    /// Process keypad and encoder devices. When `false` those devices
    /// are drained but their samples are discarded, and pointer releases
    /// skip click-focus.
    pub use_groups: bool,
}

impl Default for InputOptions {
    fn default() -> Self {
        Self {
            read_period: 50,
            long_press_time: 400,
            long_press_repeat_time: 100,
            drag_limit: 10,
            drag_throw: 10,
            use_groups: true,
        }
    }
}

/// One registered device: its driver, customization and gesture state.
pub(crate) struct DeviceRecord {
    pub(crate) kind: DeviceKind,
    pub(crate) source: Box<dyn SampleSource>,
    /// Tick of the most recent pressed sample.
    pub(crate) last_activity: u32,
    /// Widget repositioned to follow a pointer device.
    pub(crate) cursor: Option<WidgetId>,
    /// Focus group fed by a keypad or encoder device.
    pub(crate) group: Option<GroupId>,
    /// Button index → screen point table of a button-array device.
    pub(crate) button_points: Vec<Point>,
    pub(crate) feedback: Option<FeedbackHandler>,
    pub(crate) proc: ProcState,
}

/// The input-device registry and per-tick processing entry.
///
/// `InputRoot` owns one record per physical input device and, once per
/// scheduler period, drains each enabled device's driver and runs the
/// appropriate gesture state machine against the scene:
///
/// ```no_run
/// # use trellis_input::app::{InputOptions, InputRoot};
/// # use trellis_input::core::{DeviceKind, Readout, Sample, SampleState, Point, Scene};
/// # fn tick_count() -> u32 { 0 }
/// # fn poll_touch_panel() -> Readout {
/// #     Readout::single(Sample::Pointer { state: SampleState::Released, point: Point::zero() })
/// # }
/// # fn example(scene: &mut dyn Scene) {
/// let mut input = InputRoot::new(InputOptions::default(), Box::new(TickCounter));
/// let _touch = input.register(DeviceKind::Pointer, poll_touch_panel);
/// loop {
///     // From the cooperative scheduler, every read_period ms.
///     input.process(&mut *scene);
/// }
/// # }
/// # struct TickCounter;
/// # impl trellis_input::core::TickSource for TickCounter {
/// #     fn now(&self) -> u32 { tick_count() }
/// # }
/// ```
///
/// All processing is single-threaded and runs to completion inside
/// [`process`](Self::process); widget callbacks invoked from it must not
/// call back into the `InputRoot`.
pub struct InputRoot {
    pub(crate) options: InputOptions,
    pub(crate) clock: Box<dyn TickSource>,
    pub(crate) devices: Vec<DeviceRecord>,
    /// The device currently being drained, readable by callbacks
    /// through [`active_device`](Self::active_device).
    pub(crate) active: Option<DeviceId>,
}

impl InputRoot {
    /// Create an empty registry.
    pub fn new(options: InputOptions, clock: Box<dyn TickSource>) -> Self {
        let mut options = options;
        if !(1..=100).contains(&options.drag_throw) {
            warn!(
                drag_throw = options.drag_throw,
                "drag_throw out of range, clamping to 1..=100"
            );
            options.drag_throw = options.drag_throw.clamp(1, 100);
        }
        Self {
            options,
            clock,
            devices: Vec::new(),
            active: None,
        }
    }

    /// Register a device and its driver. Devices persist until shutdown
    /// and are drained in registration order.
    pub fn register(&mut self, kind: DeviceKind, source: impl SampleSource + 'static) -> DeviceId {
        let id = DeviceId(self.devices.len());
        let now = self.clock.now();
        self.devices.push(DeviceRecord {
            kind,
            source: Box::new(source),
            last_activity: now,
            cursor: None,
            group: None,
            button_points: Vec::new(),
            feedback: None,
            proc: ProcState::new(kind),
        });
        id
    }

    /// All registered devices, in registration order.
    pub fn devices(&self) -> impl Iterator<Item = DeviceId> + '_ {
        (0..self.devices.len()).map(DeviceId)
    }

    /// Drain and process every enabled device once.
    ///
    /// Called by the cooperative scheduler every
    /// [`read_period`](InputOptions::read_period) milliseconds.
    pub fn process(&mut self, scene: &mut dyn Scene) {
        run_input_pass(self, scene);
    }

    // --- MARK: RESET

    /// Queue a reset of one device, or of all devices with `None`.
    ///
    /// The reset is honored at the next opportunity inside the input
    /// pass: every widget reference is dropped, timers and gesture
    /// accumulators are zeroed. Idempotent.
    pub fn reset(&mut self, device: Option<DeviceId>) {
        match device {
            Some(id) => {
                if let Some(record) = self.devices.get_mut(id.0) {
                    record.proc.reset_pending = true;
                }
            }
            None => {
                for record in &mut self.devices {
                    record.proc.reset_pending = true;
                }
            }
        }
    }

    /// Restart the long-press timers of a device, as if the press had
    /// just begun.
    pub fn reset_long_press(&mut self, device: DeviceId) {
        let now = self.clock.now();
        if let Some(record) = self.devices.get_mut(device.0) {
            record.proc.longpress_sent = false;
            record.proc.longpress_repeat_timestamp = now;
            record.proc.press_timestamp = now;
        }
    }

    /// Enable or disable every device of the given kind.
    pub fn enable(&mut self, kind: DeviceKind, enable: bool) {
        for record in &mut self.devices {
            if record.kind == kind {
                record.proc.disabled = !enable;
            }
        }
    }

    // --- MARK: CUSTOMIZATION

    /// Attach a cursor widget to a pointer device.
    ///
    /// The cursor is reparented under the scene's system layer and then
    /// follows the device's sample point. No-op for other device kinds.
    pub fn set_cursor(&mut self, device: DeviceId, cursor: WidgetId, scene: &mut dyn Scene) {
        let Some(record) = self.devices.get_mut(device.0) else {
            return;
        };
        if record.kind != DeviceKind::Pointer {
            return;
        }
        record.cursor = Some(cursor);
        scene.set_parent(cursor, scene.system_layer());
        if let ProcVariant::Pointer(pointer) = &record.proc.variant {
            scene.set_position(cursor, pointer.current_point);
        }
    }

    /// Attach a focus group to a keypad or encoder device. No-op for
    /// other device kinds.
    pub fn set_group(&mut self, device: DeviceId, group: GroupId) {
        if let Some(record) = self.devices.get_mut(device.0)
            && matches!(record.kind, DeviceKind::Keypad | DeviceKind::Encoder)
        {
            record.group = Some(group);
        }
    }

    /// Set the button→point table of a button-array device. No-op for
    /// other device kinds.
    pub fn set_button_points(&mut self, device: DeviceId, points: Vec<Point>) {
        if let Some(record) = self.devices.get_mut(device.0)
            && record.kind == DeviceKind::ButtonArray
        {
            record.button_points = points;
        }
    }

    /// Install a feedback hook, invoked for every signal the device
    /// emits.
    pub fn set_feedback(&mut self, device: DeviceId, feedback: FeedbackHandler) {
        if let Some(record) = self.devices.get_mut(device.0) {
            record.feedback = Some(feedback);
        }
    }

    /// The device's feedback hook, if any.
    pub fn feedback(&self, device: DeviceId) -> Option<FeedbackHandler> {
        self.devices.get(device.0)?.feedback.clone()
    }

    // --- MARK: QUERIES

    /// The options the registry was created with.
    pub fn options(&self) -> &InputOptions {
        &self.options
    }

    /// The kind of a device.
    pub fn device_kind(&self, device: DeviceId) -> Option<DeviceKind> {
        Some(self.devices.get(device.0)?.kind)
    }

    /// The device currently being drained, if the input pass is running.
    pub fn active_device(&self) -> Option<DeviceId> {
        self.active
    }

    /// The last sample point of a pointer-family device, or `(-1, -1)`
    /// for other kinds.
    pub fn last_point(&self, device: DeviceId) -> Point {
        match self.devices.get(device.0).map(|record| &record.proc.variant) {
            Some(ProcVariant::Pointer(pointer)) => pointer.current_point,
            _ => Point::new(-1, -1),
        }
    }

    /// The last key a keypad device reported, if any.
    pub fn last_key(&self, device: DeviceId) -> Option<Key> {
        let record = self.devices.get(device.0)?;
        if record.kind != DeviceKind::Keypad {
            return None;
        }
        match &record.proc.variant {
            ProcVariant::Key(key) => key.last_key,
            ProcVariant::Pointer(_) => None,
        }
    }

    /// Whether a pointer-family device is currently dragging a widget.
    pub fn is_dragging(&self, device: DeviceId) -> bool {
        match self.devices.get(device.0).map(|record| &record.proc.variant) {
            Some(ProcVariant::Pointer(pointer)) => pointer.drag_active,
            _ => false,
        }
    }

    /// The motion vector of the current drag, or zero for other kinds.
    pub fn drag_vector(&self, device: DeviceId) -> Vector {
        match self.devices.get(device.0).map(|record| &record.proc.variant) {
            Some(ProcVariant::Pointer(pointer)) => pointer.vector,
            _ => Vector::zero(),
        }
    }

    /// Milliseconds since the last pressed sample of a device, or since
    /// the last pressed sample of any device with `None`.
    ///
    /// The aggregate starts from a `u16::MAX` ceiling, so with no
    /// devices (or none active for over a minute) it reports ~65 s.
    pub fn inactive_time(&self, device: Option<DeviceId>) -> u32 {
        let now = self.clock.now();
        match device {
            Some(id) => self
                .devices
                .get(id.0)
                .map_or(0, |record| elapsed(now, record.last_activity)),
            None => self
                .devices
                .iter()
                .fold(u32::from(u16::MAX), |shortest, record| {
                    shortest.min(elapsed(now, record.last_activity))
                }),
        }
    }

    /// Make a pointer-family device ignore everything until its next
    /// release edge.
    pub fn wait_until_release(&mut self, device: DeviceId) {
        if let Some(record) = self.devices.get_mut(device.0)
            && let ProcVariant::Pointer(pointer) = &mut record.proc.variant
        {
            pointer.wait_until_release = true;
        }
    }
}
