// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! The periodic input pass.
//!
//! Once per scheduler period the pass drains every enabled device in
//! registration order and feeds each sample to the state machine for
//! the device's kind. This file holds the drain loop and the plumbing
//! shared by all four machines; the machines themselves live in the
//! sibling modules.

use tracing::{info_span, trace};

use crate::app::input_root::{DeviceRecord, InputOptions, InputRoot};
use crate::core::{
    DeviceId, DeviceKind, EventCtx, GroupId, Key, ProcVariant, Readout, Sample, SampleState, Scene,
    Signal, TickSource, WidgetEvent, WidgetId,
};
use crate::contract_violation;

pub(crate) mod button;
pub(crate) mod drag;
pub(crate) mod encoder;
pub(crate) mod keypad;
pub(crate) mod pointer;

/// A widget callback latched a reset query; the rest of the sample's
/// work must be abandoned.
pub(crate) struct Interrupted;

/// Control flow of everything that may run widget callbacks.
pub(crate) type Flow = Result<(), Interrupted>;

// --- MARK: DRAIN LOOP

/// See the module docs. This is the body of [`InputRoot::process`].
pub(crate) fn run_input_pass(root: &mut InputRoot, scene: &mut dyn Scene) {
    let _span = info_span!("input_pass").entered();
    trace!("input pass started");

    for index in 0..root.devices.len() {
        let id = DeviceId(index);
        root.active = Some(id);
        let device = &mut root.devices[index];

        // A reset may have been queued from outside the pass.
        device.proc.handle_reset();
        if device.proc.disabled {
            continue;
        }

        loop {
            let Readout { sample, more } = device.source.read();
            // The read callback runs driver code that may have destroyed
            // widgets (e.g. a deferred deletion queue flushed from it).
            device.proc.handle_reset();

            if sample.state() == SampleState::Pressed {
                device.last_activity = root.clock.now();
            }

            trace!("{} sample on {}", sample.short_name(), id);
            let kind = device.kind;
            let mut pass = DevicePass {
                scene: &mut *scene,
                options: &root.options,
                clock: &*root.clock,
                device,
                id,
                ctx: EventCtx::new(id, kind),
            };
            let _ = pass.dispatch(sample);
            device.proc.handle_reset();

            if !more {
                break;
            }
        }
    }

    root.active = None;
    trace!("input pass finished");
}

// --- MARK: DEVICE PASS

/// Everything one device's sample processing needs: the scene, the
/// configuration, the clock and the device's own record.
pub(crate) struct DevicePass<'a> {
    pub(crate) scene: &'a mut dyn Scene,
    pub(crate) options: &'a InputOptions,
    pub(crate) clock: &'a dyn TickSource,
    pub(crate) device: &'a mut DeviceRecord,
    pub(crate) id: DeviceId,
    pub(crate) ctx: EventCtx,
}

impl DevicePass<'_> {
    fn dispatch(&mut self, sample: Sample) -> Flow {
        self.validate_references();
        match (self.device.kind, sample) {
            (DeviceKind::Pointer, Sample::Pointer { state, point }) => {
                self.process_pointer(point, state)
            }
            (DeviceKind::Keypad, Sample::Key { state, key }) => self.process_keypad(key, state),
            (DeviceKind::Encoder, Sample::Encoder { state, diff }) => {
                self.process_encoder(diff, state)
            }
            (DeviceKind::ButtonArray, Sample::Button { state, index }) => {
                self.process_button(index, state)
            }
            (kind, sample) => {
                contract_violation!(
                    "{} sample delivered to {:?} device {}",
                    sample.short_name(),
                    kind,
                    self.id
                );
                Ok(())
            }
        }
    }

    /// Drop every reference to a widget the scene no longer knows.
    ///
    /// Callbacks that destroy widgets are required to request a reset,
    /// so this usually finds nothing; it exists so that a missed request
    /// degrades to a clean restart instead of acting on the wrong widget.
    fn validate_references(&mut self) {
        if let ProcVariant::Pointer(pointer) = &self.device.proc.variant {
            let stale = |widget: Option<WidgetId>| {
                widget.is_some_and(|widget| !self.scene.contains(widget))
            };
            if stale(pointer.pressed_widget) || stale(pointer.last_pressed) {
                trace!("dropping stale widget references on {}", self.id);
                self.device.proc.reset_pending = true;
                self.device.proc.handle_reset();
            }
        }
    }

    pub(crate) fn now(&self) -> u32 {
        self.clock.now()
    }

    // --- MARK: STATE ACCESS

    pub(crate) fn pointer(&self) -> &crate::core::PointerProc {
        match &self.device.proc.variant {
            ProcVariant::Pointer(pointer) => pointer,
            ProcVariant::Key(_) => unreachable!("pointer state on a key-family device"),
        }
    }

    pub(crate) fn pointer_mut(&mut self) -> &mut crate::core::PointerProc {
        match &mut self.device.proc.variant {
            ProcVariant::Pointer(pointer) => pointer,
            ProcVariant::Key(_) => unreachable!("pointer state on a key-family device"),
        }
    }

    pub(crate) fn key(&self) -> &crate::core::KeyProc {
        match &self.device.proc.variant {
            ProcVariant::Key(key) => key,
            ProcVariant::Pointer(_) => unreachable!("key state on a pointer-family device"),
        }
    }

    pub(crate) fn key_mut(&mut self) -> &mut crate::core::KeyProc {
        match &mut self.device.proc.variant {
            ProcVariant::Key(key) => key,
            ProcVariant::Pointer(_) => unreachable!("key state on a pointer-family device"),
        }
    }

    // --- MARK: DELIVERY

    /// Check for a reset latched by the most recent callback.
    pub(crate) fn guard(&self) -> Flow {
        if self.device.proc.reset_pending {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    fn absorb_ctx(&mut self) -> Flow {
        if self.ctx.take_reset_request() {
            self.device.proc.reset_pending = true;
        }
        if self.ctx.take_release_wait_request()
            && let ProcVariant::Pointer(pointer) = &mut self.device.proc.variant
        {
            pointer.wait_until_release = true;
        }
        self.guard()
    }

    pub(crate) fn send_signal(&mut self, target: WidgetId, signal: Signal) -> Flow {
        if let Some(feedback) = &self.device.feedback {
            feedback(self.id, signal);
        }
        self.scene.signal(target, signal, &mut self.ctx);
        self.absorb_ctx()
    }

    pub(crate) fn send_event(&mut self, target: WidgetId, event: WidgetEvent) -> Flow {
        self.scene.send_event(target, event, &mut self.ctx);
        self.absorb_ctx()
    }

    pub(crate) fn focus_next(&mut self, group: GroupId) -> Flow {
        self.scene.focus_next(group, &mut self.ctx);
        self.absorb_ctx()
    }

    pub(crate) fn focus_prev(&mut self, group: GroupId) -> Flow {
        self.scene.focus_prev(group, &mut self.ctx);
        self.absorb_ctx()
    }

    pub(crate) fn focus_widget(&mut self, widget: WidgetId) -> Flow {
        self.scene.focus_widget(widget, &mut self.ctx);
        self.absorb_ctx()
    }

    pub(crate) fn send_group_data(&mut self, group: GroupId, key: Key) -> Flow {
        self.scene.send_data(group, key, &mut self.ctx);
        self.absorb_ctx()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::core::{
        DeviceId, DeviceKind, Point, Sample, SampleState, Scene, Signal, WidgetEvent, WidgetFlags,
    };
    use crate::testing::{Record, TestHarness};

    fn pressed(x: i32, y: i32) -> Sample {
        Sample::Pointer {
            state: SampleState::Pressed,
            point: Point::new(x, y),
        }
    }

    fn released(x: i32, y: i32) -> Sample {
        Sample::Pointer {
            state: SampleState::Released,
            point: Point::new(x, y),
        }
    }

    /// Devices are drained one after the other, in registration order.
    #[test]
    fn devices_drain_in_registration_order() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let left = harness
            .scene
            .add_widget(screen, 0, 0, 50, 50, WidgetFlags::CLICKABLE);
        let right = harness
            .scene
            .add_widget(screen, 50, 0, 50, 50, WidgetFlags::CLICKABLE);
        let first = harness.add_device(DeviceKind::Pointer);
        let second = harness.add_device(DeviceKind::Pointer);

        harness.push(second, pressed(60, 10));
        harness.push(first, pressed(10, 10));
        harness.step(10);

        let presses: Vec<_> = harness
            .scene
            .drain_records()
            .into_iter()
            .filter_map(|record| match record {
                Record::Event(id, WidgetEvent::Pressed) => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(presses, vec![left, right]);
    }

    /// A queued reset wipes the device before its next sample; queueing
    /// it twice is the same as once.
    #[test]
    fn reset_is_idempotent() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let _button = harness
            .scene
            .add_widget(screen, 0, 0, 50, 50, WidgetFlags::CLICKABLE);
        let device = harness.add_device(DeviceKind::Pointer);

        harness.push(device, pressed(10, 10));
        harness.step(10);
        harness.scene.drain_records();

        harness.root.reset(Some(device));
        harness.root.reset(Some(device));
        harness.push(device, released(10, 10));
        harness.step(10);

        // The press was forgotten: the release finds nothing to release.
        assert!(harness.scene.drain_records().is_empty());
        assert!(!harness.root.is_dragging(device));
    }

    /// `reset(None)` queues a reset on every device.
    #[test]
    fn reset_all_covers_every_device() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let _button = harness
            .scene
            .add_widget(screen, 0, 0, 100, 100, WidgetFlags::CLICKABLE);
        let first = harness.add_device(DeviceKind::Pointer);
        let second = harness.add_device(DeviceKind::Pointer);

        harness.push(first, pressed(10, 10));
        harness.push(second, pressed(20, 20));
        harness.step(10);
        harness.scene.drain_records();

        harness.root.reset(None);
        harness.push(first, released(10, 10));
        harness.push(second, released(20, 20));
        harness.step(10);
        assert!(harness.scene.drain_records().is_empty());
    }

    /// Disabled devices are not read; re-enabling resumes processing.
    #[test]
    fn disabled_devices_are_skipped() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let button = harness
            .scene
            .add_widget(screen, 0, 0, 50, 50, WidgetFlags::CLICKABLE);
        let device = harness.add_device(DeviceKind::Pointer);

        harness.root.enable(DeviceKind::Pointer, false);
        harness.push(device, pressed(10, 10));
        harness.step(10);
        assert!(harness.scene.drain_records().is_empty());

        harness.root.enable(DeviceKind::Pointer, true);
        harness.step(10);
        assert!(
            harness
                .scene
                .drain_records()
                .contains(&Record::Event(button, WidgetEvent::Pressed))
        );
    }

    /// The feedback hook observes the device's signals, in order, with
    /// the right device id.
    #[test]
    fn feedback_observes_emitted_signals() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let _button = harness
            .scene
            .add_widget(screen, 0, 0, 50, 50, WidgetFlags::CLICKABLE);
        let device = harness.add_device(DeviceKind::Pointer);

        let seen: Rc<RefCell<Vec<(DeviceId, Signal)>>> = Rc::default();
        let sink = Rc::clone(&seen);
        harness
            .root
            .set_feedback(device, Rc::new(move |id, signal| {
                sink.borrow_mut().push((id, signal));
            }));

        harness.push(device, pressed(10, 10));
        harness.step(10);
        harness.push(device, released(10, 10));
        harness.step(10);

        assert_eq!(
            seen.borrow().as_slice(),
            &[
                (device, Signal::Pressed),
                (device, Signal::Pressing),
                (device, Signal::Released),
            ]
        );
        assert_eq!(harness.root.active_device(), None);
    }

    /// A widget destroyed without a reset request is still dropped
    /// before the next sample touches it.
    #[test]
    fn stale_references_wipe_the_device() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let button = harness
            .scene
            .add_widget(screen, 0, 0, 50, 50, WidgetFlags::CLICKABLE);
        let device = harness.add_device(DeviceKind::Pointer);

        harness.push(device, pressed(10, 10));
        harness.step(10);
        harness.scene.drain_records();

        // Destroyed outside any callback, e.g. by application code
        // between scheduler ticks.
        harness.scene.destroy(button);
        harness.push(device, released(10, 10));
        harness.step(10);

        assert!(harness.scene.drain_records().is_empty());
        assert!(!harness.root.is_dragging(device));
    }
}
