// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! The pointer state machine: press, release, long press, press-lost.

use crate::core::{
    Point, SampleState, Scene, Signal, Vector, WidgetEvent, WidgetFlags, WidgetId, elapsed,
};
use crate::passes::hit_test;
use crate::passes::{DevicePass, Flow};

impl DevicePass<'_> {
    /// Process one pointer sample.
    pub(crate) fn process_pointer(&mut self, point: Point, state: SampleState) -> Flow {
        if let Some(cursor) = self.device.cursor
            && self.pointer().last_point != point
            && self.scene.contains(cursor)
        {
            self.scene.set_position(cursor, point);
        }

        self.pointer_mut().current_point = point;
        let flow = match state {
            SampleState::Pressed => self.press(),
            SampleState::Released => self.release(),
        };

        // Even an interrupted sample becomes the motion reference of the
        // next one.
        let current = self.pointer().current_point;
        self.pointer_mut().last_point = current;
        flow
    }

    /// The press path. Also entered by the button-array adapter.
    pub(crate) fn press(&mut self) -> Flow {
        if self.pointer().wait_until_release {
            return Ok(());
        }

        let held = self.pointer().pressed_widget;
        // Re-hit-test unless the held widget claimed the press for good:
        // a drag in progress or press-lost protection pins it.
        let rehit = match held {
            None => true,
            Some(widget) => {
                !self.pointer().drag_active
                    && !self
                        .scene
                        .flags(widget)
                        .contains(WidgetFlags::PROTECT_PRESS_LOST)
            }
        };
        let hit = if rehit {
            let point = self.pointer().current_point;
            hit_test::find_target(&*self.scene, point)
        } else {
            held
        };

        if hit != held {
            // A change of target restarts motion tracking from here, so
            // the first sample on the new widget carries zero motion.
            let current = self.pointer().current_point;
            self.pointer_mut().last_point = current;

            if let Some(lost) = held {
                self.send_signal(lost, Signal::PressLost)?;
                self.send_event(lost, WidgetEvent::PressLost)?;
            }

            self.pointer_mut().pressed_widget = hit;
            self.pointer_mut().last_pressed = hit;

            if let Some(pressed) = hit {
                self.device.proc.press_timestamp = self.now();
                self.device.proc.longpress_sent = false;
                {
                    let pointer = self.pointer_mut();
                    pointer.drag_limit_crossed = false;
                    pointer.drag_active = false;
                    pointer.drag_sum = Vector::zero();
                    pointer.vector = Vector::zero();
                }

                // The outermost ancestor marked "top" comes to the front.
                let mut walk = Some(pressed);
                let mut topmost = None;
                while let Some(widget) = walk {
                    if self.scene.flags(widget).contains(WidgetFlags::TOP) {
                        topmost = Some(widget);
                    }
                    walk = self.scene.parent(widget);
                }
                if let Some(topmost) = topmost {
                    self.scene.raise_to_front(topmost);
                    self.scene.invalidate(topmost);
                }

                self.send_signal(pressed, Signal::Pressed)?;
                self.send_event(pressed, WidgetEvent::Pressed)?;
            }
        }

        let vector = self.pointer().current_point - self.pointer().last_point;
        {
            let pointer = self.pointer_mut();
            pointer.vector = vector;
            // Low-pass the velocity estimate toward the sample delta.
            // The one-step nudge makes the estimate settle at zero when
            // motion stops, instead of orbiting it by rounding.
            let mut throw = pointer.throw_vector;
            throw.x = (throw.x * 5) >> 3;
            throw.y = (throw.y * 5) >> 3;
            throw.x -= throw.x.signum();
            throw.y -= throw.y.signum();
            throw.x += (vector.x * 4) >> 3;
            throw.y += (vector.y * 4) >> 3;
            pointer.throw_vector = throw;
        }

        if let Some(pressed) = self.pointer().pressed_widget {
            self.send_signal(pressed, Signal::Pressing)?;
            self.send_event(pressed, WidgetEvent::Pressing)?;

            self.drag()?;

            if !self.pointer().drag_active
                && !self.device.proc.longpress_sent
                && elapsed(self.now(), self.device.proc.press_timestamp)
                    > self.options.long_press_time
            {
                self.send_signal(pressed, Signal::LongPress)?;
                self.send_event(pressed, WidgetEvent::LongPressed)?;
                self.device.proc.longpress_sent = true;
                self.device.proc.longpress_repeat_timestamp = self.now();
            }
            if !self.pointer().drag_active
                && self.device.proc.longpress_sent
                && elapsed(self.now(), self.device.proc.longpress_repeat_timestamp)
                    > self.options.long_press_repeat_time
            {
                self.send_signal(pressed, Signal::LongPressRepeat)?;
                self.send_event(pressed, WidgetEvent::LongPressedRepeat)?;
                self.device.proc.longpress_repeat_timestamp = self.now();
            }
        }
        Ok(())
    }

    /// The release path. Also entered by the button-array adapter.
    pub(crate) fn release(&mut self) -> Flow {
        if self.pointer().wait_until_release {
            let pointer = self.pointer_mut();
            pointer.pressed_widget = None;
            pointer.last_pressed = None;
            pointer.wait_until_release = false;
            self.device.proc.press_timestamp = 0;
            self.device.proc.longpress_repeat_timestamp = 0;
        }

        if let Some(released) = self.pointer().pressed_widget {
            // A press-lost-protected widget may have kept the press even
            // though the pointer slid off; only report a release if the
            // release actually lands on it.
            let protected = self
                .scene
                .flags(released)
                .contains(WidgetFlags::PROTECT_PRESS_LOST);
            let point = self.pointer().current_point;
            let still_on =
                !protected || hit_test::hit_test(&*self.scene, released, point) == Some(released);

            if still_on {
                self.send_signal(released, Signal::Released)?;
                if !self.device.proc.longpress_sent && !self.pointer().drag_active {
                    self.send_event(released, WidgetEvent::Clicked)?;
                } else {
                    self.send_event(released, WidgetEvent::Released)?;
                }
            } else {
                self.send_signal(released, Signal::PressLost)?;
                self.send_event(released, WidgetEvent::PressLost)?;
            }

            if self.options.use_groups {
                // Pointer devices never edit; a click always leaves edit
                // mode.
                if let Some(group) = self.scene.group_of(released)
                    && self.scene.editing(group)
                {
                    self.scene.set_editing(group, false);
                }
                self.click_focus(released)?;
            }

            self.guard()?;
            self.pointer_mut().pressed_widget = None;
            self.device.proc.press_timestamp = 0;
            self.device.proc.longpress_repeat_timestamp = 0;
        }

        if self.pointer().last_pressed.is_some() {
            self.drag_throw()?;
        }
        Ok(())
    }

    /// Focus the released widget's enclosing group member, unless a
    /// click-focus protection along the way forbids it.
    fn click_focus(&mut self, released: WidgetId) -> Flow {
        if self
            .scene
            .flags(released)
            .contains(WidgetFlags::PROTECT_CLICK_FOCUS)
        {
            return Ok(());
        }

        let mut group = self.scene.group_of(released);
        let mut candidate = released;
        let mut target = Some(candidate);
        while group.is_none() {
            match self.scene.parent(candidate) {
                None => {
                    target = None;
                    break;
                }
                Some(parent) => {
                    if self
                        .scene
                        .flags(parent)
                        .contains(WidgetFlags::PROTECT_CLICK_FOCUS)
                    {
                        target = None;
                        break;
                    }
                    candidate = parent;
                    target = Some(parent);
                    group = self.scene.group_of(parent);
                }
            }
        }

        if let (Some(group), Some(target)) = (group, target)
            && self.scene.click_focus_enabled(group)
        {
            self.focus_widget(target)?;
        }
        Ok(())
    }
}
