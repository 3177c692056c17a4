// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! The encoder state machine: diff-stepped navigation and edit mode.

use crate::core::{Key, SampleState, Scene, Signal, elapsed};
use crate::passes::{DevicePass, Flow};

impl DevicePass<'_> {
    /// Process one encoder sample.
    ///
    /// Turning the knob moves focus, or adjusts the focused widget when
    /// the group is in edit mode. A long press of the knob toggles edit
    /// mode on editable widgets; a short press activates.
    pub(crate) fn process_encoder(&mut self, diff: i32, state: SampleState) -> Flow {
        if !self.options.use_groups {
            return Ok(());
        }
        let Some(group) = self.device.group else {
            return Ok(());
        };

        // Detents only count while the push button is up.
        if state == SampleState::Released {
            if self.scene.editing(group) {
                let key = if diff < 0 { Key::Left } else { Key::Right };
                for _ in 0..diff.unsigned_abs() {
                    self.send_group_data(group, key)?;
                }
            } else if diff < 0 {
                for _ in 0..diff.unsigned_abs() {
                    self.focus_prev(group)?;
                }
            } else {
                for _ in 0..diff.unsigned_abs() {
                    self.focus_next(group)?;
                }
            }
        }

        let last_state = self.key().last_state;
        match (last_state, state) {
            (SampleState::Released, SampleState::Pressed) => {
                self.device.proc.press_timestamp = self.now();
            }
            (SampleState::Pressed, SampleState::Pressed) => {
                if !self.device.proc.longpress_sent
                    && elapsed(self.now(), self.device.proc.press_timestamp)
                        > self.options.long_press_time
                {
                    let focused = self.scene.focused(group);
                    let editable = focused.is_some_and(|focused| self.scene.query_editable(focused));

                    if editable {
                        if !self.scene.is_singleton(group) {
                            // Toggling focus away is how edit mode ends,
                            // so a singleton group never enters it.
                            let editing = self.scene.editing(group);
                            self.scene.set_editing(group, !editing);
                        } else if let Some(focused) = focused {
                            self.send_signal(focused, Signal::LongPress)?;
                        }
                    } else if let Some(focused) = focused {
                        self.send_signal(focused, Signal::LongPress)?;
                    }
                    self.device.proc.longpress_sent = true;
                }
            }
            (SampleState::Pressed, SampleState::Released) => {
                let focused = self.scene.focused(group);
                let editable = focused.is_some_and(|focused| self.scene.query_editable(focused));

                if !editable {
                    self.send_group_data(group, Key::Enter)?;
                } else if self.scene.editing(group) {
                    // A long-press release comes from the mode toggle and
                    // must not also activate; a singleton group has no
                    // toggle, so its releases always activate.
                    if !self.device.proc.longpress_sent || self.scene.is_singleton(group) {
                        self.send_group_data(group, Key::Enter)?;
                    }
                } else if !self.device.proc.longpress_sent {
                    self.scene.set_editing(group, true);
                }

                self.device.proc.press_timestamp = 0;
                self.device.proc.longpress_sent = false;
            }
            (SampleState::Released, SampleState::Released) => {}
        }

        self.key_mut().last_state = state;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::app::InputOptions;
    use crate::core::{DeviceKind, Key, Sample, SampleState, Scene, Signal, WidgetFlags};
    use crate::testing::{Record, TestHarness};

    fn turn(diff: i32) -> Sample {
        Sample::Encoder {
            state: SampleState::Released,
            diff,
        }
    }

    fn knob(state: SampleState) -> Sample {
        Sample::Encoder { state, diff: 0 }
    }

    fn encoder_fixture(
        members: usize,
    ) -> (TestHarness, crate::core::GroupId, Vec<crate::core::WidgetId>) {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let group = harness.scene.add_group();
        let widgets = (0..members)
            .map(|index| {
                let widget = harness.scene.add_widget(
                    screen,
                    50 * index as i32,
                    0,
                    50,
                    50,
                    WidgetFlags::CLICKABLE,
                );
                harness.scene.add_to_group(group, widget);
                widget
            })
            .collect();
        (harness, group, widgets)
    }

    /// In navigate mode each detent moves focus one step.
    #[test]
    fn detents_step_focus() {
        let (mut harness, group, widgets) = encoder_fixture(4);
        let device = harness.add_device(DeviceKind::Encoder);
        harness.root.set_group(device, group);

        harness.push(device, turn(3));
        harness.step(10);
        assert_eq!(harness.scene.focused(group), Some(widgets[3]));
        let next_steps = harness
            .scene
            .drain_records()
            .iter()
            .filter(|record| matches!(record, Record::FocusNext(id) if *id == group))
            .count();
        assert_eq!(next_steps, 3);

        harness.push(device, turn(-1));
        harness.step(10);
        assert_eq!(harness.scene.focused(group), Some(widgets[2]));
    }

    /// In edit mode detents become LEFT/RIGHT data for the focused
    /// widget.
    #[test]
    fn detents_edit_the_focused_widget_in_edit_mode() {
        let (mut harness, group, _) = encoder_fixture(2);
        harness.scene.set_editing(group, true);
        harness.scene.drain_records();
        let device = harness.add_device(DeviceKind::Encoder);
        harness.root.set_group(device, group);

        harness.push(device, turn(2));
        harness.step(10);
        harness.push(device, turn(-1));
        harness.step(10);

        let data: Vec<_> = harness
            .scene
            .drain_records()
            .into_iter()
            .filter_map(|record| match record {
                Record::Data(id, key) if id == group => Some(key),
                _ => None,
            })
            .collect();
        assert_eq!(data, vec![Key::Right, Key::Right, Key::Left]);
    }

    /// A long knob press on an editable widget toggles edit mode; the
    /// following release does not activate.
    #[test]
    fn long_press_toggles_edit_mode() {
        let (mut harness, group, widgets) = encoder_fixture(2);
        harness.scene.set_editable(widgets[0], true);
        let device = harness.add_device(DeviceKind::Encoder);
        harness.root.set_group(device, group);

        harness.push(device, knob(SampleState::Pressed));
        harness.step(0);
        for _ in 0..50 {
            harness.step(10);
        }
        assert!(harness.scene.editing(group));

        harness.push(device, knob(SampleState::Released));
        harness.step(10);
        assert!(harness.scene.editing(group));
        let records = harness.scene.drain_records();
        assert!(!records.contains(&Record::Data(group, Key::Enter)));

        // A second long press leaves edit mode again.
        harness.push(device, knob(SampleState::Pressed));
        harness.step(10);
        for _ in 0..50 {
            harness.step(10);
        }
        assert!(!harness.scene.editing(group));
    }

    /// A short press on an editable widget enters edit mode; the next
    /// short press, while editing, activates instead.
    #[test]
    fn short_press_enters_edit_mode_then_activates() {
        let (mut harness, group, widgets) = encoder_fixture(2);
        harness.scene.set_editable(widgets[0], true);
        let device = harness.add_device(DeviceKind::Encoder);
        harness.root.set_group(device, group);

        harness.push(device, knob(SampleState::Pressed));
        harness.step(10);
        harness.push(device, knob(SampleState::Released));
        harness.step(10);
        assert!(harness.scene.editing(group));

        harness.push(device, knob(SampleState::Pressed));
        harness.step(10);
        harness.push(device, knob(SampleState::Released));
        harness.step(10);
        assert!(harness.scene.editing(group));
        assert!(
            harness
                .scene
                .drain_records()
                .contains(&Record::Data(group, Key::Enter))
        );
    }

    /// A singleton group cannot toggle edit mode: the long press becomes
    /// a plain long-press signal to the focused widget.
    #[test]
    fn singleton_groups_never_toggle_edit_mode() {
        let (mut harness, group, widgets) = encoder_fixture(1);
        harness.scene.set_editable(widgets[0], true);
        let device = harness.add_device(DeviceKind::Encoder);
        harness.root.set_group(device, group);

        harness.push(device, knob(SampleState::Pressed));
        harness.step(0);
        for _ in 0..50 {
            harness.step(10);
        }
        assert!(!harness.scene.editing(group));
        assert!(
            harness
                .scene
                .drain_records()
                .contains(&Record::Signal(widgets[0], Signal::LongPress))
        );
    }

    /// A press on a non-editable widget activates it with ENTER on
    /// release; a long press only signals.
    #[test]
    fn non_editable_widgets_get_enter() {
        let (mut harness, group, widgets) = encoder_fixture(2);
        let device = harness.add_device(DeviceKind::Encoder);
        harness.root.set_group(device, group);

        harness.push(device, knob(SampleState::Pressed));
        harness.step(10);
        harness.push(device, knob(SampleState::Released));
        harness.step(10);
        assert!(
            harness
                .scene
                .drain_records()
                .contains(&Record::Data(group, Key::Enter))
        );

        harness.push(device, knob(SampleState::Pressed));
        harness.step(10);
        for _ in 0..50 {
            harness.step(10);
        }
        assert!(
            harness
                .scene
                .drain_records()
                .contains(&Record::Signal(widgets[0], Signal::LongPress))
        );
        assert!(!harness.scene.editing(group));
    }

    /// With groups compiled out by configuration, encoder samples are
    /// consumed silently.
    #[test]
    fn encoder_without_groups_is_inert() {
        let mut harness = TestHarness::with_options(InputOptions {
            use_groups: false,
            ..Default::default()
        });
        let screen = harness.scene.active_screen();
        let widget = harness
            .scene
            .add_widget(screen, 0, 0, 50, 50, WidgetFlags::CLICKABLE);
        let group = harness.scene.add_group();
        harness.scene.add_to_group(group, widget);
        let device = harness.add_device(DeviceKind::Encoder);
        harness.root.set_group(device, group);

        harness.push(device, turn(3));
        harness.step(10);
        harness.push(device, knob(SampleState::Pressed));
        harness.step(10);
        harness.push(device, knob(SampleState::Released));
        harness.step(10);

        assert!(harness.scene.drain_records().is_empty());
        assert_eq!(harness.scene.focused(group), Some(widget));
    }
}
