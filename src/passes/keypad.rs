// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! The keypad state machine: enter/next/prev semantics over a focus group.

use crate::core::{Key, SampleState, Scene, Signal, WidgetEvent, elapsed};
use crate::passes::{DevicePass, Flow};

impl DevicePass<'_> {
    /// Process one keypad sample.
    ///
    /// Keypads act on the focus group's focused widget: ENTER presses
    /// it, NEXT/PREV move focus, anything else is forwarded as data.
    /// A device without a group consumes its samples silently.
    pub(crate) fn process_keypad(&mut self, key_in: Option<Key>, state: SampleState) -> Flow {
        if !self.options.use_groups {
            return Ok(());
        }
        let Some(group) = self.device.group else {
            return Ok(());
        };

        let last_state = self.key().last_state;
        let mut key = key_in;

        match (last_state, state) {
            (SampleState::Released, SampleState::Pressed) => {
                self.device.proc.press_timestamp = self.now();
                if key == Some(Key::Enter)
                    && let Some(focused) = self.scene.focused(group)
                {
                    self.send_signal(focused, Signal::Pressed)?;
                    self.send_event(focused, WidgetEvent::Pressed)?;
                }
            }
            (SampleState::Pressed, SampleState::Pressed) => {
                if key == Some(Key::Enter)
                    && !self.device.proc.longpress_sent
                    && elapsed(self.now(), self.device.proc.press_timestamp)
                        > self.options.long_press_time
                    && let Some(focused) = self.scene.focused(group)
                {
                    self.send_signal(focused, Signal::LongPress)?;
                    self.device.proc.longpress_sent = true;
                    self.send_event(focused, WidgetEvent::LongPressed)?;
                }
            }
            (SampleState::Pressed, SampleState::Released) => {
                // Hardware may clear the key on the release edge; always
                // release the key that was pressed.
                key = self.key().last_key;

                if matches!(key, Some(Key::Next | Key::Prev)) {
                    // Keypads never edit; leave edit mode before moving
                    // focus.
                    self.scene.set_editing(group, false);
                }

                match key {
                    Some(Key::Next) => self.focus_next(group)?,
                    Some(Key::Prev) => self.focus_prev(group)?,
                    Some(Key::Enter) => {
                        if !self.device.proc.longpress_sent
                            && let Some(focused) = self.scene.focused(group)
                        {
                            self.send_signal(focused, Signal::Released)?;
                            self.send_event(focused, WidgetEvent::Clicked)?;
                        }
                    }
                    Some(other) => self.send_group_data(group, other)?,
                    None => {}
                }

                self.device.proc.press_timestamp = 0;
                self.device.proc.longpress_sent = false;
            }
            (SampleState::Released, SampleState::Released) => {}
        }

        self.key_mut().last_state = state;
        self.key_mut().last_key = key;
        Ok(())
    }
}
