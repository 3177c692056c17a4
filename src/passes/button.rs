// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! The button-array adapter: button indexes become synthetic pointer
//! presses at configured screen points.

use tracing::trace;

use crate::core::SampleState;
use crate::passes::{DevicePass, Flow};

impl DevicePass<'_> {
    /// Process one button sample by delegating to the pointer paths.
    ///
    /// Pressing a different button than last time must always release
    /// the previous point first, whatever the sample's state; the press
    /// at the new point happens on the driver's next (repeated) sample.
    pub(crate) fn process_button(&mut self, index: usize, state: SampleState) -> Flow {
        let Some(&point) = self.device.button_points.get(index) else {
            trace!("button {} of {} has no point mapping", index, self.id);
            return Ok(());
        };

        self.pointer_mut().current_point = point;
        let same_point = self.pointer().last_point == point;
        let flow = if same_point && state == SampleState::Pressed {
            self.press()
        } else {
            self.release()
        };

        let current = self.pointer().current_point;
        self.pointer_mut().last_point = current;
        flow
    }
}
