// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! The context handed to widget callbacks during input processing.

use crate::core::device::{DeviceId, DeviceKind};

/// Context passed alongside every signal, event and focus change.
///
/// Widget callbacks run synchronously inside the input pass and may
/// mutate the scene arbitrarily, including destroying the widget the
/// pass is currently tracking. The context is how a callback tells the
/// core about it: [`request_reset`](Self::request_reset) latches a reset
/// query that the core honors as soon as the callback returns, dropping
/// every reference the device held and abandoning the rest of the
/// sample.
pub struct EventCtx {
    device: DeviceId,
    kind: DeviceKind,
    reset_requested: bool,
    release_wait_requested: bool,
}

impl EventCtx {
    pub(crate) fn new(device: DeviceId, kind: DeviceKind) -> Self {
        Self {
            device,
            kind,
            reset_requested: false,
            release_wait_requested: false,
        }
    }

    /// The device whose sample triggered this callback.
    pub fn device(&self) -> DeviceId {
        self.device
    }

    /// The kind of [`device`](Self::device).
    pub fn device_kind(&self) -> DeviceKind {
        self.kind
    }

    /// Ask the core to drop all widget references held for this device
    /// and restart its gesture state machine cleanly.
    ///
    /// Must be called whenever the callback destroyed a widget the
    /// device might be pointing at. Idempotent.
    pub fn request_reset(&mut self) {
        self.reset_requested = true;
    }

    /// Ask the core to ignore this device until its next release edge.
    ///
    /// Only meaningful for pointer-family devices; others absorb it.
    pub fn wait_until_release(&mut self) {
        self.release_wait_requested = true;
    }

    pub(crate) fn take_reset_request(&mut self) -> bool {
        std::mem::take(&mut self.reset_requested)
    }

    pub(crate) fn take_release_wait_request(&mut self) -> bool {
        std::mem::take(&mut self.release_wait_requested)
    }
}
