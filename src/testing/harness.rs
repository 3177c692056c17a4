// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! A headless environment driving the input core from scripted samples.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::app::{InputOptions, InputRoot};
use crate::core::{
    DeviceId, DeviceKind, Point, Readout, Sample, SampleSource, SampleState, TickSource,
};
use crate::testing::TestScene;

/// A settable, shareable [`TickSource`].
#[derive(Debug, Default)]
pub struct TestClock(Cell<u32>);

impl TestClock {
    /// Move the clock forward.
    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }

    /// Jump to an absolute tick.
    pub fn set(&self, now: u32) {
        self.0.set(now);
    }
}

impl TickSource for TestClock {
    fn now(&self) -> u32 {
        self.0.get()
    }
}

struct QueueState {
    queue: VecDeque<Sample>,
    /// Replayed while the queue is empty, like level-triggered hardware
    /// that keeps reporting its held state every poll.
    current: Sample,
}

/// Encoder detents are deltas: they must not be replayed by the sticky
/// driver state.
fn settle(sample: Sample) -> Sample {
    match sample {
        Sample::Encoder { state, .. } => Sample::Encoder { state, diff: 0 },
        other => other,
    }
}

fn idle_sample(kind: DeviceKind) -> Sample {
    match kind {
        DeviceKind::Pointer => Sample::Pointer {
            state: SampleState::Released,
            point: Point::zero(),
        },
        DeviceKind::Keypad => Sample::Key {
            state: SampleState::Released,
            key: None,
        },
        DeviceKind::Encoder => Sample::Encoder {
            state: SampleState::Released,
            diff: 0,
        },
        DeviceKind::ButtonArray => Sample::Button {
            state: SampleState::Released,
            index: 0,
        },
    }
}

/// A scripted driver backend: a queue of samples to deliver, plus
/// level-triggered replay of the last one.
///
/// Real hardware polled by the input pass keeps reporting its current
/// state on every read, so a pushed press stays held until a release is
/// pushed after it. Encoder detents are deltas and are consumed once.
///
/// The handle is cheaply cloneable: keep one side to
/// [`push`](Self::push) samples from the test, and register the device
/// with the closure returned by [`driver`](Self::driver).
#[derive(Clone)]
pub struct QueueSource {
    state: Rc<RefCell<QueueState>>,
}

impl QueueSource {
    /// An empty source idling in the released state of `kind`.
    pub fn new(kind: DeviceKind) -> Self {
        Self {
            state: Rc::new(RefCell::new(QueueState {
                queue: VecDeque::new(),
                current: idle_sample(kind),
            })),
        }
    }

    /// Queue a sample for the coming reads.
    pub fn push(&self, sample: Sample) {
        self.state.borrow_mut().queue.push_back(sample);
    }

    /// The polling side, to pass to
    /// [`InputRoot::register`](crate::app::InputRoot::register).
    pub fn driver(&self) -> impl SampleSource + use<> {
        let state = Rc::clone(&self.state);
        move || {
            let mut state = state.borrow_mut();
            let sample = match state.queue.pop_front() {
                Some(sample) => {
                    state.current = settle(sample);
                    sample
                }
                None => state.current,
            };
            Readout {
                sample,
                more: !state.queue.is_empty(),
            }
        }
    }
}

/// A harness bundling an [`InputRoot`], a [`TestScene`], a [`TestClock`]
/// and one [`QueueSource`] per registered device.
///
/// Push samples, step the clock, then assert on the scene's records:
///
/// ```
/// use trellis_input::core::{DeviceKind, Point, Sample, SampleState, WidgetEvent, WidgetFlags};
/// use trellis_input::testing::{Record, TestHarness};
///
/// let mut harness = TestHarness::new();
/// let screen = harness.scene.active_screen();
/// let button = harness
///     .scene
///     .add_widget(screen, 0, 0, 50, 50, WidgetFlags::CLICKABLE);
/// let device = harness.add_device(DeviceKind::Pointer);
///
/// harness.push(
///     device,
///     Sample::Pointer {
///         state: SampleState::Pressed,
///         point: Point::new(10, 10),
///     },
/// );
/// harness.step(10);
/// assert!(
///     harness
///         .scene
///         .drain_records()
///         .contains(&Record::Event(button, WidgetEvent::Pressed))
/// );
/// ```
pub struct TestHarness {
    /// The scene under test.
    pub scene: TestScene,
    /// The registry under test.
    pub root: InputRoot,
    clock: Rc<TestClock>,
    drivers: Vec<QueueSource>,
}

impl TestHarness {
    /// A harness with default options and a 480×320 scene.
    pub fn new() -> Self {
        Self::with_options(InputOptions::default())
    }

    /// A harness with the given options.
    pub fn with_options(options: InputOptions) -> Self {
        let clock = Rc::new(TestClock::default());
        let root = InputRoot::new(options, Box::new(Rc::clone(&clock)));
        Self {
            scene: TestScene::new(480, 320),
            root,
            clock,
            drivers: Vec::new(),
        }
    }

    /// Register a device backed by a fresh [`QueueSource`].
    pub fn add_device(&mut self, kind: DeviceKind) -> DeviceId {
        let source = QueueSource::new(kind);
        let id = self.root.register(kind, source.driver());
        assert_eq!(id.0, self.drivers.len());
        self.drivers.push(source);
        id
    }

    /// Queue a sample on a device's driver.
    pub fn push(&mut self, device: DeviceId, sample: Sample) {
        self.drivers[device.0].push(sample);
    }

    /// Move the clock forward without processing.
    pub fn advance(&mut self, ms: u32) {
        self.clock.advance(ms);
    }

    /// Run one input pass.
    pub fn process(&mut self) {
        self.root.process(&mut self.scene);
    }

    /// Move the clock forward and run one input pass.
    pub fn step(&mut self, ms: u32) {
        self.advance(ms);
        self.process();
    }

    /// The current tick.
    pub fn now(&self) -> u32 {
        self.clock.0.get()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
