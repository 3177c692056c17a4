// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! Dragging a widget under a press, and throwing it after the release.
//!
//! Drag and throw are the same motion engine with two vector sources:
//! while pressed the vector is the sample delta, after release it is
//! the low-pass velocity estimate decayed a bit per tick. Both go
//! through [`DevicePass::apply_vector`], which reports per axis whether
//! the write actually moved the target so both can detect a stall.

use crate::core::{Scene, Signal, Vector, WidgetFlags, WidgetId};
use crate::passes::{DevicePass, Flow};

impl DevicePass<'_> {
    /// The widget drag motion actually applies to: the nearest ancestor
    /// (possibly `origin` itself) not delegating drags to its parent.
    fn resolve_drag_target(&self, origin: WidgetId) -> Option<WidgetId> {
        let mut target = Some(origin);
        while let Some(widget) = target {
            if self.scene.flags(widget).contains(WidgetFlags::DRAG_PARENT) {
                target = self.scene.parent(widget);
            } else {
                break;
            }
        }
        target
    }

    /// Add `vector` to the target's position. Returns, per axis,
    /// whether the absolute origin moved.
    fn apply_vector(&mut self, target: WidgetId, vector: Vector) -> (bool, bool) {
        let before = self.scene.bounds(target).min;
        let position = self.scene.position(target);
        self.scene.set_position(target, position + vector);
        let after = self.scene.bounds(target).min;
        (after.x != before.x, after.y != before.y)
    }

    /// One pressed-sample step of the drag engine.
    pub(crate) fn drag(&mut self) -> Flow {
        let Some(pressed) = self.pointer().pressed_widget else {
            return Ok(());
        };
        let Some(target) = self.resolve_drag_target(pressed) else {
            return Ok(());
        };
        if !self.scene.flags(target).contains(WidgetFlags::DRAGGABLE) {
            return Ok(());
        }

        let limit = self.options.drag_limit;
        let vector = self.pointer().vector;
        {
            let pointer = self.pointer_mut();
            pointer.drag_sum += vector;
            if !pointer.drag_limit_crossed
                && (pointer.drag_sum.x.abs() >= limit || pointer.drag_sum.y.abs() >= limit)
            {
                pointer.drag_limit_crossed = true;
            }
        }

        if !self.pointer().drag_limit_crossed || vector == Vector::zero() {
            return Ok(());
        }

        let parent = self.scene.parent(target);
        let parent_size_before = parent.map(|parent| self.scene.size(parent));
        let pending_before = self.scene.pending_invalidations();

        let (moved_x, moved_y) = self.apply_vector(target, vector);

        if moved_x || moved_y {
            if !self.pointer().drag_active {
                self.send_signal(target, Signal::DragBegin)?;
                self.pointer_mut().drag_active = true;
            }
        } else {
            // The write was absorbed (the target is pinned, or at its
            // limit). Unless the parent resized out from under it, the
            // speculative invalidation the write queued can be dropped.
            let parent_size_after = parent.map(|parent| self.scene.size(parent));
            if parent_size_after == parent_size_before {
                let added = self
                    .scene
                    .pending_invalidations()
                    .saturating_sub(pending_before);
                self.scene.retract_invalidations(added);
            }
        }
        Ok(())
    }

    /// One release-tick step of the inertial throw.
    pub(crate) fn drag_throw(&mut self) -> Flow {
        if !self.pointer().drag_active {
            return Ok(());
        }
        let Some(last_pressed) = self.pointer().last_pressed else {
            return Ok(());
        };
        let Some(target) = self.resolve_drag_target(last_pressed) else {
            return Ok(());
        };

        if !self.scene.flags(target).contains(WidgetFlags::DRAG_THROW) {
            self.pointer_mut().drag_active = false;
            return self.send_signal(target, Signal::DragEnd);
        }

        // Integer decay: the vector provably reaches zero, so the throw
        // cannot creep forever.
        let keep = 100 - self.options.drag_throw;
        let throw = {
            let pointer = self.pointer_mut();
            pointer.throw_vector.x = pointer.throw_vector.x * keep / 100;
            pointer.throw_vector.y = pointer.throw_vector.y * keep / 100;
            pointer.throw_vector
        };

        if throw == Vector::zero() {
            self.pointer_mut().drag_active = false;
            return self.send_signal(target, Signal::DragEnd);
        }

        let (moved_x, moved_y) = self.apply_vector(target, throw);
        let stalled_x = !moved_x || throw.x == 0;
        let stalled_y = !moved_y || throw.y == 0;
        if stalled_x && stalled_y {
            let pointer = self.pointer_mut();
            pointer.drag_active = false;
            pointer.vector = Vector::zero();
            pointer.throw_vector = Vector::zero();
            self.send_signal(target, Signal::DragEnd)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::app::InputOptions;
    use crate::core::{
        DeviceKind, Point, Sample, SampleState, Scene, Signal, Vector, WidgetEvent, WidgetFlags,
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

    /// Below the dead-zone nothing moves; the sample crossing it moves
    /// the target and emits drag-begin.
    #[test]
    fn dead_zone_holds_until_the_limit() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let panel = harness.scene.add_widget(
            screen,
            0,
            0,
            200,
            200,
            WidgetFlags::CLICKABLE | WidgetFlags::DRAGGABLE,
        );
        let device = harness.add_device(DeviceKind::Pointer);

        harness.push(device, pressed(10, 10));
        harness.step(10);
        harness.push(device, pressed(10, 14));
        harness.step(10);
        harness.push(device, pressed(10, 19));
        harness.step(10);
        // Cumulative motion 9 < 10: still parked.
        assert_eq!(harness.scene.position(panel), Point::new(0, 0));
        assert!(!harness.root.is_dragging(device));
        harness.scene.drain_records();

        harness.push(device, pressed(10, 22));
        harness.step(10);
        // Sum 12 >= 10: this sample's delta is applied.
        assert_eq!(harness.scene.position(panel), Point::new(0, 3));
        assert!(harness.root.is_dragging(device));
        let records = harness.scene.drain_records();
        assert!(records.contains(&Record::Signal(panel, Signal::DragBegin)));
    }

    /// One pixel short of the limit never begins a drag.
    #[test]
    fn dead_zone_boundary_is_inclusive() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let panel = harness.scene.add_widget(
            screen,
            0,
            0,
            200,
            200,
            WidgetFlags::CLICKABLE | WidgetFlags::DRAGGABLE,
        );
        let device = harness.add_device(DeviceKind::Pointer);

        harness.push(device, pressed(50, 50));
        harness.step(10);
        harness.push(device, pressed(50, 59));
        harness.step(10);
        assert_eq!(harness.scene.position(panel), Point::new(0, 0));
        assert!(
            !harness
                .scene
                .drain_records()
                .contains(&Record::Signal(panel, Signal::DragBegin))
        );

        harness.push(device, pressed(50, 60));
        harness.step(10);
        assert_eq!(harness.scene.position(panel), Point::new(0, 1));
        assert!(
            harness
                .scene
                .drain_records()
                .contains(&Record::Signal(panel, Signal::DragBegin))
        );
    }

    /// Drags on a drag-parent widget move the ancestor instead.
    #[test]
    fn drag_parent_delegates_to_the_ancestor() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let panel = harness.scene.add_widget(
            screen,
            0,
            0,
            200,
            200,
            WidgetFlags::CLICKABLE | WidgetFlags::DRAGGABLE,
        );
        let child = harness.scene.add_widget(
            panel,
            10,
            10,
            50,
            50,
            WidgetFlags::CLICKABLE | WidgetFlags::DRAG_PARENT,
        );
        let device = harness.add_device(DeviceKind::Pointer);

        harness.push(device, pressed(20, 20));
        harness.step(10);
        harness.push(device, pressed(20, 40));
        harness.step(10);

        assert_eq!(harness.scene.position(panel), Point::new(0, 20));
        assert_eq!(harness.scene.position(child), Point::new(10, 10));
        let records = harness.scene.drain_records();
        assert!(records.contains(&Record::Signal(panel, Signal::DragBegin)));
    }

    /// A release after a drag on a widget without throw ends the drag
    /// immediately; the released event is not a click.
    #[test]
    fn drag_without_throw_ends_on_release() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let panel = harness.scene.add_widget(
            screen,
            0,
            0,
            200,
            200,
            WidgetFlags::CLICKABLE | WidgetFlags::DRAGGABLE,
        );
        let device = harness.add_device(DeviceKind::Pointer);

        harness.push(device, pressed(10, 10));
        harness.step(10);
        harness.push(device, pressed(10, 30));
        harness.step(10);
        harness.scene.drain_records();

        harness.push(device, released(10, 30));
        harness.step(10);
        let records = harness.scene.drain_records();
        assert!(records.contains(&Record::Signal(panel, Signal::DragEnd)));
        assert!(records.contains(&Record::Event(panel, WidgetEvent::Released)));
        assert!(!records.contains(&Record::Event(panel, WidgetEvent::Clicked)));
        assert!(!harness.root.is_dragging(device));
    }

    /// With full decay the throw terminates on the first release tick.
    #[test]
    fn full_decay_terminates_the_throw_in_one_step() {
        let mut harness = TestHarness::with_options(InputOptions {
            drag_throw: 100,
            ..Default::default()
        });
        let screen = harness.scene.active_screen();
        let panel = harness.scene.add_widget(
            screen,
            0,
            0,
            200,
            200,
            WidgetFlags::CLICKABLE | WidgetFlags::DRAGGABLE | WidgetFlags::DRAG_THROW,
        );
        let device = harness.add_device(DeviceKind::Pointer);

        harness.push(device, pressed(10, 10));
        harness.step(10);
        for step in 1..=4 {
            harness.push(device, pressed(10, 10 + step * 20));
            harness.step(10);
        }
        harness.scene.drain_records();

        harness.push(device, released(10, 90));
        harness.step(10);
        assert!(!harness.root.is_dragging(device));
        assert!(
            harness
                .scene
                .drain_records()
                .contains(&Record::Signal(panel, Signal::DragEnd))
        );
        let rest_position = harness.scene.position(panel);

        // Further release ticks leave the target alone.
        harness.step(10);
        harness.step(10);
        assert_eq!(harness.scene.position(panel), rest_position);
        assert!(
            !harness
                .scene
                .drain_records()
                .contains(&Record::Signal(panel, Signal::DragEnd))
        );
    }

    /// A throw keeps moving the target across release ticks and decays
    /// to a stop, emitting exactly one drag-end.
    #[test]
    fn throw_decays_to_a_stop() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let panel = harness.scene.add_widget(
            screen,
            0,
            0,
            200,
            200,
            WidgetFlags::CLICKABLE | WidgetFlags::DRAGGABLE | WidgetFlags::DRAG_THROW,
        );
        let device = harness.add_device(DeviceKind::Pointer);

        harness.push(device, pressed(10, 10));
        harness.step(10);
        for step in 1..=4 {
            harness.push(device, pressed(10, 10 + step * 20));
            harness.step(10);
        }
        let position_at_release = harness.scene.position(panel);
        harness.scene.drain_records();

        harness.push(device, released(10, 90));
        harness.step(10);
        // Still coasting after the first release tick.
        assert!(harness.root.is_dragging(device));
        assert!(harness.scene.position(panel).y > position_at_release.y);

        let mut drag_ends = 0;
        for _ in 0..200 {
            harness.step(10);
            drag_ends += harness
                .scene
                .drain_records()
                .iter()
                .filter(|record| matches!(record, Record::Signal(id, Signal::DragEnd) if *id == panel))
                .count();
        }
        assert!(!harness.root.is_dragging(device));
        assert_eq!(drag_ends, 1);
    }

    /// A pinned target absorbs position writes: no drag-begin, and the
    /// speculative invalidations are retracted.
    #[test]
    fn pinned_target_retracts_speculative_invalidations() {
        let mut harness = TestHarness::new();
        let screen = harness.scene.active_screen();
        let panel = harness.scene.add_widget(
            screen,
            0,
            0,
            200,
            200,
            WidgetFlags::CLICKABLE | WidgetFlags::DRAGGABLE,
        );
        harness.scene.lock_position(panel);
        let device = harness.add_device(DeviceKind::Pointer);

        harness.push(device, pressed(10, 10));
        harness.step(10);
        harness.push(device, pressed(10, 40));
        harness.step(10);

        assert_eq!(harness.scene.position(panel), Point::new(0, 0));
        assert_eq!(harness.scene.pending_invalidations(), 0);
        assert!(
            !harness
                .scene
                .drain_records()
                .contains(&Record::Signal(panel, Signal::DragBegin))
        );
        assert_eq!(harness.root.drag_vector(device), Vector::new(0, 30));
    }
}
