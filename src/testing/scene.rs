// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! A scripted [`Scene`] implementation for tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use crate::core::{
    Bounds, ChildrenIds, EventCtx, GroupId, Key, Point, Scene, Signal, Size, WidgetEvent,
    WidgetFlags, WidgetId,
};

/// One delivery or focus operation observed by the [`TestScene`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    /// A signal was delivered to a widget.
    Signal(WidgetId, Signal),
    /// An event was delivered to a widget.
    Event(WidgetId, WidgetEvent),
    /// Focus moved to the next widget of a group.
    FocusNext(GroupId),
    /// Focus moved to the previous widget of a group.
    FocusPrev(GroupId),
    /// A specific widget was focused.
    Focus(WidgetId),
    /// A key was forwarded to a group as data.
    Data(GroupId, Key),
    /// A group's edit mode changed.
    Editing(GroupId, bool),
}

/// A recording of everything the input core asked the scene to do.
///
/// Internally a shared queue of [`Record`]s, so clones observe the same
/// stream.
#[derive(Clone, Debug, Default)]
pub struct Recording(Rc<RefCell<VecDeque<Record>>>);

impl Recording {
    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// The number of records.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Drop all records.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    /// Pop the next record, if any.
    pub fn next(&self) -> Option<Record> {
        self.0.borrow_mut().pop_front()
    }

    /// Drain every record collected so far.
    pub fn drain(&self) -> Vec<Record> {
        self.0.borrow_mut().drain(..).collect()
    }

    fn push(&self, record: Record) {
        self.0.borrow_mut().push_back(record);
    }
}

/// What a scripted widget callback does when its trigger fires.
#[derive(Clone, Copy, Debug)]
pub enum Reaction {
    /// Destroy a widget (possibly the recipient itself) and request a
    /// reset, like a real deletion would.
    Destroy(WidgetId),
    /// Request a reset without destroying anything.
    RequestReset,
    /// Ask the core to ignore the device until the next release edge.
    WaitUntilRelease,
}

struct TestWidget {
    parent: Option<WidgetId>,
    /// Front-most first, agreeing with hit-test order.
    children: Vec<WidgetId>,
    origin: Point,
    size: Size,
    flags: WidgetFlags,
    group: Option<GroupId>,
    editable: bool,
    /// Position writes are absorbed, modeling a constrained widget.
    position_locked: bool,
}

struct TestGroup {
    members: Vec<WidgetId>,
    focused: usize,
    editing: bool,
    click_focus: bool,
}

/// An in-memory widget tree, focus groups and invalidation queue.
///
/// New widgets are inserted in front of their siblings, like a toolkit
/// that paints the newest child on top. Destroyed ids are never reused,
/// so the core's liveness checks behave like generational handles.
pub struct TestScene {
    widgets: HashMap<WidgetId, TestWidget>,
    groups: HashMap<GroupId, TestGroup>,
    system_layer: WidgetId,
    top_layer: WidgetId,
    active_screen: WidgetId,
    invalidations: Vec<WidgetId>,
    recording: Recording,
    reactions: HashMap<(WidgetId, Signal), Reaction>,
}

impl TestScene {
    /// A scene with three empty full-screen layers.
    pub fn new(width: i32, height: i32) -> Self {
        let mut scene = Self {
            widgets: HashMap::new(),
            groups: HashMap::new(),
            system_layer: WidgetId::next(),
            top_layer: WidgetId::next(),
            active_screen: WidgetId::next(),
            invalidations: Vec::new(),
            recording: Recording::default(),
            reactions: HashMap::new(),
        };
        for layer in [scene.system_layer, scene.top_layer, scene.active_screen] {
            scene.widgets.insert(
                layer,
                TestWidget {
                    parent: None,
                    children: Vec::new(),
                    origin: Point::zero(),
                    size: Size::new(width, height),
                    flags: WidgetFlags::empty(),
                    group: None,
                    editable: false,
                    position_locked: false,
                },
            );
        }
        scene
    }

    /// Add a widget under `parent`, in front of its siblings.
    pub fn add_widget(
        &mut self,
        parent: WidgetId,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        flags: WidgetFlags,
    ) -> WidgetId {
        let id = WidgetId::next();
        self.widgets.insert(
            id,
            TestWidget {
                parent: Some(parent),
                children: Vec::new(),
                origin: Point::new(x, y),
                size: Size::new(width, height),
                flags,
                group: None,
                editable: false,
                position_locked: false,
            },
        );
        self.widgets
            .get_mut(&parent)
            .expect("add_widget: parent not in scene")
            .children
            .insert(0, id);
        id
    }

    /// Destroy a widget and its whole subtree.
    pub fn destroy(&mut self, widget: WidgetId) {
        let Some(removed) = self.widgets.remove(&widget) else {
            return;
        };
        for child in removed.children {
            self.destroy(child);
        }
        if let Some(parent) = removed.parent
            && let Some(parent) = self.widgets.get_mut(&parent)
        {
            parent.children.retain(|child| *child != widget);
        }
        if let Some(group) = removed.group
            && let Some(group) = self.groups.get_mut(&group)
        {
            if let Some(index) = group.members.iter().position(|member| *member == widget) {
                group.members.remove(index);
                if index < group.focused {
                    group.focused -= 1;
                } else if group.focused >= group.members.len() {
                    group.focused = 0;
                }
            }
        }
    }

    /// Replace a widget's flags.
    pub fn set_flags(&mut self, widget: WidgetId, flags: WidgetFlags) {
        if let Some(widget) = self.widgets.get_mut(&widget) {
            widget.flags = flags;
        }
    }

    /// Make the widget absorb position writes.
    pub fn lock_position(&mut self, widget: WidgetId) {
        if let Some(widget) = self.widgets.get_mut(&widget) {
            widget.position_locked = true;
        }
    }

    /// Mark the widget as in-place editable.
    pub fn set_editable(&mut self, widget: WidgetId, editable: bool) {
        if let Some(widget) = self.widgets.get_mut(&widget) {
            widget.editable = editable;
        }
    }

    /// Create an empty focus group (click focus enabled).
    pub fn add_group(&mut self) -> GroupId {
        let id = GroupId::next();
        self.groups.insert(
            id,
            TestGroup {
                members: Vec::new(),
                focused: 0,
                editing: false,
                click_focus: true,
            },
        );
        id
    }

    /// Append a widget to a group's focus ring.
    pub fn add_to_group(&mut self, group: GroupId, widget: WidgetId) {
        self.groups
            .get_mut(&group)
            .expect("add_to_group: group not in scene")
            .members
            .push(widget);
        if let Some(widget) = self.widgets.get_mut(&widget) {
            widget.group = Some(group);
        }
    }

    /// Enable or disable click focus for a group.
    pub fn set_click_focus(&mut self, group: GroupId, enabled: bool) {
        if let Some(group) = self.groups.get_mut(&group) {
            group.click_focus = enabled;
        }
    }

    /// Script what a widget's callback does when `signal` reaches it.
    pub fn on_signal(&mut self, widget: WidgetId, signal: Signal, reaction: Reaction) {
        self.reactions.insert((widget, signal), reaction);
    }

    /// A handle on the recorded delivery stream.
    pub fn records(&self) -> Recording {
        self.recording.clone()
    }

    /// Drain every record collected so far.
    pub fn drain_records(&self) -> Vec<Record> {
        self.recording.drain()
    }

    fn absolute_origin(&self, widget: WidgetId) -> Point {
        let record = &self.widgets[&widget];
        match record.parent {
            Some(parent) => self.absolute_origin(parent) + record.origin.to_vector(),
            None => record.origin,
        }
    }
}

impl Scene for TestScene {
    fn contains(&self, widget: WidgetId) -> bool {
        self.widgets.contains_key(&widget)
    }

    fn parent(&self, widget: WidgetId) -> Option<WidgetId> {
        self.widgets.get(&widget)?.parent
    }

    fn children(&self, widget: WidgetId) -> ChildrenIds {
        self.widgets
            .get(&widget)
            .map(|record| record.children.iter().copied().collect())
            .unwrap_or_default()
    }

    fn flags(&self, widget: WidgetId) -> WidgetFlags {
        self.widgets
            .get(&widget)
            .map(|record| record.flags)
            .unwrap_or_default()
    }

    fn bounds(&self, widget: WidgetId) -> Bounds {
        let Some(record) = self.widgets.get(&widget) else {
            return Bounds::new(Point::zero(), Point::zero());
        };
        let origin = self.absolute_origin(widget);
        Bounds::new(
            origin,
            Point::new(origin.x + record.size.width, origin.y + record.size.height),
        )
    }

    fn position(&self, widget: WidgetId) -> Point {
        self.widgets
            .get(&widget)
            .map(|record| record.origin)
            .unwrap_or_else(Point::zero)
    }

    fn size(&self, widget: WidgetId) -> Size {
        self.widgets
            .get(&widget)
            .map(|record| record.size)
            .unwrap_or_else(Size::zero)
    }

    fn group_of(&self, widget: WidgetId) -> Option<GroupId> {
        self.widgets.get(&widget)?.group
    }

    fn set_position(&mut self, widget: WidgetId, position: Point) {
        let Some(record) = self.widgets.get_mut(&widget) else {
            return;
        };
        if !record.position_locked {
            record.origin = position;
        }
        // A write always queues a speculative repaint, moved or not.
        self.invalidations.push(widget);
    }

    fn set_parent(&mut self, widget: WidgetId, parent: WidgetId) {
        let Some(old_parent) = self.widgets.get(&widget).and_then(|record| record.parent) else {
            return;
        };
        if let Some(old_parent) = self.widgets.get_mut(&old_parent) {
            old_parent.children.retain(|child| *child != widget);
        }
        self.widgets.get_mut(&widget).unwrap().parent = Some(parent);
        self.widgets
            .get_mut(&parent)
            .expect("set_parent: parent not in scene")
            .children
            .insert(0, widget);
    }

    fn raise_to_front(&mut self, widget: WidgetId) {
        let Some(parent) = self.widgets.get(&widget).and_then(|record| record.parent) else {
            return;
        };
        let children = &mut self.widgets.get_mut(&parent).unwrap().children;
        children.retain(|child| *child != widget);
        children.insert(0, widget);
    }

    fn invalidate(&mut self, widget: WidgetId) {
        self.invalidations.push(widget);
    }

    fn pending_invalidations(&self) -> usize {
        self.invalidations.len()
    }

    fn retract_invalidations(&mut self, count: usize) {
        let keep = self.invalidations.len().saturating_sub(count);
        self.invalidations.truncate(keep);
    }

    fn system_layer(&self) -> WidgetId {
        self.system_layer
    }

    fn top_layer(&self) -> WidgetId {
        self.top_layer
    }

    fn active_screen(&self) -> WidgetId {
        self.active_screen
    }

    fn signal(&mut self, widget: WidgetId, signal: Signal, ctx: &mut EventCtx) {
        debug_assert!(
            self.widgets.contains_key(&widget),
            "signal {signal:?} delivered to destroyed widget {widget}"
        );
        self.recording.push(Record::Signal(widget, signal));
        if let Some(reaction) = self.reactions.get(&(widget, signal)).copied() {
            match reaction {
                Reaction::Destroy(target) => {
                    self.destroy(target);
                    ctx.request_reset();
                }
                Reaction::RequestReset => ctx.request_reset(),
                Reaction::WaitUntilRelease => ctx.wait_until_release(),
            }
        }
    }

    fn send_event(&mut self, widget: WidgetId, event: WidgetEvent, _ctx: &mut EventCtx) {
        debug_assert!(
            self.widgets.contains_key(&widget),
            "event {event:?} delivered to destroyed widget {widget}"
        );
        self.recording.push(Record::Event(widget, event));
    }

    fn query_editable(&mut self, widget: WidgetId) -> bool {
        self.widgets
            .get(&widget)
            .is_some_and(|record| record.editable)
    }

    fn focused(&self, group: GroupId) -> Option<WidgetId> {
        let group = self.groups.get(&group)?;
        group.members.get(group.focused).copied()
    }

    fn focus_next(&mut self, group_id: GroupId, _ctx: &mut EventCtx) {
        if let Some(group) = self.groups.get_mut(&group_id)
            && !group.members.is_empty()
        {
            group.focused = (group.focused + 1) % group.members.len();
            self.recording.push(Record::FocusNext(group_id));
        }
    }

    fn focus_prev(&mut self, group_id: GroupId, _ctx: &mut EventCtx) {
        if let Some(group) = self.groups.get_mut(&group_id)
            && !group.members.is_empty()
        {
            group.focused = (group.focused + group.members.len() - 1) % group.members.len();
            self.recording.push(Record::FocusPrev(group_id));
        }
    }

    fn focus_widget(&mut self, widget: WidgetId, _ctx: &mut EventCtx) {
        let Some(group_id) = self.widgets.get(&widget).and_then(|record| record.group) else {
            return;
        };
        let group = self.groups.get_mut(&group_id).unwrap();
        if let Some(index) = group.members.iter().position(|member| *member == widget) {
            group.focused = index;
            self.recording.push(Record::Focus(widget));
        }
    }

    fn editing(&self, group: GroupId) -> bool {
        self.groups.get(&group).is_some_and(|group| group.editing)
    }

    fn set_editing(&mut self, group_id: GroupId, editing: bool) {
        if let Some(group) = self.groups.get_mut(&group_id)
            && group.editing != editing
        {
            group.editing = editing;
            self.recording.push(Record::Editing(group_id, editing));
        }
    }

    fn click_focus_enabled(&self, group: GroupId) -> bool {
        self.groups
            .get(&group)
            .is_some_and(|group| group.click_focus)
    }

    fn is_singleton(&self, group: GroupId) -> bool {
        self.groups
            .get(&group)
            .is_none_or(|group| group.members.len() < 2)
    }

    fn send_data(&mut self, group: GroupId, key: Key, _ctx: &mut EventCtx) {
        self.recording.push(Record::Data(group, key));
    }
}
