// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0

//! Widget handles and the contract the input core requires from the scene.

use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

use smallvec::SmallVec;

use crate::core::contexts::EventCtx;
use crate::core::events::{Key, Signal, WidgetEvent};
use crate::core::geometry::{Bounds, Point, Size};

/// A unique identifier for a single widget in the scene.
///
/// The input core never holds widget memory; it holds `WidgetId`s and
/// asks the scene about them. A destroyed widget's id must never be
/// reused, so a stale id held across a callback dereferences to nothing
/// ([`Scene::contains`] returns `false`) instead of to the wrong widget.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct WidgetId(NonZeroU64);

impl WidgetId {
    /// Allocate a new unique id.
    ///
    /// Ids allocated here are unique for the lifetime of the process.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(id.try_into().unwrap())
    }

    /// The raw value, for logs and serialization.
    pub fn to_raw(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unique identifier for a focus group.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct GroupId(NonZeroU64);

impl GroupId {
    /// Allocate a new unique id.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(id.try_into().unwrap())
    }
}

bitflags::bitflags! {
    /// Per-widget behavior bits the input core reads.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct WidgetFlags: u16 {
        /// The widget can be hit by a pointer.
        const CLICKABLE = 1 << 0;
        /// The widget (and its subtree) is invisible to hit testing.
        const HIDDEN = 1 << 1;
        /// The widget can be moved by dragging.
        const DRAGGABLE = 1 << 2;
        /// The widget keeps moving inertially after a drag release.
        const DRAG_THROW = 1 << 3;
        /// Drags on this widget move its parent instead.
        const DRAG_PARENT = 1 << 4;
        /// Pressing anywhere inside brings the widget to the front.
        const TOP = 1 << 5;
        /// The press sticks to this widget even when it slides off.
        const PROTECT_PRESS_LOST = 1 << 6;
        /// Clicking this widget must not move group focus to it.
        const PROTECT_CLICK_FOCUS = 1 << 7;
    }
}

/// A list of child ids, front-most first.
pub type ChildrenIds = SmallVec<[WidgetId; 16]>;

/// The scene contract consumed by the input core.
///
/// This is everything the core needs from the widget tree, the focus
/// groups and the render invalidation queue. All methods are invoked
/// from the single-threaded input pass; implementations may run widget
/// callbacks synchronously from the dispatch methods and those callbacks
/// may freely mutate the scene, provided destruction of a widget the
/// core might reference is reported through [`EventCtx::request_reset`].
///
/// Mutating queries (`set_position`, `raise_to_front`, ...) must be
/// no-ops for ids that are no longer [`contains`](Self::contains)-live.
pub trait Scene {
    // --- MARK: TREE QUERIES

    /// Whether `widget` still refers to a live widget.
    fn contains(&self, widget: WidgetId) -> bool;

    /// The parent, or `None` for a root (layer) widget.
    fn parent(&self, widget: WidgetId) -> Option<WidgetId>;

    /// The children, ordered front-most first.
    ///
    /// Hit testing walks this order and stops at the first hit, so it
    /// must agree with the paint order (last painted = first here).
    fn children(&self, widget: WidgetId) -> ChildrenIds;

    /// The behavior bits of `widget`. [`WidgetFlags::HIDDEN`] is not
    /// inherited here; the core walks ancestors itself.
    fn flags(&self, widget: WidgetId) -> WidgetFlags;

    /// Absolute bounds; `min` inclusive, `max` exclusive.
    fn bounds(&self, widget: WidgetId) -> Bounds;

    /// The origin relative to the parent.
    fn position(&self, widget: WidgetId) -> Point;

    /// The size of the widget.
    fn size(&self, widget: WidgetId) -> Size;

    /// The focus group `widget` belongs to, if any.
    fn group_of(&self, widget: WidgetId) -> Option<GroupId>;

    // --- MARK: TREE MUTATION

    /// Move the widget's origin (parent-relative).
    ///
    /// A position write speculatively invalidates the affected areas
    /// even when it turns out not to move the widget; the core undoes
    /// such writes through [`retract_invalidations`](Self::retract_invalidations).
    fn set_position(&mut self, widget: WidgetId, position: Point);

    /// Reparent `widget` under `parent`, keeping its position.
    fn set_parent(&mut self, widget: WidgetId, parent: WidgetId);

    /// Move `widget` to the front of its parent's children.
    fn raise_to_front(&mut self, widget: WidgetId);

    /// Request a repaint of the widget's area.
    fn invalidate(&mut self, widget: WidgetId);

    /// How many areas are currently queued for repaint.
    fn pending_invalidations(&self) -> usize;

    /// Drop the `count` most recently queued repaint areas.
    fn retract_invalidations(&mut self, count: usize);

    // --- MARK: LAYERS

    /// The always-on-top system layer (cursors, system popups).
    fn system_layer(&self) -> WidgetId;

    /// The top layer, above the active screen.
    fn top_layer(&self) -> WidgetId;

    /// The active screen.
    fn active_screen(&self) -> WidgetId;

    // --- MARK: DISPATCH

    /// Deliver a state-machine signal to the widget.
    fn signal(&mut self, widget: WidgetId, signal: Signal, ctx: &mut EventCtx);

    /// Deliver a semantic event to the widget's user handlers.
    fn send_event(&mut self, widget: WidgetId, event: WidgetEvent, ctx: &mut EventCtx);

    /// Whether the widget's value can be edited in place (encoders use
    /// this to decide between edit mode and plain activation).
    fn query_editable(&mut self, widget: WidgetId) -> bool;

    // --- MARK: FOCUS GROUPS

    /// The currently focused widget of the group.
    fn focused(&self, group: GroupId) -> Option<WidgetId>;

    /// Focus the next widget in the group's ring.
    fn focus_next(&mut self, group: GroupId, ctx: &mut EventCtx);

    /// Focus the previous widget in the group's ring.
    fn focus_prev(&mut self, group: GroupId, ctx: &mut EventCtx);

    /// Focus a specific widget (its group is derived from the widget).
    fn focus_widget(&mut self, widget: WidgetId, ctx: &mut EventCtx);

    /// Whether the group is in edit mode.
    fn editing(&self, group: GroupId) -> bool;

    /// Enter or leave edit mode.
    fn set_editing(&mut self, group: GroupId, editing: bool);

    /// Whether clicking a member widget should focus it.
    fn click_focus_enabled(&self, group: GroupId) -> bool;

    /// Whether the group holds fewer than two widgets.
    fn is_singleton(&self, group: GroupId) -> bool;

    /// Forward a key to the group's focused widget as data.
    fn send_data(&mut self, group: GroupId, key: Key, ctx: &mut EventCtx);
}
