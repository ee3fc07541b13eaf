//! Widget capability traits and the shared widget core.

use crate::backend::Backend;
use crate::chord::KeyDispatch;
use crate::context::EventContext;
use crate::error::Result;
use crate::geometry::Vec2;
use crate::notifier::{Notifier, Phase};
use crate::runtime::WidgetId;
use crate::timer::{TaskId, TimerFired};
use std::any::Any;
use std::fmt;
use std::sync::mpsc::Sender;

/// Paints itself onto the backend's cell buffer.
pub trait Draw {
    /// Repaint this object. Called only when the runtime has marked it
    /// expired (or a full redraw is pending) and it is visible.
    fn draw(&mut self, screen: &mut dyn Backend);
}

/// Reacts to terminal size changes.
pub trait Resize {
    /// The terminal now has the given dimensions.
    fn resize(&mut self, size: Vec2);
}

/// Receives routed key events.
pub trait KeyboardHandler {
    /// Route the context's current key event into this object's
    /// bindings.
    fn process_key(&mut self, ctx: &mut EventContext) -> KeyDispatch;
}

/// Receives routed mouse events.
pub trait MouseHandler {
    /// Route the context's current mouse event into this object's hit
    /// areas. Returns whether anything matched.
    fn process_mouse(&mut self, ctx: &mut EventContext) -> bool;
}

/// A registrable widget: all four capabilities plus the shared core.
///
/// The timer hooks have no-op defaults; widgets that own a
/// [`Scheduler`](crate::timer::Scheduler) override them to wire it to
/// the runtime's channel and to run due task callbacks.
pub trait Widget: Draw + Resize + KeyboardHandler + MouseHandler {
    /// The shared position/size/visibility state.
    fn core(&self) -> &WidgetCore;

    /// Mutable access to the shared state.
    fn core_mut(&mut self) -> &mut WidgetCore;

    /// Upcast for downcasting registered widgets back to their
    /// concrete type.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Start this widget's background timers, if it has any.
    fn start_timers(&mut self, _owner: WidgetId, _tx: Sender<TimerFired>) -> Result<()> {
        Ok(())
    }

    /// Stop this widget's background timers, if it has any.
    fn stop_timers(&mut self, _wait: bool) -> Result<()> {
        Ok(())
    }

    /// Run the callback of a task that came due. Called on the main
    /// thread while the runtime drains the timer channel.
    fn run_timer(&mut self, _task: TaskId, _ctx: &mut EventContext) -> Result<()> {
        Ok(())
    }
}

/// Position, size, visibility and activation, with before/after change
/// hooks. Owned by every concrete widget and exposed through
/// [`Widget::core`].
pub struct WidgetCore {
    position: Vec2,
    size: Vec2,
    visible: bool,
    active: bool,
    /// Fired around position changes, with the incoming position.
    pub on_move: Notifier<Vec2>,
    /// Fired around size changes, with the incoming size.
    pub on_resize: Notifier<Vec2>,
    /// Fired around visibility changes.
    pub on_visibility: Notifier<bool>,
    /// Fired around activation changes.
    pub on_activation: Notifier<bool>,
}

impl Default for WidgetCore {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            visible: true,
            active: true,
            on_move: Notifier::new(),
            on_resize: Notifier::new(),
            on_visibility: Notifier::new(),
            on_activation: Notifier::new(),
        }
    }
}

impl WidgetCore {
    /// A core at the origin with zero size, visible and active.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current size.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Whether the widget participates in redraw.
    #[must_use]
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Whether the widget receives routed input.
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    /// Move the widget, firing `on_move` before and after with the new
    /// position.
    pub fn set_position(&mut self, pos: Vec2) {
        self.on_move.notify(Phase::Before, &pos);
        self.position = pos;
        self.on_move.notify(Phase::After, &pos);
    }

    /// Resize the widget, firing `on_resize` before and after with the
    /// new size.
    pub fn set_size(&mut self, size: Vec2) {
        self.on_resize.notify(Phase::Before, &size);
        self.size = size;
        self.on_resize.notify(Phase::After, &size);
    }

    /// Shift the position without firing move hooks.
    ///
    /// Containers use this to translate children into their interior
    /// for the duration of a draw or mouse pass and back out again; the
    /// round trip is not a logical move.
    pub fn translate(&mut self, offset: Vec2) {
        self.position += offset;
    }

    /// Show or hide the widget.
    pub fn set_visible(&mut self, visible: bool) {
        self.on_visibility.notify(Phase::Before, &visible);
        self.visible = visible;
        self.on_visibility.notify(Phase::After, &visible);
    }

    /// Enable or disable input routing to the widget.
    pub fn set_active(&mut self, active: bool) {
        self.on_activation.notify(Phase::Before, &active);
        self.active = active;
        self.on_activation.notify(Phase::After, &active);
    }
}

impl fmt::Debug for WidgetCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetCore")
            .field("position", &self.position)
            .field("size", &self.size)
            .field("visible", &self.visible)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}
