//! The event loop, widget registry and redraw machinery.

use crate::backend::Backend;
use crate::chord::KeyDispatch;
use crate::config::Config;
use crate::context::EventContext;
use crate::error::{Error, Result};
use crate::event::{KeyCode, Modifier, TermEvent};
use crate::geometry::Vec2;
use crate::style::Style;
use crate::timer::TimerFired;
use crate::widget::Widget;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};

/// Handle to a registered widget. Slot indices are never reused, so a
/// stale handle can only miss, never alias a different widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(pub usize);

enum Slot {
    Vacant,
    Live(LiveSlot),
}

struct LiveSlot {
    widget: Box<dyn Widget>,
    expired: bool,
}

impl Slot {
    fn live_mut(&mut self) -> Option<&mut LiveSlot> {
        match self {
            Self::Live(slot) => Some(slot),
            Self::Vacant => None,
        }
    }
}

static RUNTIME_EXISTS: AtomicBool = AtomicBool::new(false);

/// The toolkit's event loop: sole owner of the backend, the widget
/// registry and the dispatch context.
///
/// At most one runtime exists per process; construction fails with
/// [`Error::RuntimeConflict`] while another is alive. Dropping the
/// runtime releases the guard (terminal restoration is the backend's
/// own `Drop`).
pub struct Runtime<B: Backend> {
    backend: B,
    config: Config,
    slots: Vec<Slot>,
    ctx: EventContext,
    destroy_queue: VecDeque<Box<dyn Widget>>,
    timer_tx: Sender<TimerFired>,
    timer_rx: Receiver<TimerFired>,
    wake_predicate: Option<Box<dyn FnMut() -> bool>>,
}

impl<B: Backend> Runtime<B> {
    /// Take ownership of the backend and become the process runtime.
    pub fn new(backend: B, config: Config) -> Result<Self> {
        if RUNTIME_EXISTS
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::RuntimeConflict);
        }
        let (timer_tx, timer_rx) = mpsc::channel();
        let mut ctx = EventContext::default();
        ctx.set_chord_separator(config.chord_separator.clone());
        Ok(Self {
            backend,
            config,
            slots: Vec::new(),
            ctx,
            destroy_queue: VecDeque::new(),
            timer_tx,
            timer_rx,
            wake_predicate: None,
        })
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The dispatch context, for wiring listeners or requesting a stop
    /// from outside a callback.
    #[must_use]
    pub fn context(&self) -> &EventContext {
        &self.ctx
    }

    /// Mutable dispatch context.
    pub fn context_mut(&mut self) -> &mut EventContext {
        &mut self.ctx
    }

    /// The backend, for inspection.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Current terminal dimensions.
    #[must_use]
    pub fn size(&self) -> Vec2 {
        self.backend.size()
    }

    /// Place the terminal cursor.
    pub fn set_cursor(&mut self, pos: Vec2) -> Result<()> {
        self.backend.set_cursor(pos)
    }

    /// Style used for cleared cells.
    pub fn set_background(&mut self, style: Style) {
        self.backend.set_background(style);
    }

    /// Install a predicate polled once per loop iteration; returning
    /// true forces a redraw pass even when no event arrived.
    pub fn set_wake_predicate(&mut self, pred: impl FnMut() -> bool + 'static) {
        self.wake_predicate = Some(Box::new(pred));
    }

    /// Register a widget. New widgets start expired so they paint on
    /// the next redraw.
    pub fn add_widget(&mut self, widget: Box<dyn Widget>) -> WidgetId {
        let id = WidgetId(self.slots.len());
        self.slots.push(Slot::Live(LiveSlot {
            widget,
            expired: true,
        }));
        tracing::debug!(id = id.0, "widget added");
        id
    }

    /// Deregister a widget.
    ///
    /// Without `defer` the widget is handed back to the caller. With
    /// `defer` it moves to the destruction queue and is dropped at the
    /// end of the current loop iteration, which keeps it alive through
    /// any callbacks still referring to it this event.
    pub fn remove_widget(&mut self, id: WidgetId, defer: bool) -> Option<Box<dyn Widget>> {
        let slot = self.slots.get_mut(id.0)?;
        match std::mem::replace(slot, Slot::Vacant) {
            Slot::Vacant => None,
            Slot::Live(live) => {
                tracing::debug!(id = id.0, defer, "widget removed");
                if defer {
                    self.destroy_queue.push_back(live.widget);
                    None
                } else {
                    Some(live.widget)
                }
            }
        }
    }

    /// Shared access to a live widget.
    #[must_use]
    pub fn widget(&self, id: WidgetId) -> Option<&dyn Widget> {
        match self.slots.get(id.0) {
            Some(Slot::Live(slot)) => Some(slot.widget.as_ref()),
            _ => None,
        }
    }

    /// Mutable access to a live widget.
    pub fn widget_mut(&mut self, id: WidgetId) -> Option<&mut (dyn Widget + 'static)> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Live(slot)) => Some(slot.widget.as_mut()),
            _ => None,
        }
    }

    /// A live widget downcast to its concrete type.
    #[must_use]
    pub fn widget_as<W: Widget + 'static>(&self, id: WidgetId) -> Option<&W> {
        self.widget(id).and_then(|w| w.as_any().downcast_ref())
    }

    /// A live widget downcast to its concrete type, mutably. Marks the
    /// widget dirty, since callers usually mutate it.
    pub fn widget_as_mut<W: Widget + 'static>(&mut self, id: WidgetId) -> Option<&mut W> {
        if let Some(Slot::Live(slot)) = self.slots.get_mut(id.0) {
            slot.expired = true;
            slot.widget.as_any_mut().downcast_mut()
        } else {
            None
        }
    }

    /// Number of live widgets.
    #[must_use]
    pub fn widget_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Live(_)))
            .count()
    }

    /// Mark a widget dirty (or clean) by hand.
    pub fn set_expired(&mut self, id: WidgetId, expired: bool) -> Result<()> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Live(slot)) => {
                slot.expired = expired;
                Ok(())
            }
            _ => Err(Error::InvalidWidget(id)),
        }
    }

    /// Start a widget's background timers, wiring them to this
    /// runtime's timer channel.
    pub fn start_timers(&mut self, id: WidgetId) -> Result<()> {
        let tx = self.timer_tx.clone();
        match self.slots.get_mut(id.0) {
            Some(Slot::Live(slot)) => slot.widget.start_timers(id, tx),
            _ => Err(Error::InvalidWidget(id)),
        }
    }

    /// Stop a widget's background timers.
    pub fn stop_timers(&mut self, id: WidgetId, wait: bool) -> Result<()> {
        match self.slots.get_mut(id.0) {
            Some(Slot::Live(slot)) => slot.widget.stop_timers(wait),
            _ => Err(Error::InvalidWidget(id)),
        }
    }

    /// Dispatch one terminal event through the registry.
    pub fn process_event(&mut self, ev: TermEvent) {
        self.ctx.set_event(ev);
        self.ctx.reset_stop_input();
        match ev {
            TermEvent::Resize(size) => self.process_resize(size),
            TermEvent::Key(key) => self.process_key(key.code, key.modifier),
            TermEvent::Mouse(_) => self.process_mouse(),
        }
    }

    fn process_resize(&mut self, size: Vec2) {
        tracing::debug!(x = size.x, y = size.y, "terminal resized");
        for slot in self.slots.iter_mut().filter_map(Slot::live_mut) {
            slot.widget.resize(size);
            // The full redraw repaints everything; no per-widget mark.
            slot.expired = false;
        }
        self.ctx.request_full_redraw();
    }

    fn process_key(&mut self, code: KeyCode, modifier: Modifier) {
        // Bare digits feed the repeat accumulator instead of the widgets.
        if self.config.enable_repeat && !self.ctx.repeat_capture_suppressed() {
            if let (KeyCode::Char(c), Modifier::None) = (code, modifier) {
                if let Some(digit) = c.to_digit(10) {
                    self.ctx.accumulate_repeat(digit as usize);
                    return;
                }
            }
        }

        let mut dispatch = KeyDispatch::NONE;
        for slot in self.slots.iter_mut().filter_map(Slot::live_mut) {
            if !slot.widget.core().active() {
                continue;
            }
            let d = slot.widget.process_key(&mut self.ctx);
            slot.expired |= d.fired;
            dispatch |= d;
            if self.ctx.input_stopped() {
                break;
            }
        }
        self.ctx.set_chord_pending(dispatch.advanced);
        self.ctx.finish_repeat_event();
    }

    fn process_mouse(&mut self) {
        for slot in self.slots.iter_mut().filter_map(Slot::live_mut) {
            if !slot.widget.core().active() {
                continue;
            }
            slot.expired = slot.widget.process_mouse(&mut self.ctx);
            if self.ctx.input_stopped() {
                break;
            }
        }
    }

    /// Repaint expired visible widgets (all visible widgets when a full
    /// redraw is pending). Returns whether anything was painted.
    pub fn redraw(&mut self) -> bool {
        let full = self.ctx.full_redraw();
        if full {
            self.backend.clear_buffer();
        }
        let mut drew = false;
        for slot in self.slots.iter_mut().filter_map(Slot::live_mut) {
            if !slot.widget.core().visible() {
                continue;
            }
            if full || slot.expired {
                slot.widget.draw(&mut self.backend);
                slot.expired = false;
                drew = true;
            }
        }
        self.ctx.clear_full_redraw();
        drew
    }

    /// Clear and repaint everything.
    pub fn force_draw(&mut self) {
        self.ctx.request_full_redraw();
        self.redraw();
    }

    /// Push the buffered frame to the terminal.
    pub fn display(&mut self) -> Result<()> {
        self.backend.flush()?;
        self.ctx.bump_frame();
        Ok(())
    }

    /// Drain the timer channel, running due task callbacks on this
    /// thread. Returns the number of callbacks run.
    pub fn drain_timers(&mut self) -> usize {
        let mut fired = 0;
        while let Ok(msg) = self.timer_rx.try_recv() {
            let Some(slot) = self.slots.get_mut(msg.widget.0).and_then(Slot::live_mut) else {
                // Widget removed after the clock thread queued the message.
                continue;
            };
            if let Err(err) = slot.widget.run_timer(msg.task, &mut self.ctx) {
                tracing::warn!(widget = msg.widget.0, task = msg.task.0, %err, "timer task failed");
                continue;
            }
            slot.expired = true;
            fired += 1;
        }
        fired
    }

    /// Apply removals queued via [`EventContext::request_remove`].
    fn drain_deferred_removals(&mut self) {
        for (id, defer) in self.ctx.take_removals() {
            drop(self.remove_widget(id, defer));
        }
    }

    /// Run the event loop until a callback requests a stop.
    ///
    /// Each iteration polls the backend (bounded by the configured timer
    /// resolution), dispatches the event if one arrived, drains the
    /// timer channel and the removal queues, then redraws and flushes if
    /// anything changed. Callback panics are not caught; the backend's
    /// `Drop` restores the terminal on unwind.
    pub fn run(&mut self) -> Result<()> {
        tracing::debug!("event loop started");
        self.force_draw();
        self.display()?;

        loop {
            let mut worked = false;
            if let Some(ev) = self.backend.poll_event(self.config.timer_resolution)? {
                self.process_event(ev);
                worked = true;
            }
            worked |= self.drain_timers() > 0;
            self.drain_deferred_removals();
            self.destroy_queue.clear();
            if let Some(pred) = self.wake_predicate.as_mut() {
                worked |= pred();
            }
            if self.ctx.should_stop() {
                break;
            }
            if (worked || self.ctx.full_redraw()) && self.redraw() {
                self.display()?;
            }
        }

        tracing::debug!(frames = self.ctx.frame_count(), "event loop stopped");
        Ok(())
    }
}

impl<B: Backend> Drop for Runtime<B> {
    fn drop(&mut self) {
        for slot in self.slots.iter_mut().filter_map(Slot::live_mut) {
            // Best effort; a scheduler that never started reports
            // SchedulerStopped and that is fine here.
            drop(slot.widget.stop_timers(false));
        }
        RUNTIME_EXISTS.store(false, Ordering::SeqCst);
    }
}
