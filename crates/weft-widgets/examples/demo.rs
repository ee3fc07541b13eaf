//! Interactive tour of the built-in widgets.
//!
//! Type into the input line and press Enter to append to the list;
//! navigate the list with arrows, `g g` and `G`; click the button to
//! clear it; quit with `C-q`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::mpsc::Sender;
use std::time::Duration;
use weft_core::chord::KeyDispatch;
use weft_core::{
    Backend, Config, Draw, EventContext, KeyboardHandler, MouseHandler, Phase, Resize, Result,
    Runtime, Scheduler, Style, TaskId, TimerFired, TimerTask, Vec2, Widget, WidgetCore, WidgetId,
    Window,
};
use weft_terminal::CrosstermBackend;
use weft_widgets::{Button, InputLine, ListView, TextLine};

/// The demo's main panel: an input line feeding a list, plus a button
/// that clears it.
///
/// Submit and press callbacks cannot reach sibling widgets directly, so
/// they queue their effects in shared cells and the panel applies them
/// after each dispatch pass.
struct Pane {
    window: Window,
    list_idx: usize,
    pending: Rc<RefCell<Vec<String>>>,
    clear_requested: Rc<Cell<bool>>,
}

impl Pane {
    fn boxed(pos: Vec2, size: Vec2) -> Box<Self> {
        let mut window = Window::new(pos, size, "weft demo");
        window.add_child(Box::new(TextLine::new(
            Vec2::ZERO,
            40,
            "type, Enter to add; C-q quits",
        )));

        let pending: Rc<RefCell<Vec<String>>> = Rc::default();
        let mut input = InputLine::new(Vec2::new(0, 2), 30);
        let queue = Rc::clone(&pending);
        input.on_submit.add(Phase::After, move |line: &String| {
            if !line.is_empty() {
                queue.borrow_mut().push(line.clone());
            }
        });
        window.add_child(Box::new(input));

        let list_idx = window.add_child(Box::new(ListView::new(
            Vec2::new(0, 4),
            Vec2::new(30, 8),
            Vec::new(),
        )));

        let clear_requested: Rc<Cell<bool>> = Rc::default();
        let mut button = Button::new(Vec2::new(34, 2), "clear");
        let flag = Rc::clone(&clear_requested);
        button
            .on_press
            .add(Phase::After, move |_: &u64| flag.set(true));
        window.add_child(Box::new(button));

        window
            .router_mut()
            .bind("C-q", |_: &mut Window, ctx| ctx.request_stop())
            .expect("static chord spelling");

        Box::new(Self {
            window,
            list_idx,
            pending,
            clear_requested,
        })
    }

    /// Apply queued submissions and a pending clear to the list.
    fn sync(&mut self) -> bool {
        let lines = std::mem::take(&mut *self.pending.borrow_mut());
        let clear = self.clear_requested.replace(false);
        if lines.is_empty() && !clear {
            return false;
        }
        if let Some(list) = self.window.child_as_mut::<ListView>(self.list_idx) {
            if clear {
                list.set_items(Vec::new());
            }
            for line in lines {
                list.push_item(line);
            }
        }
        true
    }
}

impl Draw for Pane {
    fn draw(&mut self, screen: &mut dyn Backend) {
        self.window.draw(screen);
    }
}

impl Resize for Pane {
    fn resize(&mut self, size: Vec2) {
        self.window.resize(size);
    }
}

impl KeyboardHandler for Pane {
    fn process_key(&mut self, ctx: &mut EventContext) -> KeyDispatch {
        let mut d = self.window.process_key(ctx);
        d.fired |= self.sync();
        d
    }
}

impl MouseHandler for Pane {
    fn process_mouse(&mut self, ctx: &mut EventContext) -> bool {
        let hit = self.window.process_mouse(ctx);
        self.sync() || hit
    }
}

impl Widget for Pane {
    fn core(&self) -> &WidgetCore {
        self.window.core()
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        self.window.core_mut()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

/// A status line driven by a half-second timer.
struct Ticker {
    core: WidgetCore,
    timers: Scheduler<Ticker>,
    ticks: u64,
}

impl Ticker {
    fn boxed(pos: Vec2, width: i32) -> Box<Self> {
        let mut core = WidgetCore::new();
        core.set_position(pos);
        core.set_size(Vec2::new(width, 1));
        let mut timers = Scheduler::new(Duration::from_millis(50));
        timers.add_task(
            TimerTask::new(Duration::from_millis(500), 0, |_, t: &mut Ticker, _| {
                t.ticks += 1;
            }),
            true,
        );
        Box::new(Self {
            core,
            timers,
            ticks: 0,
        })
    }
}

impl Draw for Ticker {
    fn draw(&mut self, screen: &mut dyn Backend) {
        let text = format!("uptime: {:.1}s", self.ticks as f64 / 2.0);
        weft_core::draw::text_line(
            screen,
            self.core.position(),
            self.core.size().x,
            &text,
            Style::default(),
            None,
        );
    }
}

impl Resize for Ticker {
    fn resize(&mut self, _size: Vec2) {}
}

impl KeyboardHandler for Ticker {
    fn process_key(&mut self, _ctx: &mut EventContext) -> KeyDispatch {
        KeyDispatch::NONE
    }
}

impl MouseHandler for Ticker {
    fn process_mouse(&mut self, _ctx: &mut EventContext) -> bool {
        false
    }
}

impl Widget for Ticker {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }

    fn start_timers(&mut self, owner: WidgetId, tx: Sender<TimerFired>) -> Result<()> {
        self.timers.start(owner, tx)
    }

    fn stop_timers(&mut self, wait: bool) -> Result<()> {
        self.timers.stop(wait)
    }

    fn run_timer(&mut self, task: TaskId, ctx: &mut EventContext) -> Result<()> {
        let mut timers = std::mem::take(&mut self.timers);
        let result = timers.fire(task, self, ctx);
        self.timers = timers;
        result
    }
}

fn main() -> Result<()> {
    let backend = CrosstermBackend::new()?;
    let mut rt = Runtime::new(backend, Config::default())?;
    // The input line wants digits as characters, not repeat counts.
    rt.context_mut().set_repeat_capture(false);

    let size = rt.size();
    rt.add_widget(Pane::boxed(Vec2::new(1, 1), size - Vec2::new(2, 3)));
    let ticker = rt.add_widget(Ticker::boxed(Vec2::new(1, size.y - 1), 24));
    rt.start_timers(ticker)?;

    rt.run()
}
