//! Core runtime for weft, a terminal-UI widget toolkit.
//!
//! The pieces compose bottom-up: [`chord::Chord`] and [`hit::HitArea`]
//! match raw input, an [`router::InputRouter`] owns a widget's bindings,
//! [`notifier::Notifier`] provides before/after change hooks,
//! [`timer::Scheduler`] runs background timed tasks, and
//! [`runtime::Runtime`] owns the backend, the widget registry and the
//! event loop. [`window::Window`] is the built-in composite widget.
//!
//! Terminal access goes through the [`backend::Backend`] trait; the
//! crossterm implementation lives in `weft-terminal`, and
//! [`backend::TestBackend`] drives everything headlessly in tests.

pub mod backend;
pub mod chord;
pub mod config;
pub mod context;
pub mod draw;
pub mod error;
pub mod event;
pub mod geometry;
pub mod hit;
pub mod notifier;
pub mod router;
pub mod runtime;
pub mod style;
pub mod timer;
pub mod widget;
pub mod window;

pub use backend::{Backend, TestBackend};
pub use chord::{Chord, Key, KeyDispatch, KeyPattern};
pub use config::Config;
pub use context::EventContext;
pub use error::{Error, Result};
pub use event::{
    KeyCode, KeyEventData, Modifier, MouseButton, MouseEventData, SymKey, TermEvent,
};
pub use geometry::{Rect, Vec2};
pub use hit::HitArea;
pub use notifier::{Notifier, Phase};
pub use router::InputRouter;
pub use runtime::{Runtime, WidgetId};
pub use style::{Attrs, Cell, Color, ColorMode, Style};
pub use timer::{Scheduler, TaskId, TaskStats, TimerFired, TimerTask};
pub use widget::{Draw, KeyboardHandler, MouseHandler, Resize, Widget, WidgetCore};
pub use window::Window;
