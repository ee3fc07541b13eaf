//! Ready-made widgets for the weft runtime.
//!
//! Each widget composes a `WidgetCore` with an `InputRouter` and
//! exercises the core dispatch surface: [`TextLine`] draws, [`Button`]
//! binds chords and a click area, [`InputLine`] edits through a
//! character wildcard, and [`ListView`] consumes repeat counts and the
//! mouse wheel.

pub mod button;
pub mod input_line;
pub mod list;
pub mod text_line;

pub use button::Button;
pub use input_line::InputLine;
pub use list::ListView;
pub use text_line::TextLine;
