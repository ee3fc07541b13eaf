//! Crossterm backend for weft.
//!
//! [`CrosstermBackend`] implements `weft_core::Backend` over a real
//! terminal: a [`cell_buffer::CellBuffer`] back buffer, a
//! [`renderer::DiffRenderer`] that flushes only what changed, and
//! crossterm event decoding into core events.

pub mod backend;
pub mod cell_buffer;
pub mod renderer;

pub use backend::CrosstermBackend;
pub use cell_buffer::{BufCell, CellBuffer};
pub use renderer::{detect_color_mode, DiffRenderer};
