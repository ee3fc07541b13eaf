//! The crossterm-backed terminal.

use crate::cell_buffer::CellBuffer;
use crate::renderer::{detect_color_mode, DiffRenderer};
use crossterm::cursor;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode as CtKeyCode, KeyEvent,
    KeyEventKind, KeyModifiers, MouseButton as CtMouseButton, MouseEvent, MouseEventKind,
};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};
use std::time::Duration;
use weft_core::{
    Backend, Cell, ColorMode, KeyCode, KeyEventData, Modifier, MouseButton, MouseEventData,
    Result, Style, SymKey, TermEvent, Vec2,
};

/// A real terminal: raw mode, alternate screen and mouse capture for
/// the lifetime of the value, restored on `Drop`.
pub struct CrosstermBackend {
    out: Stdout,
    buffer: CellBuffer,
    renderer: DiffRenderer,
}

impl CrosstermBackend {
    /// Take over the terminal.
    pub fn new() -> Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide,
            Clear(ClearType::All)
        )?;
        let (width, height) = terminal::size()?;
        tracing::debug!(width, height, "terminal acquired");
        Ok(Self {
            out,
            buffer: CellBuffer::new(width, height),
            renderer: DiffRenderer::new(detect_color_mode()),
        })
    }

    fn decode(&mut self, ev: Event) -> Option<TermEvent> {
        match ev {
            Event::Resize(width, height) => {
                self.buffer.resize(width, height);
                self.renderer.reset();
                Some(TermEvent::Resize(Vec2::new(
                    i32::from(width),
                    i32::from(height),
                )))
            }
            Event::Key(key) => decode_key(key).map(TermEvent::Key),
            Event::Mouse(mouse) => decode_mouse(mouse).map(TermEvent::Mouse),
            _ => None,
        }
    }
}

fn decode_modifier(m: KeyModifiers, shift_override: bool) -> Modifier {
    Modifier::from_flags(
        m.contains(KeyModifiers::CONTROL),
        m.contains(KeyModifiers::SHIFT) || shift_override,
        m.contains(KeyModifiers::ALT),
    )
}

fn decode_key(key: KeyEvent) -> Option<KeyEventData> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    let sym = KeyCode::Sym;
    let mut shift_override = false;
    let code = match key.code {
        CtKeyCode::Char(' ') => sym(SymKey::Space),
        // Upper-case characters arrive with or without the SHIFT flag
        // depending on the terminal; canonicalize to shifted.
        CtKeyCode::Char(c) => {
            shift_override = c.is_uppercase();
            KeyCode::Char(c)
        }
        CtKeyCode::F(n @ 1..=12) => {
            let table = [
                SymKey::F1,
                SymKey::F2,
                SymKey::F3,
                SymKey::F4,
                SymKey::F5,
                SymKey::F6,
                SymKey::F7,
                SymKey::F8,
                SymKey::F9,
                SymKey::F10,
                SymKey::F11,
                SymKey::F12,
            ];
            KeyCode::Sym(table[usize::from(n) - 1])
        }
        CtKeyCode::Insert => sym(SymKey::Insert),
        CtKeyCode::Delete => sym(SymKey::Delete),
        CtKeyCode::Home => sym(SymKey::Home),
        CtKeyCode::End => sym(SymKey::End),
        CtKeyCode::PageUp => sym(SymKey::PageUp),
        CtKeyCode::PageDown => sym(SymKey::PageDown),
        CtKeyCode::Left => sym(SymKey::Left),
        CtKeyCode::Right => sym(SymKey::Right),
        CtKeyCode::Down => sym(SymKey::Down),
        CtKeyCode::Up => sym(SymKey::Up),
        CtKeyCode::Backspace => sym(SymKey::Backspace),
        CtKeyCode::Tab => sym(SymKey::Tab),
        CtKeyCode::BackTab => {
            shift_override = true;
            KeyCode::Sym(SymKey::Tab)
        }
        CtKeyCode::Enter => sym(SymKey::Enter),
        CtKeyCode::Esc => sym(SymKey::Esc),
        _ => return None,
    };
    Some(KeyEventData::new(
        code,
        decode_modifier(key.modifiers, shift_override),
    ))
}

fn decode_mouse(mouse: MouseEvent) -> Option<MouseEventData> {
    let button = match mouse.kind {
        MouseEventKind::Down(CtMouseButton::Left) => MouseButton::Left,
        MouseEventKind::Down(CtMouseButton::Right) => MouseButton::Right,
        MouseEventKind::Down(CtMouseButton::Middle) => MouseButton::Middle,
        MouseEventKind::Up(_) => MouseButton::Release,
        MouseEventKind::ScrollUp => MouseButton::WheelUp,
        MouseEventKind::ScrollDown => MouseButton::WheelDown,
        _ => return None,
    };
    Some(MouseEventData {
        button,
        pos: Vec2::new(i32::from(mouse.column), i32::from(mouse.row)),
    })
}

impl Backend for CrosstermBackend {
    fn size(&self) -> Vec2 {
        self.buffer.size()
    }

    fn poll_event(&mut self, timeout: Duration) -> Result<Option<TermEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        let ev = event::read()?;
        Ok(self.decode(ev))
    }

    fn clear_buffer(&mut self) {
        self.buffer.clear();
    }

    fn clear_screen(&mut self) -> Result<()> {
        self.buffer.clear();
        queue!(self.out, Clear(ClearType::All))?;
        self.out.flush()?;
        self.renderer.reset();
        Ok(())
    }

    fn set_cell(&mut self, pos: Vec2, cell: Cell) {
        self.buffer.set(pos, cell);
    }

    fn cell_at(&self, pos: Vec2) -> Option<Cell> {
        self.buffer.get(pos)
    }

    fn flush(&mut self) -> Result<()> {
        self.renderer.flush(&mut self.buffer, &mut self.out)?;
        Ok(())
    }

    fn set_cursor(&mut self, pos: Vec2) -> Result<()> {
        let x = u16::try_from(pos.x.max(0)).unwrap_or(0);
        let y = u16::try_from(pos.y.max(0)).unwrap_or(0);
        execute!(self.out, cursor::Show, cursor::MoveTo(x, y))?;
        self.renderer.reset();
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        execute!(self.out, cursor::Hide)?;
        Ok(())
    }

    fn set_background(&mut self, style: Style) {
        self.buffer.set_background(style);
    }

    fn set_color_mode(&mut self, mode: ColorMode) {
        self.renderer.set_color_mode(mode);
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        // Restore in reverse acquisition order; failures here are
        // unreportable and the process is leaving anyway.
        let _ = execute!(
            self.out,
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
        tracing::debug!("terminal released");
    }
}
