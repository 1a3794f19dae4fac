//! Batched terminal output.
//!
//! Commands are queued in order and emitted with a single flush; nothing is
//! written mid-frame. Positions are absolute, origin (0,0).

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{Write, stdout};

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Command {
    MoveTo(u16, u16),
    ClearAll,
    Print(String),
}

#[derive(Default)]
pub(crate) struct Writer {
    cmds: Vec<Command>,
}

impl Writer {
    pub(crate) fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub(crate) fn move_to(&mut self, x: u16, y: u16) {
        self.cmds.push(Command::MoveTo(x, y));
    }

    pub(crate) fn clear_all(&mut self) {
        self.cmds.push(Command::ClearAll);
    }

    pub(crate) fn print<S: Into<String>>(&mut self, s: S) {
        let s: String = s.into();
        if !s.is_empty() {
            self.cmds.push(Command::Print(s));
        }
    }

    pub(crate) fn flush(self) -> Result<()> {
        let mut out = stdout();
        self.flush_to(&mut out)
    }

    fn flush_to<W: Write>(self, out: &mut W) -> Result<()> {
        for c in self.cmds {
            match c {
                Command::MoveTo(x, y) => {
                    queue!(out, MoveTo(x, y))?;
                }
                Command::ClearAll => {
                    queue!(out, Clear(ClearType::All))?;
                }
                Command::Print(s) => {
                    queue!(out, Print(s))?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }
}
