//! Modal key dispatcher.
//!
//! Routes key events according to the current mode:
//! * `mode`    - Normal-mode handling and the transitions between modes
//! * `command` - command-line editing while in Command mode
//!
//! The dispatcher owns the mode, the command buffer, the command history and
//! the key map. It never executes anything itself: submitted lines and
//! matched actions are returned to the caller, which runs them through a
//! [`CommandExecutor`](crate::CommandExecutor) and reports the status back
//! with [`ModalDispatcher::set_last_output`].

use crate::{CommandBuffer, CommandHistory};
use core_events::{KeyInput, KeyKind};
use core_keymap::KeyMap;
use tracing::trace;

mod command;
pub(crate) mod command_parser;
mod mode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Command,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Command => "command",
        }
    }
}

/// Result of dispatching a single key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    /// Nothing observable changed.
    Ignored,
    /// Mode or command line changed; repaint.
    Redraw,
    /// Enter pressed in Command mode; the full line to execute.
    Submit(String),
    /// Normal-mode key matched a binding; its action string.
    Action(String),
}

impl DispatchResult {
    pub fn is_dirty(&self) -> bool {
        !matches!(self, DispatchResult::Ignored)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModalDispatcher {
    mode: Mode,
    buffer: CommandBuffer,
    history: CommandHistory,
    keymap: KeyMap,
    last_output: Option<String>,
}

impl ModalDispatcher {
    pub fn new(keymap: KeyMap) -> Self {
        Self {
            keymap,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn buffer(&self) -> &CommandBuffer {
        &self.buffer
    }

    /// Status text shown on the command bar while in Normal mode.
    pub fn last_output(&self) -> Option<&str> {
        self.last_output.as_deref()
    }

    pub fn set_last_output(&mut self, output: Option<String>) {
        self.last_output = output;
    }

    pub fn handle(&mut self, key: &KeyInput) -> DispatchResult {
        if key.kind == KeyKind::Release {
            return DispatchResult::Ignored;
        }
        let result = match self.mode {
            Mode::Normal => mode::handle_normal(self, key),
            Mode::Command => command::handle_command_key(self, key),
        };
        trace!(target: "dispatch", mode = self.mode.as_str(), dirty = result.is_dirty(), "key");
        result
    }
}
