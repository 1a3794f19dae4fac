//! core-actions: modal key dispatch and command execution.
//!
//! Key events enter through [`ModalDispatcher::handle`]. In Normal mode a key
//! either switches to Command mode (`:`) or resolves to a binding's action
//! string; in Command mode keys edit the [`CommandBuffer`] until Enter
//! submits the line. Both action strings and submitted lines are plain
//! command lines handed to a [`CommandExecutor`].

mod buffer;
mod dispatcher;
mod executor;
mod history;

pub use buffer::CommandBuffer;
pub use dispatcher::command_parser::{CommandParser, ParsedCommand};
pub use dispatcher::{DispatchResult, ModalDispatcher, Mode};
pub use executor::{CommandExecutor, CommandOutcome, Effect, ServiceExecutor};
pub use history::{CommandHistory, HISTORY_MAX};
