//! Command-mode key handling: line editing, history recall, submit/cancel.

use super::mode::leave_command;
use super::{DispatchResult, ModalDispatcher};
use core_events::{KeyInput, keys};
use tracing::debug;

pub(crate) fn handle_command_key(d: &mut ModalDispatcher, key: &KeyInput) -> DispatchResult {
    match key.id {
        keys::ESC => {
            d.buffer.clear();
            d.last_output = None;
            leave_command(d);
            DispatchResult::Redraw
        }
        keys::ENTER => {
            let line = d.buffer.text();
            d.buffer.clear();
            d.history.push(&line);
            leave_command(d);
            debug!(target: "dispatch.command", len = line.len(), "submit");
            DispatchResult::Submit(line)
        }
        keys::BACKSPACE => {
            if d.buffer.is_empty() {
                leave_command(d);
            } else {
                d.buffer.backspace();
            }
            DispatchResult::Redraw
        }
        keys::DELETE => redraw_if(d.buffer.delete()),
        keys::LEFT => redraw_if(d.buffer.left()),
        keys::RIGHT => redraw_if(d.buffer.right()),
        keys::HOME => {
            d.buffer.home();
            DispatchResult::Redraw
        }
        keys::END => {
            d.buffer.end();
            DispatchResult::Redraw
        }
        keys::UP => recall(d, true),
        keys::DOWN => recall(d, false),
        _ if key.is_printable() => {
            d.buffer.insert_str(&key.utf8);
            DispatchResult::Redraw
        }
        _ => DispatchResult::Ignored,
    }
}

fn redraw_if(changed: bool) -> DispatchResult {
    if changed {
        DispatchResult::Redraw
    } else {
        DispatchResult::Ignored
    }
}

fn recall(d: &mut ModalDispatcher, older: bool) -> DispatchResult {
    let entry = if older {
        d.history.older()
    } else {
        d.history.newer()
    };
    match entry.map(str::to_string) {
        Some(line) => {
            d.buffer.set(&line);
            DispatchResult::Redraw
        }
        None => DispatchResult::Ignored,
    }
}
