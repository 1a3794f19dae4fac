//! Normal-mode handling and mode transitions.

use super::{DispatchResult, ModalDispatcher, Mode};
use core_events::{KEYPRESS_UNMAPPED, KeyInput};
use std::sync::atomic::Ordering;
use tracing::debug;

pub(crate) fn handle_normal(d: &mut ModalDispatcher, key: &KeyInput) -> DispatchResult {
    if key.mods.is_empty() && key.utf8 == ":" {
        enter_command(d);
        return DispatchResult::Redraw;
    }
    match d.keymap.lookup(key) {
        Some(binding) => DispatchResult::Action(binding.action.clone()),
        None => {
            KEYPRESS_UNMAPPED.fetch_add(1, Ordering::Relaxed);
            DispatchResult::Ignored
        }
    }
}

pub(crate) fn enter_command(d: &mut ModalDispatcher) {
    d.buffer.clear();
    d.history.reset();
    d.mode = Mode::Command;
    debug!(target: "dispatch.mode", to = d.mode.as_str(), "mode_change");
}

/// Back to Normal. The buffer is left as is; callers clear it when the
/// transition calls for it.
pub(crate) fn leave_command(d: &mut ModalDispatcher) {
    d.history.reset();
    d.mode = Mode::Normal;
    debug!(target: "dispatch.mode", to = d.mode.as_str(), "mode_change");
}
