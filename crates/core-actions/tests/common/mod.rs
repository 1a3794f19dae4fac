#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{
    CommandExecutor, DispatchResult, Effect, ModalDispatcher, ServiceExecutor,
};
use core_events::KeyInput;
use core_keymap::{KeyMap, default_mappings};
use core_state::LocalLibrary;

pub fn dispatcher() -> ModalDispatcher {
    ModalDispatcher::new(KeyMap::from_mappings(&default_mappings()))
}

pub fn executor() -> ServiceExecutor<LocalLibrary> {
    ServiceExecutor::new(LocalLibrary::demo())
}

/// Feed literal characters, returning each dispatch result.
pub fn type_text(d: &mut ModalDispatcher, text: &str) -> Vec<DispatchResult> {
    text.chars().map(|c| d.handle(&KeyInput::char(c))).collect()
}

/// Run one key through dispatcher and executor the way the UI loop does.
pub fn press(
    d: &mut ModalDispatcher,
    e: &mut ServiceExecutor<LocalLibrary>,
    key: KeyInput,
) -> Effect {
    match d.handle(&key) {
        DispatchResult::Submit(line) | DispatchResult::Action(line) => {
            let outcome = e.execute(&line);
            d.set_last_output(outcome.status);
            outcome.effect
        }
        _ => Effect::None,
    }
}
