mod common;
use common::*;

use core_actions::{DispatchResult, Effect, Mode};
use core_events::{KeyInput, ModMask, keys};
use core_keymap::{KeyMap, KeyMapping, default_mappings, merge_mappings};
use core_state::{DetailKind, MusicService, PlaybackStatus};
use pretty_assertions::assert_eq;

#[test]
fn colon_ab_enter_submits_ab() {
    let mut d = dispatcher();
    assert_eq!(d.handle(&KeyInput::char(':')), DispatchResult::Redraw);
    assert_eq!(d.mode(), Mode::Command);
    assert!(d.buffer().is_empty());
    type_text(&mut d, "ab");
    assert_eq!(
        d.handle(&KeyInput::named(keys::ENTER)),
        DispatchResult::Submit("ab".to_string())
    );
    assert_eq!(d.mode(), Mode::Normal);
    assert!(d.buffer().is_empty());
}

#[test]
fn unknown_submitted_command_surfaces_on_command_bar() {
    let mut d = dispatcher();
    let mut e = executor();
    press(&mut d, &mut e, KeyInput::char(':'));
    type_text(&mut d, "ab");
    let effect = press(&mut d, &mut e, KeyInput::named(keys::ENTER));
    assert_eq!(effect, Effect::None);
    assert_eq!(d.last_output(), Some("Unknown command: ab"));
}

#[test]
fn bound_keys_drive_playback() {
    let mut d = dispatcher();
    let mut e = executor();
    press(&mut d, &mut e, KeyInput::named(keys::SPACE));
    assert_eq!(e.service().playback().status, PlaybackStatus::Playing);
    press(&mut d, &mut e, KeyInput::char('n'));
    assert_eq!(e.service().queue().current, Some(1));
    press(&mut d, &mut e, KeyInput::char('x'));
    assert_eq!(e.service().playback().status, PlaybackStatus::Paused);
    assert_eq!(d.last_output(), Some("Paused"));
}

#[test]
fn open_then_close_detail_via_command_and_binding() {
    let mut d = dispatcher();
    let mut e = executor();
    press(&mut d, &mut e, KeyInput::char(':'));
    type_text(&mut d, "open playlist 1");
    let effect = press(&mut d, &mut e, KeyInput::named(keys::ENTER));
    assert_eq!(
        effect,
        Effect::OpenDetail {
            kind: DetailKind::Playlist,
            index: 1
        }
    );
    assert_eq!(press(&mut d, &mut e, KeyInput::named(keys::ESC)), Effect::CloseDetail);
}

#[test]
fn quit_from_either_mode() {
    let mut d = dispatcher();
    let mut e = executor();
    assert_eq!(
        press(&mut d, &mut e, KeyInput::char_with('c', ModMask::CTRL)),
        Effect::Quit
    );
    press(&mut d, &mut e, KeyInput::char(':'));
    type_text(&mut d, "quit");
    assert_eq!(press(&mut d, &mut e, KeyInput::named(keys::ENTER)), Effect::Quit);
}

#[test]
fn user_override_replaces_default_binding() {
    let merged = merge_mappings(default_mappings(), &[KeyMapping::new("j", None, "next")]);
    let mut d = core_actions::ModalDispatcher::new(KeyMap::from_mappings(&merged));
    assert_eq!(d.handle(&KeyInput::char('n')), DispatchResult::Ignored);
    assert_eq!(
        d.handle(&KeyInput::char('j')),
        DispatchResult::Action("next".to_string())
    );
}

#[test]
fn command_mode_keys_never_reach_bindings() {
    let mut d = dispatcher();
    let mut e = executor();
    press(&mut d, &mut e, KeyInput::char(':'));
    // 'q' is bound to quit in Normal mode; here it is just text.
    assert_eq!(press(&mut d, &mut e, KeyInput::char('q')), Effect::None);
    assert_eq!(d.buffer().text(), "q");
}
