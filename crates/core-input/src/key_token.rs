use core_events::{KeyInput, KeyKind, ModMask, keys};
use crossterm::event::{
    KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyEventKind as CKeyEventKind,
    KeyModifiers as CKeyModifiers,
};

/// Map a crossterm key event into a queued `KeyInput`.
///
/// Returns `None` for key codes with no identifier (media keys, lone modifiers).
pub(crate) fn map_key_event(event: &CKeyEvent) -> Option<KeyInput> {
    let mods = map_mod_mask(event.modifiers);
    let mut key = match event.code {
        CKeyCode::Char(' ') => KeyInput::named_with(keys::SPACE, mods),
        CKeyCode::Char(c) => KeyInput::char_with(c, mods),
        CKeyCode::F(n) if (1..=24).contains(&n) => {
            KeyInput::named_with(keys::F_BASE + u32::from(n), mods)
        }
        code => KeyInput::named_with(map_named(code)?, mods),
    };
    key.kind = map_kind(event.kind);
    Some(normalize_shift(key))
}

fn map_named(code: CKeyCode) -> Option<u32> {
    let id = match code {
        CKeyCode::Enter => keys::ENTER,
        CKeyCode::Esc => keys::ESC,
        CKeyCode::Backspace => keys::BACKSPACE,
        CKeyCode::Tab | CKeyCode::BackTab => keys::TAB,
        CKeyCode::Up => keys::UP,
        CKeyCode::Down => keys::DOWN,
        CKeyCode::Left => keys::LEFT,
        CKeyCode::Right => keys::RIGHT,
        CKeyCode::Home => keys::HOME,
        CKeyCode::End => keys::END,
        CKeyCode::PageUp => keys::PAGE_UP,
        CKeyCode::PageDown => keys::PAGE_DOWN,
        CKeyCode::Delete => keys::DELETE,
        _ => return None,
    };
    Some(id)
}

fn map_kind(kind: CKeyEventKind) -> KeyKind {
    match kind {
        CKeyEventKind::Press => KeyKind::Press,
        CKeyEventKind::Repeat => KeyKind::Repeat,
        CKeyEventKind::Release => KeyKind::Release,
    }
}

/// Convert crossterm modifier flags into the `ModMask` bits.
pub(crate) fn map_mod_mask(mods: CKeyModifiers) -> ModMask {
    let mut out = ModMask::empty();
    if mods.contains(CKeyModifiers::CONTROL) {
        out |= ModMask::CTRL;
    }
    if mods.contains(CKeyModifiers::ALT) {
        out |= ModMask::ALT;
    }
    if mods.contains(CKeyModifiers::SHIFT) {
        out |= ModMask::SHIFT;
    }
    if mods.contains(CKeyModifiers::SUPER) {
        out |= ModMask::SUPER;
    }
    if mods.contains(CKeyModifiers::META) {
        out |= ModMask::META;
    }
    out
}

/// Shift is dropped for printable characters whose text already reflects it
/// (`'P'` arrives as `Char('P')` + SHIFT), so a binding for `"P"` with no
/// modifiers fires. It is kept for named keys (`Shift+Tab`).
fn normalize_shift(mut key: KeyInput) -> KeyInput {
    let printable_char = key
        .utf8
        .chars()
        .next()
        .is_some_and(|c| !c.is_control() && key.id == c as u32);
    if printable_char {
        key.mods.remove(ModMask::SHIFT);
    }
    key
}
