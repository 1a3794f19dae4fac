//! core-keymap: normal-mode key binding table.
//!
//! A binding pairs a key (special key name or literal text) and an optional
//! modifier set with an action string. Lookup is linear and first-match in
//! registration order; duplicate `(key, modifiers)` pairs are kept as-is.
//!
//! Matching rules:
//! - Special names (`ESC`, `ENTER`/`RETURN`, `TAB`, `SPACE`, arrows, `DELETE`,
//!   `BACKSPACE`) resolve to fixed identifiers and compare against the event id.
//! - Everything else compares against the event's literal UTF-8 text.
//! - Declared modifiers must equal the event's modifier set exactly. A binding
//!   without modifiers only matches events carrying no modifiers, so `"p"` does
//!   not fire for `Ctrl+p`.
//! - Shift never reaches a printable key: `P` arrives as the text `"P"` with
//!   no modifiers. Bind the shifted text itself; a `shift` modifier on a
//!   printable key can never match (see [`KeyMapping::shift_unreachable`]).

use core_events::{KeyInput, ModMask, named_key_id};
use tracing::{debug, trace};

// -------------------------------------------------------------------------------------------------
// Binding specification (as written in configuration)
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMapping {
    pub key: String,
    pub modifiers: Option<ModMask>,
    pub action: String,
}

impl KeyMapping {
    pub fn new(key: impl Into<String>, modifiers: Option<ModMask>, action: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers,
            action: action.into(),
        }
    }

    /// True when `shift` is declared on a printable key, which the input
    /// layer always delivers with shift already folded into the text.
    pub fn shift_unreachable(&self) -> bool {
        self.modifiers.is_some_and(|m| m.contains(ModMask::SHIFT))
            && named_key_id(&self.key).is_none()
    }
}

// -------------------------------------------------------------------------------------------------
// Resolved form
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyMatcher {
    Id(u32),
    Text(String),
}

impl KeyMatcher {
    pub fn resolve(key: &str) -> Self {
        match named_key_id(key) {
            Some(id) => KeyMatcher::Id(id),
            None => KeyMatcher::Text(key.to_string()),
        }
    }

    fn matches(&self, event: &KeyInput) -> bool {
        match self {
            KeyMatcher::Id(id) => *id == event.id,
            KeyMatcher::Text(text) => *text == event.utf8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub matcher: KeyMatcher,
    pub modifiers: ModMask,
    pub action: String,
}

impl Binding {
    pub fn matches(&self, event: &KeyInput) -> bool {
        self.modifiers == event.mods && self.matcher.matches(event)
    }
}

impl From<&KeyMapping> for Binding {
    fn from(m: &KeyMapping) -> Self {
        Self {
            matcher: KeyMatcher::resolve(&m.key),
            modifiers: m.modifiers.unwrap_or_else(ModMask::empty),
            action: m.action.clone(),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Table
// -------------------------------------------------------------------------------------------------
#[derive(Debug, Clone, Default)]
pub struct KeyMap {
    bindings: Vec<Binding>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an ordered mapping list. A reload simply rebuilds.
    pub fn from_mappings<'a>(mappings: impl IntoIterator<Item = &'a KeyMapping>) -> Self {
        let bindings: Vec<Binding> = mappings.into_iter().map(Binding::from).collect();
        debug!(target: "input.keymap", bindings = bindings.len(), "keymap_built");
        Self { bindings }
    }

    /// First binding matching the event, in registration order.
    pub fn lookup(&self, event: &KeyInput) -> Option<&Binding> {
        let found = self.bindings.iter().find(|b| b.matches(event));
        trace!(target: "input.keymap", id = event.id, mods = ?event.mods, hit = found.is_some(), "lookup");
        found
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

// -------------------------------------------------------------------------------------------------
// Defaults
// -------------------------------------------------------------------------------------------------
pub fn default_mappings() -> Vec<KeyMapping> {
    vec![
        KeyMapping::new("SPACE", None, "toggle"),
        KeyMapping::new("n", None, "next"),
        KeyMapping::new("p", None, "prev"),
        KeyMapping::new("s", None, "play"),
        KeyMapping::new("x", None, "pause"),
        KeyMapping::new("ESC", None, "close"),
        KeyMapping::new("q", None, "quit"),
        KeyMapping::new("c", Some(ModMask::CTRL), "quit"),
    ]
}

/// Merge user bindings over defaults. A user entry replaces, in place, every
/// default carrying the same action; remaining user entries are appended in
/// their own order. Keys are not de-duplicated.
pub fn merge_mappings(defaults: Vec<KeyMapping>, user: &[KeyMapping]) -> Vec<KeyMapping> {
    let mut merged: Vec<KeyMapping> = Vec::with_capacity(defaults.len() + user.len());
    let mut consumed = vec![false; user.len()];
    for default in defaults {
        match user.iter().position(|u| u.action == default.action) {
            Some(idx) => {
                if !consumed[idx] {
                    merged.push(user[idx].clone());
                    consumed[idx] = true;
                }
            }
            None => merged.push(default),
        }
    }
    for (idx, u) in user.iter().enumerate() {
        if !consumed[idx] {
            merged.push(u.clone());
        }
    }
    merged
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;
    use core_events::keys;
    use pretty_assertions::assert_eq;

    #[test]
    fn shift_is_unreachable_only_on_printable_keys() {
        assert!(KeyMapping::new("P", Some(ModMask::SHIFT), "prev").shift_unreachable());
        assert!(
            KeyMapping::new("p", Some(ModMask::CTRL | ModMask::SHIFT), "prev").shift_unreachable()
        );
        assert!(!KeyMapping::new("TAB", Some(ModMask::SHIFT), "next").shift_unreachable());
        assert!(!KeyMapping::new("P", None, "prev").shift_unreachable());
        assert!(!KeyMapping::new("p", Some(ModMask::CTRL), "prev").shift_unreachable());
    }

    #[test]
    fn literal_binding_requires_empty_modifiers() {
        let map = KeyMap::from_mappings(&[KeyMapping::new("p", None, "prev")]);
        assert_eq!(
            map.lookup(&KeyInput::char('p')).map(|b| b.action.as_str()),
            Some("prev")
        );
        assert!(map.lookup(&KeyInput::char_with('p', ModMask::CTRL)).is_none());
    }

    #[test]
    fn declared_modifiers_match_exactly() {
        let map = KeyMap::from_mappings(&[KeyMapping::new(
            "c",
            Some(ModMask::CTRL | ModMask::ALT),
            "quit",
        )]);
        let both = KeyInput::char_with('c', ModMask::ALT | ModMask::CTRL);
        assert!(map.lookup(&both).is_some(), "order independent");
        assert!(map.lookup(&KeyInput::char_with('c', ModMask::CTRL)).is_none());
        assert!(
            map.lookup(&KeyInput::char_with('c', ModMask::CTRL | ModMask::ALT | ModMask::SHIFT))
                .is_none()
        );
        assert!(map.lookup(&KeyInput::char('c')).is_none());
    }

    #[test]
    fn special_names_resolve_to_ids() {
        let map = KeyMap::from_mappings(&[
            KeyMapping::new("Return", None, "submit"),
            KeyMapping::new("space", None, "toggle"),
        ]);
        assert_eq!(map.bindings()[0].matcher, KeyMatcher::Id(keys::ENTER));
        assert_eq!(
            map.lookup(&KeyInput::named(keys::SPACE)).unwrap().action,
            "toggle"
        );
    }

    #[test]
    fn first_registered_wins_on_collision() {
        let map = KeyMap::from_mappings(&[
            KeyMapping::new("n", None, "next"),
            KeyMapping::new("n", None, "search"),
        ]);
        assert_eq!(map.len(), 2, "duplicates are not collapsed");
        assert_eq!(map.lookup(&KeyInput::char('n')).unwrap().action, "next");
    }

    #[test]
    fn unmapped_event_yields_none() {
        let map = KeyMap::from_mappings(&default_mappings());
        assert!(map.lookup(&KeyInput::char('z')).is_none());
    }

    #[test]
    fn merge_replaces_by_action_and_appends_rest() {
        let defaults = vec![
            KeyMapping::new("n", None, "next"),
            KeyMapping::new("q", None, "quit"),
        ];
        let user = vec![
            KeyMapping::new("j", None, "next"),
            KeyMapping::new("o", None, "open song 0"),
        ];
        let merged = merge_mappings(defaults, &user);
        assert_eq!(
            merged,
            vec![
                KeyMapping::new("j", None, "next"),
                KeyMapping::new("q", None, "quit"),
                KeyMapping::new("o", None, "open song 0"),
            ]
        );
    }

    #[test]
    fn merge_keeps_key_collisions() {
        let defaults = vec![KeyMapping::new("n", None, "next")];
        let user = vec![KeyMapping::new("n", None, "toggle")];
        let merged = merge_mappings(defaults, &user);
        let map = KeyMap::from_mappings(&merged);
        assert_eq!(map.len(), 2);
        assert_eq!(map.lookup(&KeyInput::char('n')).unwrap().action, "next");
    }

    #[test]
    fn merge_replaces_every_default_with_the_action_once() {
        let merged = merge_mappings(
            default_mappings(),
            &[KeyMapping::new("Q", None, "quit")],
        );
        let quit_bindings: Vec<_> = merged.iter().filter(|m| m.action == "quit").collect();
        assert_eq!(quit_bindings.len(), 1);
        assert_eq!(quit_bindings[0].key, "Q");
    }
}
