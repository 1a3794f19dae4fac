//! Core event types shared by the input pipeline, dispatcher and runtime.
//!
//! A key event carries both a numeric identifier and the literal UTF-8 text the
//! terminal produced. Printable keys use their Unicode scalar value as id;
//! special keys (arrows, Enter, Backspace, ...) use fixed identifiers from
//! [`keys`]. Identifiers for special keys live above the Unicode range so they
//! can never collide with a printable character.

use std::fmt;
use std::sync::atomic::AtomicU64;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters. Inspected by tests and logged on shutdown.
// -------------------------------------------------------------------------------------------------
pub static QUEUE_ENQUEUED: AtomicU64 = AtomicU64::new(0); // every enqueue call
pub static QUEUE_DIRECT_HANDOFFS: AtomicU64 = AtomicU64::new(0); // enqueue resumed a waiting consumer
pub static QUEUE_BUFFERED: AtomicU64 = AtomicU64::new(0); // enqueue appended to the buffer
pub static KEYPRESS_TOTAL: AtomicU64 = AtomicU64::new(0); // key events produced by the input task
pub static KEYPRESS_UNMAPPED: AtomicU64 = AtomicU64::new(0); // normal-mode keys with no binding
pub static ASYNC_INPUT_STARTS: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_SIGNAL: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_STREAM: AtomicU64 = AtomicU64::new(0);
pub static ASYNC_INPUT_STOP_ERROR: AtomicU64 = AtomicU64::new(0);

/// Fixed identifiers for special keys.
pub mod keys {
    /// First identifier past the Unicode scalar range.
    const SYNTHESIZED_BASE: u32 = 0x11_0000;

    pub const TAB: u32 = 0x09;
    pub const ESC: u32 = 0x1b;
    pub const SPACE: u32 = 0x20;
    pub const ENTER: u32 = SYNTHESIZED_BASE + 1;
    pub const BACKSPACE: u32 = SYNTHESIZED_BASE + 2;
    pub const DELETE: u32 = SYNTHESIZED_BASE + 3;
    pub const UP: u32 = SYNTHESIZED_BASE + 4;
    pub const DOWN: u32 = SYNTHESIZED_BASE + 5;
    pub const LEFT: u32 = SYNTHESIZED_BASE + 6;
    pub const RIGHT: u32 = SYNTHESIZED_BASE + 7;
    pub const HOME: u32 = SYNTHESIZED_BASE + 8;
    pub const END: u32 = SYNTHESIZED_BASE + 9;
    pub const PAGE_UP: u32 = SYNTHESIZED_BASE + 10;
    pub const PAGE_DOWN: u32 = SYNTHESIZED_BASE + 11;
    /// Function keys occupy `F_BASE + n` for `n` in `1..=24`.
    pub const F_BASE: u32 = SYNTHESIZED_BASE + 0x100;
}

/// Resolve a configuration key name (`"ESC"`, `"enter"`, `"Up"`, ...) to its fixed
/// identifier. Matching is case-insensitive. Returns `None` for names that must be
/// matched on their literal text instead.
pub fn named_key_id(name: &str) -> Option<u32> {
    let id = match name.to_ascii_uppercase().as_str() {
        "ESC" | "ESCAPE" => keys::ESC,
        "ENTER" | "RETURN" => keys::ENTER,
        "TAB" => keys::TAB,
        "SPACE" => keys::SPACE,
        "UP" => keys::UP,
        "DOWN" => keys::DOWN,
        "LEFT" => keys::LEFT,
        "RIGHT" => keys::RIGHT,
        "DELETE" => keys::DELETE,
        "BACKSPACE" => keys::BACKSPACE,
        _ => return None,
    };
    Some(id)
}

bitflags::bitflags! {
    /// Modifier set attached to a key event. Comparison between sets is exact.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ModMask: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
        const META  = 0b0000_1000;
        const SUPER = 0b0001_0000;
    }
}

impl ModMask {
    /// Parse a single modifier name as written in configuration files.
    pub fn parse_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::CTRL),
            "alt" | "option" => Some(Self::ALT),
            "shift" => Some(Self::SHIFT),
            "meta" => Some(Self::META),
            "super" | "cmd" | "command" => Some(Self::SUPER),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyKind {
    #[default]
    Press,
    Repeat,
    Release,
    Unknown,
}

/// A single keyboard event as produced by the backend. Immutable once queued.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyInput {
    pub id: u32,
    pub utf8: String,
    pub mods: ModMask,
    pub kind: KeyKind,
}

impl KeyInput {
    /// Printable character press with no modifiers.
    pub fn char(ch: char) -> Self {
        Self::char_with(ch, ModMask::empty())
    }

    pub fn char_with(ch: char, mods: ModMask) -> Self {
        Self {
            id: ch as u32,
            utf8: ch.to_string(),
            mods,
            kind: KeyKind::Press,
        }
    }

    /// Special key press (see [`keys`]). `utf8` is empty unless the key has a
    /// natural textual form (Tab, Space, Esc).
    pub fn named(id: u32) -> Self {
        Self::named_with(id, ModMask::empty())
    }

    pub fn named_with(id: u32, mods: ModMask) -> Self {
        let utf8 = match id {
            keys::TAB | keys::ESC | keys::SPACE => char::from_u32(id).map(String::from),
            _ => None,
        }
        .unwrap_or_default();
        Self {
            id,
            utf8,
            mods,
            kind: KeyKind::Press,
        }
    }

    pub fn with_kind(mut self, kind: KeyKind) -> Self {
        self.kind = kind;
        self
    }

    /// True when the event carries text that may be inserted into a command buffer.
    pub fn is_printable(&self) -> bool {
        !self.utf8.is_empty()
            && !self.mods.intersects(ModMask::CTRL | ModMask::ALT | ModMask::SUPER)
            && self.utf8.chars().all(|c| !c.is_control())
    }
}

impl fmt::Display for KeyInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}{:?}", self.id, self.mods)
    }
}

/// Normalized events flowing through the input queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyInput),
    /// Terminal resize (columns, rows). Posted as a message so geometry is only
    /// ever mutated from the UI loop.
    Resize(u16, u16),
    /// Focus changes force a full repaint.
    FocusGained,
    FocusLost,
}
