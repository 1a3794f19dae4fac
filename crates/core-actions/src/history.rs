//! Submitted command lines, newest last, for Up/Down recall.

use std::collections::VecDeque;

pub const HISTORY_MAX: usize = 64;

#[derive(Debug, Clone, Default)]
pub struct CommandHistory {
    entries: VecDeque<String>,
    /// Index of the entry currently recalled; `None` while editing a fresh line.
    browsing: Option<usize>,
}

impl CommandHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Record a submitted line. Blank lines and repeats of the newest entry
    /// are skipped; the oldest entry is evicted past [`HISTORY_MAX`].
    pub fn push(&mut self, line: &str) {
        self.browsing = None;
        let line = line.trim();
        if line.is_empty() || self.entries.back().is_some_and(|last| last == line) {
            return;
        }
        if self.entries.len() == HISTORY_MAX {
            self.entries.pop_front();
        }
        self.entries.push_back(line.to_string());
    }

    pub fn reset(&mut self) {
        self.browsing = None;
    }

    /// Step towards older entries; stays on the oldest.
    pub fn older(&mut self) -> Option<&str> {
        let idx = match self.browsing {
            None => self.entries.len().checked_sub(1)?,
            Some(i) => i.saturating_sub(1),
        };
        self.browsing = Some(idx);
        self.entries.get(idx).map(String::as_str)
    }

    /// Step towards newer entries. Walking past the newest leaves history and
    /// yields an empty line; `None` when not browsing.
    pub fn newer(&mut self) -> Option<&str> {
        let i = self.browsing?;
        if i + 1 >= self.entries.len() {
            self.browsing = None;
            return Some("");
        }
        self.browsing = Some(i + 1);
        self.entries.get(i + 1).map(String::as_str)
    }
}
