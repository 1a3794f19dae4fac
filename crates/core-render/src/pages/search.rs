//! Last search results, grouped by kind, numbered for `open <kind> <index>`.

use super::{Bordered, Page, RenderContext};
use crate::screen::Screen;
use core_model::PageState;
use core_state::SearchSnapshot;

pub struct SearchPage {
    frame: Bordered,
}

impl SearchPage {
    pub fn create(screen: &mut Screen<'_>) -> Option<Self> {
        Some(Self {
            frame: Bordered::create(screen)?,
        })
    }
}

fn section<'a>(out: &mut Vec<String>, label: &str, items: impl Iterator<Item = &'a str>) {
    let items: Vec<&str> = items.collect();
    if items.is_empty() {
        return;
    }
    out.push(format!("{label}:"));
    out.extend(items.iter().enumerate().map(|(i, s)| format!("  {i}. {s}")));
}

pub(crate) fn search_lines(snap: &SearchSnapshot) -> Vec<String> {
    if snap.query.is_empty() {
        return vec!["Type :search <terms>".to_string()];
    }
    if snap.is_empty() {
        return vec![format!("No results for \"{}\"", snap.query)];
    }
    let mut out = Vec::new();
    section(&mut out, "Songs", snap.songs.iter().map(|t| t.title.as_str()));
    section(&mut out, "Albums", snap.albums.iter().map(String::as_str));
    section(&mut out, "Artists", snap.artists.iter().map(String::as_str));
    section(&mut out, "Playlists", snap.playlists.iter().map(String::as_str));
    out
}

impl Page for SearchPage {
    fn kind(&self) -> &'static str {
        "search"
    }

    fn render(&mut self, screen: &mut Screen<'_>, ctx: &RenderContext<'_>) {
        let snap = ctx.service.search_results();
        let title = if snap.query.is_empty() {
            " Search ".to_string()
        } else {
            format!(" Search: {} ", snap.query)
        };
        self.frame.draw_frame(screen, &title);
        self.frame.write_lines(screen, search_lines(&snap));
    }

    fn on_resize(&mut self, screen: &mut Screen<'_>, state: PageState) {
        self.frame.resize(screen, state);
    }

    fn page_state(&self, screen: &Screen<'_>) -> PageState {
        self.frame.state(screen)
    }

    fn min_dimensions(&self) -> (u32, u32) {
        (24, 5)
    }

    fn destroy(&mut self, screen: &mut Screen<'_>) {
        self.frame.destroy(screen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::Track;

    #[test]
    fn groups_and_numbers_results() {
        let snap = SearchSnapshot {
            query: "x".into(),
            songs: vec![Track::new("One", "x", "y", 1)],
            albums: Vec::new(),
            artists: vec!["X".into(), "Xs".into()],
            playlists: Vec::new(),
        };
        assert_eq!(
            search_lines(&snap),
            vec!["Songs:", "  0. One", "Artists:", "  0. X", "  1. Xs"]
        );
    }

    #[test]
    fn empty_states() {
        assert_eq!(search_lines(&SearchSnapshot::default()), vec!["Type :search <terms>"]);
        let none = SearchSnapshot {
            query: "zzz".into(),
            ..SearchSnapshot::default()
        };
        assert_eq!(search_lines(&none), vec!["No results for \"zzz\""]);
    }
}
