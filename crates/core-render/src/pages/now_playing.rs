//! Current track, playback state and a progress bar.

use super::{Bordered, Page, RenderContext};
use crate::screen::Screen;
use core_model::PageState;
use core_state::{PlaybackSnapshot, PlaybackStatus, format_time};

pub struct NowPlayingPage {
    frame: Bordered,
}

impl NowPlayingPage {
    pub fn create(screen: &mut Screen<'_>) -> Option<Self> {
        Some(Self {
            frame: Bordered::create(screen)?,
        })
    }
}

fn status_glyph(status: PlaybackStatus) -> &'static str {
    match status {
        PlaybackStatus::Playing => ">",
        PlaybackStatus::Paused => "||",
        PlaybackStatus::Stopped => "[]",
    }
}

/// `elapsed [=====-----] total`, the bar filling whatever width is left.
pub(crate) fn progress_line(snap: &PlaybackSnapshot, width: u32) -> String {
    let Some(track) = &snap.track else {
        return String::new();
    };
    let elapsed = format_time(snap.position);
    let total = format_time(track.duration);
    let fixed = elapsed.len() + total.len() + 4;
    let bar_width = (width as usize).saturating_sub(fixed);
    if bar_width == 0 {
        return format!("{elapsed} / {total}");
    }
    let ratio = if track.duration.is_zero() {
        0.0
    } else {
        (snap.position.as_secs_f64() / track.duration.as_secs_f64()).min(1.0)
    };
    let filled = (ratio * bar_width as f64).round() as usize;
    format!(
        "{elapsed} [{}{}] {total}",
        "=".repeat(filled),
        "-".repeat(bar_width - filled)
    )
}

impl Page for NowPlayingPage {
    fn kind(&self) -> &'static str {
        "now_playing"
    }

    fn render(&mut self, screen: &mut Screen<'_>, ctx: &RenderContext<'_>) {
        self.frame.draw_frame(screen, " Now Playing ");
        let (width, _) = self.frame.content_size(screen);
        let snap = ctx.service.playback();
        let lines = match &snap.track {
            Some(track) => vec![
                format!("{} {}", status_glyph(snap.status), snap.status.as_str()),
                track.title.clone(),
                format!("{} / {}", track.artist, track.album),
                progress_line(&snap, width),
            ],
            None => vec![
                format!("{} {}", status_glyph(snap.status), snap.status.as_str()),
                "Nothing playing".to_string(),
            ],
        };
        self.frame.write_lines(screen, lines);
    }

    fn on_resize(&mut self, screen: &mut Screen<'_>, state: PageState) {
        self.frame.resize(screen, state);
    }

    fn page_state(&self, screen: &Screen<'_>) -> PageState {
        self.frame.state(screen)
    }

    fn min_dimensions(&self) -> (u32, u32) {
        (24, 6)
    }

    fn destroy(&mut self, screen: &mut Screen<'_>) {
        self.frame.destroy(screen);
    }
}
