//! Command execution against the music service.
//!
//! Every failure is absorbed here and becomes a one-line status; nothing
//! propagates back into the caller's control flow. Effects the compositor
//! must apply itself (quitting, opening or closing the detail view) are
//! returned as [`Effect`].

use crate::dispatcher::command_parser::{CommandParser, ParsedCommand};
use core_state::{DetailKind, MusicService, PlaybackStatus};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Quit,
    OpenDetail { kind: DetailKind, index: usize },
    CloseDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// Text for the command bar, if any.
    pub status: Option<String>,
    pub effect: Effect,
}

impl CommandOutcome {
    fn status(text: impl Into<String>) -> Self {
        Self {
            status: Some(text.into()),
            effect: Effect::None,
        }
    }

    fn effect(effect: Effect) -> Self {
        Self {
            status: None,
            effect,
        }
    }

    fn silent() -> Self {
        Self::effect(Effect::None)
    }
}

pub trait CommandExecutor {
    fn execute(&mut self, line: &str) -> CommandOutcome;
}

/// Executes commands by driving a [`MusicService`], which it owns.
#[derive(Debug)]
pub struct ServiceExecutor<S> {
    service: S,
}

impl<S: MusicService> ServiceExecutor<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut S {
        &mut self.service
    }

    fn now_playing(&self, verb: &str) -> CommandOutcome {
        let snap = self.service.playback();
        match (snap.status, snap.track) {
            (PlaybackStatus::Playing, Some(track)) => {
                CommandOutcome::status(format!("{verb}: {}", track.title))
            }
            (_, Some(track)) => CommandOutcome::status(format!("Selected: {}", track.title)),
            (_, None) => CommandOutcome::status("Stopped"),
        }
    }

    fn run(&mut self, command: ParsedCommand) -> CommandOutcome {
        match command {
            ParsedCommand::Play => match self.service.play() {
                Ok(()) => self.now_playing("Playing"),
                Err(e) => CommandOutcome::status(e.to_string()),
            },
            ParsedCommand::Pause => {
                self.service.pause();
                CommandOutcome::status("Paused")
            }
            ParsedCommand::Toggle => match self.service.toggle() {
                Ok(()) if self.service.playback().status == PlaybackStatus::Playing => {
                    self.now_playing("Playing")
                }
                Ok(()) => CommandOutcome::status("Paused"),
                Err(e) => CommandOutcome::status(e.to_string()),
            },
            ParsedCommand::Next => match self.service.next() {
                Ok(()) => self.now_playing("Playing"),
                Err(e) => CommandOutcome::status(e.to_string()),
            },
            ParsedCommand::Prev => match self.service.prev() {
                Ok(()) => self.now_playing("Playing"),
                Err(e) => CommandOutcome::status(e.to_string()),
            },
            ParsedCommand::Search(terms) => {
                let hits = self.service.search(&terms);
                CommandOutcome::status(format!("{hits} results for \"{terms}\""))
            }
            ParsedCommand::Open { kind, index } => match self.service.detail(kind, index) {
                Ok(_) => CommandOutcome::effect(Effect::OpenDetail { kind, index }),
                Err(e) => CommandOutcome::status(e.to_string()),
            },
            ParsedCommand::Close => CommandOutcome::effect(Effect::CloseDetail),
            ParsedCommand::Quit => CommandOutcome::effect(Effect::Quit),
            ParsedCommand::Empty => CommandOutcome::silent(),
            ParsedCommand::Invalid(message) => CommandOutcome::status(message),
            ParsedCommand::Unknown(word) => {
                CommandOutcome::status(format!("Unknown command: {word}"))
            }
        }
    }
}

impl<S: MusicService> CommandExecutor for ServiceExecutor<S> {
    fn execute(&mut self, line: &str) -> CommandOutcome {
        let command = CommandParser::parse(line);
        let name = command.name();
        let outcome = self.run(command);
        match outcome.effect {
            Effect::Quit => info!(target: "dispatch.command", command = name, "quit_requested"),
            _ => debug!(
                target: "dispatch.command",
                command = name,
                has_status = outcome.status.is_some(),
                "executed"
            ),
        }
        outcome
    }
}
