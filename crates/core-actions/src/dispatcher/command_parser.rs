//! Structured command line parsing.
//!
//! Converts a submitted command line (or a key binding's action string) into
//! a `ParsedCommand`. A leading ':' is accepted and ignored. Parsing has no
//! side effects; problems are represented as `Unknown` / `Invalid` variants
//! which the executor turns into status messages.

use core_state::DetailKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    Play,
    Pause,
    Toggle,
    Next,
    Prev,
    Search(String),
    Open { kind: DetailKind, index: usize },
    Close,
    Quit,
    /// Blank line.
    Empty,
    /// Known command with bad arguments; carries the message to show.
    Invalid(String),
    Unknown(String),
}

impl ParsedCommand {
    /// Short name for logs (never includes arguments).
    pub fn name(&self) -> &'static str {
        match self {
            ParsedCommand::Play => "play",
            ParsedCommand::Pause => "pause",
            ParsedCommand::Toggle => "toggle",
            ParsedCommand::Next => "next",
            ParsedCommand::Prev => "prev",
            ParsedCommand::Search(_) => "search",
            ParsedCommand::Open { .. } => "open",
            ParsedCommand::Close => "close",
            ParsedCommand::Quit => "quit",
            ParsedCommand::Empty => "empty",
            ParsedCommand::Invalid(_) => "invalid",
            ParsedCommand::Unknown(_) => "unknown",
        }
    }
}

pub struct CommandParser;

impl CommandParser {
    pub fn parse(raw: &str) -> ParsedCommand {
        let s = raw.trim();
        let body = s.strip_prefix(':').unwrap_or(s).trim_start();
        let mut words = body.split_whitespace();
        let Some(head) = words.next() else {
            return ParsedCommand::Empty;
        };
        match head.to_ascii_lowercase().as_str() {
            "play" => ParsedCommand::Play,
            "pause" => ParsedCommand::Pause,
            "toggle" => ParsedCommand::Toggle,
            "next" => ParsedCommand::Next,
            "prev" => ParsedCommand::Prev,
            "close" => ParsedCommand::Close,
            "quit" | "q" => ParsedCommand::Quit,
            "search" => {
                let terms = body[head.len()..].trim();
                if terms.is_empty() {
                    ParsedCommand::Invalid("usage: search <terms>".to_string())
                } else {
                    ParsedCommand::Search(terms.to_string())
                }
            }
            "open" => Self::parse_open(words.next(), words.next()),
            _ => ParsedCommand::Unknown(head.to_string()),
        }
    }

    fn parse_open(kind: Option<&str>, index: Option<&str>) -> ParsedCommand {
        let (Some(kind), Some(index)) = (kind, index) else {
            return ParsedCommand::Invalid("usage: open <kind> <index>".to_string());
        };
        let Some(kind) = DetailKind::from_name(kind) else {
            return ParsedCommand::Invalid(format!("unknown kind: {kind}"));
        };
        match index.parse::<usize>() {
            Ok(index) => ParsedCommand::Open { kind, index },
            Err(_) => ParsedCommand::Invalid(format!("bad index: {index}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_commands() {
        assert_eq!(CommandParser::parse("play"), ParsedCommand::Play);
        assert_eq!(CommandParser::parse(":q"), ParsedCommand::Quit);
        assert_eq!(CommandParser::parse("  NEXT  "), ParsedCommand::Next);
        assert_eq!(CommandParser::parse("toggle"), ParsedCommand::Toggle);
    }

    #[test]
    fn parse_search_keeps_terms_verbatim() {
        assert_eq!(
            CommandParser::parse("search  Harbor  Lights"),
            ParsedCommand::Search("Harbor  Lights".into())
        );
        assert!(matches!(CommandParser::parse("search"), ParsedCommand::Invalid(_)));
    }

    #[test]
    fn parse_open() {
        assert_eq!(
            CommandParser::parse("open album 2"),
            ParsedCommand::Open {
                kind: DetailKind::Album,
                index: 2
            }
        );
        assert_eq!(
            CommandParser::parse("open podcast 1"),
            ParsedCommand::Invalid("unknown kind: podcast".into())
        );
        assert_eq!(
            CommandParser::parse("open song x"),
            ParsedCommand::Invalid("bad index: x".into())
        );
        assert!(matches!(CommandParser::parse("open"), ParsedCommand::Invalid(_)));
    }

    #[test]
    fn parse_blank_and_unknown() {
        assert_eq!(CommandParser::parse("   "), ParsedCommand::Empty);
        assert_eq!(CommandParser::parse(":"), ParsedCommand::Empty);
        assert_eq!(
            CommandParser::parse("doesnotexist now"),
            ParsedCommand::Unknown("doesnotexist".into())
        );
    }
}
