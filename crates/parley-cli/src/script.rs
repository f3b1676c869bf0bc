//! Scenario script parser.
//!
//! One command per line. Blank lines and lines starting with `#` are
//! skipped. Commands that act as another client (`channel`, `message`,
//! `peer`, `online`, `offline`) write to the database directly; the rest
//! are the signed-in user's actions.
//!
//! ```text
//! channel general General chatter
//! message general 5
//! select random
//! create design | UI and UX
//! peer bob Bob
//! online bob
//! dm bob
//! show
//! ```

use crate::CliError;

/// A parsed script command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Another client creates a channel with a fixed id.
    Channel {
        /// Channel id.
        id: String,
        /// Display name.
        name: String,
        /// Description (rest of the line).
        description: String,
    },
    /// The user submits the new-channel form.
    Create {
        /// Name field.
        name: String,
        /// Description field.
        description: String,
    },
    /// Others post `count` messages to a channel.
    Message {
        /// Target channel.
        channel: String,
        /// Number of messages.
        count: u32,
    },
    /// The user opens a channel.
    Select(String),
    /// A user appears in the directory.
    Peer {
        /// Peer id.
        id: String,
        /// Display name.
        name: String,
    },
    /// A peer's presence marker appears.
    Online(String),
    /// A peer's presence marker disappears.
    Offline(String),
    /// The user opens a direct conversation.
    Dm(String),
    /// The user stars a channel.
    Star(String),
    /// The user unstars a channel.
    Unstar(String),
    /// The user's connection drops.
    Disconnect,
    /// The user's connection comes back.
    Connect,
    /// The user uploads a file through the upload modal.
    Upload(String),
    /// The user signs out.
    SignOut,
    /// Print the whole sidebar.
    Show,
}

/// Parse a whole script.
pub fn parse_script(source: &str) -> Result<Vec<Command>, CliError> {
    source
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let line = line.trim();
            (!line.is_empty() && !line.starts_with('#')).then_some((i + 1, line))
        })
        .map(|(line_no, line)| {
            parse_line(line).map_err(|message| CliError::Parse { line: line_no, message })
        })
        .collect()
}

fn parse_line(line: &str) -> Result<Command, String> {
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word {
        "channel" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let id = required(parts.next(), "channel id")?;
            let name = required(parts.next(), "channel name")?;
            Command::Channel { id, name, description: parts.next().unwrap_or("").trim().to_owned() }
        },
        "create" => {
            let (name, description) = rest.split_once('|').unwrap_or((rest, ""));
            Command::Create { name: name.trim().to_owned(), description: description.trim().to_owned() }
        },
        "message" => {
            let mut parts = rest.split_whitespace();
            let channel = required(parts.next(), "channel id")?;
            let count = match parts.next() {
                Some(n) => n.parse().map_err(|_| format!("invalid message count {n:?}"))?,
                None => 1,
            };
            Command::Message { channel, count }
        },
        "peer" => {
            let (id, name) = rest.split_once(char::is_whitespace).unwrap_or((rest, rest));
            Command::Peer { id: required(Some(id), "peer id")?, name: name.trim().to_owned() }
        },
        "select" => Command::Select(single(rest, "channel id")?),
        "online" => Command::Online(single(rest, "peer id")?),
        "offline" => Command::Offline(single(rest, "peer id")?),
        "dm" => Command::Dm(single(rest, "peer id")?),
        "star" => Command::Star(single(rest, "channel id")?),
        "unstar" => Command::Unstar(single(rest, "channel id")?),
        "upload" => Command::Upload(single(rest, "file name")?),
        "disconnect" => Command::Disconnect,
        "connect" => Command::Connect,
        "signout" => Command::SignOut,
        "show" => Command::Show,
        other => return Err(format!("unknown command {other:?}")),
    };
    Ok(command)
}

fn required(part: Option<&str>, what: &str) -> Result<String, String> {
    match part.map(str::trim) {
        Some(p) if !p.is_empty() => Ok(p.to_owned()),
        _ => Err(format!("missing {what}")),
    }
}

fn single(rest: &str, what: &str) -> Result<String, String> {
    let value = required(Some(rest), what)?;
    if value.contains(char::is_whitespace) {
        return Err(format!("{what} must be a single word"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_command() {
        let script = "
            # setup
            channel general General chatter
            message general 5
            message random
            create design | UI and UX
            select general
            peer bob Bob Builder
            online bob
            offline bob
            dm bob
            star general
            unstar general
            upload cat.png
            disconnect
            connect
            signout
            show
        ";

        let commands = parse_script(script).unwrap();

        assert_eq!(commands.len(), 16);
        assert_eq!(commands[0], Command::Channel {
            id: "general".into(),
            name: "General".into(),
            description: "chatter".into(),
        });
        assert_eq!(commands[2], Command::Message { channel: "random".into(), count: 1 });
        assert_eq!(commands[3], Command::Create {
            name: "design".into(),
            description: "UI and UX".into(),
        });
        assert_eq!(commands[5], Command::Peer { id: "bob".into(), name: "Bob Builder".into() });
        assert_eq!(commands[15], Command::Show);
    }

    #[test]
    fn create_without_description_keeps_it_empty() {
        let commands = parse_script("create lonely").unwrap();
        assert_eq!(commands, vec![Command::Create {
            name: "lonely".into(),
            description: String::new(),
        }]);
    }

    #[test]
    fn peer_without_name_uses_id() {
        let commands = parse_script("peer carol").unwrap();
        assert_eq!(commands, vec![Command::Peer { id: "carol".into(), name: "carol".into() }]);
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse_script("show\n\nfly away").unwrap_err();
        assert!(matches!(err, CliError::Parse { line: 3, .. }));

        let err = parse_script("message general lots").unwrap_err();
        assert_eq!(err.to_string(), "line 1: invalid message count \"lots\"");

        let err = parse_script("select").unwrap_err();
        assert_eq!(err.to_string(), "line 1: missing channel id");
    }
}
