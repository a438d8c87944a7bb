//! Chat command parsing.
//!
//! Commands are recognized behind any configured prefix character and may
//! carry the bot's own `@username` suffix (`/create@somebot` in groups).
//! Commands addressed to a different bot are not ours and parse to `None`.

/// A command this bot knows how to handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    /// `create`, optionally with inline text after the command word.
    Create { inline: Option<String> },
    /// `delete <gist id>`; the id is the second token when present.
    Delete { id: Option<String> },
}

/// A recognized command plus the alias it was invoked under
/// (prefix included, `@username` suffix stripped) for usage hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: Command,
    pub alias: String,
}

/// Built once at startup from the authenticated bot identity.
pub struct CommandParser {
    bot_username: String,
    prefixes: Vec<char>,
}

impl CommandParser {
    pub fn new(bot_username: &str, prefixes: &[char]) -> Self {
        Self {
            bot_username: bot_username.to_string(),
            prefixes: prefixes.to_vec(),
        }
    }

    pub fn parse(&self, text: &str) -> Option<ParsedCommand> {
        let text = text.trim_start();
        let prefix = text.chars().next()?;
        if !self.prefixes.contains(&prefix) {
            return None;
        }

        let mut parts = text[prefix.len_utf8()..].splitn(2, char::is_whitespace);
        let head = parts.next()?;
        let rest = parts.next().map(str::trim).filter(|r| !r.is_empty());

        // Telegram usernames are case-insensitive.
        let name = match head.split_once('@') {
            Some((name, target)) => {
                if !target.eq_ignore_ascii_case(&self.bot_username) {
                    return None;
                }
                name
            }
            None => head,
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "create" => Command::Create {
                inline: rest.map(str::to_string),
            },
            "delete" => Command::Delete {
                id: rest
                    .and_then(|r| r.split_whitespace().next())
                    .map(str::to_string),
            },
            _ => return None,
        };

        Some(ParsedCommand {
            command,
            alias: format!("{prefix}{name}"),
        })
    }
}
