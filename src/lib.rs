//! Telegram bot that pastes text and small text files to GitHub Gist.

pub mod command;
pub mod config;
pub mod filesize;
pub mod gist;
pub mod handlers;
pub mod mimetype;

pub use command::{Command, CommandParser, ParsedCommand};
pub use config::Config;
pub use gist::{GistClient, Paste, PasteError};
