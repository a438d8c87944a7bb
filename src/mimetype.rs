//! MIME-type gate for paste attachments.

use std::sync::OnceLock;

use regex::Regex;

static TEXT_LIKE: OnceLock<Regex> = OnceLock::new();

/// Whether an attachment's MIME type is a text format we accept for pasting:
/// anything under `text/`, plus json, yaml, xml, toml, and shell scripts.
///
/// The match is case-sensitive; Telegram reports these subtypes lowercase.
pub fn is_text_like(mime_type: &str) -> bool {
    let pattern = TEXT_LIKE.get_or_init(|| {
        Regex::new(r"^text/|json$|yaml$|xml$|toml$|x-sh$|x-shellscript$").unwrap()
    });
    pattern.is_match(mime_type)
}
