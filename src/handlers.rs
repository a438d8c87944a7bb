//! Command handlers: `start`, `create`, `delete`.
//!
//! Each invocation is self-contained: resolve input, validate, call the gist
//! API, render the reply. Failures are surfaced to the invoking chat and
//! never escape the invocation.

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{
    Document, InlineKeyboardButton, InlineKeyboardMarkup, Message, ParseMode, ReplyParameters,
    User,
};
use teloxide::utils::html;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use url::Url;

use crate::gist::{GistClient, Paste, PasteError};
use crate::mimetype;

/// Attachments over this many bytes are rejected before download.
pub const MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Where the paste content comes from, decided before any network traffic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteSource {
    /// Text supplied inline after the command.
    Inline(String),
    /// Text or caption of the replied-to message.
    ReplyText(String),
    /// The replied-to message carries a document attachment.
    Document,
    /// Nothing usable; prompt the user instead.
    Usage,
}

/// What the replied-to message offers as paste input.
#[derive(Debug, Clone, Copy)]
pub struct ReplyInput<'a> {
    pub has_document: bool,
    pub text: Option<&'a str>,
}

/// Pick the paste source. Inline text after the command wins; otherwise the
/// replied-to message is consulted. A reply with nothing usable is a usage
/// re-prompt, never an empty paste.
pub fn resolve_source(inline: Option<&str>, reply: Option<ReplyInput<'_>>) -> PasteSource {
    if let Some(text) = inline.filter(|text| !text.trim().is_empty()) {
        return PasteSource::Inline(text.to_string());
    }
    match reply {
        Some(reply) if reply.has_document => PasteSource::Document,
        Some(reply) => match reply.text.filter(|text| !text.trim().is_empty()) {
            Some(text) => PasteSource::ReplyText(text.to_string()),
            None => PasteSource::Usage,
        },
        None => PasteSource::Usage,
    }
}

/// Validate an attachment before anything is downloaded.
pub fn check_document(size: u64, mime_type: Option<&str>) -> Result<(), PasteError> {
    if size > MAX_FILE_SIZE {
        return Err(PasteError::TooLarge(MAX_FILE_SIZE));
    }
    match mime_type {
        Some(mime) if mimetype::is_text_like(mime) => Ok(()),
        Some(mime) => Err(PasteError::UnsupportedType(mime.to_string())),
        None => Err(PasteError::UnsupportedType("an unknown type".to_string())),
    }
}

pub async fn handle_start(bot: &Bot, msg: &Message) -> ResponseResult<()> {
    bot.send_message(msg.chat.id, "Bot works. Use /create to paste text to GitHub Gist.")
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}

pub async fn handle_create(
    bot: &Bot,
    msg: &Message,
    alias: &str,
    inline: Option<String>,
    gist: &GistClient,
) -> ResponseResult<()> {
    let reply = msg.reply_to_message();
    let doc = reply.and_then(|r| r.document());
    let source = resolve_source(
        inline.as_deref(),
        reply.map(|r| ReplyInput {
            has_document: doc.is_some(),
            text: r.text().or_else(|| r.caption()),
        }),
    );

    if source == PasteSource::Usage {
        bot.send_message(
            msg.chat.id,
            format!("Reply to a message with {alias} or put the text right after the command."),
        )
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
        return Ok(());
    }

    // One progress message per invocation, edited exactly once with the outcome.
    let progress = bot
        .send_message(msg.chat.id, "Pasting to GitHub Gist...")
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    let outcome = match source {
        PasteSource::Inline(content) | PasteSource::ReplyText(content) => {
            gist.create(&content).await
        }
        PasteSource::Document => match doc {
            Some(doc) => paste_document(bot, gist, doc).await,
            // resolve_source only yields Document when the reply has one
            None => return Ok(()),
        },
        PasteSource::Usage => return Ok(()),
    };

    match outcome {
        Ok(paste) if paste.url.is_empty() => {
            bot.edit_message_text(msg.chat.id, progress.id, "Text too short or file problems.")
                .await?;
        }
        Ok(paste) => {
            info!("created gist {} for {}", paste.url, author_display(msg));
            bot.edit_message_text(
                msg.chat.id,
                progress.id,
                format!(
                    "Here is your GitHub Gist, successfully pasted.\n\nPaste by {}",
                    author_display(msg)
                ),
            )
            .parse_mode(ParseMode::Html)
            .reply_markup(paste_keyboard(&paste))
            .await?;
        }
        Err(e) => {
            // Plain text on purpose: error bodies must not be HTML-interpreted.
            bot.edit_message_text(msg.chat.id, progress.id, e.to_string())
                .await?;
        }
    }

    Ok(())
}

pub async fn handle_delete(
    bot: &Bot,
    msg: &Message,
    alias: &str,
    id: Option<String>,
    gist: &GistClient,
) -> ResponseResult<()> {
    let Some(id) = id else {
        bot.send_message(msg.chat.id, format!("Usage: {alias} GIST_ID"))
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    };

    let text = match gist.delete(&id).await {
        Ok(confirmation) => confirmation,
        Err(e) => e.to_string(),
    };
    bot.send_message(msg.chat.id, text)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;
    Ok(())
}

/// Validate, download, and paste a document attachment.
async fn paste_document(
    bot: &Bot,
    gist: &GistClient,
    doc: &Document,
) -> Result<Paste, PasteError> {
    check_document(
        u64::from(doc.file.size),
        doc.mime_type.as_ref().map(|mime| mime.as_ref()),
    )?;
    let content = download_text(bot, doc).await?;
    gist.create(&content).await
}

/// Download an attachment through a transient temp file and read it as text.
/// The temp file is unlinked when `tmp` drops, on every path out of here.
async fn download_text(bot: &Bot, doc: &Document) -> Result<String, PasteError> {
    let file = bot.get_file(doc.file.id.clone()).await.map_err(|e| {
        warn!("get_file failed: {e}");
        PasteError::RemoteUnavailable
    })?;

    let tmp = tempfile::NamedTempFile::new().map_err(|e| {
        warn!("failed to create transient file: {e}");
        PasteError::RemoteUnavailable
    })?;
    let std_handle = tmp.reopen().map_err(|e| {
        warn!("failed to reopen transient file: {e}");
        PasteError::RemoteUnavailable
    })?;

    let mut dst = tokio::fs::File::from_std(std_handle);
    bot.download_file(&file.path, &mut dst).await.map_err(|e| {
        warn!("attachment download failed: {e}");
        PasteError::RemoteUnavailable
    })?;
    dst.flush().await.map_err(|e| {
        warn!("attachment flush failed: {e}");
        PasteError::RemoteUnavailable
    })?;

    read_transient_text(&tmp)
}

fn read_transient_text(tmp: &tempfile::NamedTempFile) -> Result<String, PasteError> {
    std::fs::read_to_string(tmp.path()).map_err(|e| {
        info!("attachment is not UTF-8 text: {e}");
        PasteError::DecodeFailure
    })
}

/// Display name for the author: `@username`, a clickable mention, or the
/// channel title for anonymous senders.
fn author_display(msg: &Message) -> String {
    if let Some(user) = &msg.from {
        user_display(user)
    } else {
        msg.sender_chat
            .as_ref()
            .and_then(|chat| chat.title())
            .map(html::escape)
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

fn user_display(user: &User) -> String {
    match &user.username {
        Some(username) => format!("@{username}"),
        None => format!(
            r#"<a href="tg://user?id={}">{}</a>"#,
            user.id,
            html::escape(&user.first_name)
        ),
    }
}

/// `[Open Link, Raw Link?]` on the first row, `[Share Link]` on the second.
pub fn paste_keyboard(paste: &Paste) -> InlineKeyboardMarkup {
    let mut first_row = Vec::new();
    if let Ok(url) = Url::parse(&paste.url) {
        first_row.push(InlineKeyboardButton::url("Open Link", url));
    }
    if let Some(raw) = paste.raw_url.as_ref().and_then(|raw| Url::parse(raw).ok()) {
        first_row.push(InlineKeyboardButton::url("Raw Link", raw));
    }

    let share = format!(
        "https://telegram.me/share/url?url={}",
        urlencoding::encode(&paste.url)
    );
    let mut rows = vec![first_row];
    if let Ok(url) = Url::parse(&share) {
        rows.push(vec![InlineKeyboardButton::url("Share Link", url)]);
    }
    InlineKeyboardMarkup::new(rows)
}
