//! GitHub Gist API client: create a paste, delete a paste.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::filesize::human_bytes;

/// GitHub's gist collection endpoint.
pub const GITHUB_GISTS_API: &str = "https://api.github.com/gists";

/// A successfully created paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paste {
    /// Human-viewable gist page. Empty when the API answered 2xx without one.
    pub url: String,
    /// Direct link to the raw file content, when the API provided one.
    pub raw_url: Option<String>,
}

/// Why a paste could not be created or deleted. Shown to the user as-is;
/// a single failed attempt is terminal, nothing is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PasteError {
    /// The API answered 2xx but the body carried an error message.
    RemoteRejected(String),
    /// Non-2xx status, transport failure, or an unparseable body.
    RemoteUnavailable,
    /// Attachment exceeds the paste size limit (bytes).
    TooLarge(u64),
    /// Attachment MIME type is not an accepted text format.
    UnsupportedType(String),
    /// Attachment bytes are not valid UTF-8 text.
    DecodeFailure,
}

impl fmt::Display for PasteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteRejected(message) => write!(f, "Gist API error: {message}"),
            Self::RemoteUnavailable => write!(f, "Failed to talk to the Gist API, try again later."),
            Self::TooLarge(limit) => {
                write!(f, "You can only paste files smaller than {}.", human_bytes(u128::from(*limit)))
            }
            Self::UnsupportedType(mime) => write!(f, "Only text files can be pasted, not {mime}."),
            Self::DecodeFailure => write!(f, "That file is not readable as text."),
        }
    }
}

impl std::error::Error for PasteError {}

#[derive(Serialize)]
struct CreateGist<'a> {
    description: &'a str,
    public: bool,
    files: HashMap<&'a str, GistContent<'a>>,
}

#[derive(Serialize)]
struct GistContent<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct GistResponse {
    message: Option<String>,
    html_url: Option<String>,
    #[serde(default)]
    files: HashMap<String, GistFile>,
}

#[derive(Deserialize)]
struct GistFile {
    raw_url: Option<String>,
}

/// Thin authenticated wrapper around the two gist endpoints.
pub struct GistClient {
    http: reqwest::Client,
    api: String,
    token: String,
    title: String,
    description: String,
    public: bool,
}

impl GistClient {
    pub fn new(token: String, bot_username: &str, public: bool) -> Self {
        Self {
            http: reqwest::Client::new(),
            api: GITHUB_GISTS_API.to_string(),
            token,
            title: format!("Gist Paste by @{bot_username}"),
            description: format!("GitHub Gist created by @{bot_username} from Telegram"),
            public,
        }
    }

    /// Override the gist file name used for new pastes.
    pub fn with_title(mut self, title: String) -> Self {
        self.title = title;
        self
    }

    /// Override the gist description used for new pastes.
    pub fn with_description(mut self, description: String) -> Self {
        self.description = description;
        self
    }

    /// Point the client at a different API root. Tests use this to talk to a
    /// local mock server.
    pub fn with_api_base(mut self, api: String) -> Self {
        self.api = api;
        self
    }

    /// Create a gist holding `content` as a single file.
    pub async fn create(&self, content: &str) -> Result<Paste, PasteError> {
        let body = CreateGist {
            description: &self.description,
            public: self.public,
            files: HashMap::from([(self.title.as_str(), GistContent { content })]),
        };

        let response = self
            .http
            .post(&self.api)
            .header("Authorization", format!("token {}", self.token))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("gist create request failed: {e}");
                PasteError::RemoteUnavailable
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("gist create returned {status}");
            return Err(PasteError::RemoteUnavailable);
        }

        let gist: GistResponse = response.json().await.map_err(|e| {
            warn!("gist create returned an unparseable body: {e}");
            PasteError::RemoteUnavailable
        })?;

        if let Some(message) = gist.message {
            return Err(PasteError::RemoteRejected(message));
        }

        let raw_url = gist
            .files
            .get(&self.title)
            .or_else(|| gist.files.values().next())
            .and_then(|file| file.raw_url.as_deref())
            // GitHub does not escape spaces in raw URLs; Telegram buttons need them escaped.
            .map(|raw| raw.replace(' ', "%20"));

        Ok(Paste {
            url: gist.html_url.unwrap_or_default(),
            raw_url,
        })
    }

    /// Delete a gist by its remote id.
    pub async fn delete(&self, id: &str) -> Result<String, PasteError> {
        let response = self
            .http
            .delete(format!("{}/{}", self.api, id))
            .header("Authorization", format!("token {}", self.token))
            .send()
            .await
            .map_err(|e| {
                warn!("gist delete request failed: {e}");
                PasteError::RemoteUnavailable
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(format!("Deleted gist {id}."))
        } else {
            warn!("gist delete returned {status}");
            Err(PasteError::RemoteUnavailable)
        }
    }
}
