//! Cassette data structures for recording and replaying HTTP interactions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A captured message body.
///
/// UTF-8 bodies are stored as text so cassettes stay readable; anything
/// else is kept as raw bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Body {
    /// A valid UTF-8 body.
    Text(String),
    /// A body that is not valid UTF-8.
    Binary(Vec<u8>),
}

impl Body {
    /// Capture `bytes`, preferring the text form when possible.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::Text(text.to_string()),
            Err(_) => Self::Binary(bytes.to_vec()),
        }
    }

    /// The raw body bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    /// Returns `true` if the body has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Parse the body as JSON, if it is JSON.
    #[must_use]
    pub fn as_json(&self) -> Option<serde_json::Value> {
        if self.is_empty() {
            return None;
        }
        serde_json::from_slice(self.as_bytes()).ok()
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// A captured header value.
///
/// Values are almost always text; the rare value carrying bytes that are not
/// UTF-8 is kept raw so replay reproduces it exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(untagged)]
pub enum HeaderText {
    /// A valid UTF-8 value.
    Text(String),
    /// A value that is not valid UTF-8.
    Binary(Vec<u8>),
}

impl HeaderText {
    /// Capture `bytes`, preferring the text form when possible.
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match std::str::from_utf8(bytes) {
            Ok(text) => Self::Text(text.to_string()),
            Err(_) => Self::Binary(bytes.to_vec()),
        }
    }

    /// The raw value bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    /// The value as text, or `None` for a raw value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }
}

impl From<String> for HeaderText {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for HeaderText {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl PartialEq<str> for HeaderText {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for HeaderText {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

/// A captured request as it is stored and compared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapturedRequest {
    /// HTTP method (e.g. `GET`).
    pub method: String,
    /// Full request URI including the query string.
    pub uri: String,
    /// Headers in wire order; names are lowercase and may repeat.
    #[serde(default)]
    pub headers: Vec<(String, HeaderText)>,
    /// Request body.
    #[serde(default)]
    pub body: Body,
}

impl CapturedRequest {
    /// Values of every header named `name` (case-insensitive), in order.
    pub fn header_values<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a HeaderText> + 'a {
        self.headers.iter().filter(move |(key, _)| key.eq_ignore_ascii_case(name)).map(|(_, v)| v)
    }
}

/// A captured response as it is stored and replayed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CapturedResponse {
    /// HTTP status code.
    pub status: u16,
    /// Headers in wire order; names are lowercase and may repeat.
    #[serde(default)]
    pub headers: Vec<(String, HeaderText)>,
    /// Response body.
    #[serde(default)]
    pub body: Body,
}

/// A single recorded request/response pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Interaction {
    /// The censored request.
    pub request: CapturedRequest,
    /// The censored response.
    pub response: CapturedResponse,
    /// When the real call completed.
    pub recorded_at: DateTime<Utc>,
    /// Wall-clock duration of the real call in milliseconds.
    pub duration_ms: u64,
}

/// On-disk layout of a cassette file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CassetteDocument {
    /// Cassette name.
    pub name: String,
    /// Ordered list of interactions.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}
