//! Error taxonomy for the dispatch engine and its collaborators.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// Boxed error type carried by transport and encoding failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the VCR transport.
#[derive(Debug, thiserror::Error)]
pub enum VcrError {
    /// No stored interaction satisfied the match rules.
    #[error("No interaction found for request {method} {uri}")]
    NoMatchFound {
        /// Method of the unmatched request.
        method: String,
        /// URI of the unmatched request (after censoring).
        uri: String,
    },
    /// The real transport failed before producing a response.
    #[error("Transport failure: {0}")]
    Transport(#[source] BoxError),
    /// The cassette could not be read or written.
    #[error(transparent)]
    Persistence(#[from] StorageError),
    /// The caller's cancellation token fired.
    #[error("Request cancelled")]
    Cancelled,
    /// A matching interaction exists but is older than the configured validity window.
    #[error("Interaction for {method} {uri} recorded at {recorded_at} has expired")]
    InteractionExpired {
        /// Method of the expired request.
        method: String,
        /// URI of the expired request.
        uri: String,
        /// When the stale interaction was recorded.
        recorded_at: DateTime<Utc>,
    },
    /// A stored interaction cannot be turned back into a response.
    #[error("Invalid stored interaction: {0}")]
    InvalidInteraction(String),
    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl VcrError {
    /// Wrap any transport-level failure.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Returns `true` if this error is a cancellation rather than a failure.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Errors raised by cassette storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Cassette I/O failed for {}: {source}", path.display())]
    Io {
        /// Path of the cassette file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The cassette contents could not be encoded or decoded.
    #[error("Cassette encoding failed for {location}: {source}")]
    Encoding {
        /// Human-readable location of the cassette.
        location: String,
        /// Underlying serializer error.
        #[source]
        source: BoxError,
    },
    /// The write did not run to completion.
    #[error("Cassette write interrupted: {0}")]
    Interrupted(String),
}
