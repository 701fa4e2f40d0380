//! Error types for the Bot API client.
//!
//! # Design
//! Two tiers. `ClientError` covers everything that stops a call from producing
//! an envelope: bad arguments, transport failures and undecodable responses.
//! Application failures reported by the remote service are not errors at this
//! layer; they arrive as an `Envelope` with `ok == false` and only become an
//! `ApiFailure` if the caller asks for it via `Envelope::into_result`.

use thiserror::Error;

/// Boxed cause carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by `BotClient` and `Bot`.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The bot token is empty or contains characters outside the token alphabet.
    #[error("invalid bot token: {0}")]
    InvalidToken(&'static str),

    /// The method name is empty or contains a path separator.
    #[error("invalid method name {0:?}")]
    InvalidMethod(String),

    /// The file path passed to a download is empty.
    #[error("invalid file path {0:?}")]
    InvalidFilePath(String),

    /// The request parameters could not be serialized to a JSON object.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Parameters serialized to something other than a JSON object.
    #[error("parameters must serialize to a JSON object, got {0}")]
    ParametersNotAnObject(&'static str),

    /// The HTTP round-trip failed before a response body was read.
    #[error("transport failure calling {method}")]
    Transport {
        method: String,
        #[source]
        source: TransportError,
    },

    /// The response body is not a well-formed envelope of the requested shape.
    #[error("deserialization failed (HTTP {status}): {source}")]
    Deserialization {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// A file download returned a non-2xx status.
    #[error("file download failed with HTTP {status}")]
    Download { status: u16 },
}

/// A failure while executing an `HttpRequest`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// An application-level failure reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Bot API error {}: {description}", code_label(.error_code))]
pub struct ApiFailure {
    pub error_code: Option<i64>,
    pub description: String,
    pub retry_after: Option<i64>,
    pub migrate_to_chat_id: Option<i64>,
}

fn code_label(code: &Option<i64>) -> String {
    code.map_or_else(|| "?".to_string(), |c| c.to_string())
}
