use thiserror::Error;

/// User-facing message returned whenever the upstream feed cannot be reached.
pub const FEED_UNAVAILABLE_MESSAGE: &str =
    "No se ha podido recuperar la información de las balizas V16. Inténtelo de nuevo más tarde.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("{0}")]
    Unavailable(String),

    #[error("Could not decode feed payload: {0}")]
    Decode(String),

    #[error("Malformed feed: {0}")]
    Malformed(String),
}

/// Maximum length for error response bodies in log messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl FeedError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// The upstream answered, but not with a success status.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        tracing::warn!(
            status = status.as_u16(),
            body = %Self::truncate_body(body),
            "Feed returned non-success status"
        );
        FeedError::unavailable()
    }

    pub fn unavailable() -> Self {
        FeedError::Unavailable(FEED_UNAVAILABLE_MESSAGE.to_string())
    }

    /// Which of the three failure kinds this is, for logs and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedError::Unavailable(_) => "feed_unavailable",
            FeedError::Decode(_) => "decode_failure",
            FeedError::Malformed(_) => "malformed_feed",
        }
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        tracing::warn!(error = %err, timeout = err.is_timeout(), "Feed request failed");
        FeedError::unavailable()
    }
}

impl From<base64::DecodeError> for FeedError {
    fn from(err: base64::DecodeError) -> Self {
        FeedError::Decode(err.to_string())
    }
}

impl From<std::string::FromUtf8Error> for FeedError {
    fn from(err: std::string::FromUtf8Error) -> Self {
        FeedError::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Malformed(err.to_string())
    }
}
