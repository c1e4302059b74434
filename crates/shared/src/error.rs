//! Shared error types.

/// A frame from the sensor feed could not be turned into a [`crate::Message`].
///
/// Cloneable so it can be handed to every subscriber of the feed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Not JSON, or JSON that does not match the reading shape.
    #[error("invalid reading payload: {0}")]
    Json(String),

    /// A binary frame whose bytes are not UTF-8.
    #[error("binary frame is not valid UTF-8")]
    Utf8,
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Json(err.to_string())
    }
}
