use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    /// Best-effort parse of a response body. Anything but `{"message": "..."}` is `None`.
    pub fn from_body(body: &str) -> Option<Self> {
        serde_json::from_str::<Self>(body)
            .ok()
            .filter(|err| !err.message.trim().is_empty())
    }
}

#[derive(Debug, Error)]
#[error("HTTP {status}: {message}")]
pub struct ApiException {
    pub status: u16,
    pub message: String,
}

impl ApiException {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_message_body() {
        let err = ApiError::from_body(r#"{"message": "Invalid sort parameter: bogus"}"#)
            .expect("message body");
        assert_eq!(err.message, "Invalid sort parameter: bogus");
    }

    #[test]
    fn rejects_opaque_bodies() {
        assert!(ApiError::from_body("<html>502 Bad Gateway</html>").is_none());
        assert!(ApiError::from_body(r#"{"detail": "nope"}"#).is_none());
        assert!(ApiError::from_body(r#"{"message": "  "}"#).is_none());
    }
}
