//! Request failure type and server error-body decoding.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use serde_json::Value;

/// Errors produced by API calls.
///
/// Views only ever display these, so `Display` for [`ApiError::RequestFailed`]
/// is the bare server message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// The request never produced a response (connect, DNS, body stream).
    #[error("network error: {0}")]
    Transport(String),

    /// A request payload could not be serialized.
    #[error("invalid request body: {0}")]
    Encode(String),

    /// A 2xx response body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The configured base URL cannot be joined with a path.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTP status for server-side failures, `None` otherwise.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub(crate) fn request_failed_message(status: u16) -> String {
    format!("request failed: {status}")
}

/// Extract the human-readable message from a failed response body.
///
/// Accepts `{"detail": "..."}`, `{"message": "..."}`, and validation-style
/// `{"detail": [{"msg": "..."}, ...]}` bodies. Anything else falls back to
/// `request failed: <status>`.
#[must_use]
pub fn error_message(status: u16, body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return request_failed_message(status);
    };

    match value.get("detail") {
        Some(Value::String(detail)) if !detail.is_empty() => return detail.clone(),
        Some(Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return messages.join("; ");
            }
        }
        _ => {}
    }

    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map_or_else(|| request_failed_message(status), ToOwned::to_owned)
}
