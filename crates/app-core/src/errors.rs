//! User-facing error messages
//!
//! Server rejections arrive as JSON objects keyed by field name. The screens
//! show a single line: `detail` wins, then `error`, then the first field in
//! the order the server sent it.

use app_state::SessionError;
use carepair_client::Error;
use serde_json::Value;

/// Shown whenever no response was received
pub const NETWORK_ERROR_MESSAGE: &str =
    "Unable to connect. Please check your internet connection and try again.";

/// Errors surfaced by screen actions
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Input rejected before any request was made
    #[error("{0}")]
    Invalid(&'static str),

    /// The request failed; `message` is ready to display
    #[error("{message}")]
    Failed {
        /// Text for the error banner
        message: String,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl FormError {
    /// Text for the error banner
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether the form never reached the network
    pub fn is_validation(&self) -> bool {
        matches!(self, FormError::Invalid(_))
    }

    pub(crate) fn failed(message: impl Into<String>, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        FormError::Failed { message: message.into(), source: source.into() }
    }

    /// Convert a session failure, describing API errors with `describe`
    pub(crate) fn from_session(err: SessionError, describe: impl FnOnce(&Error) -> String, fallback: &str) -> Self {
        match err {
            SessionError::Api(e) => {
                let message = describe(&e);
                Self::failed(message, e)
            }
            SessionError::Storage(e) => Self::failed(fallback, e),
        }
    }
}

/// Message for a failed request
///
/// Network failures get the connectivity message. Server rejections use the
/// body as described in the module docs. Anything else, including a body with
/// nothing usable, gets `fallback`.
pub fn user_message(err: &Error, fallback: &str) -> String {
    if err.is_network_error() {
        return NETWORK_ERROR_MESSAGE.to_string();
    }
    err.body().and_then(body_message).unwrap_or_else(|| fallback.to_string())
}

/// The `detail` field of a rejection, or `fallback`
pub fn detail_message(err: &Error, fallback: &str) -> String {
    err.body()
        .and_then(|body| body.get("detail"))
        .and_then(display_text)
        .unwrap_or_else(|| fallback.to_string())
}

/// Rejection body pretty-printed for display, when there is one
pub fn pretty_body(err: &Error) -> Option<String> {
    let body = err.body()?;
    let empty = match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if empty {
        return None;
    }
    serde_json::to_string_pretty(body).ok()
}

fn body_message(body: &Value) -> Option<String> {
    let fields = body.as_object()?;

    if let Some(detail) = fields.get("detail").and_then(display_text) {
        return Some(detail);
    }
    if let Some(error) = fields.get("error").and_then(display_text) {
        return Some(error);
    }

    match fields.values().next()? {
        Value::Array(items) => items.first().and_then(display_text),
        // Nested serializer errors, e.g. {"user": {"email": [...]}}
        nested @ Value::Object(_) => body_message(nested),
        other => display_text(other),
    }
}

fn display_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
