//! CarePair API client library
//!
//! This crate implements the HTTP side of the CarePair mobile client: typed
//! request and response schemas for the remote REST API, a raw JSON/multipart
//! client, and a client that attaches bearer credentials and silently
//! refreshes an expired access token once per request.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod auth;
pub mod endpoints;
pub mod http;
pub mod profiles;
pub mod types;

pub use api::CarePairApi;
pub use auth::{AuthenticatedClient, SessionCallback, SessionEvent};
pub use http::{ApiClient, ApiClientConfig, ApiRequest, ApiResponse, HttpMethod, MultipartForm};
pub use profiles::{
    PatientProfile, PatientProfileUpdate, ProfileImage, ProfileUser, TherapistProfile,
    TherapistProfileUpdate, WeeklyAvailability, Weekday,
};
pub use types::{
    AuthResponse, AuthTokens, LoginRequest, PatientRegistration, Registration, Role,
    TherapistRegistration, User,
};

/// Result type for CarePair API operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for CarePair API operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport failure or timeout; no response was received
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("API error ({status})")]
    Api {
        /// HTTP status code
        status: u16,
        /// Decoded JSON error body, if the server sent one
        body: Option<serde_json::Value>,
    },

    /// A success response did not match the expected schema
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A request body could not be encoded
    #[error("Failed to encode request: {0}")]
    Encode(String),

    /// Token storage failure
    #[error("Token storage error: {0}")]
    Storage(#[from] storage::KvError),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// HTTP status of a server rejection
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// JSON body of a server rejection
    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            Error::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Whether the server rejected the credentials (HTTP 401)
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Whether no response was received at all
    pub fn is_network_error(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}
