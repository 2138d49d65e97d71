//! CarePair API facade
//!
//! One method per remote operation. All calls go through the
//! [`AuthenticatedClient`], so they carry credentials and survive one token
//! expiry transparently.
//!
//! # Example
//!
//! ```rust,no_run
//! use carepair_client::{ApiClient, ApiClientConfig, AuthenticatedClient, CarePairApi, LoginRequest};
//! use std::sync::Arc;
//! use storage::MemoryTokenStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http = ApiClient::new(ApiClientConfig::new("https://api.carepair.example"))?;
//!     let client = AuthenticatedClient::new(http, Arc::new(MemoryTokenStore::new()));
//!     let api = CarePairApi::new(Arc::new(client));
//!
//!     let response = api.login(&LoginRequest::new("jane@example.com", "correct horse")).await?;
//!     println!("Signed in as {}", response.user.full_name);
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::auth::AuthenticatedClient;
use crate::endpoints;
use crate::http::ApiRequest;
use crate::profiles::{PatientProfile, PatientProfileUpdate, TherapistProfile, TherapistProfileUpdate};
use crate::types::{AuthResponse, LoginRequest, PatientRegistration, Registration, TherapistRegistration, User};
use crate::Result;

#[derive(Serialize)]
struct LogoutRequest<'a> {
    refresh: &'a str,
}

/// Typed access to the CarePair REST API
#[derive(Debug, Clone)]
pub struct CarePairApi {
    client: Arc<AuthenticatedClient>,
}

impl CarePairApi {
    /// Create the facade over a shared authenticated client
    pub fn new(client: Arc<AuthenticatedClient>) -> Self {
        Self { client }
    }

    /// The shared authenticated client
    pub fn client(&self) -> &Arc<AuthenticatedClient> {
        &self.client
    }

    /// Exchange email and password for a user and token pair
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse> {
        let request = ApiRequest::post(endpoints::LOGIN).json_body(credentials)?;
        Ok(self.client.send(request).await?.data)
    }

    /// Create a patient account
    pub async fn register_patient(&self, payload: &PatientRegistration) -> Result<AuthResponse> {
        let request = ApiRequest::post(endpoints::REGISTER_PATIENT).json_body(payload)?;
        Ok(self.client.send(request).await?.data)
    }

    /// Create a therapist account
    pub async fn register_therapist(&self, payload: &TherapistRegistration) -> Result<AuthResponse> {
        let request = ApiRequest::post(endpoints::REGISTER_THERAPIST).json_body(payload)?;
        Ok(self.client.send(request).await?.data)
    }

    /// Create an account of either role
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        match registration {
            Registration::Patient(payload) => self.register_patient(payload).await,
            Registration::Therapist(payload) => self.register_therapist(payload).await,
        }
    }

    /// Look up the user the stored access token belongs to
    pub async fn current_user(&self) -> Result<User> {
        Ok(self.client.send(ApiRequest::get(endpoints::CURRENT_USER)).await?.data)
    }

    /// End the session server-side
    ///
    /// The refresh token is sent along when one is stored so the server can
    /// revoke it. Local credentials are not touched here.
    pub async fn logout(&self) -> Result<()> {
        let refresh = self.client.tokens().refresh_token().await?;
        let mut request = ApiRequest::post(endpoints::LOGOUT);
        if let Some(refresh) = refresh.as_deref() {
            request = request.json_body(&LogoutRequest { refresh })?;
        }
        self.client.send::<Value>(request).await?;
        Ok(())
    }

    /// Fetch the signed-in patient's profile
    pub async fn patient_profile(&self) -> Result<PatientProfile> {
        Ok(self.client.send(ApiRequest::get(endpoints::PATIENT_PROFILE)).await?.data)
    }

    /// Update the editable patient fields
    ///
    /// Any 2xx counts as saved; the reply body is not inspected.
    pub async fn update_patient_profile(&self, update: &PatientProfileUpdate) -> Result<()> {
        let request = ApiRequest::patch(endpoints::PATIENT_PROFILE).json_body(update)?;
        self.client.send::<Value>(request).await?;
        Ok(())
    }

    /// Fetch the signed-in therapist's profile
    pub async fn therapist_profile(&self) -> Result<TherapistProfile> {
        Ok(self.client.send(ApiRequest::get(endpoints::THERAPIST_PROFILE)).await?.data)
    }

    /// Update the therapist profile as multipart form data
    ///
    /// Like the patient update, the reply body is ignored. Fetch the profile
    /// again to see what was stored.
    pub async fn update_therapist_profile(&self, update: &TherapistProfileUpdate) -> Result<()> {
        let request = ApiRequest::patch(endpoints::THERAPIST_PROFILE).multipart(update.to_multipart()?);
        self.client.send::<Value>(request).await?;
        Ok(())
    }
}
