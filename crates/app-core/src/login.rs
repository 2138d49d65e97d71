//! Login screen

use app_state::SessionContext;
use carepair_client::{LoginRequest, User};

use crate::errors::{detail_message, FormError, NETWORK_ERROR_MESSAGE};

/// Shown when the server rejects the credentials without a `detail`
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

/// Email and password as typed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    /// Account email
    pub email: String,
    /// Password
    pub password: String,
}

impl LoginForm {
    /// Create a filled-in form
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// Check the form and build the request
    pub fn validate(&self) -> Result<LoginRequest, FormError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(FormError::Invalid("Please fill in all fields"));
        }
        Ok(LoginRequest::new(&self.email, &self.password))
    }

    /// Sign in through the session
    ///
    /// Nothing is sent when validation fails.
    pub async fn submit(&self, session: &SessionContext) -> Result<User, FormError> {
        let request = self.validate()?;
        session.login(&request).await.map_err(|e| {
            tracing::debug!(error = %e, "login rejected");
            FormError::from_session(e, login_message, INVALID_CREDENTIALS_MESSAGE)
        })
    }
}

fn login_message(err: &carepair_client::Error) -> String {
    if err.is_network_error() {
        NETWORK_ERROR_MESSAGE.to_string()
    } else {
        detail_message(err, INVALID_CREDENTIALS_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carepair_client::{ApiClient, ApiClientConfig, AuthenticatedClient, CarePairApi};
    use serde_json::json;
    use std::sync::Arc;
    use storage::MemoryTokenStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(base_url: &str) -> SessionContext {
        let http = ApiClient::new(ApiClientConfig::new(base_url)).unwrap();
        let client = AuthenticatedClient::new(http, Arc::new(MemoryTokenStore::new()));
        SessionContext::new(CarePairApi::new(Arc::new(client)))
    }

    #[test]
    fn test_empty_fields_rejected() {
        for form in [LoginForm::new("", "secret"), LoginForm::new("a@b.c", ""), LoginForm::default()] {
            let err = form.validate().unwrap_err();
            assert_eq!(err.message(), "Please fill in all fields");
        }
    }

    #[test]
    fn test_valid_form_builds_request() {
        let request = LoginForm::new("a@b.c", "secret").validate().unwrap();
        assert_eq!(request.email, "a@b.c");
        assert_eq!(request.password, "secret");
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let session = session_for(&server.uri());
        let err = LoginForm::new("a@b.c", "").submit(&session).await.unwrap_err();
        assert!(err.is_validation());
        server.verify().await;
    }

    #[tokio::test]
    async fn test_rejection_shows_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "detail": "No active account found with the given credentials"
            })))
            .mount(&server)
            .await;

        let session = session_for(&server.uri());
        let err = LoginForm::new("a@b.c", "wrong").submit(&session).await.unwrap_err();
        assert_eq!(err.message(), "No active account found with the given credentials");
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_rejection_without_detail_uses_default() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"email": ["Enter a valid email address."]})))
            .mount(&server)
            .await;

        let session = session_for(&server.uri());
        let err = LoginForm::new("nope", "secret").submit(&session).await.unwrap_err();
        assert_eq!(err.message(), INVALID_CREDENTIALS_MESSAGE);
    }

    #[tokio::test]
    async fn test_unreachable_server_shows_connectivity_message() {
        let session = session_for("http://127.0.0.1:9");
        let err = LoginForm::new("a@b.c", "secret").submit(&session).await.unwrap_err();
        assert_eq!(err.message(), NETWORK_ERROR_MESSAGE);
    }
}
