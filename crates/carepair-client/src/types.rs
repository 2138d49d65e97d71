//! Authentication and account schemas
//!
//! Field names match the REST API's JSON bodies exactly.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Person seeking care
    Patient,
    /// Care provider
    Therapist,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Therapist => "therapist",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated account
///
/// Provider-defined fields beyond the fixed ones are kept in `extra` rather
/// than dropped. An unknown `role` fails decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Account id
    pub id: i64,
    /// Login email
    pub email: String,
    /// Display name
    pub full_name: String,
    /// Account role
    pub role: Role,
    /// Server-suggested landing path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    /// Any other fields the server sent
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Access/refresh token pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Short-lived access token
    pub access: String,
    /// Long-lived refresh token
    pub refresh: String,
}

/// Response of login and registration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The account that was signed in
    pub user: User,
    /// Fresh credentials
    pub tokens: AuthTokens,
}

/// Login credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Account password
    pub password: String,
}

impl LoginRequest {
    /// Create login credentials
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }
}

/// Token refresh request body
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    /// Stored refresh token
    pub refresh: String,
}

/// Token refresh response body
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    /// New access token
    pub access: String,
    /// Rotated refresh token, if the server rotates
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Patient sign-up payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRegistration {
    /// Account email
    pub email: String,
    /// Password
    pub password: String,
    /// Password confirmation
    pub password2: String,
    /// Full name
    pub full_name: String,
    /// Phone number
    pub phone_number: String,
    /// Date of birth as entered (YYYY-MM-DD or empty)
    pub date_of_birth: String,
    /// Gender option value
    pub gender: String,
    /// Emergency contact name
    pub emergency_contact_name: String,
    /// Emergency contact phone
    pub emergency_contact_phone: String,
    /// Free-text health notes
    pub basic_health_info: String,
    /// Terms and conditions accepted
    pub terms_accepted: bool,
}

/// Therapist sign-up payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TherapistRegistration {
    /// Account email
    pub email: String,
    /// Password
    pub password: String,
    /// Password confirmation
    pub password2: String,
    /// Full name
    pub full_name: String,
    /// Phone number
    pub phone_number: String,
    /// Date of birth as entered (YYYY-MM-DD or empty)
    pub date_of_birth: String,
    /// Gender option value
    pub gender: String,
    /// Profession option value
    pub profession_type: String,
    /// Professional license id
    pub license_id: String,
    /// Years in practice
    pub years_of_experience: u32,
}

/// Role-specific registration payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// Register a patient account
    Patient(PatientRegistration),
    /// Register a therapist account
    Therapist(TherapistRegistration),
}

impl Registration {
    /// Role the account will have
    pub fn role(&self) -> Role {
        match self {
            Registration::Patient(_) => Role::Patient,
            Registration::Therapist(_) => Role::Therapist,
        }
    }

    /// Email the account is registered under
    pub fn email(&self) -> &str {
        match self {
            Registration::Patient(p) => &p.email,
            Registration::Therapist(t) => &t.email,
        }
    }
}
