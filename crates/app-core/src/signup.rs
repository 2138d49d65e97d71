//! Signup screen
//!
//! One form serves both roles. Validation runs top to bottom and stops at the
//! first problem, before anything is sent.

use app_state::SessionContext;
use carepair_client::{PatientRegistration, Registration, Role, TherapistRegistration, User};

use crate::errors::{user_message, FormError};

/// Shown when a rejection carries no usable message
pub const REGISTRATION_FAILED_MESSAGE: &str = "Registration failed. Please try again.";

/// Minimum password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Gender options as (label, value)
pub const GENDER_OPTIONS: [(&str, &str); 3] = [("Male", "male"), ("Female", "female"), ("Other", "other")];

/// Profession options as (label, value)
pub const PROFESSION_OPTIONS: [(&str, &str); 5] = [
    ("Psychologist", "psychologist"),
    ("Psychiatrist", "psychiatrist"),
    ("Counselor", "counselor"),
    ("Therapist", "therapist"),
    ("Social Worker", "social_worker"),
];

/// Signup form state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    /// Role being registered
    pub role: Role,
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
    /// Date of birth, YYYY-MM-DD
    pub date_of_birth: String,
    /// Gender option value
    pub gender: String,
    /// Emergency contact name (patients)
    pub emergency_contact_name: String,
    /// Emergency contact phone (patients)
    pub emergency_contact_phone: String,
    /// Health notes (patients)
    pub basic_health_info: String,
    /// Terms accepted (patients)
    pub terms_accepted: bool,
    /// Profession option value (therapists)
    pub profession_type: String,
    /// License id (therapists)
    pub license_id: String,
    /// Years of experience as typed (therapists)
    pub years_of_experience: String,
}

impl Default for SignupForm {
    fn default() -> Self {
        Self::new(Role::Patient)
    }
}

impl SignupForm {
    /// Empty form for the given role
    pub fn new(role: Role) -> Self {
        Self {
            role,
            email: String::new(),
            password: String::new(),
            password2: String::new(),
            full_name: String::new(),
            phone_number: String::new(),
            date_of_birth: String::new(),
            gender: String::new(),
            emergency_contact_name: String::new(),
            emergency_contact_phone: String::new(),
            basic_health_info: String::new(),
            terms_accepted: false,
            profession_type: String::new(),
            license_id: String::new(),
            years_of_experience: String::new(),
        }
    }

    /// Whether the password meets the length requirement
    ///
    /// Length is counted in Unicode scalar values, so an emoji counts once.
    pub fn password_long_enough(&self) -> bool {
        self.password.chars().count() >= MIN_PASSWORD_LENGTH
    }

    /// Whether both password fields are filled in and equal
    pub fn passwords_match(&self) -> bool {
        !self.password.is_empty() && self.password == self.password2
    }

    /// Check the form, first problem first
    pub fn validate(&self) -> Result<(), FormError> {
        if self.full_name.is_empty() || self.email.is_empty() || self.phone_number.is_empty() {
            return Err(FormError::Invalid("Please fill in all required fields"));
        }
        if self.password.is_empty() || self.password2.is_empty() {
            return Err(FormError::Invalid("Please enter a password"));
        }
        if self.password != self.password2 {
            return Err(FormError::Invalid("Passwords do not match"));
        }
        if !self.password_long_enough() {
            return Err(FormError::Invalid("Password must be at least 8 characters"));
        }
        if self.gender.is_empty() {
            return Err(FormError::Invalid("Please select your gender"));
        }

        match self.role {
            Role::Patient if !self.terms_accepted => {
                Err(FormError::Invalid("Please accept the terms and conditions"))
            }
            Role::Therapist if self.profession_type.is_empty() => {
                Err(FormError::Invalid("Please select your profession type"))
            }
            Role::Therapist if self.license_id.is_empty() => Err(FormError::Invalid("Please enter your license ID")),
            _ => Ok(()),
        }
    }

    /// Build the role-specific payload
    ///
    /// Only the fields belonging to the selected role are included.
    pub fn to_registration(&self) -> Registration {
        match self.role {
            Role::Patient => Registration::Patient(PatientRegistration {
                email: self.email.clone(),
                password: self.password.clone(),
                password2: self.password2.clone(),
                full_name: self.full_name.clone(),
                phone_number: self.phone_number.clone(),
                date_of_birth: self.date_of_birth.clone(),
                gender: self.gender.clone(),
                emergency_contact_name: self.emergency_contact_name.clone(),
                emergency_contact_phone: self.emergency_contact_phone.clone(),
                basic_health_info: self.basic_health_info.clone(),
                terms_accepted: self.terms_accepted,
            }),
            Role::Therapist => Registration::Therapist(TherapistRegistration {
                email: self.email.clone(),
                password: self.password.clone(),
                password2: self.password2.clone(),
                full_name: self.full_name.clone(),
                phone_number: self.phone_number.clone(),
                date_of_birth: self.date_of_birth.clone(),
                gender: self.gender.clone(),
                profession_type: self.profession_type.clone(),
                license_id: self.license_id.clone(),
                years_of_experience: parse_leading_int(&self.years_of_experience),
            }),
        }
    }

    /// Validate, then register and sign in through the session
    pub async fn submit(&self, session: &SessionContext) -> Result<User, FormError> {
        self.validate()?;
        let registration = self.to_registration();
        session.register(&registration).await.map_err(|e| {
            tracing::debug!(error = %e, role = %registration.role(), "registration rejected");
            FormError::from_session(e, |err| user_message(err, REGISTRATION_FAILED_MESSAGE), REGISTRATION_FAILED_MESSAGE)
        })
    }
}

/// Leading decimal digits as a number
///
/// Blank or non-numeric input is 0. Values past `u32::MAX` saturate.
pub(crate) fn parse_leading_int(text: &str) -> u32 {
    let trimmed = text.trim_start();
    let end = trimmed.find(|c: char| !c.is_ascii_digit()).unwrap_or(trimmed.len());
    let digits = &trimmed[..end];
    if digits.is_empty() {
        return 0;
    }
    // Only overflow can fail on a non-empty run of ASCII digits
    digits.parse().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use carepair_client::{ApiClient, ApiClientConfig, AuthenticatedClient, CarePairApi};
    use std::sync::Arc;
    use storage::MemoryTokenStore;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(base_url: &str) -> SessionContext {
        let http = ApiClient::new(ApiClientConfig::new(base_url)).unwrap();
        let client = AuthenticatedClient::new(http, Arc::new(MemoryTokenStore::new()));
        SessionContext::new(CarePairApi::new(Arc::new(client)))
    }

    fn valid_patient() -> SignupForm {
        SignupForm {
            email: "jane@example.com".to_string(),
            password: "hunter2!x".to_string(),
            password2: "hunter2!x".to_string(),
            full_name: "Jane Doe".to_string(),
            phone_number: "555-0100".to_string(),
            gender: "female".to_string(),
            terms_accepted: true,
            ..SignupForm::new(Role::Patient)
        }
    }

    fn valid_therapist() -> SignupForm {
        SignupForm {
            role: Role::Therapist,
            terms_accepted: false,
            profession_type: "counselor".to_string(),
            license_id: "LIC-778".to_string(),
            years_of_experience: "12".to_string(),
            ..valid_patient()
        }
    }

    fn message(form: &SignupForm) -> String {
        form.validate().unwrap_err().message()
    }

    #[test]
    fn test_valid_forms_pass() {
        assert!(valid_patient().validate().is_ok());
        assert!(valid_therapist().validate().is_ok());
    }

    #[test]
    fn test_required_fields_checked_first() {
        // Everything wrong at once still reports the first rule
        let form = SignupForm::new(Role::Therapist);
        assert_eq!(message(&form), "Please fill in all required fields");

        let form = SignupForm { phone_number: String::new(), ..valid_patient() };
        assert_eq!(message(&form), "Please fill in all required fields");
    }

    #[test]
    fn test_password_rules_in_order() {
        let form = SignupForm { password2: String::new(), ..valid_patient() };
        assert_eq!(message(&form), "Please enter a password");

        let form = SignupForm { password: "short".to_string(), password2: "other".to_string(), ..valid_patient() };
        assert_eq!(message(&form), "Passwords do not match");

        let form = SignupForm { password: "short".to_string(), password2: "short".to_string(), ..valid_patient() };
        assert_eq!(message(&form), "Password must be at least 8 characters");
    }

    #[test]
    fn test_password_length_counts_characters() {
        // Eight characters, more than eight bytes
        let form = SignupForm { password: "pässwörd".to_string(), password2: "pässwörd".to_string(), ..valid_patient() };
        assert!(form.password_long_enough());
        assert!(form.validate().is_ok());

        let form = SignupForm { password: "ääääääá".to_string(), password2: "ääääääá".to_string(), ..valid_patient() };
        assert_eq!(message(&form), "Password must be at least 8 characters");
    }

    #[test]
    fn test_emoji_password_counts_each_emoji_once() {
        // Four emoji are eight UTF-16 units but only four characters
        let form = SignupForm { password: "😀😀😀😀".to_string(), password2: "😀😀😀😀".to_string(), ..valid_patient() };
        assert!(!form.password_long_enough());
        assert_eq!(message(&form), "Password must be at least 8 characters");
    }

    #[test]
    fn test_gender_and_role_rules() {
        let form = SignupForm { gender: String::new(), terms_accepted: false, ..valid_patient() };
        assert_eq!(message(&form), "Please select your gender");

        let form = SignupForm { terms_accepted: false, ..valid_patient() };
        assert_eq!(message(&form), "Please accept the terms and conditions");

        let form = SignupForm { profession_type: String::new(), license_id: String::new(), ..valid_therapist() };
        assert_eq!(message(&form), "Please select your profession type");

        let form = SignupForm { license_id: String::new(), ..valid_therapist() };
        assert_eq!(message(&form), "Please enter your license ID");
    }

    #[test]
    fn test_therapist_does_not_need_terms() {
        let form = SignupForm { terms_accepted: false, ..valid_therapist() };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_patient_payload() {
        match valid_patient().to_registration() {
            Registration::Patient(payload) => {
                assert_eq!(payload.full_name, "Jane Doe");
                assert!(payload.terms_accepted);
            }
            other => panic!("expected patient payload, got {other:?}"),
        }
    }

    #[test]
    fn test_therapist_payload_omits_patient_fields() {
        let form = SignupForm { emergency_contact_name: "John".to_string(), ..valid_therapist() };
        let registration = form.to_registration();
        assert_eq!(registration.role(), Role::Therapist);

        let Registration::Therapist(payload) = registration else {
            panic!("expected therapist payload");
        };
        assert_eq!(payload.years_of_experience, 12);

        let wire = serde_json::to_value(&payload).unwrap();
        assert!(wire.get("emergency_contact_name").is_none());
        assert!(wire.get("terms_accepted").is_none());
    }

    #[test]
    fn test_years_of_experience_parsing() {
        assert_eq!(parse_leading_int(""), 0);
        assert_eq!(parse_leading_int("   "), 0);
        assert_eq!(parse_leading_int("abc"), 0);
        assert_eq!(parse_leading_int("7"), 7);
        assert_eq!(parse_leading_int(" 15 years"), 15);
        assert_eq!(parse_leading_int("-3"), 0);
    }

    #[test]
    fn test_years_of_experience_saturates() {
        assert_eq!(parse_leading_int("4294967295"), u32::MAX);
        assert_eq!(parse_leading_int("99999999999"), u32::MAX);
        assert_eq!(parse_leading_int("99999999999 years"), u32::MAX);
    }

    #[tokio::test]
    async fn test_invalid_form_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register/patient/"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let session = session_for(&server.uri());
        let form = SignupForm { terms_accepted: false, ..valid_patient() };
        let err = form.submit(&session).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.message(), "Please accept the terms and conditions");
        assert!(!session.is_authenticated());
        server.verify().await;
    }

    #[test]
    fn test_password_hints() {
        let form = valid_patient();
        assert!(form.passwords_match());
        let form = SignupForm { password: String::new(), password2: String::new(), ..valid_patient() };
        assert!(!form.passwords_match());
    }
}
