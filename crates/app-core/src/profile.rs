//! Profile editors
//!
//! Each form is pre-populated from the fetched profile and turned back into
//! an update payload on save. Account fields (name, email and so on) are
//! displayed but never sent back.

use carepair_client::profiles::DEFAULT_TIME_SLOT;
use carepair_client::{
    CarePairApi, PatientProfile, PatientProfileUpdate, ProfileImage, TherapistProfile, TherapistProfileUpdate,
    WeeklyAvailability, Weekday,
};

use crate::errors::{detail_message, pretty_body, FormError};
use crate::signup::parse_leading_int;

/// Patient load failure without a `detail`
pub const PATIENT_LOAD_FAILED: &str = "Failed to load profile data.";
/// Patient save failure
pub const PATIENT_SAVE_FAILED: &str = "Failed to update profile. Please check your connection.";
/// Therapist load failure
pub const THERAPIST_LOAD_FAILED: &str = "Failed to load profile details.";
/// Therapist save failure without a usable body
pub const THERAPIST_SAVE_FAILED: &str = "Update failed. Please check your data.";

/// Default profession for a therapist profile with none set
pub const DEFAULT_PROFESSION_TYPE: &str = "therapist";
/// Default consultation mode
pub const DEFAULT_CONSULTATION_MODE: &str = "online";

/// First letter of a name for the avatar placeholder
fn avatar_initial(full_name: &str) -> char {
    full_name.chars().next().unwrap_or('U')
}

// =============================================================================
// Patient
// =============================================================================

/// Patient profile editor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientProfileForm {
    full_name: String,
    email: String,
    phone_number: String,
    date_of_birth: String,
    /// Emergency contact name
    pub emergency_contact_name: String,
    /// Emergency contact phone
    pub emergency_contact_phone: String,
    /// Free-text health notes
    pub basic_health_info: String,
}

impl PatientProfileForm {
    /// Pre-populate from a fetched profile
    pub fn from_profile(profile: &PatientProfile) -> Self {
        Self {
            full_name: profile.user.full_name.clone(),
            email: profile.user.email.clone(),
            phone_number: profile.user.phone_number.clone(),
            date_of_birth: profile.user.date_of_birth.clone(),
            emergency_contact_name: profile.emergency_contact_name.clone(),
            emergency_contact_phone: profile.emergency_contact_phone.clone(),
            basic_health_info: profile.basic_health_info.clone(),
        }
    }

    /// Fetch the signed-in patient's profile
    pub async fn load(api: &CarePairApi) -> Result<Self, FormError> {
        match api.patient_profile().await {
            Ok(profile) => Ok(Self::from_profile(&profile)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load patient profile");
                Err(FormError::failed(detail_message(&e, PATIENT_LOAD_FAILED), e))
            }
        }
    }

    /// Full name (read-only)
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Email (read-only)
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Phone number (read-only)
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Date of birth (read-only)
    pub fn date_of_birth(&self) -> &str {
        &self.date_of_birth
    }

    /// Avatar placeholder letter
    pub fn initial(&self) -> char {
        avatar_initial(&self.full_name)
    }

    /// The editable fields as an update payload
    pub fn to_update(&self) -> PatientProfileUpdate {
        PatientProfileUpdate {
            emergency_contact_name: self.emergency_contact_name.clone(),
            emergency_contact_phone: self.emergency_contact_phone.clone(),
            basic_health_info: self.basic_health_info.clone(),
        }
    }

    /// Send the editable fields
    pub async fn save(&self, api: &CarePairApi) -> Result<(), FormError> {
        match api.update_patient_profile(&self.to_update()).await {
            Ok(()) => {
                tracing::info!("patient profile updated");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to update patient profile");
                Err(FormError::failed(PATIENT_SAVE_FAILED, e))
            }
        }
    }
}

// =============================================================================
// Therapist
// =============================================================================

/// Therapist profile editor
#[derive(Debug, Clone, PartialEq)]
pub struct TherapistProfileForm {
    full_name: String,
    email: String,
    is_verified: bool,
    profile_picture_url: Option<String>,
    new_picture: Option<ProfileImage>,
    /// Phone number
    pub phone_number: String,
    /// Profession option value
    pub profession_type: String,
    /// License id
    pub license_id: String,
    /// Years in practice
    pub years_of_experience: u32,
    /// Biography
    pub bio: String,
    /// Consultation fee as a decimal string
    pub consultation_fees: String,
    /// Consultation mode option value
    pub consultation_mode: String,
    specialization_tags: Vec<String>,
    languages_spoken: Vec<String>,
    schedule: WeeklyAvailability,
}

impl Default for TherapistProfileForm {
    fn default() -> Self {
        Self::from_profile(&TherapistProfile::default())
    }
}

impl TherapistProfileForm {
    /// Pre-populate from a fetched profile, filling defaults for blanks
    pub fn from_profile(profile: &TherapistProfile) -> Self {
        let user = profile.user.clone().unwrap_or_default();
        Self {
            full_name: user.full_name,
            email: user.email,
            is_verified: profile.is_verified,
            profile_picture_url: profile.profile_picture.clone().filter(|url| !url.is_empty()),
            new_picture: None,
            phone_number: profile.phone_number.clone(),
            profession_type: non_empty_or(&profile.profession_type, DEFAULT_PROFESSION_TYPE),
            license_id: profile.license_id.clone(),
            years_of_experience: profile.years_of_experience,
            bio: profile.bio.clone(),
            consultation_fees: profile.consultation_fees.clone(),
            consultation_mode: non_empty_or(&profile.consultation_mode, DEFAULT_CONSULTATION_MODE),
            specialization_tags: profile.specialization_tags.clone(),
            languages_spoken: profile.languages_spoken.clone(),
            schedule: profile.availability_slots.clone(),
        }
    }

    /// Fetch the signed-in therapist's profile
    pub async fn load(api: &CarePairApi) -> Result<Self, FormError> {
        match api.therapist_profile().await {
            Ok(profile) => Ok(Self::from_profile(&profile)),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load therapist profile");
                Err(FormError::failed(THERAPIST_LOAD_FAILED, e))
            }
        }
    }

    /// Full name (read-only)
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Email (read-only)
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Whether the license has been verified (read-only)
    pub fn is_verified(&self) -> bool {
        self.is_verified
    }

    /// Picture to show: the server URL, unless a new one was picked
    pub fn profile_picture_url(&self) -> Option<&str> {
        self.profile_picture_url.as_deref()
    }

    /// Newly picked picture awaiting upload
    pub fn new_picture(&self) -> Option<&ProfileImage> {
        self.new_picture.as_ref()
    }

    /// Avatar placeholder letter
    pub fn initial(&self) -> char {
        avatar_initial(&self.full_name)
    }

    /// Consultation mode for display, first letter capitalized
    pub fn consultation_mode_label(&self) -> String {
        let mut chars = self.consultation_mode.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Specialization tags
    pub fn tags(&self) -> &[String] {
        &self.specialization_tags
    }

    /// Languages spoken
    pub fn languages(&self) -> &[String] {
        &self.languages_spoken
    }

    /// Weekly schedule
    pub fn schedule(&self) -> &WeeklyAvailability {
        &self.schedule
    }

    /// Add a tag; blank input is ignored
    pub fn add_tag(&mut self, tag: &str) {
        push_trimmed(&mut self.specialization_tags, tag);
    }

    /// Remove a tag by position
    pub fn remove_tag(&mut self, index: usize) {
        remove_at(&mut self.specialization_tags, index);
    }

    /// Add a language; blank input is ignored
    pub fn add_language(&mut self, language: &str) {
        push_trimmed(&mut self.languages_spoken, language);
    }

    /// Remove a language by position
    pub fn remove_language(&mut self, index: usize) {
        remove_at(&mut self.languages_spoken, index);
    }

    /// Append the default slot to a day
    pub fn add_time_slot(&mut self, day: Weekday) {
        self.schedule.add_slot(day, DEFAULT_TIME_SLOT);
    }

    /// Replace one slot's text
    pub fn update_time_slot(&mut self, day: Weekday, index: usize, value: impl Into<String>) -> bool {
        self.schedule.update_slot(day, index, value)
    }

    /// Remove one slot
    pub fn remove_time_slot(&mut self, day: Weekday, index: usize) {
        self.schedule.remove_slot(day, index);
    }

    /// Set years from text input; non-numeric input becomes 0
    pub fn set_years_of_experience(&mut self, text: &str) {
        self.years_of_experience = parse_leading_int(text);
    }

    /// Attach a newly picked JPEG
    pub fn pick_image(&mut self, bytes: Vec<u8>) {
        self.new_picture = Some(ProfileImage::jpeg(bytes));
    }

    /// The editable fields as a multipart update
    ///
    /// The picture is only included when a new one was picked.
    pub fn to_update(&self) -> TherapistProfileUpdate {
        TherapistProfileUpdate {
            phone_number: self.phone_number.clone(),
            license_id: self.license_id.clone(),
            years_of_experience: self.years_of_experience,
            bio: self.bio.clone(),
            consultation_fees: self.consultation_fees.clone(),
            consultation_mode: self.consultation_mode.clone(),
            specialization_tags: self.specialization_tags.clone(),
            languages_spoken: self.languages_spoken.clone(),
            availability_slots: self.schedule.clone(),
            profile_picture: self.new_picture.clone(),
        }
    }

    /// Send the update, then fetch the stored profile again
    ///
    /// On failure the form keeps its edits. If the save went through but the
    /// fetch fails, the edits stay on screen and the save still succeeds.
    pub async fn save(&mut self, api: &CarePairApi) -> Result<(), FormError> {
        if let Err(e) = api.update_therapist_profile(&self.to_update()).await {
            tracing::warn!(error = %e, "failed to update therapist profile");
            let message = pretty_body(&e).unwrap_or_else(|| THERAPIST_SAVE_FAILED.to_string());
            return Err(FormError::failed(message, e));
        }
        tracing::info!("therapist profile updated");
        self.new_picture = None;

        match api.therapist_profile().await {
            Ok(saved) => *self = Self::from_profile(&saved),
            Err(e) => tracing::warn!(error = %e, "saved therapist profile could not be reloaded"),
        }
        Ok(())
    }
}

fn non_empty_or(value: &str, default: &str) -> String {
    let chosen = if value.is_empty() { default } else { value };
    chosen.to_string()
}

fn push_trimmed(items: &mut Vec<String>, input: &str) {
    let trimmed = input.trim();
    if !trimmed.is_empty() {
        items.push(trimmed.to_string());
    }
}

fn remove_at(items: &mut Vec<String>, index: usize) {
    if index < items.len() {
        items.remove(index);
    }
}
