//! Patient and therapist profile schemas
//!
//! Profile reads are tolerant: any scalar the server omits decodes as empty.
//! Nested structures are typed, so a malformed tag list or availability map is
//! a decode error instead of a pass-through value.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::http::MultipartForm;
use crate::Result;

/// Slot inserted by "add time slot"
pub const DEFAULT_TIME_SLOT: &str = "09:00 - 10:00";

/// Default file name for an uploaded profile picture
pub const PROFILE_PICTURE_FILE_NAME: &str = "profile.jpg";

/// Default MIME type for an uploaded profile picture
pub const PROFILE_PICTURE_MIME: &str = "image/jpeg";

// =============================================================================
// Weekly availability
// =============================================================================

/// Day of the week, Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Weekday {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl Weekday {
    /// All days in display order
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// English day name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl std::str::FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| format!("unknown weekday: {s}"))
    }
}

impl TryFrom<String> for Weekday {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Weekday> for String {
    fn from(day: Weekday) -> Self {
        day.as_str().to_string()
    }
}

/// Weekly availability: free-form time ranges per day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyAvailability(BTreeMap<Weekday, Vec<String>>);

impl WeeklyAvailability {
    /// Create an empty schedule
    pub fn new() -> Self {
        Self::default()
    }

    /// Slots for a day (empty if none)
    pub fn slots(&self, day: Weekday) -> &[String] {
        self.0.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a slot to a day
    pub fn add_slot(&mut self, day: Weekday, slot: impl Into<String>) {
        self.0.entry(day).or_default().push(slot.into());
    }

    /// Replace one slot; returns false if the index does not exist
    pub fn update_slot(&mut self, day: Weekday, index: usize, slot: impl Into<String>) -> bool {
        match self.0.get_mut(&day).and_then(|slots| slots.get_mut(index)) {
            Some(existing) => {
                *existing = slot.into();
                true
            }
            None => false,
        }
    }

    /// Remove one slot; returns the removed slot if the index existed
    pub fn remove_slot(&mut self, day: Weekday, index: usize) -> Option<String> {
        let slots = self.0.get_mut(&day)?;
        if index < slots.len() {
            Some(slots.remove(index))
        } else {
            None
        }
    }

    /// Whether no day has any slot
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// Iterate over days that have an entry
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &[String])> {
        self.0.iter().map(|(day, slots)| (*day, slots.as_slice()))
    }
}

// =============================================================================
// Wire helpers
// =============================================================================

/// Accept either an object or a JSON-encoded string of that object
fn availability_from_wire<'de, D>(deserializer: D) -> std::result::Result<WeeklyAvailability, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(WeeklyAvailability::default()),
        Some(Value::String(encoded)) if encoded.trim().is_empty() => Ok(WeeklyAvailability::default()),
        Some(Value::String(encoded)) => serde_json::from_str(&encoded).map_err(D::Error::custom),
        Some(other) => serde_json::from_value(other).map_err(D::Error::custom),
    }
}

/// Decimal fields arrive as strings ("150.00") or plain numbers
fn decimal_from_wire<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(D::Error::custom(format!("expected a decimal, got {other}"))),
    }
}

/// Treat `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// Patient
// =============================================================================

/// Account fields nested in a profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUser {
    /// Full name
    #[serde(default, deserialize_with = "null_as_default")]
    pub full_name: String,
    /// Email
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Phone number
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
    /// Date of birth
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_of_birth: String,
}

/// Patient profile as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    /// Account fields
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: ProfileUser,
    /// Emergency contact name
    #[serde(default, deserialize_with = "null_as_default")]
    pub emergency_contact_name: String,
    /// Emergency contact phone
    #[serde(default, deserialize_with = "null_as_default")]
    pub emergency_contact_phone: String,
    /// Free-text health notes
    #[serde(default, deserialize_with = "null_as_default")]
    pub basic_health_info: String,
}

/// Editable patient fields; account fields are never re-sent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfileUpdate {
    /// Emergency contact name
    pub emergency_contact_name: String,
    /// Emergency contact phone
    pub emergency_contact_phone: String,
    /// Free-text health notes
    pub basic_health_info: String,
}

// =============================================================================
// Therapist
// =============================================================================

/// Therapist profile as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TherapistProfile {
    /// Account fields
    #[serde(default)]
    pub user: Option<ProfileUser>,
    /// Phone number
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
    /// Profession option value
    #[serde(default, deserialize_with = "null_as_default")]
    pub profession_type: String,
    /// License id
    #[serde(default, deserialize_with = "null_as_default")]
    pub license_id: String,
    /// Years in practice
    #[serde(default, deserialize_with = "null_as_default")]
    pub years_of_experience: u32,
    /// Biography
    #[serde(default, deserialize_with = "null_as_default")]
    pub bio: String,
    /// Consultation fee as a decimal string
    #[serde(default, deserialize_with = "decimal_from_wire")]
    pub consultation_fees: String,
    /// Consultation mode option value
    #[serde(default, deserialize_with = "null_as_default")]
    pub consultation_mode: String,
    /// Specialization tags
    #[serde(default, deserialize_with = "null_as_default")]
    pub specialization_tags: Vec<String>,
    /// Languages spoken
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages_spoken: Vec<String>,
    /// Weekly availability
    #[serde(default, deserialize_with = "availability_from_wire")]
    pub availability_slots: WeeklyAvailability,
    /// URL of the current profile picture
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Whether the license has been verified
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_verified: bool,
}

/// Newly picked profile picture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// File name reported to the server
    pub file_name: String,
    /// MIME type
    pub mime: String,
}

impl ProfileImage {
    /// A JPEG picked from the device library
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: PROFILE_PICTURE_FILE_NAME.to_string(),
            mime: PROFILE_PICTURE_MIME.to_string(),
        }
    }
}

/// Editable therapist fields, sent as multipart form data
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TherapistProfileUpdate {
    /// Phone number
    pub phone_number: String,
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
    /// Specialization tags
    pub specialization_tags: Vec<String>,
    /// Languages spoken
    pub languages_spoken: Vec<String>,
    /// Weekly availability
    pub availability_slots: WeeklyAvailability,
    /// New profile picture, only when one was picked
    pub profile_picture: Option<ProfileImage>,
}

impl TherapistProfileUpdate {
    /// Encode as multipart form data
    ///
    /// Scalars are plain text parts; the tag list, language list and
    /// availability map are JSON-encoded text parts.
    pub fn to_multipart(&self) -> Result<MultipartForm> {
        let mut form = MultipartForm::new();

        if let Some(image) = &self.profile_picture {
            form = form.file("profile_picture", image.bytes.clone(), &image.file_name, &image.mime);
        }

        form.text("phone_number", &self.phone_number)
            .text("license_id", &self.license_id)
            .text("years_of_experience", self.years_of_experience.to_string())
            .text("bio", &self.bio)
            .text("consultation_fees", &self.consultation_fees)
            .text("consultation_mode", &self.consultation_mode)
            .json_text("specialization_tags", &self.specialization_tags)?
            .json_text("languages_spoken", &self.languages_spoken)?
            .json_text("availability_slots", &self.availability_slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::FormPart;
    use serde_json::json;

    #[test]
    fn test_patient_profile_tolerates_missing_fields() {
        let profile: PatientProfile = serde_json::from_value(json!({
            "user": {"full_name": "Jane Doe", "email": "jane@example.com", "phone_number": null},
            "basic_health_info": "Peanut allergy"
        }))
        .unwrap();

        assert_eq!(profile.user.full_name, "Jane Doe");
        assert_eq!(profile.user.phone_number, "");
        assert_eq!(profile.user.date_of_birth, "");
        assert_eq!(profile.emergency_contact_name, "");
        assert_eq!(profile.basic_health_info, "Peanut allergy");
    }

    #[test]
    fn test_patient_update_only_editable_fields() {
        let update = PatientProfileUpdate {
            emergency_contact_name: "John".to_string(),
            emergency_contact_phone: "555-0100".to_string(),
            basic_health_info: String::new(),
        };
        let value = serde_json::to_value(&update).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["emergency_contact_name", "emergency_contact_phone", "basic_health_info"]);
    }

    #[test]
    fn test_availability_from_encoded_string() {
        let profile: TherapistProfile = serde_json::from_value(json!({
            "availability_slots": "{\"Monday\": [\"09:00 - 10:00\"], \"Friday\": []}"
        }))
        .unwrap();

        assert_eq!(profile.availability_slots.slots(Weekday::Monday), ["09:00 - 10:00"]);
        assert!(profile.availability_slots.slots(Weekday::Friday).is_empty());
        assert!(profile.availability_slots.slots(Weekday::Sunday).is_empty());
    }

    #[test]
    fn test_availability_from_object() {
        let profile: TherapistProfile = serde_json::from_value(json!({
            "availability_slots": {"Tuesday": ["13:00 - 14:00", "15:00 - 16:00"]}
        }))
        .unwrap();

        assert_eq!(profile.availability_slots.slots(Weekday::Tuesday).len(), 2);
    }

    #[test]
    fn test_availability_unknown_day_fails() {
        let result = serde_json::from_value::<TherapistProfile>(json!({
            "availability_slots": {"Funday": ["09:00 - 10:00"]}
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_consultation_fees_number_or_string() {
        let from_string: TherapistProfile =
            serde_json::from_value(json!({"consultation_fees": "150.00"})).unwrap();
        let from_number: TherapistProfile =
            serde_json::from_value(json!({"consultation_fees": 80})).unwrap();
        let missing: TherapistProfile = serde_json::from_value(json!({})).unwrap();

        assert_eq!(from_string.consultation_fees, "150.00");
        assert_eq!(from_number.consultation_fees, "80");
        assert_eq!(missing.consultation_fees, "");
    }

    #[test]
    fn test_weekly_availability_editing() {
        let mut schedule = WeeklyAvailability::new();
        assert!(schedule.is_empty());

        schedule.add_slot(Weekday::Wednesday, DEFAULT_TIME_SLOT);
        schedule.add_slot(Weekday::Wednesday, "11:00 - 12:00");
        assert!(schedule.update_slot(Weekday::Wednesday, 1, "11:30 - 12:30"));
        assert!(!schedule.update_slot(Weekday::Thursday, 0, "nope"));

        assert_eq!(schedule.slots(Weekday::Wednesday), ["09:00 - 10:00", "11:30 - 12:30"]);
        assert_eq!(schedule.remove_slot(Weekday::Wednesday, 0).as_deref(), Some("09:00 - 10:00"));
        assert!(schedule.remove_slot(Weekday::Wednesday, 5).is_none());
        assert_eq!(schedule.slots(Weekday::Wednesday), ["11:30 - 12:30"]);
    }

    #[test]
    fn test_weekly_availability_serializes_by_day_name() {
        let mut schedule = WeeklyAvailability::new();
        schedule.add_slot(Weekday::Sunday, "10:00 - 11:00");
        schedule.add_slot(Weekday::Monday, "09:00 - 10:00");

        let encoded = serde_json::to_string(&schedule).unwrap();
        assert_eq!(encoded, r#"{"Monday":["09:00 - 10:00"],"Sunday":["10:00 - 11:00"]}"#);
    }

    #[test]
    fn test_therapist_update_multipart() {
        let mut availability = WeeklyAvailability::new();
        availability.add_slot(Weekday::Monday, DEFAULT_TIME_SLOT);

        let update = TherapistProfileUpdate {
            phone_number: "555".to_string(),
            license_id: "LIC-9".to_string(),
            years_of_experience: 4,
            bio: "CBT focused".to_string(),
            consultation_fees: "120".to_string(),
            consultation_mode: "online".to_string(),
            specialization_tags: vec!["Anxiety".to_string()],
            languages_spoken: vec!["English".to_string(), "French".to_string()],
            availability_slots: availability,
            profile_picture: None,
        };

        let form = update.to_multipart().unwrap();
        assert_eq!(form.text_value("years_of_experience"), Some("4"));
        assert_eq!(form.text_value("specialization_tags"), Some(r#"["Anxiety"]"#));
        assert_eq!(form.text_value("languages_spoken"), Some(r#"["English","French"]"#));
        assert_eq!(form.text_value("availability_slots"), Some(r#"{"Monday":["09:00 - 10:00"]}"#));
        assert!(!form.contains("profile_picture"));
        assert!(!form.contains("full_name"));
        assert!(!form.contains("profession_type"));
    }

    #[test]
    fn test_therapist_update_with_picture() {
        let update = TherapistProfileUpdate {
            profile_picture: Some(ProfileImage::jpeg(vec![0xFF, 0xD8])),
            ..Default::default()
        };

        let form = update.to_multipart().unwrap();
        match &form.parts()[0] {
            FormPart::File { name, file_name, mime, bytes } => {
                assert_eq!(name, "profile_picture");
                assert_eq!(file_name, "profile.jpg");
                assert_eq!(mime, "image/jpeg");
                assert_eq!(bytes, &vec![0xFF, 0xD8]);
            }
            other => panic!("expected file part first, got {other:?}"),
        }
    }
}
