//! Screen logic for CarePair
//!
//! Form state, client-side validation and user-facing error messages for the
//! login, signup and profile screens. Rendering lives elsewhere; everything
//! here is plain data and async calls against the session and API.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod login;
pub mod profile;
pub mod signup;

pub use errors::{user_message, FormError, NETWORK_ERROR_MESSAGE};
pub use login::LoginForm;
pub use profile::{PatientProfileForm, TherapistProfileForm};
pub use signup::SignupForm;
