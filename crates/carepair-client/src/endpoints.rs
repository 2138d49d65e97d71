//! REST endpoint paths, relative to the configured base URL

/// Email/password login
pub const LOGIN: &str = "/auth/login/";

/// Patient account registration
pub const REGISTER_PATIENT: &str = "/auth/register/patient/";

/// Therapist account registration
pub const REGISTER_THERAPIST: &str = "/auth/register/therapist/";

/// Current-user lookup ("whoami")
pub const CURRENT_USER: &str = "/auth/me/";

/// Server-side session termination
pub const LOGOUT: &str = "/auth/logout/";

/// Access token refresh
pub const TOKEN_REFRESH: &str = "/auth/token/refresh/";

/// Patient profile read/update
pub const PATIENT_PROFILE: &str = "/patients/profile/";

/// Therapist profile read/update
pub const THERAPIST_PROFILE: &str = "/therapists/profile/";
