//! Route definitions for CarePair
//!
//! Every screen has one canonical path. Paths written with route-group
//! segments, such as `/(patient)/home`, resolve to the same route as their
//! plain form.

use serde::{Deserialize, Serialize};

// =============================================================================
// Route Groups
// =============================================================================

/// Access group a route belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteGroup {
    /// Open to everyone
    Public,
    /// Login and signup
    Auth,
    /// Signed-in patients only
    Patient,
    /// Signed-in therapists only
    Therapist,
}

impl RouteGroup {
    /// Whether a signed-in user is required
    pub fn is_protected(&self) -> bool {
        matches!(self, RouteGroup::Patient | RouteGroup::Therapist)
    }
}

// =============================================================================
// Route Definitions
// =============================================================================

/// All screens in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "route")]
pub enum Route {
    // Public
    /// Landing page
    Landing,
    /// Blog listing
    Blog,
    /// Help and contact
    Support,

    // Auth
    /// Login screen
    Login,
    /// Signup screen
    Signup,

    // Patient
    /// Patient home
    PatientHome,
    /// Patient dashboard
    PatientDashboard,
    /// Patient appointments
    PatientAppointments,
    /// Patient messages
    PatientMessages,
    /// Mood journal
    PatientJournal,
    /// Care plan
    PatientCarePlan,
    /// Articles
    PatientArticles,
    /// Quizzes
    PatientQuizzes,
    /// Flashcards
    PatientFlashcards,
    /// Medications
    PatientMedications,
    /// Patient profile editor
    PatientProfile,
    /// Patient settings
    PatientSettings,
    /// Patient support
    PatientSupport,
    /// Therapist search
    PatientFindTherapist,

    // Therapist
    /// Therapist dashboard
    TherapistDashboard,
    /// Therapist appointments
    TherapistAppointments,
    /// Therapist messages
    TherapistMessages,
    /// Therapist profile editor
    TherapistProfile,
    /// Posts written by the therapist
    TherapistMyBlogs,
}

impl Default for Route {
    fn default() -> Self {
        Route::Landing
    }
}

impl Route {
    /// Every route, in declaration order
    pub const ALL: [Route; 24] = [
        Route::Landing,
        Route::Blog,
        Route::Support,
        Route::Login,
        Route::Signup,
        Route::PatientHome,
        Route::PatientDashboard,
        Route::PatientAppointments,
        Route::PatientMessages,
        Route::PatientJournal,
        Route::PatientCarePlan,
        Route::PatientArticles,
        Route::PatientQuizzes,
        Route::PatientFlashcards,
        Route::PatientMedications,
        Route::PatientProfile,
        Route::PatientSettings,
        Route::PatientSupport,
        Route::PatientFindTherapist,
        Route::TherapistDashboard,
        Route::TherapistAppointments,
        Route::TherapistMessages,
        Route::TherapistProfile,
        Route::TherapistMyBlogs,
    ];

    /// Canonical URL path for this route
    pub fn path(&self) -> &'static str {
        match self {
            Route::Landing => "/",
            Route::Blog => "/blog",
            Route::Support => "/support",
            Route::Login => "/auth/login",
            Route::Signup => "/auth/signup",
            Route::PatientHome => "/patient/home",
            Route::PatientDashboard => "/patient/dashboard",
            Route::PatientAppointments => "/patient/appointments",
            Route::PatientMessages => "/patient/messages",
            Route::PatientJournal => "/patient/journal",
            Route::PatientCarePlan => "/patient/care-plan",
            Route::PatientArticles => "/patient/articles",
            Route::PatientQuizzes => "/patient/quizzes",
            Route::PatientFlashcards => "/patient/flashcards",
            Route::PatientMedications => "/patient/medications",
            Route::PatientProfile => "/patient/profile",
            Route::PatientSettings => "/patient/settings",
            Route::PatientSupport => "/patient/support",
            Route::PatientFindTherapist => "/patient/find-therapist",
            Route::TherapistDashboard => "/therapist/dashboard",
            Route::TherapistAppointments => "/therapist/appointments",
            Route::TherapistMessages => "/therapist/messages",
            Route::TherapistProfile => "/therapist/profile",
            Route::TherapistMyBlogs => "/therapist/my-blogs",
        }
    }

    /// Access group for this route
    pub fn group(&self) -> RouteGroup {
        match self {
            Route::Landing | Route::Blog | Route::Support => RouteGroup::Public,
            Route::Login | Route::Signup => RouteGroup::Auth,
            Route::TherapistDashboard
            | Route::TherapistAppointments
            | Route::TherapistMessages
            | Route::TherapistProfile
            | Route::TherapistMyBlogs => RouteGroup::Therapist,
            _ => RouteGroup::Patient,
        }
    }

    /// Whether a signed-in user is required
    pub fn requires_auth(&self) -> bool {
        self.group().is_protected()
    }

    /// Parse a URL path
    ///
    /// Accepts group segments (`/(auth)/login`), a trailing `/index` or
    /// slash, and a query string, which is ignored. A path with its group
    /// left out (`/home`) resolves when only one group has that screen;
    /// `/dashboard` exists for both roles and stays unresolved.
    pub fn from_path(path: &str) -> Option<Route> {
        let normalized = normalize_path(path);
        let canonical = match normalized.as_str() {
            "/blogs" => "/blog",
            other => other,
        };
        if let Some(route) = Route::ALL.into_iter().find(|route| route.path() == canonical) {
            return Some(route);
        }

        let mut grouped = Route::ALL
            .into_iter()
            .filter(|route| route.path().strip_suffix(canonical).is_some_and(is_group_prefix));
        match (grouped.next(), grouped.next()) {
            (Some(route), None) => Some(route),
            _ => None,
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

fn is_group_prefix(prefix: &str) -> bool {
    matches!(prefix, "/auth" | "/patient" | "/therapist")
}

fn normalize_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();

    let segments: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "index")
        .map(|segment| segment.strip_prefix('(').and_then(|s| s.strip_suffix(')')).unwrap_or(segment))
        .collect();

    format!("/{}", segments.join("/"))
}

// =============================================================================
// Tests
// =============================================================================
