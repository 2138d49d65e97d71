//! Role-based route guard
//!
//! Decides, from the session state alone, whether a screen may be shown.
//! Patients never see therapist screens and vice versa; a signed-in user who
//! wanders into the other role's area is sent to their own landing screen.

use app_state::AuthState;
use carepair_client::Role;

use crate::navigation::{Route, RouteGroup};

/// Outcome of a navigation check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Show the requested screen
    Allow,
    /// Session is still being restored; show a spinner
    Wait,
    /// Go somewhere else instead
    Redirect(Route),
}

/// Decide whether `route` may be shown for `state`
pub fn authorize(route: Route, state: &AuthState) -> Access {
    if state.loading {
        return Access::Wait;
    }

    let required = match route.group() {
        RouteGroup::Patient => Role::Patient,
        RouteGroup::Therapist => Role::Therapist,
        RouteGroup::Public | RouteGroup::Auth => return Access::Allow,
    };

    match state.role() {
        None => {
            tracing::debug!(route = %route, "signed out; redirecting to login");
            Access::Redirect(Route::Login)
        }
        Some(role) if role != required => {
            let target = landing_route(role);
            tracing::debug!(route = %route, %role, target = %target, "wrong role; redirecting");
            Access::Redirect(target)
        }
        Some(_) => Access::Allow,
    }
}

/// First screen after login or registration
pub fn landing_route(role: Role) -> Route {
    match role {
        Role::Patient => Route::PatientHome,
        Role::Therapist => Route::TherapistDashboard,
    }
}

/// Screen shown after signing out
pub fn logout_route() -> Route {
    Route::Landing
}

#[cfg(test)]
mod tests {
    use super::*;
    use carepair_client::User;
    use serde_json::json;

    fn signed_in(role: &str) -> AuthState {
        let user: User = serde_json::from_value(json!({
            "id": 1,
            "email": "user@example.com",
            "full_name": "Test User",
            "role": role
        }))
        .unwrap();
        AuthState { user: Some(user), loading: false }
    }

    fn signed_out() -> AuthState {
        AuthState { user: None, loading: false }
    }

    #[test]
    fn test_loading_waits_everywhere() {
        let state = AuthState::default();
        for route in Route::ALL {
            assert_eq!(authorize(route, &state), Access::Wait);
        }
    }

    #[test]
    fn test_signed_out_user() {
        let state = signed_out();
        assert_eq!(authorize(Route::Landing, &state), Access::Allow);
        assert_eq!(authorize(Route::Login, &state), Access::Allow);
        assert_eq!(authorize(Route::Support, &state), Access::Allow);
        assert_eq!(authorize(Route::PatientHome, &state), Access::Redirect(Route::Login));
        assert_eq!(authorize(Route::TherapistProfile, &state), Access::Redirect(Route::Login));
    }

    #[test]
    fn test_patient_cannot_reach_therapist_screens() {
        let state = signed_in("patient");
        for route in Route::ALL.into_iter().filter(|r| r.group() == RouteGroup::Therapist) {
            assert_eq!(authorize(route, &state), Access::Redirect(Route::PatientHome));
        }
        assert_eq!(authorize(Route::PatientProfile, &state), Access::Allow);
    }

    #[test]
    fn test_therapist_cannot_reach_patient_screens() {
        let state = signed_in("therapist");
        for route in Route::ALL.into_iter().filter(|r| r.group() == RouteGroup::Patient) {
            assert_eq!(authorize(route, &state), Access::Redirect(Route::TherapistDashboard));
        }
        assert_eq!(authorize(Route::TherapistMyBlogs, &state), Access::Allow);
    }

    #[test]
    fn test_public_screens_allowed_when_signed_in() {
        let state = signed_in("therapist");
        assert_eq!(authorize(Route::Landing, &state), Access::Allow);
        assert_eq!(authorize(Route::Blog, &state), Access::Allow);
    }

    #[test]
    fn test_landing_routes() {
        assert_eq!(landing_route(Role::Patient), Route::PatientHome);
        assert_eq!(landing_route(Role::Therapist), Route::TherapistDashboard);
        assert_eq!(logout_route(), Route::Landing);
    }
}
