//! Header menu and greeting helpers

use carepair_client::Role;
use serde::Serialize;

use crate::navigation::Route;

/// One header link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavLink {
    /// Link text
    pub label: &'static str,
    /// Target screen
    pub route: Route,
}

impl NavLink {
    const fn new(label: &'static str, route: Route) -> Self {
        Self { label, route }
    }
}

const HOME: NavLink = NavLink::new("Home", Route::Landing);
const BLOGS: NavLink = NavLink::new("Blogs", Route::Blog);
const SUPPORT: NavLink = NavLink::new("Support", Route::Support);

/// Header links for the signed-in role, or for visitors
pub fn nav_links(role: Option<Role>) -> Vec<NavLink> {
    match role {
        Some(Role::Therapist) => vec![
            HOME,
            NavLink::new("My Blogs", Route::TherapistMyBlogs),
            BLOGS,
            NavLink::new("Appointments", Route::TherapistAppointments),
            SUPPORT,
        ],
        Some(Role::Patient) | None => vec![HOME, BLOGS, SUPPORT],
    }
}

/// Profile screen for a role
pub fn profile_route(role: Role) -> Route {
    match role {
        Role::Patient => Route::PatientProfile,
        Role::Therapist => Route::TherapistProfile,
    }
}

/// First word of a full name, or `fallback` when there is none
///
/// `first_name(Some("Jane Doe"), "there")` gives `"Jane"`.
pub fn first_name<'a>(full_name: Option<&'a str>, fallback: &'a str) -> &'a str {
    full_name
        .and_then(|name| name.split(' ').next())
        .filter(|first| !first.is_empty())
        .unwrap_or(fallback)
}
