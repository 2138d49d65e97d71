//! Navigation for CarePair
//!
//! Screen routes, the role-based route guard and the header menu. Rendering
//! is left to the platform shell; this crate decides where a user may go.
//!
//! # Modules
//!
//! - [`navigation`] - Route definitions and path parsing
//! - [`guard`] - Access decisions from the session state
//! - [`menu`] - Header links and greeting helpers
//!
//! # Example
//!
//! ```rust
//! use app_state::AuthState;
//! use app_ui::{authorize, Access, Route};
//!
//! let signed_out = AuthState { user: None, loading: false };
//! assert_eq!(authorize(Route::PatientProfile, &signed_out), Access::Redirect(Route::Login));
//! assert_eq!(authorize(Route::Landing, &signed_out), Access::Allow);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod guard;
pub mod menu;
pub mod navigation;

pub use guard::{authorize, landing_route, logout_route, Access};
pub use menu::{first_name, nav_links, profile_route, NavLink};
pub use navigation::{Route, RouteGroup};
