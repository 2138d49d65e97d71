//! Application state for CarePair
//!
//! Holds the signed-in user and exposes it to screens and route guards as an
//! observable value.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod session;

pub use session::{AuthState, SessionContext, SessionError};
