//! CarePair client
//!
//! Wires the member crates into a running client: configuration from the
//! environment, logging, the persisted token store, the API client and the
//! session. Screens and route guards build on [`CarePairApp`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod app;
pub mod config;
pub mod telemetry;

pub use app::CarePairApp;
pub use config::{AppConfig, ConfigError};

pub use app_core;
pub use app_state;
pub use app_ui;
pub use carepair_client;
pub use storage;
