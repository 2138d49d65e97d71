//! Device storage for CarePair
//!
//! This crate provides the persisted key-value store and the credential
//! storage used by the HTTP client and the session context.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;
pub mod tokens;

pub use kv::{KvConfig, KvError, KvStore, Result};
pub use tokens::{MemoryTokenStore, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
