//! Common utilities and types shared across Cardbox crates.
//!
//! This module provides the error type and the small value types that every
//! layer agrees on: API method names and bearer tokens.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{AccessToken, ApiMethod};
