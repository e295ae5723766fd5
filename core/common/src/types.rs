//! Common types used throughout Cardbox.

use std::fmt;
use zeroize::Zeroize;

/// Name of a remote API operation, such as `files/upload`.
///
/// Segments consist of lowercase ASCII letters, `_` and the digit `2`,
/// separated by single slashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiMethod(String);

impl ApiMethod {
    /// Parse and validate a method name.
    ///
    /// # Errors
    /// - `InvalidMethod` if the name is empty, has empty segments, or contains
    ///   characters outside the method alphabet
    pub fn parse(method: &str) -> crate::Result<Self> {
        let well_formed = method
            .split('/')
            .all(|segment| !segment.is_empty() && segment.bytes().all(is_method_byte));

        if !well_formed {
            return Err(crate::Error::InvalidMethod(method.to_string()));
        }
        Ok(Self(method.to_string()))
    }

    /// Get the method name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_method_byte(b: u8) -> bool {
    b.is_ascii_lowercase() || b == b'_' || b == b'2'
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ApiMethod {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::parse(s)
    }
}

/// Opaque bearer token, wiped from memory on drop.
///
/// The empty token is valid and is what a fresh client starts with.
#[derive(Clone, Default, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value for the `Authorization` header.
    ///
    /// # Errors
    /// - `InvalidInput` if the token holds characters that cannot appear in
    ///   an HTTP header value
    pub fn bearer_header(&self) -> crate::Result<String> {
        if !self.0.bytes().all(|b| b.is_ascii_graphic()) {
            return Err(crate::Error::InvalidInput(
                "access token contains characters not allowed in a header".to_string(),
            ));
        }
        Ok(format!("Bearer {}", self.0))
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken([REDACTED; {} chars])", self.0.len())
    }
}
