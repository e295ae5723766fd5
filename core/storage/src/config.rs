//! Client configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use cardbox_common::{Error, Result};

/// Base URL for file transfer operations.
pub const CONTENT_ENDPOINT: &str = "https://content.dropboxapi.com/";
/// Base URL for metadata and control operations.
pub const RPC_ENDPOINT: &str = "https://api.dropboxapi.com/";
/// OAuth2 authorization page.
pub const AUTHORIZE_ENDPOINT: &str = "https://www.dropbox.com/oauth2/authorize";
/// Version segment placed between base URL and API method.
pub const API_VERSION: &str = "2/";

const USER_AGENT: &str = "Cardbox/0.1";

/// Where and how the client talks to Dropbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the content endpoint (must end with `/`).
    pub content_endpoint: String,
    /// Base URL of the RPC endpoint (must end with `/`).
    pub rpc_endpoint: String,
    pub authorize_endpoint: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            content_endpoint: CONTENT_ENDPOINT.to_string(),
            rpc_endpoint: RPC_ENDPOINT.to_string(),
            authorize_endpoint: AUTHORIZE_ENDPOINT.to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    /// - File cannot be read
    /// - File is not valid JSON
    /// - An endpoint is not a usable base URL
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            Error::Serialization(format!("Invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every endpoint is an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        check_base_url("content_endpoint", &self.content_endpoint)?;
        check_base_url("rpc_endpoint", &self.rpc_endpoint)?;
        Url::parse(&self.authorize_endpoint).map_err(|e| {
            Error::InvalidInput(format!(
                "authorize_endpoint '{}' is not a URL: {}",
                self.authorize_endpoint, e
            ))
        })?;
        Ok(())
    }
}

/// Check a base URL that API paths get appended to.
pub(crate) fn check_base_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| Error::InvalidInput(format!("{} '{}' is not a URL: {}", name, value, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(Error::InvalidInput(format!(
            "{} '{}' must use http or https",
            name, value
        )));
    }
    if !value.ends_with('/') {
        return Err(Error::InvalidInput(format!(
            "{} '{}' must end with '/'",
            name, value
        )));
    }
    Ok(())
}
