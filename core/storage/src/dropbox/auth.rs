//! Access token persistence.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cardbox_common::{AccessToken, Error, Result};

use super::client::DropboxClient;

/// File name of the stored token inside the config directory.
pub const TOKEN_FILE_NAME: &str = "api_key";
const APP_DIR: &str = "cardbox";

/// File-backed storage for the current access token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store the token at an explicit path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store the token under the user's config directory.
    ///
    /// # Errors
    /// - No config directory is known for this platform
    pub fn default_location() -> Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                ErrorKind::NotFound,
                "no config directory available for the token store",
            ))
        })?;
        Ok(Self::new(base.join(APP_DIR).join(TOKEN_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored token; a missing file yields the empty token.
    pub async fn load(&self) -> Result<AccessToken> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => Ok(AccessToken::new(raw.trim())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(AccessToken::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a non-empty token is stored.
    pub async fn has_token(&self) -> Result<bool> {
        Ok(!self.load().await?.is_empty())
    }

    /// Persist `token`, creating parent directories as needed.
    pub async fn save(&self, token: &AccessToken) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, token.as_str()).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        tracing::info!("Stored access token at {}", self.path.display());
        Ok(())
    }

    /// Remove the stored token. Removing a missing token is not an error.
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `token` and make it the client's current token.
    ///
    /// The client receives the value read back from the store.
    pub async fn update_access_token(
        &self,
        client: &DropboxClient,
        token: AccessToken,
    ) -> Result<()> {
        self.save(&token).await?;
        client.set_token(self.load().await?);
        Ok(())
    }
}
