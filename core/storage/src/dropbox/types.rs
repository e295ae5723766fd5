//! Typed call arguments and result models for the Dropbox API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cardbox_common::{Error, Result};

/// What to do when an upload target already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Never overwrite; conflicts are resolved by `autorename` or fail.
    #[default]
    Add,
    /// Always overwrite.
    Overwrite,
    /// Overwrite only the revision the caller last saw.
    Update,
}

impl std::str::FromStr for WriteMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "add" => Ok(WriteMode::Add),
            "overwrite" => Ok(WriteMode::Overwrite),
            "update" => Ok(WriteMode::Update),
            other => Err(Error::InvalidInput(format!(
                "unknown write mode '{}' (expected add, overwrite or update)",
                other
            ))),
        }
    }
}

/// Arguments of `files/upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadArgs {
    /// Target path in the Dropbox.
    pub path: String,
    #[serde(default)]
    pub mode: WriteMode,
    #[serde(default = "default_autorename")]
    pub autorename: bool,
    /// Suppress the desktop notification for this change.
    #[serde(default)]
    pub mute: bool,
}

fn default_autorename() -> bool {
    true
}

impl UploadArgs {
    /// Upload to `path` with mode `add`, autorename on, mute off.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: WriteMode::default(),
            autorename: default_autorename(),
            mute: false,
        }
    }

    pub fn mode(mut self, mode: WriteMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn autorename(mut self, autorename: bool) -> Self {
        self.autorename = autorename;
        self
    }

    pub fn mute(mut self, mute: bool) -> Self {
        self.mute = mute;
        self
    }

    /// Same arguments with the path forced to start with `/`.
    pub fn normalized(mut self) -> Self {
        self.path = normalize_path(&self.path);
        self
    }
}

/// Prefix `path` with `/` unless it already has one.
pub fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Single-path argument of `files/download` and `files/download_zip`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathArg {
    pub path: String,
}

impl PathArg {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Body of `files/get_metadata`.
///
/// `path` may also be an id (`id:...`) or a revision (`rev:...`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GetMetadataArgs {
    pub path: String,
    /// Extra information for photos and videos.
    #[serde(default)]
    pub include_media_info: bool,
    /// Return metadata for deleted entries instead of `not_found`.
    #[serde(default)]
    pub include_deleted: bool,
    #[serde(default)]
    pub include_has_explicit_shared_members: bool,
}

impl GetMetadataArgs {
    /// Query `path` with every flag off.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn include_media_info(mut self, include: bool) -> Self {
        self.include_media_info = include;
        self
    }

    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    pub fn include_has_explicit_shared_members(mut self, include: bool) -> Self {
        self.include_has_explicit_shared_members = include;
        self
    }
}

/// Metadata of a file as returned by uploads and downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
    /// Revision identifier, used by write mode `update`.
    pub rev: String,
    /// Size in bytes.
    pub size: u64,
    pub client_modified: DateTime<Utc>,
    pub server_modified: DateTime<Utc>,
    #[serde(default)]
    pub content_hash: Option<String>,
}

/// Metadata of a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderMetadata {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
}

/// Metadata of a deleted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedMetadata {
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
}

/// Result of `files/get_metadata`, discriminated by `.tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
pub enum Metadata {
    File(FileMetadata),
    Folder(FolderMetadata),
    Deleted(DeletedMetadata),
}

impl Metadata {
    /// Last path component.
    pub fn name(&self) -> &str {
        match self {
            Metadata::File(file) => &file.name,
            Metadata::Folder(folder) => &folder.name,
            Metadata::Deleted(deleted) => &deleted.name,
        }
    }

    /// Display path, when Dropbox returned one.
    pub fn path_display(&self) -> Option<&str> {
        match self {
            Metadata::File(file) => file.path_display.as_deref(),
            Metadata::Folder(folder) => folder.path_display.as_deref(),
            Metadata::Deleted(deleted) => deleted.path_display.as_deref(),
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Metadata::Folder(_))
    }
}

/// Serialize `value` as compact JSON that is safe inside an HTTP header.
///
/// Characters from U+007F upwards are written as `\uXXXX` escapes, using
/// surrogate pairs outside the BMP. Pure ASCII input serializes unchanged.
pub fn header_safe_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value)?;
    if json.is_ascii() && !json.contains('\u{7f}') {
        return Ok(json);
    }

    let mut out = String::with_capacity(json.len() + 16);
    let mut units = [0u16; 2];
    for ch in json.chars() {
        if (ch as u32) < 0x7f {
            out.push(ch);
        } else {
            for unit in ch.encode_utf16(&mut units).iter() {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    Ok(out)
}

/// Check that call arguments serialize to a JSON object.
pub(crate) fn ensure_object<T: Serialize + ?Sized>(args: &T) -> Result<()> {
    let value = serde_json::to_value(args).map_err(|e| {
        Error::InvalidInput(format!("invalid argument (expected: object): {}", e))
    })?;
    match value {
        serde_json::Value::Object(_) => Ok(()),
        other => Err(Error::InvalidInput(format!(
            "invalid argument {} (expected: object)",
            other
        ))),
    }
}
