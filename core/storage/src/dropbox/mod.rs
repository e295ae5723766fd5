//! Dropbox HTTP API client for Cardbox.
//!
//! This module provides:
//! - Generic GET/POST calls with arguments in the `Dropbox-API-Arg` header
//! - Named file operations: upload, download, zip download, metadata
//! - A pluggable transport, with a `reqwest` implementation for production
//! - File-backed persistence of the bearer token

pub mod auth;
pub mod client;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{TokenStore, TOKEN_FILE_NAME};
pub use client::{DownloadedFile, DropboxClient, Endpoint, Pending, PendingResponse};
pub use transport::{
    ApiRequest, ApiResponse, HttpMethod, HttpTransport, RequestBody, Transport, API_ARG_HEADER,
    API_RESULT_HEADER,
};
pub use types::{
    header_safe_json, normalize_path, DeletedMetadata, FileMetadata, FolderMetadata,
    GetMetadataArgs, Metadata, PathArg, UploadArgs, WriteMode,
};
