//! Storage access for Cardbox.
//!
//! The card collection lives as JSON in a Dropbox folder. This crate wraps the
//! Dropbox HTTP API behind a small client object that holds the bearer token,
//! validates every call before it reaches the network, and passes remote
//! failures through unchanged.
//!
//! # Design Principles
//! - Fail fast: malformed method names and arguments never cause I/O
//! - Async operations: every request returns a future once validated
//! - Explicit session state: the token lives in the client, not in a global
//! - Thin error mapping: HTTP statuses are surfaced, not interpreted

pub mod config;
pub mod dropbox;

pub use config::{ClientConfig, API_VERSION, AUTHORIZE_ENDPOINT, CONTENT_ENDPOINT, RPC_ENDPOINT};
pub use dropbox::{
    DownloadedFile, DropboxClient, Endpoint, GetMetadataArgs, Metadata, PendingResponse,
    TokenStore, UploadArgs, WriteMode,
};
