//! Recording transport used by the client tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Mutex;

use cardbox_common::{Error, Result};

use super::transport::{ApiRequest, ApiResponse, Transport};

/// Transport that records every request and answers with a canned reply.
pub(crate) struct RecordingTransport {
    requests: Mutex<Vec<ApiRequest>>,
    reply: Reply,
}

enum Reply {
    Response {
        status: u16,
        headers: Vec<(String, String)>,
        body: Bytes,
    },
    NetworkFailure(String),
}

impl RecordingTransport {
    pub(crate) fn ok(body: &'static [u8]) -> Self {
        Self::status(200, body)
    }

    pub(crate) fn status(status: u16, body: &'static [u8]) -> Self {
        Self::with_headers(status, &[], body)
    }

    pub(crate) fn with_headers(status: u16, headers: &[(&str, &str)], body: &'static [u8]) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply: Reply::Response {
                status,
                headers: headers
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                body: Bytes::from_static(body),
            },
        }
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            reply: Reply::NetworkFailure(message.to_string()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last(&self) -> ApiRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request recorded")
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request);

        match &self.reply {
            Reply::Response {
                status,
                headers,
                body,
            } => Ok(ApiResponse {
                status: *status,
                headers: headers.clone(),
                body: body.clone(),
            }),
            Reply::NetworkFailure(message) => Err(Error::Network(message.clone())),
        }
    }
}
