//! HTTP transport seam for the Dropbox client.
//!
//! The client builds fully-formed [`ApiRequest`]s and hands them to a
//! [`Transport`]. Any HTTP answer, success or not, comes back as `Ok`; only
//! failures to talk to the server at all are errors here.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;

use cardbox_common::{Error, Result};

/// Header carrying JSON call arguments on content-endpoint calls.
pub const API_ARG_HEADER: &str = "Dropbox-API-Arg";
/// Header carrying JSON result metadata on content download calls.
pub const API_RESULT_HEADER: &str = "Dropbox-API-Result";

/// HTTP verb of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// Opaque bytes, sent as `application/octet-stream`.
    Octets(Bytes),
    /// Serialized JSON document, sent as `application/json`.
    Json(String),
}

/// A fully-formed request ready for the wire.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP verb.
    pub method: HttpMethod,
    /// Absolute URL including version segment and API method.
    pub url: String,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Request payload.
    pub body: RequestBody,
}

impl ApiRequest {
    /// Look up a header value, ignoring ASCII case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// Response as received from the remote service.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Raw response body.
    pub body: Bytes,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a header value, ignoring ASCII case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Body decoded as UTF-8.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| Error::Serialization(format!("Response body is not UTF-8: {}", e)))
    }

    /// Body decoded as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::Serialization(format!("Failed to parse response: {}", e)))
    }

    /// Decode the `Dropbox-API-Result` header, if the response carries one.
    pub fn api_result<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.header(API_RESULT_HEADER) {
            Some(raw) => serde_json::from_str(raw).map(Some).map_err(|e| {
                Error::Serialization(format!("Failed to parse {}: {}", API_RESULT_HEADER, e))
            }),
            None => Ok(None),
        }
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Something that can put an [`ApiRequest`] on the wire.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and collect the full response.
    ///
    /// # Errors
    /// - `Network` when no HTTP response could be obtained
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Production transport on top of `reqwest`.
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    /// Create a transport with the given user agent.
    pub fn new(user_agent: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut builder = match request.method {
            HttpMethod::Get => self.http.get(&request.url),
            HttpMethod::Post => self.http.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Octets(bytes) => builder.body(bytes),
            RequestBody::Json(json) => builder.body(json),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request to {} failed: {}", request.url, e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body: {}", e)))?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
