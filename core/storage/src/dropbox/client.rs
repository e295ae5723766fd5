//! Dropbox HTTP API client.

use bytes::Bytes;
use futures::future::BoxFuture;
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

use cardbox_common::{AccessToken, ApiMethod, Error, Result};

use crate::config::{check_base_url, ClientConfig, API_VERSION};

use super::auth::TokenStore;
use super::transport::{
    ApiRequest, ApiResponse, HttpMethod, HttpTransport, RequestBody, Transport, API_ARG_HEADER,
};
use super::types::{
    ensure_object, header_safe_json, FileMetadata, GetMetadataArgs, Metadata, PathArg, UploadArgs,
};

const AUTHORIZATION: &str = "Authorization";
const CONTENT_TYPE: &str = "Content-Type";
const OCTET_STREAM: &str = "application/octet-stream";
const JSON: &str = "application/json";

const UPLOAD: &str = "files/upload";
const DOWNLOAD: &str = "files/download";
const DOWNLOAD_ZIP: &str = "files/download_zip";
const GET_METADATA: &str = "files/get_metadata";

/// Result of a request that passed validation and is ready to run.
pub type Pending<T> = BoxFuture<'static, Result<T>>;
/// Pending raw response.
pub type PendingResponse = Pending<ApiResponse>;

/// Base URL family a request is sent to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Endpoint {
    /// File transfer endpoint.
    #[default]
    Content,
    /// Metadata and control endpoint.
    Rpc,
    /// Explicit base URL, ending with `/`.
    Custom(String),
}

impl Endpoint {
    fn base_url<'a>(&'a self, config: &'a ClientConfig) -> Result<&'a str> {
        match self {
            Endpoint::Content => Ok(config.content_endpoint.as_str()),
            Endpoint::Rpc => Ok(config.rpc_endpoint.as_str()),
            Endpoint::Custom(url) => {
                check_base_url("endpoint", url)?;
                Ok(url.as_str())
            }
        }
    }
}

/// A downloaded file together with the metadata Dropbox sent along.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    /// Parsed `Dropbox-API-Result` header, when present.
    pub metadata: Option<FileMetadata>,
    pub content: Bytes,
}

/// Client for the Dropbox HTTP API.
///
/// Every request operation validates its input and captures the token when
/// it is called. Validation failures come back in the outer `Result` without
/// touching the network; the returned future carries the transport outcome.
/// Non-success HTTP statuses surface as [`Error::Status`] unchanged. There is
/// no retry.
pub struct DropboxClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    token: RwLock<AccessToken>,
}

impl DropboxClient {
    /// Create a client on the production HTTP transport, with an empty token.
    ///
    /// # Errors
    /// - Invalid endpoint configuration
    /// - HTTP client construction failed
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(&config.user_agent)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client on an arbitrary transport, with an empty token.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            token: RwLock::new(AccessToken::default()),
        }
    }

    /// Create a client whose token is the one persisted in `store`.
    pub async fn from_store(config: ClientConfig, store: &TokenStore) -> Result<Self> {
        let client = Self::new(config)?;
        client.set_token(store.load().await?);
        Ok(client)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Replace the token used by calls that do not pass their own.
    ///
    /// Calls made before this returns keep the token they captured.
    pub fn set_token(&self, token: impl Into<AccessToken>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token.into();
        debug!("Access token replaced");
    }

    /// Copy of the current default token.
    pub fn token(&self) -> AccessToken {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn resolve_token(&self, token: Option<&str>) -> AccessToken {
        match token {
            Some(explicit) => AccessToken::from(explicit),
            None => self.token(),
        }
    }

    /// Always fails: the OAuth2 code flow is not supported.
    ///
    /// Obtain a token out of band and install it with [`set_token`](Self::set_token).
    pub async fn authorize(&self, client_id: &str, redirect_uri: Option<&str>) -> Result<AccessToken> {
        debug!(
            client_id,
            redirect_uri = redirect_uri.unwrap_or_default(),
            endpoint = %self.config.authorize_endpoint,
            "Authorization requested"
        );
        Err(Error::Unsupported(
            "Not implemented yet, please obtain a token manually and store it via set_token"
                .to_string(),
        ))
    }

    /// Generic GET with arguments in the `Dropbox-API-Arg` header.
    ///
    /// # Errors
    /// - `InvalidMethod` if `method` does not match the method grammar
    /// - `InvalidInput` if `args` is not an object, `endpoint` is not a base
    ///   URL, or the token cannot be put in a header
    pub fn get<A: Serialize + ?Sized>(
        &self,
        method: &str,
        args: &A,
        endpoint: Endpoint,
        token: Option<&str>,
    ) -> Result<PendingResponse> {
        let body = RequestBody::Empty;
        let (method, request) =
            self.arg_header_request(HttpMethod::Get, method, args, &endpoint, token, body)?;
        Ok(self.dispatch(method, request))
    }

    /// Generic POST of raw `content` with arguments in the `Dropbox-API-Arg`
    /// header.
    ///
    /// # Errors
    /// Same as [`get`](Self::get).
    pub fn post<A: Serialize + ?Sized>(
        &self,
        method: &str,
        args: &A,
        content: impl Into<Bytes>,
        endpoint: Endpoint,
        token: Option<&str>,
    ) -> Result<PendingResponse> {
        let body = RequestBody::Octets(content.into());
        let (method, request) =
            self.arg_header_request(HttpMethod::Post, method, args, &endpoint, token, body)?;
        Ok(self.dispatch(method, request))
    }

    /// Upload `content` to `args.path`, adding a leading `/` if missing.
    pub fn upload(
        &self,
        args: UploadArgs,
        content: impl Into<Bytes>,
        token: Option<&str>,
    ) -> Result<PendingResponse> {
        let args = args.normalized();
        self.post(UPLOAD, &args, content, Endpoint::Content, token)
    }

    /// Download the file at `path`.
    pub fn download(&self, path: &str, token: Option<&str>) -> Result<PendingResponse> {
        self.get(DOWNLOAD, &PathArg::new(path), Endpoint::Content, token)
    }

    /// Download the folder at `path` as a zip archive.
    pub fn zip(&self, path: &str, token: Option<&str>) -> Result<PendingResponse> {
        self.get(DOWNLOAD_ZIP, &PathArg::new(path), Endpoint::Content, token)
    }

    /// Fetch metadata from the RPC endpoint.
    ///
    /// Arguments travel as a JSON body rather than in the argument header.
    pub fn get_metadata(
        &self,
        args: GetMetadataArgs,
        token: Option<&str>,
    ) -> Result<PendingResponse> {
        let method = ApiMethod::parse(GET_METADATA)?;
        let authorization = self.resolve_token(token).bearer_header()?;
        let body = serde_json::to_string(&args)?;

        let request = ApiRequest {
            method: HttpMethod::Post,
            url: format!("{}{}{}", self.config.rpc_endpoint, API_VERSION, method),
            headers: vec![
                (AUTHORIZATION.to_string(), authorization),
                (CONTENT_TYPE.to_string(), JSON.to_string()),
            ],
            body: RequestBody::Json(body),
        };

        Ok(self.dispatch(method, request))
    }

    /// Upload and decode the returned file metadata.
    pub fn upload_file(
        &self,
        args: UploadArgs,
        content: impl Into<Bytes>,
        token: Option<&str>,
    ) -> Result<Pending<FileMetadata>> {
        let pending = self.upload(args, content, token)?;
        Ok(Box::pin(async move { pending.await?.json() }))
    }

    /// Download and split the response into metadata and content.
    pub fn download_file(&self, path: &str, token: Option<&str>) -> Result<Pending<DownloadedFile>> {
        let pending = self.download(path, token)?;
        Ok(Box::pin(async move {
            let response = pending.await?;
            let metadata = response.api_result()?;
            Ok(DownloadedFile {
                metadata,
                content: response.body,
            })
        }))
    }

    /// Metadata of `path` with every optional flag off, decoded.
    pub fn metadata(&self, path: &str, token: Option<&str>) -> Result<Pending<Metadata>> {
        let pending = self.get_metadata(GetMetadataArgs::new(path), token)?;
        Ok(Box::pin(async move { pending.await?.json() }))
    }

    fn arg_header_request<A: Serialize + ?Sized>(
        &self,
        verb: HttpMethod,
        method: &str,
        args: &A,
        endpoint: &Endpoint,
        token: Option<&str>,
        body: RequestBody,
    ) -> Result<(ApiMethod, ApiRequest)> {
        let method = ApiMethod::parse(method)?;
        ensure_object(args)?;
        let base = endpoint.base_url(&self.config)?;
        let authorization = self.resolve_token(token).bearer_header()?;
        let api_arg = header_safe_json(args)?;

        let mut headers = Vec::with_capacity(3);
        if matches!(body, RequestBody::Octets(_)) {
            headers.push((CONTENT_TYPE.to_string(), OCTET_STREAM.to_string()));
        }
        headers.push((AUTHORIZATION.to_string(), authorization));
        headers.push((API_ARG_HEADER.to_string(), api_arg));

        let request = ApiRequest {
            method: verb,
            url: format!("{}{}{}", base, API_VERSION, method),
            headers,
            body,
        };
        Ok((method, request))
    }

    fn dispatch(&self, method: ApiMethod, request: ApiRequest) -> PendingResponse {
        debug!(method = %method, url = %request.url, "Dispatching Dropbox API request");
        let transport = Arc::clone(&self.transport);

        Box::pin(async move {
            let response = transport.send(request).await?;
            if response.is_success() {
                return Ok(response);
            }

            warn!(method = %method, status = response.status, "Dropbox API request failed");
            Err(Error::Status {
                status: response.status,
                body: String::from_utf8_lossy(&response.body).into_owned(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dropbox::testing::RecordingTransport;
    use crate::dropbox::types::WriteMode;
    use proptest::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn client_on(transport: &Arc<RecordingTransport>) -> DropboxClient {
        let client = DropboxClient::with_transport(ClientConfig::default(), transport.clone());
        client.set_token("t1");
        client
    }

    #[tokio::test]
    async fn test_invalid_method_never_reaches_transport() {
        let transport = Arc::new(RecordingTransport::ok(b""));
        let client = client_on(&transport);

        for method in ["", "Files/upload", "files//upload", "/files/upload", "files/upload/", "files/v3"] {
            let err = client
                .get(method, &json!({}), Endpoint::Content, None)
                .err()
                .expect("get must fail validation");
            assert!(matches!(err, Error::InvalidMethod(_)));

            let err = client
                .post(method, &json!({}), vec![1u8], Endpoint::Content, None)
                .err()
                .expect("post must fail validation");
            assert!(matches!(err, Error::InvalidMethod(_)));
        }

        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_object_args_rejected() {
        let transport = Arc::new(RecordingTransport::ok(b""));
        let client = client_on(&transport);

        let err = client
            .get("files/download", &json!(["/x.json"]), Endpoint::Content, None)
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = client
            .post("files/upload", "path", Bytes::new(), Endpoint::Content, None)
            .err()
            .unwrap();
        assert!(err.is_validation());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_unserializable_args_rejected() {
        let transport = Arc::new(RecordingTransport::ok(b""));
        let client = client_on(&transport);

        let mut args = HashMap::new();
        args.insert((1, 2), "/x.json");

        let err = client
            .get("files/download", &args, Endpoint::Content, None)
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.is_validation());

        let err = client
            .post("files/upload", &args, vec![1u8], Endpoint::Content, None)
            .err()
            .unwrap();
        assert!(err.is_validation());
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_set_token_is_quiet_at_info() {
        let transport = Arc::new(RecordingTransport::ok(b""));
        let client = client_on(&transport);

        let output = LogBuffer::default();
        let writer = output.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || client.set_token("t2"));

        assert!(output.contents().is_empty(), "unexpected log: {}", output.contents());
        assert_eq!(client.token().as_str(), "t2");
    }

    #[tokio::test]
    async fn test_bad_custom_endpoint_and_token_rejected() {
        let transport = Arc::new(RecordingTransport::ok(b""));
        let client = client_on(&transport);

        let err = client
            .get("files/download", &PathArg::new("/a"), Endpoint::Custom("nope".into()), None)
            .err()
            .unwrap();
        assert!(err.is_validation());

        let err = client.download("/a", Some("bad\ntoken")).err().unwrap();
        assert!(err.is_validation());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_latest_token_is_default() {
        let transport = Arc::new(RecordingTransport::ok(b""));
        let client = client_on(&transport);
        client.set_token("t2");

        client.download("/x.json", None).unwrap().await.unwrap();
        assert_eq!(transport.last().header("Authorization"), Some("Bearer t2"));
        assert_eq!(client.token().as_str(), "t2");
    }

    #[tokio::test]
    async fn test_explicit_token_overrides_default() {
        let transport = Arc::new(RecordingTransport::ok(b""));
        let client = client_on(&transport);
        client.set_token("t2");

        client.zip("/decks", Some("explicit")).unwrap().await.unwrap();
        assert_eq!(transport.last().header("Authorization"), Some("Bearer explicit"));

        client
            .get_metadata(GetMetadataArgs::new("/a"), Some("explicit"))
            .unwrap()
            .await
            .unwrap();
        assert_eq!(transport.last().header("Authorization"), Some("Bearer explicit"));
        assert_eq!(client.token().as_str(), "t2");
    }

    #[tokio::test]
    async fn test_token_captured_at_invocation() {
        let transport = Arc::new(RecordingTransport::ok(b""));
        let client = client_on(&transport);

        let pending = client.download("/x.json", None).unwrap();
        client.set_token("t2");
        pending.await.unwrap();

        assert_eq!(transport.last().header("Authorization"), Some("Bearer t1"));
    }

    #[tokio::test]
    async fn test_upload_normalizes_path() {
        let transport = Arc::new(RecordingTransport::ok(b"{}"));
        let client = client_on(&transport);

        client
            .upload(UploadArgs::new("foo/bar"), b"[]".to_vec(), None)
            .unwrap()
            .await
            .unwrap();
        client
            .upload(UploadArgs::new("/foo/bar"), b"[]".to_vec(), None)
            .unwrap()
            .await
            .unwrap();

        let requests = transport.requests();
        for request in &requests {
            let arg: serde_json::Value =
                serde_json::from_str(request.header("Dropbox-API-Arg").unwrap()).unwrap();
            assert_eq!(arg["path"], "/foo/bar");
        }
    }

    #[tokio::test]
    async fn test_upload_wire_shape() {
        let transport = Arc::new(RecordingTransport::ok(b"{}"));
        let client = client_on(&transport);

        let args = UploadArgs::new("cards.json").mode(WriteMode::Overwrite).mute(true);
        client
            .upload(args, Bytes::from_static(b"[{\"name\":\"Bolt\"}]"), None)
            .unwrap()
            .await
            .unwrap();

        let request = transport.last();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://content.dropboxapi.com/2/files/upload");
        assert_eq!(request.header("Content-Type"), Some("application/octet-stream"));
        assert_eq!(
            request.header("Dropbox-API-Arg"),
            Some(r#"{"path":"/cards.json","mode":"overwrite","autorename":true,"mute":true}"#)
        );
        assert_eq!(
            request.body,
            RequestBody::Octets(Bytes::from_static(b"[{\"name\":\"Bolt\"}]"))
        );
    }

    #[tokio::test]
    async fn test_download_wire_shape() {
        let transport = Arc::new(RecordingTransport::ok(b"[]"));
        let client = client_on(&transport);

        let response = client.download("/x.json", None).unwrap().await.unwrap();
        assert_eq!(response.text().unwrap(), "[]");

        let request = transport.last();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://content.dropboxapi.com/2/files/download");
        assert_eq!(request.header("Dropbox-API-Arg"), Some(r#"{"path":"/x.json"}"#));
        assert_eq!(request.header("Authorization"), Some("Bearer t1"));
        assert_eq!(request.header("Content-Type"), None);
        assert_eq!(request.body, RequestBody::Empty);
    }

    #[tokio::test]
    async fn test_zip_wire_shape() {
        let transport = Arc::new(RecordingTransport::ok(b"PK"));
        let client = client_on(&transport);

        client.zip("/decks", None).unwrap().await.unwrap();

        let request = transport.last();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://content.dropboxapi.com/2/files/download_zip");
        assert_eq!(request.header("Dropbox-API-Arg"), Some(r#"{"path":"/decks"}"#));
    }

    #[tokio::test]
    async fn test_get_metadata_wire_shape() {
        let transport = Arc::new(RecordingTransport::ok(b"{}"));
        let client = client_on(&transport);

        client
            .get_metadata(GetMetadataArgs::new("/x.json").include_media_info(true), None)
            .unwrap()
            .await
            .unwrap();

        let request = transport.last();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://api.dropboxapi.com/2/files/get_metadata");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("Dropbox-API-Arg"), None);
        assert_eq!(
            request.body,
            RequestBody::Json(
                r#"{"path":"/x.json","include_media_info":true,"include_deleted":false,"include_has_explicit_shared_members":false}"#
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_generic_calls_honor_endpoint() {
        let transport = Arc::new(RecordingTransport::ok(b"{}"));
        let client = client_on(&transport);

        client
            .get("users/get_current_account", &json!({}), Endpoint::Rpc, None)
            .unwrap()
            .await
            .unwrap();
        assert_eq!(
            transport.last().url,
            "https://api.dropboxapi.com/2/users/get_current_account"
        );
        assert_eq!(transport.last().header("Dropbox-API-Arg"), Some("{}"));

        client
            .post(
                "files/upload",
                &json!({"path": "/a"}),
                vec![0u8, 159, 146, 150],
                Endpoint::Custom("http://127.0.0.1:9/".into()),
                None,
            )
            .unwrap()
            .await
            .unwrap();
        let request = transport.last();
        assert_eq!(request.url, "http://127.0.0.1:9/2/files/upload");
        assert_eq!(request.body, RequestBody::Octets(Bytes::from(vec![0u8, 159, 146, 150])));
    }

    #[tokio::test]
    async fn test_authorize_is_unsupported() {
        let transport = Arc::new(RecordingTransport::ok(b""));
        let client = client_on(&transport);

        let err = client
            .authorize("app-key", Some("http://localhost/callback"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
        assert!(!err.is_validation());

        assert!(client.authorize("", None).await.is_err());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_unauthorized_passes_through_every_operation() {
        const BODY: &[u8] = br#"{"error_summary":"invalid_access_token/..."}"#;

        async fn check(op: impl FnOnce(&DropboxClient) -> Result<PendingResponse>) {
            let transport = Arc::new(RecordingTransport::status(401, BODY));
            let client = client_on(&transport);

            let err = op(&client).unwrap().await.unwrap_err();
            match err {
                Error::Status { status, body } => {
                    assert_eq!(status, 401);
                    assert_eq!(body.as_bytes(), BODY);
                }
                other => panic!("expected status error, got {:?}", other),
            }
            assert_eq!(transport.calls(), 1);
        }

        check(|c| c.get("files/download", &PathArg::new("/a"), Endpoint::Content, None)).await;
        check(|c| c.post("files/upload", &PathArg::new("/a"), vec![1u8], Endpoint::Content, None)).await;
        check(|c| c.upload(UploadArgs::new("a"), vec![1u8], None)).await;
        check(|c| c.download("/a", None)).await;
        check(|c| c.zip("/a", None)).await;
        check(|c| c.get_metadata(GetMetadataArgs::new("/a"), None)).await;
    }

    #[tokio::test]
    async fn test_network_failure_passes_through() {
        let transport = Arc::new(RecordingTransport::failing("connection reset"));
        let client = client_on(&transport);

        let err = client.download("/a", None).unwrap().await.unwrap_err();
        match err {
            Error::Network(message) => assert_eq!(message, "connection reset"),
            other => panic!("expected network error, got {:?}", other),
        }
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_download_file_reads_result_header() {
        let transport = Arc::new(RecordingTransport::with_headers(
            200,
            &[(
                "dropbox-api-result",
                r#"{"name":"cards.json","id":"id:1","path_display":"/cards.json","rev":"015f","size":2,"client_modified":"2020-01-02T03:04:05Z","server_modified":"2020-01-02T03:04:06Z"}"#,
            )],
            b"[]",
        ));
        let client = client_on(&transport);

        let file = client.download_file("/cards.json", None).unwrap().await.unwrap();
        let metadata = file.metadata.unwrap();
        assert_eq!(metadata.name, "cards.json");
        assert_eq!(metadata.size, 2);
        assert_eq!(&file.content[..], b"[]");
    }

    #[tokio::test]
    async fn test_upload_file_decodes_metadata() {
        let transport = Arc::new(RecordingTransport::ok(
            br#"{"name":"cards.json","id":"id:1","rev":"0160","size":5,"client_modified":"2020-01-02T03:04:05Z","server_modified":"2020-01-02T03:04:06Z"}"#,
        ));
        let client = client_on(&transport);

        let metadata = client
            .upload_file(UploadArgs::new("cards.json"), b"hello".to_vec(), None)
            .unwrap()
            .await
            .unwrap();
        assert_eq!(metadata.rev, "0160");
    }

    #[tokio::test]
    async fn test_metadata_decodes_tagged_result() {
        let transport = Arc::new(RecordingTransport::ok(
            br#"{".tag":"folder","name":"decks","id":"id:2","path_display":"/decks"}"#,
        ));
        let client = client_on(&transport);

        let metadata = client.metadata("/decks", None).unwrap().await.unwrap();
        assert!(metadata.is_folder());
        assert_eq!(metadata.path_display(), Some("/decks"));
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let transport = Arc::new(RecordingTransport::ok(b""));
        let client = client_on(&transport);

        let pending = vec![
            client.download("/a", None).unwrap(),
            client.zip("/b", Some("other")).unwrap(),
            client.get_metadata(GetMetadataArgs::new("/c"), None).unwrap(),
        ];
        let results = futures::future::join_all(pending).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(transport.calls(), 3);
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = ClientConfig {
            content_endpoint: "https://content.dropboxapi.com".to_string(),
            ..ClientConfig::default()
        };
        assert!(DropboxClient::new(config).is_err());
    }

    fn assert_never_dispatched(method: &str) -> std::result::Result<(), TestCaseError> {
        let transport = Arc::new(RecordingTransport::ok(b""));
        let client = client_on(&transport);

        let err = client.get(method, &json!({}), Endpoint::Content, None).err();
        prop_assert!(matches!(err, Some(Error::InvalidMethod(_))), "get accepted {:?}", method);

        let err = client
            .post(method, &json!({}), vec![1u8], Endpoint::Rpc, None)
            .err();
        prop_assert!(matches!(err, Some(Error::InvalidMethod(_))), "post accepted {:?}", method);

        prop_assert_eq!(transport.calls(), 0);
        Ok(())
    }

    proptest! {
        #[test]
        fn prop_foreign_characters_never_dispatch(method in "[a-z_2/]{0,6}[A-Z013-9 .\\-]{1,3}[a-z_2/]{0,6}") {
            assert_never_dispatched(&method)?;
        }

        #[test]
        fn prop_bad_slashes_never_dispatch(segment in "[a-z_2]{1,8}") {
            assert_never_dispatched(&format!("/{}", segment))?;
            assert_never_dispatched(&format!("{}/", segment))?;
            assert_never_dispatched(&format!("{}//{}", segment, segment))?;
        }
    }
}
