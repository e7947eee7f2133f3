//! High-level administration client.
//!
//! [`AdminClient`] is the public surface of the crate: configure an
//! endpoint through a [`ProductProfile`], log in, issue named RPC methods,
//! upload raw payloads over the same session, log out.

use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};
use reqwest::Method;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use url::Url;

use super::envelope::{RpcPayload, RpcRequest, decode_response};
use super::error::{ApiError, AuthError, CodecError, FileError, TransportError};
use super::session::{LoginState, Session};
use super::transport::{Exchange, HttpTransport};
use crate::config::ClientConfig;
use crate::log::mask_string;
use crate::profile::{Application, Endpoint, ProductProfile};

/// Content type of the vendor-specific binary upload channel.
const UPLOAD_CONTENT_TYPE: &str = "application/k-upload";

/// A binary transfer prepared for the upload channel. Transient, built per
/// upload call; not part of session state.
#[derive(Debug, Clone)]
pub struct UploadDescriptor {
    /// Base name of the uploaded file, as presented to the server.
    pub filename: String,
    /// Reference id of the item the file belongs to.
    pub parent_id: i64,
    /// Payload length in bytes.
    pub length: u64,
}

/// JSON-RPC administration client for one server product.
///
/// One instance owns one logical session. Every entry point takes
/// `&mut self`, so a client admits no overlapping in-flight calls and
/// needs no internal locking; concurrent administration uses independent
/// instances, each with its own session and endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use adminrpc::{AdminClient, Application, ClientConfig, ProductProfile};
///
/// # async fn example() -> Result<(), anyhow::Error> {
/// let mut api = AdminClient::new(
///     ProductProfile::operator(),
///     Application::new("Sample application", "Company Ltd.", "1.0"),
///     ClientConfig::default(),
/// )?;
///
/// api.login("operator.company.tld", "admin", "SecretPassword").await?;
/// let extensions = api.send_request("Extensions.get", None).await?;
/// println!("{extensions}");
/// api.logout().await?;
/// # Ok(())
/// # }
/// ```
pub struct AdminClient {
    profile: ProductProfile,
    application: Application,
    version: String,
    port: u16,
    path: String,
    host: Option<String>,
    use_tls: bool,
    transport: HttpTransport,
    session: Session,
    next_id: u64,
}

impl AdminClient {
    /// Creates a client for the given product profile and application
    /// identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP transport cannot be initialized (e.g.
    /// TLS backend initialization failure).
    pub fn new(
        profile: ProductProfile,
        application: Application,
        config: ClientConfig,
    ) -> Result<Self, anyhow::Error> {
        let user_agent = config
            .user_agent
            .clone()
            .unwrap_or_else(|| format!("{}/{}", application.name, application.version));
        let transport = HttpTransport::new(&config, &user_agent)?;

        Ok(Self {
            version: profile.protocol_version.clone(),
            port: profile.default_port,
            path: profile.api_path.clone(),
            host: None,
            use_tls: config.use_tls,
            profile,
            application,
            transport,
            session: Session::default(),
            next_id: 0,
        })
    }

    /// Authenticates against `host` and stores the resulting session
    /// token/cookies for subsequent calls.
    ///
    /// Calling `login` while already logged in replaces the existing
    /// session: the prior token is discarded locally (no implicit logout
    /// RPC) and a warning is logged.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] when the server rejects the
    ///   handshake with an RPC error.
    /// - [`TransportError`]/[`CodecError`] variants propagate unchanged.
    pub async fn login(
        &mut self,
        host: &str,
        username: &str,
        password: &str,
    ) -> Result<Value, ApiError> {
        if self.session.state() == LoginState::LoggedIn {
            warn!(host = host; "login() called while a session is active, replacing the existing session");
        }
        self.session.invalidate();

        self.host = Some(host.to_string());
        self.session.begin_login();

        let user = mask_string(username);
        info!(host = host, user = &*user, method = &*self.profile.login_method; "Logging in");

        let params = json!({
            "userName": username,
            "password": password,
            "application": self.application,
        });

        let login_method = self.profile.login_method.clone();
        match self.call(&login_method, Some(params)).await {
            Ok(result) => {
                let token = result
                    .get(&self.profile.token_field)
                    .and_then(Value::as_str)
                    .map(str::to_owned);
                if token.is_none() {
                    debug!(field = &*self.profile.token_field; "Login result carries no token field, relying on cookies");
                }
                self.session.complete_login(token);
                info!(host = host; "Login successful");
                Ok(result)
            }
            Err(ApiError::Remote(remote)) => {
                self.session.abort_login();
                Err(AuthError::InvalidCredentials(remote.message).into())
            }
            Err(other) => {
                self.session.abort_login();
                Err(other)
            }
        }
    }

    /// Issues the product's logout RPC if logged in, then unconditionally
    /// clears local session state.
    ///
    /// A failure of the logout exchange is still reported, but the local
    /// session is discarded regardless, so no later call can carry the
    /// stale token.
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        if self.session.state() != LoginState::LoggedIn {
            self.session.invalidate();
            return Ok(());
        }

        let logout_method = self.profile.logout_method.clone();
        info!(method = &*logout_method; "Logging out");

        let outcome = self.call(&logout_method, None).await;
        self.session.invalidate();

        match outcome {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error:% = e; "Logout RPC failed, local session discarded anyway");
                Err(e)
            }
        }
    }

    /// Sends a named RPC method with optional parameters and returns the
    /// decoded `result` value.
    ///
    /// This is the single generic entry point: no retries, no fallback.
    /// [`RemoteError`](super::error::RemoteError), [`TransportError`],
    /// [`CodecError`], and [`AuthError`] all propagate unchanged. After
    /// the server reports session expiry, calls fail fast with
    /// [`AuthError::SessionExpired`] without touching the network until
    /// the next login.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use serde_json::json;
    /// # use adminrpc::{AdminClient, ApiError};
    /// # async fn example(api: &mut AdminClient) -> Result<(), ApiError> {
    /// let users = api
    ///     .send_request("Users.get", Some(json!({"query": {"limit": 100}})))
    ///     .await?;
    /// println!("{}", users["totalItems"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn send_request(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Value, ApiError> {
        if self.session.is_expired() {
            return Err(AuthError::SessionExpired.into());
        }
        self.call(method, params).await
    }

    /// Reconfigures the JSON-RPC version, port, and path used by future
    /// requests.
    ///
    /// Intended for switching sub-endpoints of the same authenticated
    /// server (e.g. administration vs. end-user component); the stored
    /// session token is untouched. May also be called before `login` to
    /// override the profile defaults.
    pub fn set_json_rpc(&mut self, version: &str, port: u16, path: &str) {
        debug!(version = version, port = port, path = path; "Switching JSON-RPC endpoint settings");
        self.version = version.to_string();
        self.port = port;
        self.path = path.to_string();
    }

    /// Uploads a local file over the session's binary transfer channel and
    /// returns the server's `result` value.
    ///
    /// The file content is read fully and the handle released before any
    /// network I/O begins.
    ///
    /// # Errors
    ///
    /// [`FileError::NotReadable`] when the file cannot be read or is
    /// empty; no network call is made in that case. An empty body would
    /// indicate a read failure to the server, so zero-length uploads are
    /// rejected locally.
    pub async fn upload_file(
        &mut self,
        path: impl AsRef<Path>,
        parent_id: Option<i64>,
    ) -> Result<Value, ApiError> {
        let path = path.as_ref();

        let payload = tokio::fs::read(path).await.map_err(|e| FileError::NotReadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if payload.is_empty() {
            return Err(FileError::NotReadable {
                path: path.to_path_buf(),
                reason: "file is empty".to_string(),
            }
            .into());
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        if filename.is_empty() {
            return Err(FileError::NotReadable {
                path: path.to_path_buf(),
                reason: "no usable file name".to_string(),
            }
            .into());
        }

        let descriptor = UploadDescriptor {
            filename,
            parent_id: parent_id.unwrap_or(0),
            length: payload.len() as u64,
        };

        self.put_upload(descriptor, payload).await
    }

    /// Fetches the product's constant table: issues the profile's
    /// constants method and returns the profile-named field of the result.
    pub async fn get_constants(&mut self) -> Result<Value, ApiError> {
        let method = self.profile.constants_method.clone();
        let result = self.send_request(&method, None).await?;

        let field = self.profile.constants_field.clone();
        result.get(&field).cloned().ok_or_else(|| {
            CodecError::Malformed(format!("result carries no `{field}` member")).into()
        })
    }

    /// Current authentication state.
    pub fn login_state(&self) -> LoginState {
        self.session.state()
    }

    /// The stored session token, if any.
    pub fn session_token(&self) -> Option<&str> {
        self.session.token()
    }

    /// URL future requests would be sent to; `None` before `login`.
    pub fn endpoint_url(&self) -> Option<String> {
        self.endpoint().ok().map(|e| e.to_string())
    }

    /// Round-trip time of the most recent exchange, if any.
    pub async fn last_request_latency(&self) -> Option<Duration> {
        self.transport.last_latency().await
    }

    fn endpoint(&self) -> Result<Endpoint, ApiError> {
        let host = self.host.as_ref().ok_or(ApiError::NotConnected)?;
        Ok(Endpoint {
            host: host.clone(),
            port: self.port,
            path: self.path.clone(),
            use_tls: self.use_tls,
        })
    }

    fn endpoint_url_checked(&self) -> Result<Url, ApiError> {
        let endpoint = self.endpoint()?;
        endpoint.url().map_err(|e| {
            TransportError::ConnectFailed(format!("invalid endpoint {endpoint}: {e}")).into()
        })
    }

    /// One JSON-RPC exchange: envelope, session context, POST, decode.
    async fn call(&mut self, method: &str, params: Option<Value>) -> Result<Value, ApiError> {
        let url = self.endpoint_url_checked()?;

        self.next_id += 1;
        let id = self.next_id;
        let body = RpcRequest::new(&self.version, id, method, params).to_bytes()?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        self.session.apply(&mut headers, &self.profile.token_header);

        debug!(method = method, id = id; "Sending JSON-RPC request");
        let exchange = self
            .transport
            .execute(Method::POST, url, headers, Some(body))
            .await?;

        self.finish_exchange(exchange, Some(id))
    }

    /// Raw binary PUT over the upload channel, reusing the same session
    /// context and response decoding as ordinary calls.
    async fn put_upload(
        &mut self,
        descriptor: UploadDescriptor,
        payload: Vec<u8>,
    ) -> Result<Value, ApiError> {
        if self.session.is_expired() {
            return Err(AuthError::SessionExpired.into());
        }

        let mut url = self.endpoint_url_checked()?;
        url.query_pairs_mut()
            .append_pair("method", "PutFile")
            .append_pair("filename", &descriptor.filename)
            .append_pair("parentId", &descriptor.parent_id.to_string())
            .append_pair("length", &descriptor.length.to_string());

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(UPLOAD_CONTENT_TYPE));
        self.session.apply(&mut headers, &self.profile.token_header);

        info!(filename = &*descriptor.filename, parent = descriptor.parent_id, length = descriptor.length; "Uploading file");
        let exchange = self
            .transport
            .execute(Method::PUT, url, headers, Some(payload))
            .await?;

        self.finish_exchange(exchange, None)
    }

    /// Shared response tail: absorb cookies, decode the envelope, detect
    /// session expiry, unwrap result or surface the server error.
    fn finish_exchange(
        &mut self,
        exchange: Exchange,
        expected_id: Option<u64>,
    ) -> Result<Value, ApiError> {
        if self.session.state() != LoginState::LoggedOut {
            self.session.absorb_cookies(&exchange.headers);
        }

        let status = exchange.status;
        let response = decode_response(&exchange.body).map_err(|e| match e {
            CodecError::Malformed(reason) if !status.is_success() => {
                CodecError::Malformed(format!("HTTP {status}: {reason}"))
            }
            other => other,
        })?;

        if let (Some(expected), Some(got)) = (expected_id, &response.id) {
            if got.as_u64() != Some(expected) {
                warn!(expected = expected, got:? = got; "Response id does not match request id");
            }
        }

        match response.payload {
            RpcPayload::Result(result) => Ok(result),
            RpcPayload::Error(remote) => {
                if self.session.state() == LoginState::LoggedIn
                    && self.profile.session_expired_codes.contains(&remote.code)
                {
                    warn!(code = remote.code; "Server reports the session expired, invalidating local session");
                    self.session.mark_expired();
                }
                Err(remote.into())
            }
        }
    }
}
