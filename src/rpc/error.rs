//! Error types for the JSON-RPC client core.
//!
//! Every failure from the transport, codec, or session layers reaches the
//! caller as a distinct [`ApiError`] variant; nothing is swallowed or
//! retried. The only local recovery anywhere in the core is the session
//! manager's proactive invalidation on a detected auth expiry, which still
//! re-raises the originating error.

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Network-level failure of a single HTTP exchange.
///
/// The transport performs no retry; a variant here means the exchange did
/// not complete, never that it completed with an empty body.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The TCP connection could not be established (refused, unreachable,
    /// DNS failure).
    #[error("connection failed: {0}")]
    ConnectFailed(String),

    /// The configured connect or read timeout elapsed.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// TLS negotiation or certificate validation failed.
    #[error("TLS failure: {0}")]
    Tls(String),

    /// The exchange was cut short for any other reason.
    #[error("request aborted: {0}")]
    Aborted(String),
}

impl TransportError {
    /// Classifies a `reqwest` failure into the transport taxonomy.
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return TransportError::Timeout(err.to_string());
        }
        if has_tls_cause(&err) {
            return TransportError::Tls(err.to_string());
        }
        if err.is_connect() {
            return TransportError::ConnectFailed(err.to_string());
        }
        TransportError::Aborted(err.to_string())
    }
}

fn has_tls_cause(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string().to_ascii_lowercase();
        if text.contains("tls") || text.contains("ssl") || text.contains("certificate") {
            return true;
        }
        source = inner.source();
    }
    false
}

/// The response bytes could not be decoded as a JSON-RPC envelope.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Not valid JSON, not an object, or neither `result` nor `error`
    /// member present.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A protocol-level error object reported by the server.
///
/// This is a completed exchange whose envelope carried `error` instead of
/// `result`; it is surfaced as a failure, never merged into a result.
#[derive(Debug, Clone, Error, Deserialize)]
#[error("server error {code}: {message}")]
pub struct RemoteError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Authentication lifecycle failures.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server rejected the login handshake.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The server declared the session dead; subsequent calls fail fast
    /// until the next login.
    #[error("session expired")]
    SessionExpired,
}

/// Local file access failed while preparing an upload.
#[derive(Debug, Error)]
pub enum FileError {
    /// The file could not be read or was empty. An empty body indicates a
    /// read failure to the server, not an intentional empty file.
    #[error("cannot read file {path}: {reason}")]
    NotReadable { path: PathBuf, reason: String },
}

/// Any failure an [`AdminClient`](crate::AdminClient) call can produce.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    File(#[from] FileError),

    /// No endpoint is configured yet; `login` establishes one.
    #[error("no endpoint configured, call login first")]
    NotConnected,
}
