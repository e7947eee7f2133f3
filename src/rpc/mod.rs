//! JSON-RPC session and transport core.
//!
//! This module contains all protocol and state-machine logic shared across
//! the product family:
//!
//! - [`AdminClient`] - the public facade: login, named RPC calls, raw
//!   uploads, logout
//! - [`RpcRequest`]/[`RpcResponse`] - JSON-RPC 2.0 envelope codec
//! - [`Session`]/[`LoginState`] - session token and cookie lifecycle
//! - [`ApiError`] and friends - the typed failure taxonomy
//!
//! The transport performs exactly one HTTP(S) exchange per call; there is
//! no retry and no fallback anywhere in this module. Every failure reaches
//! the caller as a distinguishable error variant.
//!
//! # Example
//!
//! ```rust,no_run
//! use adminrpc::{AdminClient, Application, ClientConfig, ProductProfile};
//!
//! # async fn example() -> Result<(), anyhow::Error> {
//! let mut api = AdminClient::new(
//!     ProductProfile::workspace(),
//!     Application::new("Backup tool", "Company Ltd.", "2.1"),
//!     ClientConfig::default(),
//! )?;
//!
//! api.login("workspace.company.tld", "admin", "SecretPassword").await?;
//! api.upload_file("/tmp/report.pdf", Some(42)).await?;
//! api.logout().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod envelope;
mod error;
mod session;
mod transport;

pub use client::{AdminClient, UploadDescriptor};
pub use envelope::{RpcPayload, RpcRequest, RpcResponse, decode_response};
pub use error::{ApiError, AuthError, CodecError, FileError, RemoteError, TransportError};
pub use session::{LoginState, Session};
