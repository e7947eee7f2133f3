//! Generic JSON-RPC 2.0 administration client.
//!
//! This crate implements the shared session and transport layer used to
//! administer a family of server products that speak the same JSON-RPC
//! protocol but differ in endpoint (port, URL path) and a handful of RPC
//! method names. Product variants are plain configuration records
//! ([`ProductProfile`]); all protocol and state-machine logic lives in
//! [`rpc`].
//!
//! # Example
//!
//! ```rust,no_run
//! use adminrpc::{AdminClient, Application, ClientConfig, ProductProfile};
//!
//! # async fn example() -> Result<(), anyhow::Error> {
//! let mut api = AdminClient::new(
//!     ProductProfile::directory(),
//!     Application::new("Sample application", "Company Ltd.", "1.0"),
//!     ClientConfig::default(),
//! )?;
//!
//! api.login("directory.company.tld", "admin", "SecretPassword").await?;
//! let info = api.send_request("Server.getInfo", None).await?;
//! println!("{info}");
//! api.logout().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod log;
pub mod profile;
pub mod rpc;

pub use crate::config::ClientConfig;
pub use crate::profile::{Application, Endpoint, ProductProfile};
pub use crate::rpc::{
    AdminClient, ApiError, AuthError, CodecError, FileError, LoginState, RemoteError,
    TransportError, UploadDescriptor,
};
