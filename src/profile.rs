//! Product profiles and endpoint records.
//!
//! A [`ProductProfile`] is the only thing that distinguishes one server
//! product from another: the JSON-RPC protocol version, the default TCP
//! port and API path, and the handful of product-specific method and field
//! names the core treats as opaque strings. Profiles are immutable values
//! passed into [`AdminClient::new`](crate::AdminClient::new); product
//! identity is never encoded through inheritance or globals.

use serde::Serialize;
use url::Url;

/// Default login RPC method shared across the product family.
pub const DEFAULT_LOGIN_METHOD: &str = "Session.login";

/// Default logout RPC method shared across the product family.
pub const DEFAULT_LOGOUT_METHOD: &str = "Session.logout";

/// Default login-result field carrying the session token.
pub const DEFAULT_TOKEN_FIELD: &str = "token";

/// Default request header echoing the session token back to the server.
pub const DEFAULT_TOKEN_HEADER: &str = "X-Token";

/// Default server error code signalling an expired session.
///
/// Sits in the JSON-RPC implementation-defined server-error band; products
/// that report expiry differently override
/// [`ProductProfile::session_expired_codes`].
pub const DEFAULT_SESSION_EXPIRED_CODE: i64 = -32001;

/// Port of the operator product's end-user (client) component.
pub const OPERATOR_CLIENT_PORT: u16 = 443;

/// API path of the operator product's end-user (client) component.
pub const OPERATOR_CLIENT_PATH: &str = "/myphone/api/jsonrpc/";

/// Port of the workspace product's end-user (client) component.
pub const WORKSPACE_CLIENT_PORT: u16 = 443;

/// API path of the workspace product's end-user (client) component.
pub const WORKSPACE_CLIENT_PATH: &str = "/server/data";

/// Identity of the calling application, sent with the login request and
/// used to derive the transport User-Agent.
#[derive(Debug, Clone, Serialize)]
pub struct Application {
    pub name: String,
    pub vendor: String,
    pub version: String,
}

impl Application {
    pub fn new(name: &str, vendor: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            vendor: vendor.to_string(),
            version: version.to_string(),
        }
    }
}

/// Static per-product JSON-RPC settings consumed by the client core.
///
/// The method and field names are opaque configuration: the core never
/// interprets them beyond substituting them into requests and looking them
/// up in results.
#[derive(Debug, Clone)]
pub struct ProductProfile {
    /// JSON-RPC protocol version string, e.g. `"2.0"`.
    pub protocol_version: String,
    /// Default administration TCP port.
    pub default_port: u16,
    /// Default base API path, e.g. `/admin/jsonrpc/`.
    pub api_path: String,
    /// RPC method performing the login handshake.
    pub login_method: String,
    /// RPC method invalidating the server-side session.
    pub logout_method: String,
    /// Login-result field carrying the session token.
    pub token_field: String,
    /// Request header the token is echoed in on subsequent calls.
    pub token_header: String,
    /// RPC method returning the product's constant table.
    pub constants_method: String,
    /// Result field holding that table.
    pub constants_field: String,
    /// Server error codes that mean the session has expired.
    pub session_expired_codes: Vec<i64>,
}

impl ProductProfile {
    /// Profile for a product not covered by the predefined constructors.
    ///
    /// Starts from the family-wide defaults; use the `with_*` methods to
    /// adjust the product-specific names.
    pub fn custom(protocol_version: &str, default_port: u16, api_path: &str) -> Self {
        Self {
            protocol_version: protocol_version.to_string(),
            default_port,
            api_path: api_path.to_string(),
            login_method: DEFAULT_LOGIN_METHOD.to_string(),
            logout_method: DEFAULT_LOGOUT_METHOD.to_string(),
            token_field: DEFAULT_TOKEN_FIELD.to_string(),
            token_header: DEFAULT_TOKEN_HEADER.to_string(),
            constants_method: "Server.getInfo".to_string(),
            constants_field: "serverInfo".to_string(),
            session_expired_codes: vec![DEFAULT_SESSION_EXPIRED_CODE],
        }
    }

    /// Directory server administration profile.
    pub fn directory() -> Self {
        Self::custom("2.0", 4101, "/admin/jsonrpc/")
    }

    /// Operator (telephony) server administration profile.
    ///
    /// The end-user component of this product lives at
    /// [`OPERATOR_CLIENT_PORT`]/[`OPERATOR_CLIENT_PATH`]; switch with
    /// [`AdminClient::set_json_rpc`](crate::AdminClient::set_json_rpc).
    pub fn operator() -> Self {
        Self::custom("2.0", 4021, "/admin/api/jsonrpc/")
            .with_constants("Server.getConstantList", "constantList")
    }

    /// Workspace (document collaboration) server administration profile.
    ///
    /// The end-user component of this product lives at
    /// [`WORKSPACE_CLIENT_PORT`]/[`WORKSPACE_CLIENT_PATH`].
    pub fn workspace() -> Self {
        Self::custom("2.0", 4060, "/admin/api/jsonrpc/")
            .with_constants("Server.getProductInfo", "constants")
    }

    pub fn with_login_method(mut self, method: &str) -> Self {
        self.login_method = method.to_string();
        self
    }

    pub fn with_logout_method(mut self, method: &str) -> Self {
        self.logout_method = method.to_string();
        self
    }

    pub fn with_token_field(mut self, field: &str) -> Self {
        self.token_field = field.to_string();
        self
    }

    pub fn with_token_header(mut self, header: &str) -> Self {
        self.token_header = header.to_string();
        self
    }

    pub fn with_constants(mut self, method: &str, field: &str) -> Self {
        self.constants_method = method.to_string();
        self.constants_field = field.to_string();
        self
    }

    pub fn with_session_expired_codes(mut self, codes: Vec<i64>) -> Self {
        self.session_expired_codes = codes;
        self
    }
}

/// Where requests are sent: host plus the current JSON-RPC settings.
///
/// Endpoints are immutable values. Switching component (admin vs. client
/// sub-endpoint) derives a new `Endpoint`; it never mutates one an open
/// session already used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub use_tls: bool,
}

impl Endpoint {
    /// Renders the endpoint as an absolute URL.
    pub fn url(&self) -> Result<Url, url::ParseError> {
        let scheme = if self.use_tls { "https" } else { "http" };
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        Url::parse(&format!("{}://{}:{}{}", scheme, self.host, self.port, path))
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scheme = if self.use_tls { "https" } else { "http" };
        write!(f, "{}://{}:{}{}", scheme, self.host, self.port, self.path)
    }
}
