use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

/// Authentication material for the RPC endpoint.
///
/// Exactly one form is supplied; it is encoded once into a Basic
/// `Authorization` header value at client construction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RpcAuth {
    /// A pre-formed `user:pass` credential string.
    Credentials(String),
    /// Separate username and password, joined with `:` before encoding.
    UserPass { user: String, pass: String },
}

impl RpcAuth {
    /// Renders the `Authorization` header value.
    pub(crate) fn header_value(&self) -> String {
        let raw = match self {
            RpcAuth::Credentials(credentials) => credentials.clone(),
            RpcAuth::UserPass { user, pass } => format!("{user}:{pass}"),
        };
        format!("Basic {}", STANDARD.encode(raw.as_bytes()))
    }
}

/// Configuration for [`RpcClient`](super::RpcClient).
///
/// Deserializable so an application can load it straight from its
/// file/environment configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RpcClientConfig {
    /// The endpoint URL. Must be non-empty and parseable.
    pub url: String,
    /// Optional credentials; when absent no `Authorization` header is sent.
    #[serde(default)]
    pub auth: Option<RpcAuth>,
    /// Transport-level request timeout in seconds, handed to the HTTP
    /// client. Defaults to 30.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl RpcClientConfig {
    /// Convenience constructor for the common no-auth case.
    pub fn endpoint(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}
