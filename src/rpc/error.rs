//! Error types for the RPC correlation layer.

use thiserror::Error;

/// Errors produced while submitting and resolving RPC calls.
///
/// The taxonomy splits along two axes: *when* the error surfaces and *how
/// far* it reaches.
///
/// - [`Config`](RpcError::Config) and [`Validation`](RpcError::Validation)
///   surface synchronously, before any id is allocated or any byte is sent.
/// - [`Transport`](RpcError::Transport), [`Unauthorized`](RpcError::Unauthorized)
///   and [`InvalidResponse`](RpcError::InvalidResponse) are uniform
///   batch-level errors: they reflect a failure of the exchange as a whole
///   and are delivered identically to every completion handle in the batch.
/// - [`MissingResponse`](RpcError::MissingResponse),
///   [`MissingResult`](RpcError::MissingResult) and
///   [`Remote`](RpcError::Remote) are per-call: siblings in the same batch
///   resolve independently.
///
/// The enum is `Clone` so a single uniform error can fan out to every
/// completion handle; transport failures therefore carry the rendered
/// `reqwest` message rather than the non-cloneable error value itself.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcError {
    /// The client could not be constructed, typically because the endpoint
    /// URL was empty or unparseable.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// A call in the batch failed the structural check (empty method name).
    /// The whole batch is rejected before any id allocation or network I/O.
    #[error("invalid RPC call: {0}")]
    Validation(String),

    /// The underlying connection failed, either on send or while the
    /// response body was being streamed.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered HTTP 401. Applied uniformly regardless of the
    /// response body.
    #[error("Unauthorized")]
    Unauthorized,

    /// The response body did not form a well-formed top-level JSON array,
    /// or the single-call path did not receive exactly one entry.
    #[error("invalid RPC response")]
    InvalidResponse,

    /// The response array carried no entry for this call's id.
    #[error("missing RPC response")]
    MissingResponse,

    /// A response entry matched this call's id but carried no `result`
    /// field. An explicit `result: null` is a success, not this error.
    #[error("missing RPC result")]
    MissingResult,

    /// The server reported an error for this call. `message` falls back to
    /// the decimal rendering of `code` when the server sent none.
    #[error("{message}")]
    Remote {
        /// The server-reported error code, if any.
        code: Option<i64>,
        /// Human-readable error text.
        message: String,
    },
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        RpcError::Transport(err.to_string())
    }
}
