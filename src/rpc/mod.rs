//! JSON-RPC-over-HTTP client with batch correlation.
//!
//! This module implements the request/response correlation protocol used by
//! Bitcoin-style node daemons: every outgoing call is assigned a unique id
//! from a process-wide allocator, calls are packed into a single JSON array
//! envelope and POSTed in one HTTP exchange, and the response array is
//! stream-parsed and demultiplexed back to the originating calls strictly by
//! id; the server is free to reorder entries.
//!
//! # Components
//!
//! - [`RpcClient`] - the batch correlator; [`RpcClient::submit_batch`] and
//!   [`RpcClient::call`] are the two entry points
//! - [`RpcCall`] - one method invocation plus its completion handle
//! - [`RequestIdAllocator`] - atomic allocation of contiguous id blocks
//! - [`RpcError`] - error taxonomy, from configuration failures down to
//!   per-call remote errors
//!
//! # Example
//!
//! ```rust,no_run
//! use noderpc::rpc::{RpcClient, RpcClientConfig};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), noderpc::rpc::RpcError> {
//! let client = RpcClient::new(RpcClientConfig {
//!     url: "http://localhost:8332".into(),
//!     ..Default::default()
//! })?;
//!
//! let info = client.call("getinfo", vec![]).await?;
//! println!("node version: {}", info["version"]);
//! # Ok(())
//! # }
//! ```
//!
//! # Error handling
//!
//! Failures of the exchange as a whole (transport, HTTP 401, a body that is
//! not a JSON array) apply uniformly to every call in the batch; per-call
//! failures (a remote `{code, message}`, a missing response entry, an entry
//! without a result) are isolated to the affected call and leave its
//! siblings untouched. See [`RpcError`] for the full taxonomy.

mod call;
mod client;
mod config;
mod error;
mod id;
mod stream;
mod types;

pub use call::{CallResult, RpcCall};
pub use client::RpcClient;
pub use config::{RpcAuth, RpcClientConfig};
pub use error::RpcError;
pub use id::RequestIdAllocator;
pub use types::{RemoteErrorObject, RequestEntry, ResponseEntry};
