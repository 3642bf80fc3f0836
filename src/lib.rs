//! JSON-RPC batch client for Bitcoin-style node daemons.
//!
//! Sends one or more method calls to a remote endpoint in a single HTTP POST
//! and correlates each returned result back to the call that issued it, by
//! request id. See [`rpc::RpcClient`] for the entry point.

pub mod rpc;

pub use crate::rpc::{
    CallResult, RequestIdAllocator, RpcAuth, RpcCall, RpcClient, RpcClientConfig, RpcError,
};
