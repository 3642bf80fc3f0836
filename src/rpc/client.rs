use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use url::Url;

use super::call::{CallResult, RpcCall};
use super::config::{RpcAuth, RpcClientConfig};
use super::error::RpcError;
use super::id::RequestIdAllocator;
use super::stream::{DecodeError, JsonArrayDecoder};
use super::types::{RequestEntry, ResponseEntry};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// JSON-RPC batch client for a single node endpoint.
///
/// Cheap to clone and safe to share: clones hand out the same underlying
/// HTTP connection pool and the same id allocator, so batches submitted
/// through any clone draw from one id sequence and never collide. Any
/// number of submissions may be in flight concurrently; each exchange keeps
/// its own decoder and response map.
///
/// One submission performs exactly one HTTP POST. There are no retries, no
/// cancellation and no backpressure at this layer; the configured timeout
/// belongs to the HTTP transport underneath.
#[derive(Clone, Debug)]
pub struct RpcClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    url: Url,
    auth_header: Option<String>,
    http: reqwest::Client,
    ids: RequestIdAllocator,
}

/// What one HTTP exchange produced, captured before any classification.
struct Exchange {
    status: Option<StatusCode>,
    transport: Option<RpcError>,
    body: Result<Vec<Value>, DecodeError>,
}

impl Exchange {
    /// Uniform batch-level classification, in precedence order: transport
    /// failure, then HTTP 401, then a body that is not a proper list.
    fn uniform_error(&self) -> Option<RpcError> {
        if let Some(err) = &self.transport {
            return Some(err.clone());
        }
        if self.status == Some(StatusCode::UNAUTHORIZED) {
            return Some(RpcError::Unauthorized);
        }
        if self.body.is_err() {
            return Some(RpcError::InvalidResponse);
        }
        None
    }

    fn into_elements(self) -> Vec<Value> {
        self.body.unwrap_or_default()
    }
}

impl RpcClient {
    /// Builds a client from its configuration.
    ///
    /// Fails with [`RpcError::Config`] when the endpoint URL is empty or
    /// unparseable; no call is possible on a misconfigured client.
    pub fn new(config: RpcClientConfig) -> Result<Self, RpcError> {
        if config.url.is_empty() {
            return Err(RpcError::Config("endpoint URL must not be empty".into()));
        }
        let url =
            Url::parse(&config.url).map_err(|err| RpcError::Config(format!("endpoint URL: {err}")))?;

        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RpcError::Config(err.to_string()))?;

        let auth_header = config.auth.as_ref().map(RpcAuth::header_value);

        Ok(Self {
            inner: Arc::new(Inner {
                url,
                auth_header,
                http,
                ids: RequestIdAllocator::new(),
            }),
        })
    }

    /// The configured endpoint.
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// Submits a batch of calls as one HTTP exchange.
    ///
    /// Every call is validated first; a validation failure rejects the
    /// whole batch before any id is allocated or any byte sent. An empty
    /// batch completes immediately with no I/O. Otherwise one contiguous id
    /// block is reserved for the batch, the envelope is POSTed, and once
    /// the response stream has fully ended each call's completion handle is
    /// resolved in input order by matching ids; the server may reorder
    /// response entries freely.
    ///
    /// The returned future is the batch-level completion signal: it
    /// finishes after every completion handle has been resolved and yields
    /// the uniform batch-level error if one applied (transport failure,
    /// HTTP 401, or a body that was not a JSON array). Per-call failures
    /// such as a missing response entry are delivered on the affected
    /// call's handle only and leave the overall outcome `Ok`.
    pub async fn submit_batch(&self, batch: Vec<RpcCall>) -> Result<(), RpcError> {
        for call in &batch {
            call.validate()?;
        }
        if batch.is_empty() {
            debug!("empty RPC batch, nothing to dispatch");
            return Ok(());
        }

        let first_id = self.inner.ids.reserve(batch.len() as u32);
        let envelope: Vec<RequestEntry> = batch
            .iter()
            .enumerate()
            .map(|(index, call)| RequestEntry {
                id: first_id.wrapping_add(index as u32),
                method: call.method.clone(),
                params: call.params.clone(),
            })
            .collect();
        debug!(calls = batch.len() as u64, first_id = first_id as u64; "dispatching RPC batch");

        let exchange = self.exchange(&envelope).await;
        let uniform = exchange.uniform_error();
        let mut map = match uniform {
            Some(_) => HashMap::new(),
            None => Self::response_map(exchange.into_elements()),
        };

        for (index, call) in batch.into_iter().enumerate() {
            let id = u64::from(first_id.wrapping_add(index as u32));
            let outcome = match &uniform {
                Some(err) => Err(err.clone()),
                None => Self::resolve_entry(map.remove(&id)),
            };
            call.resolve(outcome);
        }

        match uniform {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Performs a single call and waits for its result.
    ///
    /// A specialization of the batch path with a one-element envelope; the
    /// per-id missing-entry check is replaced by requiring the response
    /// array to contain exactly one entry, so an empty array here is an
    /// invalid response rather than a missing one.
    pub async fn call(&self, method: impl Into<String>, params: Vec<Value>) -> Result<Value, RpcError> {
        let method = method.into();
        if method.is_empty() {
            return Err(RpcError::Validation(
                "method must be a non-empty string".into(),
            ));
        }

        let id = self.inner.ids.reserve(1);
        debug!(method = &*method, id = id as u64; "dispatching RPC call");
        let envelope = vec![RequestEntry { id, method, params }];

        let exchange = self.exchange(&envelope).await;
        if let Some(err) = exchange.uniform_error() {
            return Err(err);
        }

        let mut elements = exchange.into_elements();
        if elements.len() != 1 {
            return Err(RpcError::InvalidResponse);
        }
        let element = elements.pop().ok_or(RpcError::InvalidResponse)?;
        match serde_json::from_value::<ResponseEntry>(element) {
            Ok(entry) => Self::resolve_entry(Some(entry)),
            // Not a response object at all; it carries no result.
            Err(_) => Err(RpcError::MissingResult),
        }
    }

    /// One HTTP POST: send the envelope, record the status as soon as
    /// headers arrive, then drain the body incrementally through the array
    /// decoder. A transport error terminates draining and is remembered;
    /// classification happens only after the stream has ended.
    async fn exchange(&self, envelope: &[RequestEntry]) -> Exchange {
        let mut request = self.inner.http.post(self.inner.url.clone()).json(&envelope);
        if let Some(auth) = &self.inner.auth_header {
            request = request.header(AUTHORIZATION, auth);
        }

        let mut response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error:% = err; "RPC dispatch failed");
                return Exchange {
                    status: None,
                    transport: Some(err.into()),
                    body: Ok(Vec::new()),
                };
            }
        };

        let status = response.status();
        let mut decoder = JsonArrayDecoder::new();
        let mut transport = None;
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => decoder.feed(&chunk),
                Ok(None) => break,
                Err(err) => {
                    warn!(error:% = err; "RPC response stream failed");
                    transport = Some(err.into());
                    break;
                }
            }
        }

        let body = decoder.finish();
        if let Err(err) = &body {
            debug!(error:% = err, status = status.as_u16() as u64; "RPC response body is not a JSON array");
        }

        Exchange {
            status: Some(status),
            transport,
            body,
        }
    }

    /// Builds the id to entry map from the accumulated elements. Elements
    /// that are not response objects, or that carry no id, cannot
    /// correlate and are dropped; the calls they belonged to resolve as
    /// missing responses. When an id appears twice, the later entry wins.
    fn response_map(elements: Vec<Value>) -> HashMap<u64, ResponseEntry> {
        let mut map = HashMap::with_capacity(elements.len());
        for element in elements {
            match serde_json::from_value::<ResponseEntry>(element) {
                Ok(entry) => match entry.id {
                    Some(id) => {
                        map.insert(id, entry);
                    }
                    None => warn!("dropping RPC response entry without an id"),
                },
                Err(err) => {
                    warn!(error:% = err; "dropping malformed RPC response entry");
                }
            }
        }
        map
    }

    fn resolve_entry(entry: Option<ResponseEntry>) -> CallResult {
        let Some(entry) = entry else {
            return Err(RpcError::MissingResponse);
        };
        if let Some(remote) = entry.error {
            return Err(remote.into_error());
        }
        match entry.result {
            Some(value) => Ok(value),
            None => Err(RpcError::MissingResult),
        }
    }
}
