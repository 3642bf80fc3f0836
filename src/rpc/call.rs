use serde_json::Value;
use tokio::sync::oneshot;

use super::error::RpcError;

/// Outcome delivered on a call's completion handle.
pub type CallResult = Result<Value, RpcError>;

/// One method invocation plus the channel its outcome is delivered on.
///
/// Immutable once submitted. The oneshot sender is the completion handle:
/// it is fulfilled exactly once, either with the matched result or with an
/// error, after the whole response stream for the batch has ended. A
/// dropped receiver does not fail the batch.
pub struct RpcCall {
    pub(crate) method: String,
    pub(crate) params: Vec<Value>,
    completion: oneshot::Sender<CallResult>,
}

impl RpcCall {
    /// Creates a call and the receiver its outcome will arrive on.
    pub fn new(method: impl Into<String>, params: Vec<Value>) -> (Self, oneshot::Receiver<CallResult>) {
        let (completion, rx) = oneshot::channel();
        (
            Self {
                method: method.into(),
                params,
                completion,
            },
            rx,
        )
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Structural check performed at the correlator boundary, before any id
    /// allocation or I/O. Params being a sequence is already enforced by
    /// the type.
    pub(crate) fn validate(&self) -> Result<(), RpcError> {
        if self.method.is_empty() {
            return Err(RpcError::Validation(
                "method must be a non-empty string".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn resolve(self, outcome: CallResult) {
        // The caller may have dropped the receiver; that is not an error.
        let _ = self.completion.send(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_delivers_exactly_once() {
        let (call, mut rx) = RpcCall::new("getinfo", vec![json!(1)]);
        assert_eq!(call.method(), "getinfo");
        assert_eq!(call.params(), &[json!(1)][..]);

        call.resolve(Ok(json!({"version": 1})));
        assert_eq!(rx.try_recv().unwrap(), Ok(json!({"version": 1})));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn empty_method_fails_validation() {
        let (call, _rx) = RpcCall::new("", vec![]);
        assert!(matches!(call.validate(), Err(RpcError::Validation(_))));

        let (call, _rx) = RpcCall::new("getblockcount", vec![]);
        assert!(call.validate().is_ok());
    }

    #[test]
    fn dropped_receiver_is_tolerated() {
        let (call, rx) = RpcCall::new("getinfo", vec![]);
        drop(rx);
        call.resolve(Err(RpcError::MissingResponse));
    }
}
