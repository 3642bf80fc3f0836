use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::RpcError;

/// One `{id, method, params}` entry of the outgoing batch envelope.
///
/// The wire request is a JSON array of these, in the same order as the
/// submitted calls. Ordering carries no meaning for correlation; the id
/// does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEntry {
    pub id: u32,
    pub method: String,
    pub params: Vec<Value>,
}

/// One entry of the wire response array.
///
/// Servers may reorder entries freely and may omit entries for calls they
/// did not process. A `result` of JSON `null` deserializes as
/// `Some(Value::Null)` and is distinct from an absent `result`; `error:
/// null` counts as no error.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseEntry {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "value_present")]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RemoteErrorObject>,
}

/// A server-reported `{code, message}` error object.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteErrorObject {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl RemoteErrorObject {
    /// Converts to [`RpcError::Remote`], preferring `message` and falling
    /// back to the decimal rendering of `code` when the message is absent
    /// or empty.
    pub fn into_error(self) -> RpcError {
        let message = match self.message.as_deref() {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => match self.code {
                Some(code) => code.to_string(),
                None => "unknown RPC error".to_string(),
            },
        };
        RpcError::Remote {
            code: self.code,
            message,
        }
    }
}

/// Deserializes any JSON value, including `null`, as `Some`.
///
/// A plain `Option<Value>` field would collapse an explicit `null` to
/// `None`; routing through `Value` first keeps "present but null" apart
/// from "absent" (the field default).
fn value_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_result_is_present() {
        let entry: ResponseEntry = serde_json::from_value(json!({"id": 1, "result": null})).unwrap();
        assert_eq!(entry.result, Some(Value::Null));
    }

    #[test]
    fn absent_result_is_none() {
        let entry: ResponseEntry = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(entry.result, None);
    }

    #[test]
    fn null_error_counts_as_no_error() {
        let entry: ResponseEntry =
            serde_json::from_value(json!({"id": 1, "result": 42, "error": null})).unwrap();
        assert!(entry.error.is_none());
    }

    #[test]
    fn remote_error_prefers_message() {
        let err = RemoteErrorObject {
            code: Some(-5),
            message: Some("Block not found".into()),
        }
        .into_error();
        assert_eq!(err.to_string(), "Block not found");
    }

    #[test]
    fn remote_error_falls_back_to_code() {
        let err = RemoteErrorObject {
            code: Some(-5),
            message: None,
        }
        .into_error();
        assert_eq!(err.to_string(), "-5");

        let err = RemoteErrorObject {
            code: Some(-5),
            message: Some(String::new()),
        }
        .into_error();
        assert_eq!(err.to_string(), "-5");
    }

    #[test]
    fn remote_error_with_nothing_usable() {
        let err = RemoteErrorObject {
            code: None,
            message: None,
        }
        .into_error();
        assert_eq!(err.to_string(), "unknown RPC error");
    }
}
