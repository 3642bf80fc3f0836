//! Incremental decoder for a top-level JSON array.
//!
//! The response body arrives as a sequence of byte chunks. The decoder
//! scans them as they arrive, slices out one top-level array element at a
//! time and decodes each element with `serde_json` the moment it is
//! complete, so the first entries of a large batch response are available
//! without buffering the whole body. Correlation still waits for the
//! stream to end; the decoder only does the accumulation.

use serde_json::Value;
use thiserror::Error;

/// Why a response body failed to decode as a top-level JSON array.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum DecodeError {
    #[error("top-level value is not an array")]
    NotAnArray,
    #[error("body ended before the array was closed")]
    Truncated,
    #[error("data after the closing bracket")]
    TrailingData,
    #[error("malformed array element: {0}")]
    Syntax(String),
}

enum State {
    /// Skipping whitespace before the opening bracket.
    Start,
    /// Inside the array, before an element. `first` admits the closing
    /// bracket of an empty array.
    AwaitValue { first: bool },
    /// Accumulating the bytes of one element.
    InElement,
    /// Closing bracket seen; only trailing whitespace may follow.
    Closed,
    /// Scanning failed; the rest of the input is drained and ignored.
    Failed,
}

/// Streaming decoder for one response body. Private to a single exchange.
pub(crate) struct JsonArrayDecoder {
    state: State,
    /// Nesting depth of the current element, not counting the outer array.
    depth: u32,
    in_string: bool,
    escaped: bool,
    buf: Vec<u8>,
    items: Vec<Value>,
    error: Option<DecodeError>,
}

impl JsonArrayDecoder {
    pub fn new() -> Self {
        Self {
            state: State::Start,
            depth: 0,
            in_string: false,
            escaped: false,
            buf: Vec::new(),
            items: Vec::new(),
            error: None,
        }
    }

    /// Consumes one chunk of the body. Elements completed by this chunk are
    /// decoded and retained; errors are remembered and reported by
    /// [`finish`](Self::finish).
    pub fn feed(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            match self.state {
                State::Start => match byte {
                    b' ' | b'\t' | b'\n' | b'\r' => {}
                    b'[' => self.state = State::AwaitValue { first: true },
                    _ => self.fail(DecodeError::NotAnArray),
                },
                State::AwaitValue { first } => match byte {
                    b' ' | b'\t' | b'\n' | b'\r' => {}
                    b']' if first => self.state = State::Closed,
                    b']' | b',' => {
                        self.fail(DecodeError::Syntax(format!(
                            "unexpected '{}' where a value was expected",
                            byte as char
                        )));
                    }
                    _ => {
                        self.state = State::InElement;
                        self.depth = 0;
                        self.in_string = false;
                        self.escaped = false;
                        self.buf.clear();
                        self.element_byte(byte);
                    }
                },
                State::InElement => self.element_byte(byte),
                State::Closed => match byte {
                    b' ' | b'\t' | b'\n' | b'\r' => {}
                    _ => self.fail(DecodeError::TrailingData),
                },
                State::Failed => return,
            }
        }
    }

    /// Ends the stream. Succeeds only when the body formed exactly one
    /// well-formed top-level array; a zero-byte body counts as an empty
    /// list.
    pub fn finish(self) -> Result<Vec<Value>, DecodeError> {
        match self.state {
            State::Closed => Ok(self.items),
            State::Start => Ok(Vec::new()),
            State::AwaitValue { .. } | State::InElement => Err(DecodeError::Truncated),
            State::Failed => Err(self.error.unwrap_or(DecodeError::Truncated)),
        }
    }

    fn element_byte(&mut self, byte: u8) {
        if self.in_string {
            self.buf.push(byte);
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == b'"' {
                self.in_string = false;
            }
            return;
        }

        match byte {
            b'"' => {
                self.in_string = true;
                self.buf.push(byte);
            }
            b'{' | b'[' => {
                self.depth += 1;
                self.buf.push(byte);
            }
            b'}' => {
                if self.depth == 0 {
                    self.fail(DecodeError::Syntax("unmatched '}'".into()));
                    return;
                }
                self.depth -= 1;
                self.buf.push(byte);
            }
            b']' if self.depth == 0 => {
                // Closes the outer array and ends the current element.
                if self.end_element() {
                    self.state = State::Closed;
                }
            }
            b']' => {
                self.depth -= 1;
                self.buf.push(byte);
            }
            b',' if self.depth == 0 => {
                if self.end_element() {
                    self.state = State::AwaitValue { first: false };
                }
            }
            _ => self.buf.push(byte),
        }
    }

    fn end_element(&mut self) -> bool {
        match serde_json::from_slice::<Value>(&self.buf) {
            Ok(value) => {
                self.items.push(value);
                true
            }
            Err(err) => {
                self.fail(DecodeError::Syntax(err.to_string()));
                false
            }
        }
    }

    fn fail(&mut self, err: DecodeError) {
        self.state = State::Failed;
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(body: &[u8]) -> Result<Vec<Value>, DecodeError> {
        let mut decoder = JsonArrayDecoder::new();
        decoder.feed(body);
        decoder.finish()
    }

    #[test]
    fn decodes_array_of_objects_in_one_chunk() {
        let items = decode(br#"[{"id":0,"result":1},{"id":1,"result":null}]"#).unwrap();
        assert_eq!(
            items,
            vec![json!({"id": 0, "result": 1}), json!({"id": 1, "result": null})]
        );
    }

    #[test]
    fn decodes_scalars_and_nested_values() {
        let items = decode(br#"[1, "two", [3, [4]], {"a": {"b": []}}, null]"#).unwrap();
        assert_eq!(
            items,
            vec![json!(1), json!("two"), json!([3, [4]]), json!({"a": {"b": []}}), json!(null)]
        );
    }

    #[test]
    fn boundaries_survive_arbitrary_chunk_seams() {
        let body = br#"[{"id":0,"result":{"text":"a,]\"b","n":1.5e3}},{"id":1,"error":{"code":-1}}]"#;
        let expected = decode(body).unwrap();

        // Every split point must decode identically, including splits inside
        // strings, escapes and numbers.
        for split in 0..body.len() {
            let mut decoder = JsonArrayDecoder::new();
            decoder.feed(&body[..split]);
            decoder.feed(&body[split..]);
            assert_eq!(decoder.finish().unwrap(), expected, "split at byte {}", split);
        }
    }

    #[test]
    fn empty_array_and_empty_body_decode_to_no_items() {
        assert_eq!(decode(b"[]").unwrap(), Vec::<Value>::new());
        assert_eq!(decode(b" [ ] ").unwrap(), Vec::<Value>::new());
        assert_eq!(decode(b"").unwrap(), Vec::<Value>::new());
    }

    #[test]
    fn top_level_object_is_not_an_array() {
        assert_eq!(
            decode(br#"{"id":0,"result":1}"#),
            Err(DecodeError::NotAnArray)
        );
    }

    #[test]
    fn truncated_body_is_rejected() {
        assert_eq!(decode(br#"[{"id":0"#), Err(DecodeError::Truncated));
        assert_eq!(decode(b"["), Err(DecodeError::Truncated));
        assert_eq!(decode(br#"[{"id":0},"#), Err(DecodeError::Truncated));
    }

    #[test]
    fn trailing_data_is_rejected() {
        assert_eq!(decode(b"[1] x"), Err(DecodeError::TrailingData));
        assert_eq!(decode(b"[][]"), Err(DecodeError::TrailingData));
    }

    #[test]
    fn bad_punctuation_is_rejected() {
        assert!(matches!(decode(b"[1,]"), Err(DecodeError::Syntax(_))));
        assert!(matches!(decode(b"[,1]"), Err(DecodeError::Syntax(_))));
        assert!(matches!(decode(b"[}]"), Err(DecodeError::Syntax(_))));
    }

    #[test]
    fn malformed_element_is_rejected() {
        assert!(matches!(decode(b"[1 2]"), Err(DecodeError::Syntax(_))));
        assert!(matches!(decode(b"[tru]"), Err(DecodeError::Syntax(_))));
    }

    #[test]
    fn input_after_failure_is_ignored() {
        let mut decoder = JsonArrayDecoder::new();
        decoder.feed(b"not json");
        decoder.feed(b"[1,2,3]");
        assert_eq!(decoder.finish(), Err(DecodeError::NotAnArray));
    }
}
