//! Envelope dispatch and response classification.
//!
//! The server always answers with the same envelope:
//!
//! ```json
//! { "code": 0, "request": { "code": 0, "data": { ... } } }
//! ```
//!
//! | `request.code` | `request.data`      | Outcome                          |
//! |----------------|---------------------|----------------------------------|
//! | `1000`         | any                 | [`QQMusicError::Authentication`] |
//! | other          | absent/empty        | [`QQMusicError::DataRetrieval`]  |
//! | other          | non-empty           | `data` returned to the caller    |

use crate::envelope::RequestEnvelope;
use crate::error::{QQMusicError, Result};
use crate::pool::ContextKey;
use encoding_rs::{Encoding, UTF_8};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

/// `request.code` the server uses for a rejected credential.
pub const AUTH_FAILURE_CODE: i64 = 1000;

/// Default response charset.
pub const DEFAULT_CHARSET: &str = "utf-8";

/// POST `envelope` to `endpoint` through `client` and unwrap the payload.
///
/// The body is decoded with `charset`, whatever the response headers say.
/// Unknown labels decode as UTF-8.
pub(crate) async fn execute(
    client: &Client,
    context: ContextKey,
    endpoint: &str,
    envelope: &RequestEnvelope,
    charset: &str,
) -> Result<Value> {
    let body = envelope.to_bytes()?;
    debug!(
        module = %envelope.request.module,
        method = %envelope.request.method,
        %context,
        bytes = body.len(),
        "dispatching request"
    );

    let resp = client.post(endpoint).body(body).send().await?;
    let bytes = resp.bytes().await?;
    let text = decode_body(&bytes, charset);
    let json: Value = serde_json::from_str(&text)?;

    unwrap_response(&json).inspect_err(|e| {
        warn!(
            module = %envelope.request.module,
            method = %envelope.request.method,
            error = %e,
            "request rejected"
        );
    })
}

/// Classify a parsed response envelope.
pub fn unwrap_response(response: &Value) -> Result<Value> {
    let request = &response["request"];
    let code = request["code"].as_i64().unwrap_or(0);
    if code == AUTH_FAILURE_CODE {
        return Err(QQMusicError::Authentication);
    }
    let data = &request["data"];
    if is_empty_payload(data) {
        return Err(QQMusicError::DataRetrieval { code });
    }
    Ok(data.clone())
}

fn decode_body<'a>(bytes: &'a [u8], charset: &str) -> std::borrow::Cow<'a, str> {
    let encoding = Encoding::for_label(charset.as_bytes()).unwrap_or(UTF_8);
    encoding.decode(bytes).0
}

fn is_empty_payload(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn auth_failure() {
        let r = unwrap_response(&json!({"request": {"code": 1000}}));
        assert!(matches!(r, Err(QQMusicError::Authentication)));
    }

    #[test]
    fn auth_failure_wins_over_data() {
        let r = unwrap_response(&json!({"request": {"code": 1000, "data": {"k": 1}}}));
        assert!(matches!(r, Err(QQMusicError::Authentication)));
    }

    #[test]
    fn empty_data() {
        let r = unwrap_response(&json!({"request": {"code": 0, "data": {}}}));
        assert!(matches!(r, Err(QQMusicError::DataRetrieval { code: 0 })));
    }

    #[test]
    fn missing_data_keeps_code() {
        let r = unwrap_response(&json!({"request": {"code": 2001}}));
        assert!(matches!(r, Err(QQMusicError::DataRetrieval { code: 2001 })));
    }

    #[test]
    fn missing_request_block() {
        let r = unwrap_response(&json!({"code": 0}));
        assert!(matches!(r, Err(QQMusicError::DataRetrieval { code: 0 })));
    }

    #[test]
    fn payload_returned() {
        let r = unwrap_response(&json!({"request": {"code": 0, "data": {"k": 1}}})).unwrap();
        assert_eq!(r, json!({"k": 1}));
    }

    #[test]
    fn decode_uses_requested_charset() {
        assert_eq!(decode_body(&[0xD6, 0xD0], "gbk"), "中");
        assert_eq!(decode_body("中".as_bytes(), "utf-8"), "中");
        assert_eq!(decode_body("中".as_bytes(), "no-such-charset"), "中");
    }

    #[test]
    fn empty_payload_shapes() {
        for empty in [json!(null), json!(""), json!([]), json!({}), json!(false), json!(0)] {
            assert!(is_empty_payload(&empty), "{empty}");
        }
        for full in [json!("x"), json!([1]), json!({"a": 0}), json!(true), json!(3)] {
            assert!(!is_empty_payload(&full), "{full}");
        }
    }
}
