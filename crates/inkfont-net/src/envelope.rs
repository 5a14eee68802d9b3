//! JSON envelope
//!
//! Every endpoint answers `{"success": bool, ...}`. A `false` carries an
//! `error` string (and optionally a machine-readable `code`); a `true`
//! carries an optional `message` plus the endpoint's own fields at the top
//! level. Success is decided by the `success` flag, never by HTTP status.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{NetError, Response};

/// Decoded endpoint outcome
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Accepted { message: Option<String>, data: T },
    Rejected { error: String, code: Option<String> },
}

impl<T> Reply<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Reply::Accepted { .. })
    }
}

/// Decode an envelope. Non-2xx responses with a well-formed envelope are
/// still decoded; a body without one is a transport failure.
pub fn decode<T: DeserializeOwned>(resp: &Response) -> Result<Reply<T>, NetError> {
    let malformed = |detail: String| {
        if resp.is_success() {
            NetError::Decode(detail)
        } else {
            NetError::HttpError { status: resp.status }
        }
    };

    let value: Value = serde_json::from_slice(&resp.body)
        .map_err(|e| malformed(e.to_string()))?;
    let success = value.get("success")
        .and_then(Value::as_bool)
        .ok_or_else(|| malformed("missing boolean `success` field".into()))?;

    if success {
        let message = string_field(&value, "message");
        let data = serde_json::from_value(value)
            .map_err(|e| NetError::Decode(e.to_string()))?;
        Ok(Reply::Accepted { message, data })
    } else {
        Ok(Reply::Rejected {
            error: string_field(&value, "error").unwrap_or_else(|| "Unknown error".into()),
            code: string_field(&value, "code"),
        })
    }
}

/// Like `decode`, but any non-2xx status is a transport failure
pub fn decode_strict<T: DeserializeOwned>(resp: &Response) -> Result<Reply<T>, NetError> {
    if !resp.is_success() {
        return Err(NetError::HttpError { status: resp.status });
    }
    decode(resp)
}

/// Build a success envelope from `data`'s fields
pub fn accepted<T: Serialize>(message: Option<&str>, data: &T) -> Response {
    let mut map = match serde_json::to_value(data) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    map.insert("success".into(), Value::Bool(true));
    if let Some(message) = message {
        map.insert("message".into(), Value::String(message.into()));
    }
    Response::json_body(200, &Value::Object(map))
}

/// Build a failure envelope
pub fn rejected(error: &str, code: Option<&str>) -> Response {
    let mut map = Map::new();
    map.insert("success".into(), Value::Bool(false));
    map.insert("error".into(), Value::String(error.into()));
    if let Some(code) = code {
        map.insert("code".into(), Value::String(code.into()));
    }
    Response::json_body(200, &Value::Object(map))
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(String::from)
}
