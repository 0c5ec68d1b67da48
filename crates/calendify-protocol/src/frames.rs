//! JSON frames shared by `/ws` and `POST /rpc/{method}`.
//!
//! Every frame carries a `type` tag: `req` comes from the client, `res` and
//! `event` from the server. The HTTP transport only ever returns `res`.

use calendify_core::CalendifyError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const REQ: &str = "req";
pub const RES: &str = "res";
pub const EVENT: &str = "event";

/// A call from the client, e.g.
/// `{ "type": "req", "id": "r-1", "method": "schedules.getById", "params": { "id": "s-1" } }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReqFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    pub id: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Answer to one `ReqFrame`. Exactly one of `payload` and `error` is set,
/// matching `ok`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    pub id: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorShape>,
}

impl ResFrame {
    /// Success carrying `payload`. If the payload cannot be encoded as JSON
    /// the caller gets a `SERIALIZATION_ERROR` failure instead.
    pub fn ok(id: impl Into<String>, payload: impl Serialize) -> Self {
        match serde_json::to_value(payload) {
            Ok(value) => Self {
                frame_type: RES.to_string(),
                id: id.into(),
                ok: true,
                payload: Some(value),
                error: None,
            },
            Err(e) => Self::from_error(id, &CalendifyError::Serialization(e)),
        }
    }

    pub fn err(id: impl Into<String>, code: &str, message: &str) -> Self {
        Self {
            frame_type: RES.to_string(),
            id: id.into(),
            ok: false,
            payload: None,
            error: Some(ErrorShape {
                code: code.to_string(),
                message: message.to_string(),
            }),
        }
    }

    /// Failure carrying the error's wire code and display message.
    pub fn from_error(id: impl Into<String>, err: &CalendifyError) -> Self {
        Self::err(id, err.code(), &err.to_string())
    }

    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }
}

/// Server push, e.g. `tick`, `connect.challenge` or `roster.changed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
}

impl EventFrame {
    /// Payloads are built with `json!`, so there is nothing left to encode.
    pub fn new(event: impl Into<String>, payload: Value) -> Self {
        Self {
            frame_type: EVENT.to_string(),
            event: event.into(),
            payload: Some(payload),
            seq: None,
        }
    }

    pub fn with_seq(self, seq: u64) -> Self {
        Self {
            seq: Some(seq),
            ..self
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorShape {
    pub code: String,
    pub message: String,
}

/// Any client frame, split into its `type` tag and the remaining fields.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl InboundFrame {
    /// The frame as a request, or `None` if it is not a well-formed `req`.
    pub fn into_req(self) -> Option<ReqFrame> {
        if self.frame_type != REQ {
            return None;
        }
        let mut fields = self.rest;
        fields.insert("type".to_string(), Value::from(REQ));
        serde_json::from_value(Value::Object(fields)).ok()
    }
}
