//! Gremlin Server request and response messages.
//!
//! Requests are sent as binary websocket frames: one length byte, the mime
//! type, then the JSON request body. Responses are JSON documents; a query
//! result may span several frames, each with status `206` until the final
//! `200` (or `204` for an empty result).

use crate::graphson;
use gremview_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

/// Mime type announced in every request frame.
pub const MIME_TYPE: &str = "application/vnd.gremlin-v3.0+json";

/// Status codes defined by the Gremlin Server protocol.
pub mod status {
    /// Final frame carrying data.
    pub const SUCCESS: u16 = 200;
    /// Final frame, no data.
    pub const NO_CONTENT: u16 = 204;
    /// More frames follow.
    pub const PARTIAL_CONTENT: u16 = 206;
    /// Server requires authentication.
    pub const AUTHENTICATE: u16 = 407;
}

// ============================================================================
// Request
// ============================================================================

/// An `eval` request for a script.
#[derive(Clone, Debug, Serialize)]
pub struct RequestMessage {
    #[serde(rename = "requestId")]
    request_id: Value,
    op: &'static str,
    processor: &'static str,
    args: Value,
    #[serde(skip)]
    id: Uuid,
}

impl RequestMessage {
    /// Builds an `eval` request with a fresh request id.
    pub fn eval(script: &str, traversal_source: &str) -> Self {
        let id = Uuid::new_v4();
        Self {
            request_id: json!({"@type": "g:UUID", "@value": id.to_string()}),
            op: "eval",
            processor: "",
            args: json!({
                "gremlin": script,
                "language": "gremlin-groovy",
                "bindings": {},
                "aliases": {"g": traversal_source},
            }),
            id,
        }
    }

    /// The request id responses will echo.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Encodes the request as a binary frame.
    pub fn to_frame(&self) -> Result<Vec<u8>> {
        let body = serde_json::to_vec(self)?;
        let mut frame = Vec::with_capacity(1 + MIME_TYPE.len() + body.len());
        frame.push(MIME_TYPE.len() as u8);
        frame.extend_from_slice(MIME_TYPE.as_bytes());
        frame.extend_from_slice(&body);
        Ok(frame)
    }
}

// ============================================================================
// Response
// ============================================================================

/// Status block of a response frame.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResponseStatus {
    /// Protocol status code.
    pub code: u16,
    /// Server message, usually empty on success.
    #[serde(default)]
    pub message: String,
}

/// Result block of a response frame.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResponseResult {
    /// GraphSON-encoded data.
    #[serde(default)]
    pub data: Value,
}

/// One response frame.
#[derive(Clone, Debug, Deserialize)]
pub struct ResponseMessage {
    /// Echoed request id.
    #[serde(rename = "requestId", default)]
    pub request_id: Value,
    /// Status block.
    pub status: ResponseStatus,
    /// Result block.
    #[serde(default)]
    pub result: ResponseResult,
}

/// What a response frame means for the request in flight.
#[derive(Debug, PartialEq)]
pub enum Progress {
    /// More frames follow; these items are a prefix of the result.
    Partial(Vec<Value>),
    /// The result is complete with these final items.
    Done(Vec<Value>),
}

impl ResponseMessage {
    /// Parses a response frame.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Whether this frame answers the request with the given id.
    ///
    /// Frames without a request id are attributed to the request in flight.
    pub fn answers(&self, id: &Uuid) -> bool {
        match graphson::decode(&self.request_id) {
            Value::String(s) => s.eq_ignore_ascii_case(&id.to_string()),
            _ => true,
        }
    }

    /// Interprets the frame, decoding GraphSON data into plain JSON.
    pub fn into_progress(self) -> Result<Progress> {
        match self.status.code {
            status::SUCCESS => Ok(Progress::Done(items_of(&self.result.data))),
            status::NO_CONTENT => Ok(Progress::Done(Vec::new())),
            status::PARTIAL_CONTENT => Ok(Progress::Partial(items_of(&self.result.data))),
            status::AUTHENTICATE => Err(Error::execution(
                Some(status::AUTHENTICATE),
                "Server requires authentication",
            )),
            code => {
                let message = if self.status.message.is_empty() {
                    format!("Server returned status {code}")
                } else {
                    self.status.message
                };
                Err(Error::execution(Some(code), message))
            }
        }
    }
}

fn items_of(data: &Value) -> Vec<Value> {
    match graphson::decode(data) {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        single => vec![single],
    }
}

// ============================================================================
// Tests
// ============================================================================
