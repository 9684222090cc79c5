//! Request and response envelopes exchanged with the host.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// One named call to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub event_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl RequestEnvelope {
    pub fn new(event_name: impl Into<String>, payload: Option<Value>) -> Self {
        RequestEnvelope {
            event_name: event_name.into(),
            payload,
        }
    }

    /// JSON body posted to the host; an empty object when there is no payload.
    pub fn body(&self) -> Value {
        self.payload.clone().unwrap_or_else(|| json!({}))
    }
}

/// `{ success, data | error, ...fields }` as returned by host handlers.
///
/// Handlers are not consistent about where they put their result: most use
/// `data`, some use an endpoint-specific key. Failure text may arrive as
/// `error`, `message` or both; `error` wins. Everything else is kept in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T = Value> {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> ResponseEnvelope<T> {
    pub fn ok(data: T) -> Self {
        ResponseEnvelope {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            extra: Map::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        ResponseEnvelope {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
            extra: Map::new(),
        }
    }

    /// Split into the data of a successful response or the host's error text.
    pub fn into_result(self) -> Result<Option<T>, String> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self
                .error
                .or(self.message)
                .unwrap_or_else(|| "request rejected by host".to_string()))
        }
    }
}

impl ResponseEnvelope<Value> {
    /// Like [`into_result`](Self::into_result), but looks the result up under
    /// `key` first when the handler does not use `data`.
    pub fn into_payload(mut self, key: &str) -> Result<Option<Value>, String> {
        if self.success && key != "data" {
            if let Some(v) = self.extra.remove(key) {
                return Ok(Some(v));
            }
        }
        self.into_result()
    }
}
