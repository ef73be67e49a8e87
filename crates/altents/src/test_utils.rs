//! Scripted transport and signer for client tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use base64::Engine;
use serde_json::json;

use crate::error::{Error, TransportError};
use crate::intent::MessageSigner;
use crate::transport::Transport;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    /// `None` for GET requests.
    pub body: Option<serde_json::Value>,
}

/// Returns queued responses in order and records every request.
/// An exhausted queue answers with a transport failure.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<serde_json::Value, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, response: Result<serde_json::Value, TransportError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Queue a successful JSON-RPC response.
    pub fn push_result(&self, result: serde_json::Value) {
        self.push(Ok(json!({ "id": "dontcare", "jsonrpc": "2.0", "result": result })));
    }

    pub fn push_rpc_error(&self, code: i64, message: &str) {
        self.push(Ok(json!({
            "id": "dontcare",
            "jsonrpc": "2.0",
            "error": { "code": code, "message": message }
        })));
    }

    pub fn push_failure(&self) {
        self.push(Err(TransportError::Request {
            url: "mock".to_string(),
            reason: "connection refused".to_string(),
        }));
    }

    /// Queue a NEAR `call_function` response whose return value is `value`.
    pub fn push_view_result(&self, value: serde_json::Value) {
        let bytes = serde_json::to_vec(&value).unwrap();
        self.push_result(json!({
            "result": bytes,
            "logs": [],
            "block_height": 1,
            "block_hash": "11111111111111111111111111111111"
        }));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self) -> Result<serde_json::Value, TransportError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Err(TransportError::Request {
                    url: "mock".to_string(),
                    reason: "no scripted response".to_string(),
                })
            })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            body: Some(body.clone()),
        });
        self.next()
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, TransportError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            body: None,
        });
        self.next()
    }
}

/// Signs every message with the same hex signature and keeps what it signed.
pub struct FixedSigner {
    pub signature: String,
    pub signed: Mutex<Vec<String>>,
}

impl FixedSigner {
    pub fn new(v: u8) -> Self {
        Self {
            signature: format!("0x{}{:02x}", "ab".repeat(64), v),
            signed: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MessageSigner for FixedSigner {
    async fn sign_message(&self, message: &str) -> Result<String, Error> {
        self.signed.lock().unwrap().push(message.to_string());
        Ok(self.signature.clone())
    }
}

/// Decode the base64 JSON `args_base64` of a recorded NEAR view call.
pub fn view_call_args(request: &RecordedRequest) -> serde_json::Value {
    let args = request.body.as_ref().unwrap()["params"]["args_base64"]
        .as_str()
        .unwrap()
        .to_string();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(args)
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
