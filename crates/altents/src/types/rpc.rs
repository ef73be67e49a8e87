use serde::{Deserialize, Serialize};

/// Request id sent with every call; none of the services echo-match it.
pub const REQUEST_ID: &str = "dontcare";

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub id: String,
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    pub fn new(method: &str, params: serde_json::Value) -> Self {
        Self {
            id: REQUEST_ID.to_string(),
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
        }
    }

    /// Envelope with the positional `[params]` form used by the relay and bridge.
    pub fn positional(method: &str, params: serde_json::Value) -> Self {
        Self::new(method, serde_json::Value::Array(vec![params]))
    }
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: serde_json::Value,

    #[serde(default)]
    pub jsonrpc: Option<String>,

    #[serde(default)]
    pub result: Option<serde_json::Value>,

    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub code: Option<i64>,

    #[serde(default)]
    pub data: Option<serde_json::Value>,
}
