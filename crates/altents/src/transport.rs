use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::{Error, TransportError};
use crate::types::rpc::{JsonRpcRequest, JsonRpcResponse};

/// HTTP seam between the clients and the remote services.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body and return the decoded JSON response.
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TransportError>;

    /// GET a JSON document.
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, TransportError>;
}

/// reqwest-backed transport. Each call is an independent request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn decode(
        url: &str,
        response: reqwest::Response,
    ) -> Result<serde_json::Value, TransportError> {
        let status = response.status();
        let body = response.bytes().await.map_err(|e| TransportError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        decode_body(url, status, &body)
    }
}

/// Decode a response body.
///
/// A non-2xx response whose body is a JSON object with an `error` member is
/// passed through so [`call_rpc`] can surface the service's message. Any
/// other non-2xx response is a [`TransportError::Status`].
fn decode_body(
    url: &str,
    status: reqwest::StatusCode,
    body: &[u8],
) -> Result<serde_json::Value, TransportError> {
    if !status.is_success() {
        return match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) if value.get("error").is_some() => {
                debug!("{} returned status {} with an error body", url, status);
                Ok(value)
            }
            _ => Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }),
        };
    }

    serde_json::from_slice(body).map_err(|e| TransportError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Self::decode(url, response).await
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, TransportError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Self::decode(url, response).await
    }
}

/// Send a JSON-RPC request and decode its `result`.
///
/// An `error` member or a missing `result` is an [`Error::Rpc`].
pub async fn call_rpc<T: DeserializeOwned>(
    transport: &dyn Transport,
    url: &str,
    request: &JsonRpcRequest,
) -> Result<T, Error> {
    debug!("Calling {} on {}", request.method, url);

    let body = serde_json::to_value(request).map_err(|e| TransportError::Decode {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let raw = transport.post_json(url, &body).await.map_err(|e| {
        error!("Error calling {}: {}", request.method, e);
        e
    })?;

    let response: JsonRpcResponse =
        serde_json::from_value(raw).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    if let Some(rpc_error) = response.error {
        let message = rpc_error
            .message
            .unwrap_or_else(|| "Unknown RPC error".to_string());
        error!("Error calling {}: {}", request.method, message);
        return Err(Error::Rpc {
            method: request.method.clone(),
            message,
            code: rpc_error.code,
        });
    }

    let result = match response.result {
        Some(serde_json::Value::Null) | None => {
            return Err(Error::Rpc {
                method: request.method.clone(),
                message: "No result returned from RPC".to_string(),
                code: None,
            })
        }
        Some(result) => result,
    };

    serde_json::from_value(result).map_err(|e| {
        Error::Transport(TransportError::Decode {
            url: url.to_string(),
            reason: format!("unexpected {} result: {e}", request.method),
        })
    })
}
