//! Token metadata and price listing.

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::{Error, TransportError};
use crate::transport::Transport;
use crate::types::tokens::{RemoteToken, TokenListResponse};

#[derive(Clone)]
pub struct PriceClient {
    transport: Arc<dyn Transport>,
    url: String,
}

impl PriceClient {
    pub fn new(transport: Arc<dyn Transport>, url: &str) -> Self {
        Self {
            transport,
            url: url.to_string(),
        }
    }

    /// Every token the listing knows, with its latest price.
    pub async fn fetch_tokens(&self) -> Result<Vec<RemoteToken>, Error> {
        let raw = self.transport.get_json(&self.url).await.map_err(|e| {
            error!("Error calling tokens API: {}", e);
            e
        })?;

        let response: TokenListResponse =
            serde_json::from_value(raw).map_err(|e| TransportError::Decode {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;
        debug!("Tokens API listed {} tokens", response.items.len());
        Ok(response.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockTransport;
    use serde_json::json;

    #[tokio::test]
    async fn test_fetch_tokens() {
        let transport = Arc::new(MockTransport::new());
        transport.push(Ok(json!({
            "items": [{
                "defuse_asset_id": "nep141:wrap.near",
                "blockchain": "near",
                "contract_address": "wrap.near",
                "decimals": 24,
                "price": 3.5,
                "price_updated_at": "2025-01-20T10:00:00Z",
                "symbol": "wNEAR"
            }]
        })));

        let tokens = PriceClient::new(transport.clone(), "http://tokens")
            .fetch_tokens()
            .await
            .unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].price, 3.5);

        let sent = transport.requests();
        assert_eq!(sent[0].url, "http://tokens");
        assert!(sent[0].body.is_none());
    }

    #[tokio::test]
    async fn test_fetch_tokens_bad_shape() {
        let transport = Arc::new(MockTransport::new());
        transport.push(Ok(json!({ "tokens": [] })));

        let err = PriceClient::new(transport, "http://tokens")
            .fetch_tokens()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Decode { .. })));
    }
}
