//! Bridge service: supported tokens and deposit addresses.

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use crate::asset_id::DefuseAssetId;
use crate::error::Error;
use crate::transport::{call_rpc, Transport};
use crate::types::rpc::JsonRpcRequest;
use crate::types::tokens::{BridgeableToken, DepositAddressResponse, SupportedTokensResponse};

#[derive(Clone)]
pub struct BridgeClient {
    transport: Arc<dyn Transport>,
    url: String,
}

impl BridgeClient {
    pub fn new(transport: Arc<dyn Transport>, url: &str) -> Self {
        Self {
            transport,
            url: url.to_string(),
        }
    }

    /// Tokens the bridge supports, optionally limited to `chains`
    /// (`chain_type:chain_id` strings).
    pub async fn supported_tokens(
        &self,
        chains: Option<&[String]>,
    ) -> Result<Vec<BridgeableToken>, Error> {
        let params = match chains {
            Some(chains) => json!({ "chains": chains }),
            None => json!({}),
        };
        let response: SupportedTokensResponse = call_rpc(
            self.transport.as_ref(),
            &self.url,
            &JsonRpcRequest::positional("supported_tokens", params),
        )
        .await?;

        let tokens = response.tokens.unwrap_or_default();
        debug!("Bridge supports {} tokens", tokens.len());
        Ok(tokens)
    }

    /// Address on `asset`'s chain that credits deposits to `account_id`.
    pub async fn deposit_address(
        &self,
        account_id: &str,
        asset: &DefuseAssetId,
    ) -> Result<String, Error> {
        let params = json!({
            "account_id": account_id.to_lowercase(),
            "chain": asset.chain(),
        });
        let response: DepositAddressResponse = call_rpc(
            self.transport.as_ref(),
            &self.url,
            &JsonRpcRequest::positional("deposit_address", params),
        )
        .await?;
        Ok(response.address)
    }
}
