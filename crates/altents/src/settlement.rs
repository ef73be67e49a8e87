//! Read-only calls against the settlement contract through a NEAR RPC node.

use std::sync::Arc;

use base64::Engine;
use num_bigint::BigUint;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::balance::TokenBalances;
use crate::error::Error;
use crate::transport::{call_rpc, Transport};
use crate::types::rpc::JsonRpcRequest;

/// Result of a NEAR `query` with `request_type: call_function`.
#[derive(Debug, Deserialize)]
struct CallFunctionResult {
    #[serde(default)]
    result: Vec<u8>,

    /// Older nodes report contract panics here instead of as an RPC error.
    #[serde(default)]
    error: Option<String>,
}

#[derive(Clone)]
pub struct SettlementClient {
    transport: Arc<dyn Transport>,
    rpc_url: String,
    contract_id: String,
}

impl SettlementClient {
    pub fn new(transport: Arc<dyn Transport>, rpc_url: &str, contract_id: &str) -> Self {
        Self {
            transport,
            rpc_url: rpc_url.to_string(),
            contract_id: contract_id.to_string(),
        }
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// Call a view method with JSON arguments and decode its JSON return value.
    pub async fn view_call<T: DeserializeOwned>(
        &self,
        method_name: &str,
        args: &serde_json::Value,
    ) -> Result<T, Error> {
        let args_base64 = base64::engine::general_purpose::STANDARD.encode(args.to_string());
        let request = JsonRpcRequest::new(
            "query",
            json!({
                "request_type": "call_function",
                "finality": "optimistic",
                "account_id": self.contract_id,
                "method_name": method_name,
                "args_base64": args_base64,
            }),
        );

        let output: CallFunctionResult =
            call_rpc(self.transport.as_ref(), &self.rpc_url, &request).await?;
        if let Some(message) = output.error {
            return Err(Error::Rpc {
                method: method_name.to_string(),
                message,
                code: None,
            });
        }

        serde_json::from_slice(&output.result).map_err(|e| {
            Error::Validation(format!("{method_name} returned invalid JSON: {e}"))
        })
    }

    /// Deposited balances of `account_id` for each token id, in request order.
    pub async fn mt_batch_balance_of(
        &self,
        account_id: &str,
        token_ids: &[String],
    ) -> Result<TokenBalances, Error> {
        let account_id = account_id.to_lowercase();
        debug!(
            "Fetching {} balances for {} from {}",
            token_ids.len(),
            account_id,
            self.contract_id
        );

        let parsed: serde_json::Value = self
            .view_call(
                "mt_batch_balance_of",
                &json!({ "account_id": account_id, "token_ids": token_ids }),
            )
            .await?;

        let amounts = parsed
            .as_array()
            .ok_or_else(|| Error::Validation("balances are not an array".to_string()))?;
        if amounts.len() != token_ids.len() {
            return Err(Error::Validation(format!(
                "expected {} balances, got {}",
                token_ids.len(),
                amounts.len()
            )));
        }

        token_ids
            .iter()
            .zip(amounts)
            .map(|(token_id, amount)| -> Result<(String, BigUint), Error> {
                let amount = amount.as_str().ok_or_else(|| {
                    Error::Validation(format!("balance of {token_id} is not a string"))
                })?;
                let value = BigUint::parse_bytes(amount.as_bytes(), 10).ok_or_else(|| {
                    Error::Validation(format!("balance of {token_id} is not an integer: {amount}"))
                })?;
                Ok((token_id.clone(), value))
            })
            .collect()
    }

    /// Whether `nonce` has already been consumed by `account_id`.
    pub async fn is_nonce_used(&self, account_id: &str, nonce: &str) -> Result<bool, Error> {
        self.view_call(
            "is_nonce_used",
            &json!({ "account_id": account_id, "nonce": nonce }),
        )
        .await
    }
}
