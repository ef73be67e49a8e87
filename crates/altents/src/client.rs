use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;

use crate::balance::{aggregate_balance, TokenBalances};
use crate::bridge::BridgeClient;
use crate::config::Config;
use crate::error::Error;
use crate::intent::{
    ft_withdraw_message, generate_nonce, sign_intent, token_diff_message, withdraw_deadline,
    MessageSigner,
};
use crate::prices::PriceClient;
use crate::reconcile::{merge_prices, reconcile, AggregatedSymbol, PricedAsset};
use crate::registry::{TokenRegistry, UnifiedAsset};
use crate::relay::{PollOutcome, RelayClient};
use crate::settlement::SettlementClient;
use crate::transport::{HttpTransport, Transport};
use crate::types::intents::{IntentStatus, PublishIntentRequest, PublishIntentResponse, Quote};

/// Entry point bundling every service client behind one transport.
///
/// Construct once and share; it holds no mutable state.
#[derive(Clone)]
pub struct IntentsClient {
    config: Config,
    relay: RelayClient,
    bridge: BridgeClient,
    prices: PriceClient,
    settlement: SettlementClient,
}

impl IntentsClient {
    pub fn new(config: Config, transport: Arc<dyn Transport>) -> Self {
        Self {
            relay: RelayClient::new(transport.clone(), &config.relay_url),
            bridge: BridgeClient::new(transport.clone(), &config.bridge_url),
            prices: PriceClient::new(transport.clone(), &config.tokens_api_url),
            settlement: SettlementClient::new(
                transport,
                &config.near_rpc_url,
                &config.verifying_contract,
            ),
            config,
        }
    }

    /// Client over HTTP with the configured request timeout.
    pub fn with_http(config: Config) -> Result<Self, Error> {
        config.validate()?;
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn relay(&self) -> &RelayClient {
        &self.relay
    }

    pub fn bridge(&self) -> &BridgeClient {
        &self.bridge
    }

    pub fn prices(&self) -> &PriceClient {
        &self.prices
    }

    pub fn settlement(&self) -> &SettlementClient {
        &self.settlement
    }

    /// Bridge tokens reconciled against the registry, optionally limited to
    /// `chains` (`chain_type:chain_id`).
    pub async fn bridgeable_assets(
        &self,
        registry: &TokenRegistry,
        chains: Option<&[String]>,
    ) -> Result<Vec<AggregatedSymbol>, Error> {
        let tokens = self.bridge.supported_tokens(chains).await?;
        Ok(reconcile(&tokens, registry))
    }

    /// Registry assets joined with the listing's prices.
    pub async fn priced_assets(&self, registry: &TokenRegistry) -> Result<Vec<PricedAsset>, Error> {
        let tokens = self.prices.fetch_tokens().await?;
        Ok(merge_prices(&tokens, registry))
    }

    pub async fn deposited_balances(
        &self,
        account_id: &str,
        token_ids: &[String],
    ) -> Result<TokenBalances, Error> {
        self.settlement.mt_batch_balance_of(account_id, token_ids).await
    }

    /// Aggregated deposited balance of one asset across its chain variants.
    pub async fn asset_balance(&self, account_id: &str, asset: &UnifiedAsset) -> Result<String, Error> {
        let token_ids: Vec<String> = std::iter::once(asset.defuse_asset_id.clone())
            .chain(asset.grouped_tokens.iter().map(|g| g.defuse_asset_id.clone()))
            .collect();
        let balances = self.deposited_balances(account_id, &token_ids).await?;
        Ok(aggregate_balance(asset, &balances))
    }

    pub async fn fetch_quote(
        &self,
        input_id: &str,
        output_id: &str,
        exact_amount_in: &str,
    ) -> Option<Quote> {
        self.relay
            .fetch_quote(input_id, output_id, exact_amount_in)
            .await
    }

    /// Sign and publish a swap intent for `quote`.
    pub async fn publish_intent(
        &self,
        signer: &dyn MessageSigner,
        signer_address: &str,
        quote: &Quote,
        input_id: &str,
        output_id: &str,
    ) -> Result<PublishIntentResponse, Error> {
        let signer_id = signer_address.to_lowercase();
        let nonce = self.fresh_nonce(&signer_id).await?;
        let message = token_diff_message(
            &signer_id,
            &self.config.verifying_contract,
            quote,
            input_id,
            output_id,
            nonce,
        )?;

        info!(
            "Publishing swap intent {} -> {} for {}",
            input_id, output_id, signer_id
        );
        let signed_data = sign_intent(signer, &message).await?;
        self.relay
            .publish_intent(&PublishIntentRequest {
                quote_hashes: vec![quote.quote_hash.clone()],
                signed_data,
            })
            .await
    }

    /// Sign and publish a withdrawal of `amount` raw units of `near_token_id`
    /// back to `signer_address`.
    pub async fn publish_withdraw_intent(
        &self,
        signer: &dyn MessageSigner,
        signer_address: &str,
        near_token_id: &str,
        amount: &str,
    ) -> Result<PublishIntentResponse, Error> {
        let signer_id = signer_address.to_lowercase();
        let nonce = self.fresh_nonce(&signer_id).await?;
        let message = ft_withdraw_message(
            &signer_id,
            &self.config.verifying_contract,
            near_token_id,
            amount,
            &signer_id,
            nonce,
            withdraw_deadline(OffsetDateTime::now_utc())?,
        );

        info!(
            "Publishing withdrawal of {} {} for {}",
            amount, near_token_id, signer_id
        );
        let signed_data = sign_intent(signer, &message).await?;
        self.relay
            .publish_intent(&PublishIntentRequest {
                quote_hashes: Vec::new(),
                signed_data,
            })
            .await
    }

    pub async fn get_intent_status(&self, intent_hash: &str) -> IntentStatus {
        self.relay.get_intent_status(intent_hash).await
    }

    /// Poll with the configured interval and attempt budget.
    pub async fn poll_intent_status(&self, intent_hash: &str) -> PollOutcome {
        self.relay
            .poll_intent_status(intent_hash, &self.config.poll)
            .await
    }

    async fn fresh_nonce(&self, signer_id: &str) -> Result<String, Error> {
        generate_nonce(&self.settlement, signer_id, self.config.max_nonce_attempts).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::PollConfig;
    use crate::signature::transform_erc191_signature;
    use crate::test_utils::{view_call_args, FixedSigner, MockTransport};

    fn client(transport: Arc<MockTransport>) -> IntentsClient {
        let config = Config {
            relay_url: "http://relay".to_string(),
            bridge_url: "http://bridge".to_string(),
            tokens_api_url: "http://tokens".to_string(),
            near_rpc_url: "http://near".to_string(),
            poll: PollConfig {
                interval_ms: 1,
                max_attempts: 5,
            },
            ..Config::default()
        };
        IntentsClient::new(config, transport)
    }

    fn quote() -> Quote {
        Quote {
            quote_hash: "qh".to_string(),
            defuse_asset_identifier_in: "nep141:wrap.near".to_string(),
            defuse_asset_identifier_out: "nep141:usdc.near".to_string(),
            amount_in: "1000".to_string(),
            amount_out: "990".to_string(),
            expiration_time: "2025-01-20T10:00:00Z".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_intent_flow() {
        let transport = Arc::new(MockTransport::new());
        transport.push_view_result(json!(false));
        transport.push_result(json!({ "status": "OK", "intent_hash": "ih" }));
        let signer = FixedSigner::new(27);

        let response = client(transport.clone())
            .publish_intent(
                &signer,
                "0xABC",
                &quote(),
                "nep141:wrap.near",
                "nep141:usdc.near",
            )
            .await
            .unwrap();
        assert!(response.is_ok());
        assert_eq!(response.intent_hash, "ih");

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].url, "http://near");
        let nonce = view_call_args(&sent[0])["nonce"].clone();
        assert_eq!(view_call_args(&sent[0])["account_id"], "0xabc");

        assert_eq!(sent[1].url, "http://relay");
        let body = sent[1].body.clone().unwrap();
        assert_eq!(body["method"], "publish_intent");
        let params = &body["params"][0];
        assert_eq!(params["quote_hashes"], json!(["qh"]));
        assert_eq!(params["signed_data"]["standard"], "erc191");
        assert_eq!(
            params["signed_data"]["signature"],
            transform_erc191_signature(&signer.signature).unwrap()
        );

        let payload = params["signed_data"]["payload"].as_str().unwrap();
        assert_eq!(signer.signed.lock().unwrap()[0], payload);
        let message: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(message["signer_id"], "0xabc");
        assert_eq!(message["verifying_contract"], "intents.near");
        assert_eq!(message["deadline"], "2025-01-20T10:00:00Z");
        assert_eq!(message["nonce"], nonce);
        assert_eq!(
            message["intents"][0]["diff"],
            json!({ "nep141:wrap.near": "-1000", "nep141:usdc.near": "990" })
        );
    }

    #[tokio::test]
    async fn test_publish_intent_bad_signature_is_not_sent() {
        let transport = Arc::new(MockTransport::new());
        transport.push_view_result(json!(false));
        let signer = FixedSigner::new(5);

        let err = client(transport.clone())
            .publish_intent(&signer, "0xabc", &quote(), "a", "b")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Signature(_)));
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_intent_same_asset_is_not_signed() {
        let transport = Arc::new(MockTransport::new());
        transport.push_view_result(json!(false));
        let signer = FixedSigner::new(27);

        let err = client(transport.clone())
            .publish_intent(&signer, "0xabc", &quote(), "nep141:a", "nep141:a")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(signer.signed.lock().unwrap().is_empty());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_publish_withdraw_intent() {
        let transport = Arc::new(MockTransport::new());
        transport.push_view_result(json!(false));
        transport.push_result(json!({ "status": "OK", "intent_hash": "wh" }));
        let signer = FixedSigner::new(0);

        let response = client(transport.clone())
            .publish_withdraw_intent(&signer, "0xABC", "eth.omft.near", "500")
            .await
            .unwrap();
        assert_eq!(response.intent_hash, "wh");

        let body = transport.requests()[1].body.clone().unwrap();
        let params = &body["params"][0];
        assert_eq!(params["quote_hashes"], json!([]));
        let payload = params["signed_data"]["payload"].as_str().unwrap();
        let message: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(
            message["intents"][0],
            json!({
                "intent": "ft_withdraw",
                "token": "eth.omft.near",
                "receiver_id": "eth.omft.near",
                "amount": "500",
                "memo": "WITHDRAW_TO:0xabc"
            })
        );
        assert!(message["deadline"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_asset_balance_aggregates_variants() {
        let registry = TokenRegistry::embedded().unwrap();
        let usdc = registry
            .get("nep141:17208628f84f5d6ad33f0da3bbbeb27ffcb398eac501a31bd6ad2011e36133a1")
            .unwrap();

        let transport = Arc::new(MockTransport::new());
        transport.push_view_result(json!(["1000000", "500000", "0", "250000"]));

        let balance = client(transport.clone())
            .asset_balance("alice.near", usdc)
            .await
            .unwrap();
        assert_eq!(balance, "1.75");

        let args = view_call_args(&transport.requests()[0]);
        assert_eq!(args["token_ids"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_bridgeable_assets() {
        let registry = TokenRegistry::embedded().unwrap();
        let transport = Arc::new(MockTransport::new());
        transport.push_result(json!({
            "tokens": [
                {
                    "asset_name": "ETH",
                    "decimals": 18,
                    "defuse_asset_identifier": "eth:8453:native",
                    "min_deposit_amount": "1",
                    "min_withdrawal_amount": "1",
                    "near_token_id": "base.omft.near",
                    "withdrawal_fee": 0
                },
                {
                    "asset_name": "PEPE",
                    "decimals": 18,
                    "defuse_asset_identifier": "eth:1:0x6982",
                    "min_deposit_amount": "1",
                    "min_withdrawal_amount": "1",
                    "near_token_id": "eth-0x6982.omft.near",
                    "withdrawal_fee": 0
                },
                {
                    "asset_name": "USDC",
                    "decimals": 6,
                    "defuse_asset_identifier": "stellar:mainnet:USDC:GA5Z",
                    "min_deposit_amount": "1",
                    "min_withdrawal_amount": "1",
                    "near_token_id": "base-0x833589fcd6edb6e08f4c7c32d4f71b54bda02913.omft.near",
                    "withdrawal_fee": 0
                }
            ]
        }));

        let chains = vec!["eth:8453".to_string(), "eth:1".to_string()];
        let assets = client(transport.clone())
            .bridgeable_assets(&registry, Some(&chains))
            .await
            .unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].symbol, "ETH");
        assert_eq!(assets[0].chain_variants.len(), 1);
        assert_eq!(assets[0].chain_variants[0].chain_name.as_deref(), Some("base"));

        let body = transport.requests()[0].body.clone().unwrap();
        assert_eq!(body["params"], json!([{ "chains": ["eth:8453", "eth:1"] }]));
    }

    #[tokio::test]
    async fn test_poll_uses_configured_budget() {
        let transport = Arc::new(MockTransport::new());
        for _ in 0..5 {
            transport.push_result(json!({ "status": "PENDING" }));
        }

        let outcome = client(transport.clone()).poll_intent_status("ih").await;
        assert_eq!(outcome, PollOutcome::TimedOut { attempts: 5 });
        assert_eq!(transport.requests().len(), 5);
    }
}
