pub mod asset_id;
pub mod balance;
pub mod bridge;
pub mod chains;
pub mod client;
pub mod config;
pub mod error;
pub mod intent;
pub mod prices;
pub mod reconcile;
pub mod registry;
pub mod relay;
pub mod settlement;
pub mod signature;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_utils;

use error::Error;

// Re-exports for convenience
pub use asset_id::DefuseAssetId;
pub use balance::{
    aggregate_balance, format_fixed_point, limit_decimals, parse_units, TokenBalances,
};
pub use client::IntentsClient;
pub use config::{Config, PollConfig};
pub use intent::MessageSigner;
pub use reconcile::{merge_prices, reconcile, AggregatedSymbol, ChainVariant, PricedAsset};
pub use registry::{GroupedToken, TokenRegistry, UnifiedAsset};
pub use relay::PollOutcome;
pub use transport::{HttpTransport, Transport};

/// Deposited balance of every registry asset for `account_id`, formatted
/// with each asset's decimals.
///
/// Issues a single batch query covering all primary and grouped ids.
pub async fn registry_balances(
    client: &IntentsClient,
    registry: &TokenRegistry,
    account_id: &str,
) -> Result<Vec<(UnifiedAsset, String)>, Error> {
    let token_ids = registry.balance_query_ids();
    let balances = client.deposited_balances(account_id, &token_ids).await?;

    Ok(registry
        .assets()
        .iter()
        .map(|asset| (asset.clone(), aggregate_balance(asset, &balances)))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::test_utils::{view_call_args, MockTransport};

    fn client(transport: Arc<MockTransport>) -> IntentsClient {
        let config = Config {
            near_rpc_url: "http://near".to_string(),
            ..Config::default()
        };
        IntentsClient::new(config, transport)
    }

    #[tokio::test]
    async fn test_registry_balances_single_batch() {
        let registry = TokenRegistry::embedded().unwrap();
        let ids = registry.balance_query_ids();
        assert_eq!(ids.len(), 10);

        // ETH: parent + base + arb + aurora, USDC: parent + eth + base + arb,
        // then wNEAR and BTC.
        let amounts = json!([
            "1000000000000000000",
            "500000000000000000",
            "0",
            "0",
            "2000000",
            "0",
            "0",
            "0",
            "0",
            "150000000"
        ]);
        let transport = Arc::new(MockTransport::new());
        transport.push_view_result(amounts);

        let balances = registry_balances(&client(transport.clone()), &registry, "Alice.near")
            .await
            .unwrap();

        let by_symbol: std::collections::HashMap<_, _> = balances
            .iter()
            .map(|(asset, balance)| (asset.symbol.as_str(), balance.as_str()))
            .collect();
        assert_eq!(by_symbol["ETH"], "1.5");
        assert_eq!(by_symbol["USDC"], "2");
        assert_eq!(by_symbol["wNEAR"], "0");
        assert_eq!(by_symbol["BTC"], "1.5");

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(view_call_args(&sent[0])["account_id"], "alice.near");
    }

    #[tokio::test]
    async fn test_registry_balances_propagates_errors() {
        let registry = TokenRegistry::embedded().unwrap();
        let transport = Arc::new(MockTransport::new());
        transport.push_failure();

        let err = registry_balances(&client(transport), &registry, "alice.near")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
