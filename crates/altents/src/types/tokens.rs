use serde::{Deserialize, Serialize};

use crate::asset_id::{nep141_asset_id, DefuseAssetId};
use crate::error::AssetIdError;

/// Token metadata and price from the token listing API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteToken {
    /// Settlement-layer identifier, e.g. `nep141:wrap.near`.
    pub defuse_asset_id: String,

    pub blockchain: String,

    pub contract_address: String,

    pub decimals: u8,

    /// USD price, for display only.
    pub price: f64,

    #[serde(default)]
    pub price_updated_at: Option<String>,

    pub symbol: String,
}

/// Body of the token listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenListResponse {
    pub items: Vec<RemoteToken>,
}

/// A token the bridge can deposit and withdraw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeableToken {
    pub asset_name: String,

    pub decimals: u8,

    /// Chain-qualified identifier on the origin chain, as sent by the bridge.
    /// Parsed per token so one malformed entry does not fail the listing.
    pub defuse_asset_identifier: String,

    pub min_deposit_amount: String,

    pub min_withdrawal_amount: String,

    /// NEP-141 token id of the bridged representation on NEAR.
    pub near_token_id: String,

    pub withdrawal_fee: serde_json::Number,
}

impl BridgeableToken {
    /// Identifier of this token on the settlement layer.
    pub fn settlement_asset_id(&self) -> String {
        nep141_asset_id(&self.near_token_id)
    }

    pub fn parsed_identifier(&self) -> Result<DefuseAssetId, AssetIdError> {
        self.defuse_asset_identifier.parse()
    }
}

/// Result of the bridge's `supported_tokens` method.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportedTokensResponse {
    #[serde(default)]
    pub tokens: Option<Vec<BridgeableToken>>,
}

/// Result of the bridge's `deposit_address` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositAddressResponse {
    pub address: String,
    pub chain: String,
}
