use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AssetIdError;

/// Standard prefix of fungible tokens held by the settlement contract.
pub const NEP141_PREFIX: &str = "nep141";

/// Composite bridge/relay asset identifier: `chain_type:chain_id[:address]`.
///
/// Examples: `eth:1:0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48`,
/// `eth:8453:native`, `near:mainnet:wrap.near`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DefuseAssetId {
    pub chain_type: String,
    pub chain_id: String,
    pub address: Option<String>,
}

impl DefuseAssetId {
    /// `chain_type:chain_id`, the form the bridge expects for deposit addresses.
    pub fn chain(&self) -> String {
        format!("{}:{}", self.chain_type, self.chain_id)
    }

    /// Whether the address part denotes the chain's native currency.
    pub fn is_native(&self) -> bool {
        self.address.as_deref() == Some("native")
    }

    /// Numeric chain id, when the chain id part is a number (EVM chains).
    pub fn numeric_chain_id(&self) -> Option<u64> {
        self.chain_id.parse().ok()
    }
}

impl FromStr for DefuseAssetId {
    type Err = AssetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        let (chain_type, chain_id, address) = match parts.as_slice() {
            [chain_type, chain_id] => (*chain_type, *chain_id, None),
            [chain_type, chain_id, address] => (*chain_type, *chain_id, Some(*address)),
            _ => return Err(AssetIdError::Malformed(s.to_string())),
        };

        let non_empty = |part: &'static str, value: &str| {
            if value.is_empty() {
                Err(AssetIdError::EmptyPart {
                    part,
                    id: s.to_string(),
                })
            } else {
                Ok(value.to_string())
            }
        };

        Ok(Self {
            chain_type: non_empty("chain type", chain_type)?,
            chain_id: non_empty("chain id", chain_id)?,
            address: address.map(|a| non_empty("address", a)).transpose()?,
        })
    }
}

impl TryFrom<String> for DefuseAssetId {
    type Error = AssetIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DefuseAssetId> for String {
    fn from(id: DefuseAssetId) -> Self {
        id.to_string()
    }
}

impl fmt::Display for DefuseAssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chain_type, self.chain_id)?;
        if let Some(ref address) = self.address {
            write!(f, ":{address}")?;
        }
        Ok(())
    }
}

/// Settlement-layer identifier for a NEP-141 token (`nep141:<token_id>`).
pub fn nep141_asset_id(near_token_id: &str) -> String {
    format!("{NEP141_PREFIX}:{near_token_id}")
}
