use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

const EMBEDDED_TOKENS: &str = include_str!("../data/tokens.json");

/// Canonical symbol-level asset from the local token list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedAsset {
    /// Settlement-layer identifier of the primary representation.
    pub defuse_asset_id: String,

    pub symbol: String,

    pub name: String,

    pub decimals: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    #[serde(rename = "chainName")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_name: Option<String>,

    #[serde(rename = "chainIcon")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// The same logical asset on other chains.
    #[serde(rename = "groupedTokens")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grouped_tokens: Vec<GroupedToken>,
}

/// One chain-specific variant of a [`UnifiedAsset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedToken {
    #[serde(rename = "defuseAssetId")]
    pub defuse_asset_id: String,

    #[serde(rename = "chainName")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_name: Option<String>,

    #[serde(rename = "chainIcon")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_icon: Option<String>,

    /// May differ from the parent's decimals.
    pub decimals: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl UnifiedAsset {
    /// Whether this asset's own id or one of its grouped ids equals `id`.
    pub fn contains_id(&self, id: &str) -> bool {
        self.defuse_asset_id == id || self.grouped(id).is_some()
    }

    /// The grouped variant with exactly this id.
    pub fn grouped(&self, id: &str) -> Option<&GroupedToken> {
        self.grouped_tokens.iter().find(|g| g.defuse_asset_id == id)
    }

    /// A variant record built from the parent's own fields.
    pub fn as_grouped_token(&self) -> GroupedToken {
        GroupedToken {
            defuse_asset_id: self.defuse_asset_id.clone(),
            chain_name: self.chain_name.clone(),
            chain_icon: self.chain_icon.clone(),
            decimals: self.decimals,
            address: self.address.clone(),
        }
    }
}

/// The canonical, validated list of unified assets.
///
/// Every identifier, parent or grouped, is unique across the registry.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    assets: Vec<UnifiedAsset>,
}

impl TokenRegistry {
    /// Build a registry, checking identifier uniqueness.
    pub fn new(assets: Vec<UnifiedAsset>) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        for asset in &assets {
            let ids = std::iter::once(&asset.defuse_asset_id)
                .chain(asset.grouped_tokens.iter().map(|g| &g.defuse_asset_id));
            for id in ids {
                if id.is_empty() {
                    return Err(Error::Registry(format!(
                        "empty asset id in {}",
                        asset.symbol
                    )));
                }
                if !seen.insert(id.clone()) {
                    return Err(Error::Registry(format!("duplicate asset id {id}")));
                }
            }
        }

        debug!("Loaded token registry with {} assets", assets.len());
        Ok(Self { assets })
    }

    /// Parse a registry from a JSON array of unified assets.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let assets: Vec<UnifiedAsset> =
            serde_json::from_str(json).map_err(|e| Error::Registry(e.to_string()))?;
        Self::new(assets)
    }

    /// Load a registry from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Registry(format!("failed to read {}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// The token list shipped with the crate.
    pub fn embedded() -> Result<Self, Error> {
        Self::from_json(EMBEDDED_TOKENS)
    }

    pub fn assets(&self) -> &[UnifiedAsset] {
        &self.assets
    }

    /// The asset whose primary id is `id`.
    pub fn get(&self, id: &str) -> Option<&UnifiedAsset> {
        self.assets.iter().find(|a| a.defuse_asset_id == id)
    }

    /// The asset owning `id`, either as its primary id or as a grouped variant.
    pub fn find_parent(&self, id: &str) -> Option<&UnifiedAsset> {
        self.assets.iter().find(|a| a.contains_id(id))
    }

    /// Decimals of `id`, taken from its grouped entry when it is a variant.
    pub fn decimals_of(&self, id: &str) -> Option<u8> {
        let parent = self.find_parent(id)?;
        Some(parent.grouped(id).map_or(parent.decimals, |g| g.decimals))
    }

    /// Every parent and grouped id, in registry order.
    pub fn balance_query_ids(&self) -> Vec<String> {
        self.assets
            .iter()
            .flat_map(|a| {
                std::iter::once(a.defuse_asset_id.clone())
                    .chain(a.grouped_tokens.iter().map(|g| g.defuse_asset_id.clone()))
            })
            .collect()
    }
}
