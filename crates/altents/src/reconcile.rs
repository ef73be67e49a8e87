//! Joins the bridge's token list and the price API's token list onto the
//! canonical registry.

use std::collections::HashMap;

use tracing::debug;

use crate::asset_id::DefuseAssetId;
use crate::registry::{TokenRegistry, UnifiedAsset};
use crate::types::tokens::{BridgeableToken, RemoteToken};

/// One bridgeable chain representation of a symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainVariant {
    pub chain_type: String,
    /// The bridge's chain-qualified identifier for this representation.
    pub defuse_asset_id: DefuseAssetId,
    pub near_token_id: String,
    pub chain_name: Option<String>,
    pub chain_icon: Option<String>,
    pub decimals: u8,
    pub address: String,
}

impl ChainVariant {
    /// Numeric chain id for EVM variants (`eth:<id>:...`).
    pub fn evm_chain_id(&self) -> Option<u64> {
        if self.chain_type == "eth" {
            self.defuse_asset_id.numeric_chain_id()
        } else {
            None
        }
    }

    pub fn is_native(&self) -> bool {
        self.defuse_asset_id.is_native()
    }
}

/// Reconciliation output: every bridgeable variant of one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSymbol {
    pub symbol: String,
    pub name: String,
    pub icon: Option<String>,
    pub parent_defuse_asset_id: String,
    pub chain_variants: Vec<ChainVariant>,
}

/// A registry asset joined with its price record, when the API lists one.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedAsset {
    pub asset: UnifiedAsset,
    pub remote: Option<RemoteToken>,
}

impl PricedAsset {
    pub fn price(&self) -> Option<f64> {
        self.remote.as_ref().map(|r| r.price)
    }
}

/// Per-token mapping before grouping.
struct SymbolChainMapping<'a> {
    parent: &'a UnifiedAsset,
    variant: ChainVariant,
}

/// Reconcile bridge tokens with the registry into one entry per symbol,
/// sorted by symbol. Bridge tokens without a registry parent are dropped.
pub fn reconcile(
    bridge_tokens: &[BridgeableToken],
    registry: &TokenRegistry,
) -> Vec<AggregatedSymbol> {
    let mapped = bridge_tokens
        .iter()
        .filter_map(|token| map_bridge_token(token, registry));
    group_by_symbol(mapped)
}

fn map_bridge_token<'a>(
    token: &BridgeableToken,
    registry: &'a TokenRegistry,
) -> Option<SymbolChainMapping<'a>> {
    let id = match token.parsed_identifier() {
        Ok(id) => id,
        Err(e) => {
            debug!("Dropping bridge token {}: {}", token.asset_name, e);
            return None;
        }
    };
    let settlement_id = token.settlement_asset_id();

    let Some(parent) = registry.find_parent(&settlement_id) else {
        debug!(
            "Dropping bridge token {} ({}): no registry entry for {}",
            token.asset_name, token.defuse_asset_identifier, settlement_id
        );
        return None;
    };

    let grouped = match parent.grouped(&settlement_id) {
        Some(grouped) => grouped.clone(),
        None => parent.as_grouped_token(),
    };

    let address = grouped
        .address
        .filter(|a| !a.is_empty())
        .or_else(|| id.address.clone())
        .unwrap_or_default();

    Some(SymbolChainMapping {
        parent,
        variant: ChainVariant {
            chain_type: id.chain_type.clone(),
            defuse_asset_id: id,
            near_token_id: token.near_token_id.clone(),
            chain_name: grouped.chain_name,
            chain_icon: grouped.chain_icon,
            decimals: grouped.decimals,
            address,
        },
    })
}

fn group_by_symbol<'a>(
    mapped: impl Iterator<Item = SymbolChainMapping<'a>>,
) -> Vec<AggregatedSymbol> {
    let mut result: Vec<AggregatedSymbol> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in mapped {
        match index.get(&item.parent.symbol) {
            Some(&i) => result[i].chain_variants.push(item.variant),
            None => {
                index.insert(item.parent.symbol.clone(), result.len());
                result.push(AggregatedSymbol {
                    symbol: item.parent.symbol.clone(),
                    name: item.parent.name.clone(),
                    icon: item.parent.icon.clone(),
                    parent_defuse_asset_id: item.parent.defuse_asset_id.clone(),
                    chain_variants: vec![item.variant],
                });
            }
        }
    }

    result.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    result
}

/// Join price records onto every registry asset, sorted by primary chain name.
pub fn merge_prices(
    remote_tokens: &[RemoteToken],
    registry: &TokenRegistry,
) -> Vec<PricedAsset> {
    let by_id: HashMap<&str, &RemoteToken> = remote_tokens
        .iter()
        .map(|t| (t.defuse_asset_id.as_str(), t))
        .collect();

    let mut merged: Vec<PricedAsset> = registry
        .assets()
        .iter()
        .map(|asset| PricedAsset {
            asset: asset.clone(),
            remote: by_id.get(asset.defuse_asset_id.as_str()).map(|t| (*t).clone()),
        })
        .collect();

    merged.sort_by(|a, b| {
        let a = a.asset.chain_name.as_deref().unwrap_or("");
        let b = b.asset.chain_name.as_deref().unwrap_or("");
        a.cmp(b)
    });
    merged
}
