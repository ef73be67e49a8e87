/// EVM chain id for a registry chain name. Non-EVM chains return `None`.
pub fn evm_chain_id(chain_name: &str) -> Option<u64> {
    match chain_name {
        "eth" => Some(1),
        "base" => Some(8453),
        "arbitrum" => Some(42161),
        "gnosis" => Some(100),
        "berachain" => Some(80094),
        "turbochain" => Some(1313161567),
        "aurora" => Some(1313161554),
        _ => None,
    }
}

/// Bridge chain filter (`chain_type:chain_id`) for a CLI argument, which is
/// either already in that form or an EVM chain name such as `base`.
pub fn chain_filter(chain: &str) -> Option<String> {
    if chain.contains(':') {
        return Some(chain.to_string());
    }
    evm_chain_id(chain).map(|id| format!("eth:{id}"))
}

/// Human-readable name for a registry chain name.
pub fn chain_display_name(chain_name: &str) -> String {
    match chain_name {
        "eth" => "Ethereum".to_string(),
        "near" => "NEAR".to_string(),
        "base" => "Base".to_string(),
        "arbitrum" => "Arbitrum One".to_string(),
        "bitcoin" => "Bitcoin".to_string(),
        "solana" => "Solana".to_string(),
        "dogecoin" => "Dogecoin".to_string(),
        "turbochain" => "TurboChain".to_string(),
        "aurora" => "Aurora".to_string(),
        "xrpledger" => "XRP Ledger".to_string(),
        "zcash" => "Zcash".to_string(),
        "gnosis" => "Gnosis".to_string(),
        "berachain" => "Berachain".to_string(),
        other => other.to_string(),
    }
}
