use std::collections::HashMap;

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::Error;
use crate::registry::UnifiedAsset;

/// Settlement-layer balances keyed by asset id (`nep141:...`).
pub type TokenBalances = HashMap<String, BigUint>;

/// Sum an asset's balance and its grouped variants' balances at the asset's
/// decimals, as raw units.
pub fn aggregate_raw_balance(asset: &UnifiedAsset, balances: &TokenBalances) -> BigUint {
    let mut total = balances
        .get(&asset.defuse_asset_id)
        .cloned()
        .unwrap_or_else(BigUint::zero);

    for variant in &asset.grouped_tokens {
        if let Some(balance) = balances.get(&variant.defuse_asset_id) {
            total += rescale(balance, variant.decimals, asset.decimals);
        }
    }

    total
}

/// Aggregated balance of an asset, rendered at the asset's decimals.
pub fn aggregate_balance(asset: &UnifiedAsset, balances: &TokenBalances) -> String {
    format_fixed_point(&aggregate_raw_balance(asset, balances), asset.decimals)
}

/// Convert an amount between decimal precisions. Scaling down truncates.
pub fn rescale(amount: &BigUint, from_decimals: u8, to_decimals: u8) -> BigUint {
    use std::cmp::Ordering;

    match from_decimals.cmp(&to_decimals) {
        Ordering::Equal => amount.clone(),
        Ordering::Greater => amount / pow10(from_decimals - to_decimals),
        Ordering::Less => amount * pow10(to_decimals - from_decimals),
    }
}

fn pow10(exp: u8) -> BigUint {
    BigUint::from(10u32).pow(u32::from(exp))
}

/// Render raw units as a decimal string with `decimals` fractional digits,
/// trimming trailing zeros.
pub fn format_fixed_point(value: &BigUint, decimals: u8) -> String {
    let s = value.to_string();
    let decimals = decimals as usize;

    if decimals == 0 || value.is_zero() {
        return s;
    }

    let (integer_part, decimal_part) = if s.len() <= decimals {
        ("0".to_string(), format!("{s:0>decimals$}"))
    } else {
        let (int, frac) = s.split_at(s.len() - decimals);
        (int.to_string(), frac.to_string())
    };

    let trimmed = decimal_part.trim_end_matches('0');
    if trimmed.is_empty() {
        integer_part
    } else {
        format!("{integer_part}.{trimmed}")
    }
}

/// Truncate the fractional part of a decimal string to `max_decimals` digits.
/// Never rounds.
pub fn limit_decimals(value: &str, max_decimals: usize) -> String {
    let Some((integer_part, fractional_part)) = value.split_once('.') else {
        return value.to_string();
    };
    if fractional_part.is_empty() {
        return value.to_string();
    }

    let limited: String = fractional_part.chars().take(max_decimals).collect();
    if limited.is_empty() {
        integer_part.to_string()
    } else {
        format!("{integer_part}.{limited}")
    }
}

/// Parse a human decimal amount (e.g. `"1.5"`) into raw units.
pub fn parse_units(amount: &str, decimals: u8) -> Result<BigUint, Error> {
    let amount = amount.trim();
    let (integer_part, fractional_part) = amount.split_once('.').unwrap_or((amount, ""));

    if integer_part.is_empty() && fractional_part.is_empty() {
        return Err(Error::Amount(format!("invalid amount {amount:?}")));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(integer_part) || !all_digits(fractional_part) {
        return Err(Error::Amount(format!("invalid amount {amount:?}")));
    }
    if fractional_part.len() > decimals as usize {
        return Err(Error::Amount(format!(
            "{amount} has more than {decimals} decimal places"
        )));
    }

    let digits = format!(
        "{integer_part}{fractional_part:0<width$}",
        width = decimals as usize
    );
    BigUint::parse_bytes(digits.as_bytes(), 10)
        .ok_or_else(|| Error::Amount(format!("invalid amount {amount:?}")))
}
