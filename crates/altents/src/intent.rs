//! Building and signing intent messages.

use async_trait::async_trait;
use base64::Engine;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::Error;
use crate::settlement::SettlementClient;
use crate::signature::transform_erc191_signature;
use crate::types::intents::{Intent, IntentMessage, Quote, SignedData, TokenDiff};

/// Signature standard of messages signed by EVM wallets.
pub const ERC191_STANDARD: &str = "erc191";

/// Lifetime of a withdrawal intent.
pub const WITHDRAW_DEADLINE: time::Duration = time::Duration::minutes(10);

/// Wallet signing capability: message in, hex signature out.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    async fn sign_message(&self, message: &str) -> Result<String, Error>;
}

/// 32 random bytes, base64-encoded.
pub fn random_nonce() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Draw nonces until one is unused by `account_id`, at most `max_attempts` times.
pub async fn generate_nonce(
    settlement: &SettlementClient,
    account_id: &str,
    max_attempts: u32,
) -> Result<String, Error> {
    for attempt in 1..=max_attempts {
        let nonce = random_nonce();
        if !settlement.is_nonce_used(account_id, &nonce).await? {
            return Ok(nonce);
        }
        debug!("Nonce collision for {} (attempt {})", account_id, attempt);
    }
    Err(Error::NonceExhausted {
        attempts: max_attempts,
    })
}

/// A `token_diff` swap message that spends `amount_in` of the input asset
/// for `amount_out` of the output asset, valid until the quote expires.
///
/// The diff is keyed by asset id, so swapping an asset for itself is rejected.
pub fn token_diff_message(
    signer_id: &str,
    verifying_contract: &str,
    quote: &Quote,
    input_id: &str,
    output_id: &str,
    nonce: String,
) -> Result<IntentMessage, Error> {
    if input_id == output_id {
        return Err(Error::Validation(format!(
            "cannot swap {input_id} for itself"
        )));
    }

    let mut diff = TokenDiff::new();
    diff.insert(input_id, format!("-{}", quote.amount_in));
    diff.insert(output_id, quote.amount_out.clone());

    Ok(IntentMessage {
        signer_id: signer_id.to_string(),
        verifying_contract: verifying_contract.to_string(),
        deadline: quote.expiration_time.clone(),
        nonce,
        intents: vec![Intent::TokenDiff { diff }],
    })
}

/// An `ft_withdraw` message sending `amount` of `near_token_id` out to
/// `receiver_address` on the token's origin chain.
pub fn ft_withdraw_message(
    signer_id: &str,
    verifying_contract: &str,
    near_token_id: &str,
    amount: &str,
    receiver_address: &str,
    nonce: String,
    deadline: String,
) -> IntentMessage {
    IntentMessage {
        signer_id: signer_id.to_string(),
        verifying_contract: verifying_contract.to_string(),
        deadline,
        nonce,
        intents: vec![Intent::FtWithdraw {
            token: near_token_id.to_string(),
            receiver_id: near_token_id.to_string(),
            amount: amount.to_string(),
            memo: Some(format!("WITHDRAW_TO:{receiver_address}")),
        }],
    }
}

/// RFC 3339 deadline ten minutes after `now`.
pub fn withdraw_deadline(now: OffsetDateTime) -> Result<String, Error> {
    (now + WITHDRAW_DEADLINE)
        .format(&Rfc3339)
        .map_err(|e| Error::Validation(format!("failed to format deadline: {e}")))
}

/// Have the wallet sign the message's payload and wrap it for the relay.
pub async fn sign_intent(
    signer: &dyn MessageSigner,
    message: &IntentMessage,
) -> Result<SignedData, Error> {
    let payload = message
        .to_payload()
        .map_err(|e| Error::Validation(format!("failed to serialize intent: {e}")))?;
    let signature = signer.sign_message(&payload).await?;

    Ok(SignedData {
        standard: ERC191_STANDARD.to_string(),
        payload,
        signature: transform_erc191_signature(&signature)?,
    })
}
