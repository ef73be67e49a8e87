use thiserror::Error;

/// Unified error type for the intents client library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("rpc error calling {method}: {message}")]
    Rpc {
        method: String,
        message: String,
        code: Option<i64>,
    },

    #[error("invalid response: {0}")]
    Validation(String),

    #[error("signature error: {0}")]
    Signature(#[from] SignatureError),

    #[error("asset id error: {0}")]
    AssetId(#[from] AssetIdError),

    #[error("token registry error: {0}")]
    Registry(String),

    #[error("amount error: {0}")]
    Amount(String),

    /// Reported by wallet signer implementations.
    #[error("signer error: {0}")]
    Signer(String),

    #[error("no unused nonce found after {attempts} attempts")]
    NonceExhausted { attempts: u32 },

    #[error("config error: {0}")]
    Config(String),
}

/// Errors while talking HTTP to one of the remote services.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Errors while normalizing a wallet signature.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid hex signature: {0}")]
    InvalidHex(String),

    #[error("signature is empty")]
    Empty,

    #[error("invalid recovery byte: {0}")]
    InvalidRecoveryByte(u8),
}

/// Errors while parsing composite asset identifiers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetIdError {
    #[error("expected `chain:chain_id[:address]`, got {0:?}")]
    Malformed(String),

    #[error("empty {part} in asset id {id:?}")]
    EmptyPart { part: &'static str, id: String },
}
