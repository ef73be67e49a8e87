use serde::{Deserialize, Serialize, Serializer};

/// A time-bounded exchange rate issued by the solver relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub quote_hash: String,

    pub defuse_asset_identifier_in: String,

    pub defuse_asset_identifier_out: String,

    pub amount_in: String,

    pub amount_out: String,

    /// Expiration as sent by the relay; reused verbatim as the intent deadline.
    pub expiration_time: String,
}

/// Parameters of the relay's `quote` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub defuse_asset_identifier_in: String,
    pub defuse_asset_identifier_out: String,
    pub exact_amount_in: String,
}

/// Settlement lifecycle of a published intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentStatus {
    Pending,
    TxBroadcasted,
    Settled,
    NotFoundOrNotValidAnymore,
}

impl IntentStatus {
    /// `Settled` and `NotFoundOrNotValidAnymore` never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Settled | Self::NotFoundOrNotValidAnymore)
    }
}

/// Result of the relay's `get_status` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentStatusResponse {
    pub status: IntentStatus,

    #[serde(default)]
    pub intent_hash: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "FAILED")]
    Failed,
}

/// Result of the relay's `publish_intent` method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishIntentResponse {
    pub status: PublishStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default)]
    pub intent_hash: String,
}

impl PublishIntentResponse {
    pub fn is_ok(&self) -> bool {
        self.status == PublishStatus::Ok
    }
}

/// The message a wallet signs. Its pretty JSON form is the signed payload.
#[derive(Debug, Clone, Serialize)]
pub struct IntentMessage {
    pub signer_id: String,
    pub verifying_contract: String,
    pub deadline: String,
    pub nonce: String,
    pub intents: Vec<Intent>,
}

impl IntentMessage {
    /// Two-space indented JSON, as presented to the wallet.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    TokenDiff {
        diff: TokenDiff,
    },
    FtWithdraw {
        token: String,
        receiver_id: String,
        amount: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        memo: Option<String>,
    },
}

/// Signed balance changes keyed by settlement asset id, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenDiff(Vec<(String, String)>);

impl TokenDiff {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset_id: impl Into<String>, delta: impl Into<String>) {
        self.0.push((asset_id.into(), delta.into()));
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.0
    }
}

impl Serialize for TokenDiff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(k, v)| (k, v)))
    }
}

/// Signature envelope accepted by the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedData {
    pub standard: String,
    pub payload: String,
    pub signature: String,
}

/// Parameters of the relay's `publish_intent` method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishIntentRequest {
    pub quote_hashes: Vec<String>,
    pub signed_data: SignedData,
}
