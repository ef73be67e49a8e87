//! Solver relay: quotes, intent publishing and settlement status.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::config::PollConfig;
use crate::error::Error;
use crate::transport::{call_rpc, Transport};
use crate::types::intents::{
    IntentStatus, IntentStatusResponse, PublishIntentRequest, PublishIntentResponse, Quote,
    QuoteRequest,
};
use crate::types::rpc::JsonRpcRequest;

/// How a status poll ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Settled { attempts: u32 },
    /// The relay no longer knows the intent or it can no longer settle.
    Invalid { attempts: u32 },
    TimedOut { attempts: u32 },
}

impl PollOutcome {
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Settled { .. })
    }

    pub fn attempts(&self) -> u32 {
        match *self {
            Self::Settled { attempts } | Self::Invalid { attempts } | Self::TimedOut { attempts } => {
                attempts
            }
        }
    }
}

#[derive(Clone)]
pub struct RelayClient {
    transport: Arc<dyn Transport>,
    url: String,
}

impl RelayClient {
    pub fn new(transport: Arc<dyn Transport>, url: &str) -> Self {
        Self {
            transport,
            url: url.to_string(),
        }
    }

    /// All quotes the relay returns for a request.
    pub async fn quote(&self, request: &QuoteRequest) -> Result<Vec<Quote>, Error> {
        let params = serde_json::to_value(request)
            .map_err(|e| Error::Validation(format!("failed to serialize quote request: {e}")))?;
        call_rpc(
            self.transport.as_ref(),
            &self.url,
            &JsonRpcRequest::positional("quote", params),
        )
        .await
    }

    /// The first quote for swapping exactly `exact_amount_in` raw units.
    /// Failures are logged and reported as no quote.
    pub async fn fetch_quote(
        &self,
        input_id: &str,
        output_id: &str,
        exact_amount_in: &str,
    ) -> Option<Quote> {
        let request = QuoteRequest {
            defuse_asset_identifier_in: input_id.to_string(),
            defuse_asset_identifier_out: output_id.to_string(),
            exact_amount_in: exact_amount_in.to_string(),
        };

        match self.quote(&request).await {
            Ok(quotes) => {
                debug!("Relay returned {} quotes", quotes.len());
                quotes.into_iter().next()
            }
            Err(e) => {
                warn!("Failed to fetch quote {} -> {}: {}", input_id, output_id, e);
                None
            }
        }
    }

    /// Submit a signed intent.
    pub async fn publish_intent(
        &self,
        request: &PublishIntentRequest,
    ) -> Result<PublishIntentResponse, Error> {
        let params = serde_json::to_value(request)
            .map_err(|e| Error::Validation(format!("failed to serialize intent: {e}")))?;
        let response: PublishIntentResponse = call_rpc(
            self.transport.as_ref(),
            &self.url,
            &JsonRpcRequest::positional("publish_intent", params),
        )
        .await?;

        if response.is_ok() {
            info!("Published intent {}", response.intent_hash);
        } else {
            warn!(
                "Relay rejected intent: {}",
                response.reason.as_deref().unwrap_or("no reason given")
            );
        }
        Ok(response)
    }

    /// Current status of an intent. Any failure reads as
    /// [`IntentStatus::NotFoundOrNotValidAnymore`].
    pub async fn get_intent_status(&self, intent_hash: &str) -> IntentStatus {
        let request =
            JsonRpcRequest::positional("get_status", json!({ "intent_hash": intent_hash }));

        match call_rpc::<IntentStatusResponse>(self.transport.as_ref(), &self.url, &request).await
        {
            Ok(response) => response.status,
            Err(e) => {
                error!("Failed to get intent status for {}: {}", intent_hash, e);
                IntentStatus::NotFoundOrNotValidAnymore
            }
        }
    }

    /// Poll until the intent reaches a terminal status or the attempt budget
    /// runs out.
    pub async fn poll_intent_status(&self, intent_hash: &str, poll: &PollConfig) -> PollOutcome {
        for attempt in 1..=poll.max_attempts {
            let status = self.get_intent_status(intent_hash).await;
            debug!(
                "Intent {} status {:?} (attempt {})",
                intent_hash, status, attempt
            );

            match status {
                IntentStatus::Settled => {
                    info!("Intent {} settled after {} polls", intent_hash, attempt);
                    return PollOutcome::Settled { attempts: attempt };
                }
                IntentStatus::NotFoundOrNotValidAnymore => {
                    warn!("Intent {} is no longer valid", intent_hash);
                    return PollOutcome::Invalid { attempts: attempt };
                }
                IntentStatus::Pending | IntentStatus::TxBroadcasted => {}
            }

            if attempt < poll.max_attempts {
                tokio::time::sleep(poll.interval()).await;
            }
        }

        warn!(
            "Intent {} not settled after {} polls",
            intent_hash, poll.max_attempts
        );
        PollOutcome::TimedOut {
            attempts: poll.max_attempts,
        }
    }
}
