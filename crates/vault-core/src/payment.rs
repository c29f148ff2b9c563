//! # Payment Submission Flow
//!
//! Charges a previously tokenized card and interprets the three-way
//! outcome. The charge strictly precedes any follow-up capture; a capture
//! failure after authorization downgrades the status instead of failing
//! the whole payment.

use crate::error::{FlowError, FlowResult};
use crate::gateway::{CaptureRequest, ChargeOutcome, ChargeRequest, PaymentGateway};
use crate::money::Currency;
use crate::store::TokenStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Final status of a completed payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Funds captured in full
    Captured,
    /// The authorization succeeded but the follow-up capture did not;
    /// callers may re-capture or poll rather than re-charge
    AuthorizedCapturePending,
}

/// Outcome of a payment submission. Failures travel as `FlowError`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentOutcome {
    /// The charge resolved; no further user interaction needed
    Completed {
        payment_id: String,
        status: PaymentStatus,
    },
    /// Control must be handed to an external authentication step; neither
    /// success nor failure, and nothing is recorded as a result yet
    ChallengeRequired {
        payment_id: String,
        redirect_url: String,
    },
}

/// Orchestrates load token → charge → optional capture
pub struct PaymentFlow {
    gateway: Arc<dyn PaymentGateway>,
    store: Arc<dyn TokenStore>,
}

impl PaymentFlow {
    pub fn new(gateway: Arc<dyn PaymentGateway>, store: Arc<dyn TokenStore>) -> Self {
        Self { gateway, store }
    }

    /// Charge the stored token for a user-facing decimal amount.
    ///
    /// Fails with `NoTokenAvailable` before any collaborator call when the
    /// store is empty. The amount is converted to minor units by rounding,
    /// never truncating.
    #[instrument(skip(self), fields(%currency))]
    pub async fn pay(&self, amount: f64, currency: Currency) -> FlowResult<PaymentOutcome> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err(FlowError::invalid_field(
                "amount",
                "amount must be a positive number",
            ));
        }

        let token = self.store.load().ok_or(FlowError::NoTokenAvailable)?;
        let amount_minor = currency.to_minor_units(amount);

        let request = ChargeRequest {
            token: token.token.clone(),
            customer_id: token.customer_id.clone(),
            amount_minor,
            currency,
            idempotency_key: Uuid::new_v4().to_string(),
        };

        match self.gateway.charge(&request).await? {
            ChargeOutcome::Authorized { payment_id, status } => {
                let final_status = if status.requires_capture() {
                    self.capture_authorized(&payment_id, amount_minor).await
                } else {
                    PaymentStatus::Captured
                };
                info!(payment_id = %payment_id, status = ?final_status, "payment completed");
                Ok(PaymentOutcome::Completed {
                    payment_id,
                    status: final_status,
                })
            }
            ChargeOutcome::ChallengeRequired {
                payment_id,
                redirect_url,
            } => {
                info!(payment_id = %payment_id, "step-up challenge required");
                Ok(PaymentOutcome::ChallengeRequired {
                    payment_id,
                    redirect_url,
                })
            }
            ChargeOutcome::Failed { status, message } => {
                Err(FlowError::RemoteFailure { status, message })
            }
        }
    }

    /// Capture a charge that came back authorization-only, using the
    /// originally authorized amount. A capture failure is reported as a
    /// qualified success, never a silent failure of the whole payment.
    async fn capture_authorized(&self, payment_id: &str, amount_minor: i64) -> PaymentStatus {
        let request = CaptureRequest {
            payment_id: payment_id.to_string(),
            amount_minor,
        };
        match self.gateway.capture(&request).await {
            Ok(ChargeOutcome::Authorized { .. }) => PaymentStatus::Captured,
            Ok(ChargeOutcome::Failed { status, message }) => {
                warn!(payment_id, %status, %message, "capture failed after authorization");
                PaymentStatus::AuthorizedCapturePending
            }
            Ok(ChargeOutcome::ChallengeRequired { .. }) => {
                warn!(payment_id, "unexpected challenge on capture");
                PaymentStatus::AuthorizedCapturePending
            }
            Err(err) => {
                warn!(payment_id, error = %err, "capture call failed after authorization");
                PaymentStatus::AuthorizedCapturePending
            }
        }
    }
}
