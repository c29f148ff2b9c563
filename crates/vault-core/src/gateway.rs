//! # Payment Gateway Collaborator
//!
//! The charge/capture boundary. The vendor's loosely-typed response shapes
//! are folded into one tagged outcome with exactly the three classes the
//! flows care about: authorized, step-up challenge, failed.

use crate::error::FlowResult;
use crate::money::Currency;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A charge request against a previously tokenized card.
///
/// `Debug` redacts the opaque token: it is never logged, even though it is
/// already encrypted.
#[derive(Clone, Serialize)]
pub struct ChargeRequest {
    /// Opaque token from the encryption collaborator
    pub token: String,
    pub customer_id: String,
    /// Amount in minor units
    pub amount_minor: i64,
    pub currency: Currency,
    /// Guards against double-charging on retry after a timeout or
    /// double-click; one key per user-triggered submission
    pub idempotency_key: String,
}

impl fmt::Debug for ChargeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChargeRequest")
            .field("token", &"<opaque>")
            .field("customer_id", &self.customer_id)
            .field("amount_minor", &self.amount_minor)
            .field("currency", &self.currency)
            .field("idempotency_key", &self.idempotency_key)
            .finish()
    }
}

/// Follow-up capture of a previously authorized charge
#[derive(Debug, Clone, Serialize)]
pub struct CaptureRequest {
    pub payment_id: String,
    /// The originally authorized amount, in minor units
    pub amount_minor: i64,
}

/// Status reported with an authorized charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeStatus {
    /// Funds captured; the charge is final
    Captured,
    /// Authorization only; a follow-up capture call is required
    PendingCapture,
}

impl ChargeStatus {
    pub fn requires_capture(&self) -> bool {
        matches!(self, ChargeStatus::PendingCapture)
    }
}

/// The three-way outcome of a charge (or capture) call
#[derive(Debug, Clone)]
pub enum ChargeOutcome {
    /// Collaborator reports success
    Authorized {
        payment_id: String,
        status: ChargeStatus,
    },
    /// Out-of-band authentication required before the charge can complete;
    /// neither success nor failure
    ChallengeRequired {
        payment_id: String,
        redirect_url: String,
    },
    /// Any other outcome, with whatever status the collaborator supplied
    Failed { status: String, message: String },
}

/// Capability trait for the remote payment collaborator
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Submit a charge. Within one submission, this strictly precedes any
    /// capture call.
    async fn charge(&self, request: &ChargeRequest) -> FlowResult<ChargeOutcome>;

    /// Finalize a previously authorized charge
    async fn capture(&self, request: &CaptureRequest) -> FlowResult<ChargeOutcome>;
}
