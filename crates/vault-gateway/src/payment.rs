//! # Charge and Capture
//!
//! `PaymentGateway` implementation for the vendor API. The vendor's
//! outcome-dependent response shapes are folded into the three-way
//! `ChargeOutcome` here, at the boundary, so call sites never probe
//! optional fields.

use crate::client::GatewayClient;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use vault_core::{
    CaptureRequest, ChargeOutcome, ChargeRequest, ChargeStatus, FlowError, FlowResult,
    PaymentGateway,
};

/// Map a vendor status string to a `ChargeStatus`. Anything not explicitly
/// capture-pending counts as final.
fn parse_charge_status(status: &str) -> ChargeStatus {
    match status {
        "PENDING_CAPTURE" | "AUTHORIZED" | "CAPTURE_REQUESTED" => ChargeStatus::PendingCapture,
        _ => ChargeStatus::Captured,
    }
}

impl GatewayClient {
    /// Classify a charge/capture response body into a `ChargeOutcome`.
    fn classify(status: reqwest::StatusCode, body: &str) -> FlowResult<ChargeOutcome> {
        // HTTP 402: out-of-band authentication required
        if status == reqwest::StatusCode::PAYMENT_REQUIRED {
            let envelope: PaymentEnvelope = serde_json::from_str(body)
                .map_err(|e| FlowError::Serialization(format!("challenge envelope: {e}")))?;
            let payment_id = envelope
                .payment
                .map(|p| p.id)
                .ok_or_else(|| FlowError::Serialization("challenge without payment id".into()))?;
            let redirect_url = envelope
                .merchant_action
                .and_then(|a| a.redirect_data)
                .map(|r| r.redirect_url)
                .ok_or_else(|| {
                    FlowError::Serialization("challenge without redirect target".into())
                })?;
            return Ok(ChargeOutcome::ChallengeRequired {
                payment_id,
                redirect_url,
            });
        }

        if status.is_success() {
            let envelope: PaymentEnvelope = serde_json::from_str(body)
                .map_err(|e| FlowError::Serialization(format!("payment envelope: {e}")))?;
            let payment = envelope
                .payment
                .ok_or_else(|| FlowError::Serialization("success without payment body".into()))?;
            let charge_status = payment
                .status
                .as_deref()
                .map(parse_charge_status)
                .unwrap_or(ChargeStatus::Captured);
            return Ok(ChargeOutcome::Authorized {
                payment_id: payment.id,
                status: charge_status,
            });
        }

        // Failure envelope: surface whatever status the vendor supplied
        match Self::remote_failure(status, body) {
            FlowError::RemoteFailure { status, message } => {
                Ok(ChargeOutcome::Failed { status, message })
            }
            other => Err(other),
        }
    }
}

#[async_trait]
impl PaymentGateway for GatewayClient {
    #[instrument(skip(self, request), fields(amount = request.amount_minor, currency = %request.currency))]
    async fn charge(&self, request: &ChargeRequest) -> FlowResult<ChargeOutcome> {
        let body = ChargeBody {
            token: &request.token,
            customer_id: &request.customer_id,
            amount: request.amount_minor,
            currency_code: request.currency.as_str(),
        };

        let response = self
            .client
            .post(self.url("/v1/payments"))
            .header("Authorization", self.config.auth_header())
            .header("X-Merchant-Id", &self.config.merchant_id)
            .header("Idempotency-Key", &request.idempotency_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FlowError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FlowError::Network(e.to_string()))?;

        let outcome = Self::classify(status, &text)?;
        match &outcome {
            ChargeOutcome::Authorized { payment_id, .. } => {
                info!(%payment_id, "charge authorized");
            }
            ChargeOutcome::ChallengeRequired { payment_id, .. } => {
                info!(%payment_id, "charge requires step-up challenge");
            }
            ChargeOutcome::Failed { status, .. } => {
                warn!(%status, "charge failed");
            }
        }
        Ok(outcome)
    }

    #[instrument(skip(self, request), fields(payment_id = %request.payment_id))]
    async fn capture(&self, request: &CaptureRequest) -> FlowResult<ChargeOutcome> {
        let body = CaptureBody {
            amount: request.amount_minor,
        };

        let response = self
            .client
            .post(self.url(&format!("/v1/payments/{}/capture", request.payment_id)))
            .header("Authorization", self.config.auth_header())
            .header("X-Merchant-Id", &self.config.merchant_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| FlowError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FlowError::Network(e.to_string()))?;

        Self::classify(status, &text)
    }
}

// =============================================================================
// Vendor API Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChargeBody<'a> {
    token: &'a str,
    customer_id: &'a str,
    amount: i64,
    currency_code: &'a str,
}

#[derive(Debug, Serialize)]
struct CaptureBody {
    amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentEnvelope {
    #[serde(default)]
    payment: Option<PaymentBody>,
    #[serde(default)]
    merchant_action: Option<MerchantAction>,
}

#[derive(Debug, Deserialize)]
struct PaymentBody {
    id: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MerchantAction {
    #[serde(default)]
    redirect_data: Option<RedirectData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RedirectData {
    redirect_url: String,
}
