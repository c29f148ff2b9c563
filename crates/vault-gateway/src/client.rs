//! # Gateway Client
//!
//! The reqwest client behind all vendor collaborator traits, plus the
//! session-creation and encryption implementations. The payment (charge
//! and capture) implementation lives in `payment`.

use crate::config::GatewayConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};
use vault_core::{
    collaborator_error_message, EncryptionRequest, Encryptor, FlowError, FlowResult,
    SessionDescriptor, SessionProvider, SessionRequest,
};

/// HTTP client for the vendor API. Implements `SessionProvider`,
/// `Encryptor`, and `PaymentGateway`.
pub struct GatewayClient {
    pub(crate) config: GatewayConfig,
    pub(crate) client: Client,
}

impl GatewayClient {
    /// Create a new gateway client
    pub fn new(config: GatewayConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> FlowResult<Self> {
        let config = GatewayConfig::from_env()?;
        Ok(Self::new(config))
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url, path)
    }

    /// Parse a vendor failure envelope into a `RemoteFailure`, falling back
    /// to the raw HTTP status when the body is not the expected shape.
    pub(crate) fn remote_failure(status: reqwest::StatusCode, body: &str) -> FlowError {
        if let Ok(envelope) = serde_json::from_str::<ApiErrorResponse>(body) {
            if !envelope.errors.is_empty() {
                let message = envelope
                    .errors
                    .iter()
                    .filter_map(|e| e.message.as_deref())
                    .collect::<Vec<_>>()
                    .join("; ");
                return FlowError::RemoteFailure {
                    status: envelope
                        .error_id
                        .unwrap_or_else(|| status.as_u16().to_string()),
                    message,
                };
            }
        }
        FlowError::RemoteFailure {
            status: status.as_u16().to_string(),
            message: format!("HTTP {status}"),
        }
    }
}

#[async_trait]
impl SessionProvider for GatewayClient {
    #[instrument(skip(self, request), fields(country = %request.country_code, currency = %request.currency))]
    async fn create_session(&self, request: &SessionRequest) -> FlowResult<SessionDescriptor> {
        let body = SessionBody {
            country_code: &request.country_code,
            currency_code: request.currency.as_str(),
            amount: request.amount_minor,
        };

        let response = self
            .client
            .post(self.url("/v1/sessions"))
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

        if !status.is_success() {
            error!("session creation failed: status={status}");
            return Err(Self::remote_failure(status, &text));
        }

        let session: SessionResponse = serde_json::from_str(&text)
            .map_err(|e| FlowError::Serialization(format!("session response: {e}")))?;

        info!(session_id = %session.session_id, "session created");

        Ok(SessionDescriptor {
            session_id: session.session_id,
            customer_id: session.customer_id,
            client_api_url: session.client_api_url,
            asset_url: session.asset_url,
        })
    }
}

#[async_trait]
impl Encryptor for GatewayClient {
    #[instrument(skip_all, fields(session_id = %request.session_id))]
    async fn encrypt(&self, request: &EncryptionRequest) -> FlowResult<String> {
        let body = EncryptBody {
            session_id: &request.session_id,
            payment_product_id: request.payment_product_id,
            card: EncryptCardBody {
                card_number: &request.card_number,
                expiry_date: &request.expiry_wire,
                cvv: &request.cvv,
                cardholder_name: &request.holder_name,
            },
        };

        let response = self
            .client
            .post(self.url("/v1/crypto/encrypt"))
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

        // The collaborator reports request-level validation failures in a
        // structured list, on both 200 and 4xx responses.
        if let Ok(envelope) = serde_json::from_str::<EncryptResponse>(&text) {
            if !envelope.validation_errors.is_empty() {
                let messages = envelope
                    .validation_errors
                    .iter()
                    .map(|e| collaborator_error_message(&e.code).to_string())
                    .collect();
                debug!("encryption request rejected by collaborator validation");
                return Err(FlowError::CollaboratorValidation { messages });
            }
            if status.is_success() {
                return Ok(envelope.encrypted_customer_input.unwrap_or_default());
            }
        }

        if !status.is_success() {
            error!("encryption call failed: status={status}");
            return Err(Self::remote_failure(status, &text));
        }

        Err(FlowError::Serialization(
            "unrecognized encryption response shape".to_string(),
        ))
    }
}

// =============================================================================
// Vendor API Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionBody<'a> {
    country_code: &'a str,
    currency_code: &'a str,
    amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    session_id: String,
    customer_id: String,
    client_api_url: String,
    asset_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EncryptBody<'a> {
    session_id: &'a str,
    payment_product_id: u32,
    card: EncryptCardBody<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EncryptCardBody<'a> {
    card_number: &'a str,
    expiry_date: &'a str,
    cvv: &'a str,
    cardholder_name: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncryptResponse {
    #[serde(default)]
    encrypted_customer_input: Option<String>,
    #[serde(default)]
    validation_errors: Vec<ValidationErrorEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidationErrorEntry {
    code: String,
    #[serde(default)]
    #[allow(dead_code)]
    field: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub(crate) error_id: Option<String>,
    #[serde(default)]
    pub(crate) errors: Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiError {
    #[serde(default)]
    #[allow(dead_code)]
    pub(crate) code: Option<String>,
    #[serde(default)]
    pub(crate) message: Option<String>,
}
