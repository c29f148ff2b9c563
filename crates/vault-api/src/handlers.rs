//! # Request Handlers
//!
//! Axum request handlers for the cardvault demo API. Every flow error is
//! caught here and turned into a structured, user-displayable response;
//! nothing propagates as an unhandled fault.

use crate::state::AppState;
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use vault_core::{
    AttemptResult, AttemptStatus, CardBrand, CardInput, CardToken, Currency, FieldErrors,
    FlowError, PaymentFlow, PaymentOutcome, PaymentStatus, SessionRequest, TokenizationFlow,
};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Tokenize request: raw card fields plus session scoping
#[derive(Debug, Deserialize)]
pub struct TokenizeRequest {
    #[serde(flatten)]
    pub card: CardInput,
    /// ISO 3166-1 alpha-2 country code for the session
    #[serde(default = "default_country")]
    pub country_code: String,
    #[serde(default)]
    pub currency: Currency,
    /// Expected charge amount, used only to scope the session
    #[serde(default)]
    pub amount: f64,
}

fn default_country() -> String {
    "US".to_string()
}

/// Masked view of a stored token. The opaque blob never leaves the server.
#[derive(Debug, Serialize)]
pub struct TokenView {
    pub masked_number: String,
    pub card_brand: CardBrand,
    pub holder_name: String,
    /// Display form `MM/YY`
    pub expiry: String,
    pub customer_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<&CardToken> for TokenView {
    fn from(token: &CardToken) -> Self {
        Self {
            masked_number: token.masked_number.clone(),
            card_brand: token.card_brand,
            holder_name: token.holder_name.clone(),
            expiry: token.expiry.display(),
            customer_id: token.customer_id.clone(),
            created_at: token.created_at,
        }
    }
}

/// Payment request
#[derive(Debug, Deserialize)]
pub struct PayRequest {
    /// User-facing decimal amount
    pub amount: f64,
    pub currency: Currency,
}

/// Result-stage response
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    /// The definitive outcome, present at most once per attempt
    pub result: Option<AttemptResult>,
    /// Query string with the consumed redirect parameters stripped
    pub query: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    /// Per-field messages for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            fields: None,
            retryable: false,
        }
    }
}

fn flow_error_to_response(err: FlowError) -> (StatusCode, Json<ErrorResponse>) {
    let code = err.status_code();
    let retryable = err.is_retryable();
    let response = match err {
        FlowError::Validation(fields) => ErrorResponse {
            error: "invalid input".to_string(),
            code,
            fields: Some(fields),
            retryable,
        },
        other => ErrorResponse {
            error: other.to_string(),
            code,
            fields: None,
            retryable,
        },
    };
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn lock_poisoned() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("result stage unavailable", 500)),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "cardvault",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Tokenize a card: create a session, validate, encrypt, persist.
#[instrument(skip(state, request))]
pub async fn tokenize(
    State(state): State<AppState>,
    Json(request): Json<TokenizeRequest>,
) -> Result<Json<TokenView>, (StatusCode, Json<ErrorResponse>)> {
    let session_request = SessionRequest {
        country_code: request.country_code.clone(),
        currency: request.currency,
        amount_minor: request.currency.to_minor_units(request.amount),
    };

    let session = state
        .sessions
        .create_session(&session_request)
        .await
        .map_err(|e| {
            error!("session creation failed: {}", e);
            flow_error_to_response(e)
        })?;

    let flow = TokenizationFlow::new(state.encryptor.clone(), state.store.clone())
        .with_products(state.products.clone());

    let token = flow
        .tokenize(&request.card, &session)
        .await
        .map_err(flow_error_to_response)?;

    info!(masked = %token.masked_number, "token stored");
    Ok(Json(TokenView::from(&token)))
}

/// Masked view of the stored token
pub async fn get_token(
    State(state): State<AppState>,
) -> Result<Json<TokenView>, (StatusCode, Json<ErrorResponse>)> {
    match state.store.load() {
        Some(token) => Ok(Json(TokenView::from(&token))),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("no card token stored", 404)),
        )),
    }
}

/// Delete the stored token. Idempotent: deleting an empty slot succeeds.
pub async fn delete_token(
    State(state): State<AppState>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .store
        .clear()
        .map_err(|e| flow_error_to_response(e.into()))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit a payment against the stored token
#[instrument(skip(state), fields(amount = request.amount, currency = %request.currency))]
pub async fn create_payment(
    State(state): State<AppState>,
    Json(request): Json<PayRequest>,
) -> Result<Json<PaymentOutcome>, (StatusCode, Json<ErrorResponse>)> {
    // a new attempt drops any stale pending result
    state
        .results
        .lock()
        .map_err(|_| lock_poisoned())?
        .begin_attempt();

    let flow = PaymentFlow::new(state.gateway.clone(), state.store.clone());
    let outcome = match flow.pay(request.amount, request.currency).await {
        Ok(outcome) => outcome,
        Err(err) => {
            // A definitive remote failure is still a resolved attempt and
            // belongs in the result stage; the failure envelope carries no
            // payment id.
            if let FlowError::RemoteFailure { status, .. } = &err {
                let attempt_status = match AttemptStatus::from_param(status) {
                    AttemptStatus::Unknown => AttemptStatus::Failed,
                    resolved => resolved,
                };
                state
                    .results
                    .lock()
                    .map_err(|_| lock_poisoned())?
                    .record_local(String::new(), attempt_status);
            }
            return Err(flow_error_to_response(err));
        }
    };

    // A challenge hand-off is neither success nor failure; it resolves
    // later via the redirect return.
    if let PaymentOutcome::Completed { payment_id, status } = &outcome {
        let attempt_status = match status {
            PaymentStatus::Captured => AttemptStatus::Succeeded,
            PaymentStatus::AuthorizedCapturePending => AttemptStatus::Pending,
        };
        state
            .results
            .lock()
            .map_err(|_| lock_poisoned())?
            .record_local(payment_id.clone(), attempt_status);
    }

    Ok(Json(outcome))
}

/// Reconcile and display the payment result exactly once.
///
/// Redirect-return parameters (`paymentId`, `status`) take precedence over
/// a same-session pending result and are stripped from the returned query
/// so a reload does not re-display the outcome.
#[instrument(skip(state, query))]
pub async fn payment_result(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<ResultResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut results = state.results.lock().map_err(|_| lock_poisoned())?;
    let remaining = results.absorb_redirect(query.as_deref().unwrap_or(""));
    let result = results.take_for_display();

    Ok(Json(ResultResponse {
        result,
        query: remaining,
    }))
}

/// User dismissed the displayed result
pub async fn dismiss_result(
    State(state): State<AppState>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state.results.lock().map_err(|_| lock_poisoned())?.dismiss();
    Ok(StatusCode::NO_CONTENT)
}
