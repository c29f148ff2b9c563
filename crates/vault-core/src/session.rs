//! # Session Collaborator
//!
//! Short-lived session descriptors scope the encryption and payment calls.
//! The real provider lives behind the vendor API; tests substitute a double.

use crate::error::FlowResult;
use crate::money::Currency;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Request for a new client session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
    pub currency: Currency,
    /// Amount in minor units; scopes which payment products are offered
    pub amount_minor: i64,
}

/// A short-lived session produced by the session collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDescriptor {
    pub session_id: String,
    pub customer_id: String,
    /// Base URL for client-side API calls within this session
    pub client_api_url: String,
    /// Base URL for static assets (card brand logos and the like)
    pub asset_url: String,
}

/// Capability trait for session creation
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn create_session(&self, request: &SessionRequest) -> FlowResult<SessionDescriptor>;
}
