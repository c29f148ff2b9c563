//! # Gateway Configuration
//!
//! Configuration for the vendor gateway integration.
//! All secrets are loaded from environment variables.

use std::env;
use vault_core::FlowError;

/// Vendor gateway API configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API key used in the Authorization header
    pub api_key: String,

    /// Merchant identifier scoping every call
    pub merchant_id: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `CARDVAULT_API_KEY`
    /// - `CARDVAULT_MERCHANT_ID`
    ///
    /// Optional:
    /// - `CARDVAULT_API_BASE_URL` (defaults to the vendor sandbox)
    pub fn from_env() -> Result<Self, FlowError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let api_key = env::var("CARDVAULT_API_KEY")
            .map_err(|_| FlowError::Configuration("CARDVAULT_API_KEY not set".to_string()))?;

        let merchant_id = env::var("CARDVAULT_MERCHANT_ID")
            .map_err(|_| FlowError::Configuration("CARDVAULT_MERCHANT_ID not set".to_string()))?;

        if api_key.trim().is_empty() {
            return Err(FlowError::Configuration(
                "CARDVAULT_API_KEY must not be empty".to_string(),
            ));
        }

        if merchant_id.trim().is_empty() {
            return Err(FlowError::Configuration(
                "CARDVAULT_MERCHANT_ID must not be empty".to_string(),
            ));
        }

        let api_base_url = env::var("CARDVAULT_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.sandbox.connect-pay.com".to_string());

        Ok(Self {
            api_key,
            merchant_id,
            api_base_url,
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(api_key: impl Into<String>, merchant_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            merchant_id: merchant_id.into(),
            api_base_url: "https://api.sandbox.connect-pay.com".to_string(),
        }
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config() {
        let config = GatewayConfig::new("key-abc", "merchant-1");
        assert_eq!(config.auth_header(), "Bearer key-abc");
        assert_eq!(config.merchant_id, "merchant-1");
        assert!(config.api_base_url.starts_with("https://"));
    }

    #[test]
    fn test_base_url_override() {
        let config = GatewayConfig::new("key", "merchant")
            .with_api_base_url("http://localhost:9999");
        assert_eq!(config.api_base_url, "http://localhost:9999");
    }

    #[test]
    fn test_from_env_missing_key() {
        env::remove_var("CARDVAULT_API_KEY");

        let result = GatewayConfig::from_env();
        assert!(result.is_err());
    }
}
