//! # Application State
//!
//! Shared state for the Axum application. Every collaborator sits behind a
//! trait object so the demo server and the tests wire in different
//! implementations.

use std::sync::{Arc, Mutex};
use vault_core::{
    Encryptor, FileTokenStore, PaymentGateway, PaymentProducts, ResultStage, SessionProvider,
    TokenStore,
};
use vault_gateway::GatewayClient;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> std::net::SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address")
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Session collaborator
    pub sessions: Arc<dyn SessionProvider>,
    /// Encryption collaborator
    pub encryptor: Arc<dyn Encryptor>,
    /// Payment collaborator
    pub gateway: Arc<dyn PaymentGateway>,
    /// Single-slot token store
    pub store: Arc<dyn TokenStore>,
    /// Brand → payment-product table
    pub products: PaymentProducts,
    /// Result reconciliation stage (session-scoped)
    pub results: Arc<Mutex<ResultStage>>,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create the production state: one `GatewayClient` behind all three
    /// collaborator traits, and a file-backed token store.
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();

        let client = Arc::new(
            GatewayClient::from_env()
                .map_err(|e| anyhow::anyhow!("Failed to initialize gateway client: {}", e))?,
        );

        let token_path = std::env::var("CARDVAULT_TOKEN_PATH")
            .unwrap_or_else(|_| "data/card_token.json".to_string());
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(token_path));

        let products = load_payment_products();

        Ok(Self {
            sessions: client.clone(),
            encryptor: client.clone(),
            gateway: client,
            store,
            products,
            results: Arc::new(Mutex::new(ResultStage::new())),
            config,
        })
    }

    /// Assemble state from explicit collaborators (tests)
    pub fn with_collaborators(
        sessions: Arc<dyn SessionProvider>,
        encryptor: Arc<dyn Encryptor>,
        gateway: Arc<dyn PaymentGateway>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            sessions,
            encryptor,
            gateway,
            store,
            products: PaymentProducts::default(),
            results: Arc::new(Mutex::new(ResultStage::new())),
            config: AppConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                environment: "test".to_string(),
            },
        }
    }
}

/// Load the brand → payment-product table from config, falling back to the
/// vendor defaults when no file is present.
fn load_payment_products() -> PaymentProducts {
    let config_paths = [
        "config/payment_products.toml",
        "../config/payment_products.toml",
        "../../config/payment_products.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            match PaymentProducts::from_toml(&content) {
                Ok(products) => {
                    tracing::info!(
                        "Loaded {} payment products from {}",
                        products.products.len(),
                        path
                    );
                    return products;
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path, e);
                }
            }
        }
    }

    tracing::info!("No payment product table found, using vendor defaults");
    PaymentProducts::default()
}
