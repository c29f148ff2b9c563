//! # CardVault RS
//!
//! Demo payment server: card tokenization, single-slot token storage, and
//! payment submission against the vendor sandbox.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export CARDVAULT_API_KEY=sk_sandbox_...
//! export CARDVAULT_MERCHANT_ID=merchant_...
//!
//! # Run the server
//! cardvault
//! ```

use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vault_api::{routes, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    print_banner();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr();
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment products loaded: {}", state.products.products.len());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("🔐 CardVault starting on http://{}", addr);

    if !is_prod {
        info!("📝 Health: http://{}/health", addr);
        info!("💳 Tokenize: POST http://{}/api/v1/tokenize", addr);
        info!("💸 Pay: POST http://{}/api/v1/payments", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  🔐 CardVault RS 🔐
  ━━━━━━━━━━━━━━━━━━
  Card token lifecycle engine
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
