//! # vault-api
//!
//! HTTP API layer for cardvault-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - REST endpoints for the card token lifecycle and payments
//! - The redirect-return landing route for step-up challenges
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/tokenize` | Tokenize and store a card |
//! | GET | `/api/v1/token` | Masked view of the stored token |
//! | DELETE | `/api/v1/token` | Clear the stored token |
//! | POST | `/api/v1/payments` | Charge the stored token |
//! | GET | `/payment/result` | Display the payment outcome once |
//! | POST | `/payment/result/dismiss` | Dismiss the displayed outcome |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
