//! # vault-gateway
//!
//! HTTP implementations of the cardvault collaborator traits against the
//! vendor REST API: session creation, card encryption, charge, and
//! capture. One `GatewayClient` carries all of them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use vault_gateway::GatewayClient;
//!
//! let client = GatewayClient::from_env()?;
//! let session = client.create_session(&request).await?;
//! ```

pub mod client;
pub mod config;
pub mod payment;

pub use client::GatewayClient;
pub use config::GatewayConfig;
