//! # vault-core
//!
//! Core types, flows, and capability traits for the cardvault token
//! lifecycle engine.
//!
//! This crate provides:
//! - `CardToken`, `CardBrand`, and `Expiry` card types
//! - `TokenStore` single-slot persistence with memory and file backends
//! - `Encryptor`, `SessionProvider`, and `PaymentGateway` capability traits
//! - `TokenizationFlow` and `PaymentFlow` orchestration
//! - `ResultStage` redirect-return reconciliation
//! - `FlowError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use vault_core::{CardInput, Currency, PaymentFlow, TokenizationFlow};
//!
//! // Tokenize a card into the single-slot store
//! let flow = TokenizationFlow::new(encryptor, store.clone());
//! let token = flow.tokenize(&input, &session).await?;
//!
//! // Charge it later
//! let payments = PaymentFlow::new(gateway, store);
//! let outcome = payments.pay(77.99, Currency::AUD).await?;
//! ```

pub mod card;
pub mod encrypt;
pub mod error;
pub mod gateway;
pub mod money;
pub mod payment;
pub mod product;
pub mod result;
pub mod session;
pub mod store;
pub mod tokenize;
pub mod validate;

// Re-exports for convenience
pub use card::{clean_card_number, mask_number, CardBrand, CardToken, Expiry, MASK_CHAR};
pub use encrypt::{EncryptionRequest, Encryptor};
pub use error::{FlowError, FlowResult};
pub use gateway::{
    CaptureRequest, ChargeOutcome, ChargeRequest, ChargeStatus, PaymentGateway,
};
pub use money::{Amount, Currency};
pub use payment::{PaymentFlow, PaymentOutcome, PaymentStatus};
pub use product::{PaymentProduct, PaymentProducts};
pub use result::{AttemptResult, AttemptStatus, ResultSource, ResultStage};
pub use session::{SessionDescriptor, SessionProvider, SessionRequest};
pub use store::{FileTokenStore, MemoryTokenStore, StorageError, TokenStore};
pub use tokenize::{TokenizationFlow, ENCRYPTION_TIMEOUT};
pub use validate::{collaborator_error_message, validate, CardInput, FieldErrors, ValidatedCard};
