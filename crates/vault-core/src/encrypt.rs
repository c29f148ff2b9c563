//! # Encryption Collaborator
//!
//! The encryption boundary: validated card fields go in, an opaque token
//! string comes out. Nothing outside this boundary ever sees raw card data,
//! and nothing in this crate inspects what comes back.

use crate::error::FlowResult;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

/// Normalized card fields plus session context, ready for the encryption
/// collaborator. Expiry is already in wire form `MMYYYY`.
///
/// `Debug` redacts the card fields; this struct must never reach a log.
#[derive(Clone, Serialize)]
pub struct EncryptionRequest {
    pub card_number: String,
    /// Wire form `MMYYYY`
    pub expiry_wire: String,
    pub cvv: String,
    pub holder_name: String,
    /// Resolved payment-product descriptor for the detected brand
    pub payment_product_id: u32,
    /// Session the encryption is scoped to
    pub session_id: String,
}

impl fmt::Debug for EncryptionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionRequest")
            .field("card_number", &"<redacted>")
            .field("expiry_wire", &"<redacted>")
            .field("cvv", &"<redacted>")
            .field("holder_name", &self.holder_name)
            .field("payment_product_id", &self.payment_product_id)
            .field("session_id", &self.session_id)
            .finish()
    }
}

/// Capability trait for the encryption collaborator.
///
/// A successful call yields the opaque token string. Collaborator-side
/// validation failures surface as `FlowError::CollaboratorValidation` with
/// messages already mapped through the fixed table in `validate`.
#[async_trait]
pub trait Encryptor: Send + Sync {
    async fn encrypt(&self, request: &EncryptionRequest) -> FlowResult<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_card_fields() {
        let request = EncryptionRequest {
            card_number: "4111111111111111".into(),
            expiry_wire: "122025".into(),
            cvv: "123".into(),
            holder_name: "TEST USER".into(),
            payment_product_id: 1,
            session_id: "sess-1".into(),
        };
        let rendered = format!("{request:?}");
        assert!(!rendered.contains("4111111111111111"));
        assert!(!rendered.contains("122025"));
        assert!(rendered.contains("sess-1"));
    }
}
