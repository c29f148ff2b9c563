//! # Card Tokenization Flow
//!
//! Turns user-entered card fields into a persisted `CardToken` without the
//! raw card data ever leaving the encryption boundary. Ordering is fixed:
//! local validation, then the bounded encryption call, then the store
//! write. The cvv is consumed here and retained nowhere.

use crate::card::CardBrand;
use crate::card::CardToken;
use crate::encrypt::{EncryptionRequest, Encryptor};
use crate::error::{FlowError, FlowResult};
use crate::product::PaymentProducts;
use crate::session::SessionDescriptor;
use crate::store::TokenStore;
use crate::validate::{validate, CardInput};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Hard deadline for the encryption collaborator call
pub const ENCRYPTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Orchestrates validate → encrypt → persist
pub struct TokenizationFlow {
    encryptor: Arc<dyn Encryptor>,
    store: Arc<dyn TokenStore>,
    products: PaymentProducts,
    timeout: Duration,
}

impl TokenizationFlow {
    pub fn new(encryptor: Arc<dyn Encryptor>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            encryptor,
            store,
            products: PaymentProducts::default(),
            timeout: ENCRYPTION_TIMEOUT,
        }
    }

    /// Builder: override the brand → payment-product table
    pub fn with_products(mut self, products: PaymentProducts) -> Self {
        self.products = products;
        self
    }

    /// Builder: override the encryption deadline (tests)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run the flow. On success exactly one `CardToken` sits in the store,
    /// replacing any prior token.
    #[instrument(skip_all, fields(session_id = %session.session_id))]
    pub async fn tokenize(
        &self,
        input: &CardInput,
        session: &SessionDescriptor,
    ) -> FlowResult<CardToken> {
        // Local validation runs first; a failure here never reaches the
        // collaborator.
        let card = validate(input).map_err(FlowError::Validation)?;
        let brand = CardBrand::detect(&card.number);

        let request = EncryptionRequest {
            card_number: card.number.clone(),
            expiry_wire: card.expiry.wire(),
            cvv: card.cvv.clone(),
            holder_name: card.holder_name.clone(),
            payment_product_id: self.products.resolve(brand),
            session_id: session.session_id.clone(),
        };

        // The collaborator has no native cancellation; on deadline the
        // in-flight call is abandoned, not aborted at the transport level.
        let encrypted =
            match tokio::time::timeout(self.timeout, self.encryptor.encrypt(&request)).await {
                Ok(result) => result?,
                Err(_) => {
                    warn!(limit_secs = self.timeout.as_secs(), "encryption deadline exceeded");
                    return Err(FlowError::EncryptionTimeout {
                        limit_secs: self.timeout.as_secs(),
                    });
                }
            };

        if encrypted.trim().is_empty() {
            return Err(FlowError::EmptyEncryptionResult);
        }

        let token = CardToken::new(
            encrypted,
            &card.number,
            card.holder_name.clone(),
            card.expiry,
            session.customer_id.clone(),
        );
        self.store.save(&token)?;

        info!(
            brand = %token.card_brand,
            masked = %token.masked_number,
            "card tokenized"
        );
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedEncryptor {
        result: FlowResult<String>,
        calls: AtomicUsize,
    }

    impl FixedEncryptor {
        fn ok(token: &str) -> Self {
            Self {
                result: Ok(token.to_string()),
                calls: AtomicUsize::new(0),
            }
        }

        fn err(err: FlowError) -> Self {
            Self {
                result: Err(err),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Encryptor for FixedEncryptor {
        async fn encrypt(&self, _request: &EncryptionRequest) -> FlowResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(s) => Ok(s.clone()),
                Err(FlowError::EmptyEncryptionResult) => Err(FlowError::EmptyEncryptionResult),
                Err(e) => Err(FlowError::Internal(e.to_string())),
            }
        }
    }

    struct StalledEncryptor;

    #[async_trait]
    impl Encryptor for StalledEncryptor {
        async fn encrypt(&self, _request: &EncryptionRequest) -> FlowResult<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("never".into())
        }
    }

    fn session() -> SessionDescriptor {
        SessionDescriptor {
            session_id: "sess-1".into(),
            customer_id: "cust-1".into(),
            client_api_url: "https://client.api.example/v1".into(),
            asset_url: "https://assets.example".into(),
        }
    }

    fn visa_input() -> CardInput {
        CardInput {
            card_number: "4111111111111111".into(),
            expiry: "12/25".into(),
            cvv: "123".into(),
            holder_name: "TEST USER".into(),
        }
    }

    #[tokio::test]
    async fn test_tokenize_visa_scenario() {
        let store = Arc::new(MemoryTokenStore::new());
        let flow = TokenizationFlow::new(Arc::new(FixedEncryptor::ok("blob-1")), store.clone());

        let token = flow.tokenize(&visa_input(), &session()).await.unwrap();

        assert_eq!(token.card_brand, CardBrand::Visa);
        assert!(token.masked_number.ends_with("1111"));
        assert_eq!(token.masked_number.chars().count(), 16);
        assert!(token
            .masked_number
            .chars()
            .take(12)
            .all(|c| c == crate::card::MASK_CHAR));
        assert_eq!(token.expiry.wire(), "122025");
        assert_eq!(token.customer_id, "cust-1");

        // exactly one token in the store, structurally equal to the result
        assert_eq!(store.load().unwrap(), token);
    }

    #[tokio::test]
    async fn test_tokenize_amex_scenario() {
        let store = Arc::new(MemoryTokenStore::new());
        let flow = TokenizationFlow::new(Arc::new(FixedEncryptor::ok("blob-2")), store.clone());

        let input = CardInput {
            card_number: "378282246310005".into(),
            expiry: "12/25".into(),
            cvv: "1234".into(),
            holder_name: "TEST USER".into(),
        };
        let token = flow.tokenize(&input, &session()).await.unwrap();

        assert_eq!(token.card_brand, CardBrand::Amex);
        assert_eq!(token.masked_number.chars().count(), 15);
    }

    #[tokio::test]
    async fn test_second_tokenize_replaces_first() {
        let store = Arc::new(MemoryTokenStore::new());

        let flow = TokenizationFlow::new(Arc::new(FixedEncryptor::ok("first")), store.clone());
        flow.tokenize(&visa_input(), &session()).await.unwrap();

        let flow = TokenizationFlow::new(Arc::new(FixedEncryptor::ok("second")), store.clone());
        let input = CardInput {
            card_number: "378282246310005".into(),
            expiry: "01/28".into(),
            cvv: "999".into(),
            holder_name: "OTHER USER".into(),
        };
        let second = flow.tokenize(&input, &session()).await.unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, second);
        assert_eq!(loaded.token, "second");
        assert_eq!(loaded.card_brand, CardBrand::Amex);
        assert_eq!(loaded.holder_name, "OTHER USER");
    }

    #[tokio::test]
    async fn test_invalid_input_never_calls_encryptor() {
        let encryptor = Arc::new(FixedEncryptor::ok("blob"));
        let store = Arc::new(MemoryTokenStore::new());
        let flow = TokenizationFlow::new(encryptor.clone(), store.clone());

        let input = CardInput {
            card_number: "1234".into(),
            expiry: "12/25".into(),
            cvv: "123".into(),
            holder_name: "TEST USER".into(),
        };
        let err = flow.tokenize(&input, &session()).await.unwrap_err();

        assert!(matches!(err, FlowError::Validation(_)));
        assert_eq!(encryptor.calls.load(Ordering::SeqCst), 0);
        assert!(store.load().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_encryption_deadline() {
        let store = Arc::new(MemoryTokenStore::new());
        let flow = TokenizationFlow::new(Arc::new(StalledEncryptor), store.clone());

        let err = flow.tokenize(&visa_input(), &session()).await.unwrap_err();
        assert!(matches!(err, FlowError::EncryptionTimeout { limit_secs: 5 }));
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_empty_encryption_result() {
        let store = Arc::new(MemoryTokenStore::new());
        let flow = TokenizationFlow::new(Arc::new(FixedEncryptor::ok("   ")), store.clone());

        let err = flow.tokenize(&visa_input(), &session()).await.unwrap_err();
        assert!(matches!(err, FlowError::EmptyEncryptionResult));
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_encryptor_error_propagates_without_store_write() {
        let store = Arc::new(MemoryTokenStore::new());
        let flow = TokenizationFlow::new(
            Arc::new(FixedEncryptor::err(FlowError::EmptyEncryptionResult)),
            store.clone(),
        );

        assert!(flow.tokenize(&visa_input(), &session()).await.is_err());
        assert!(store.load().is_none());
    }
}
