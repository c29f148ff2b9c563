//! # Payment Products
//!
//! Maps a detected card brand to the vendor's payment-product descriptor,
//! which the encryption collaborator requires alongside the card fields.
//! The table ships with vendor defaults and can be overridden from
//! `config/payment_products.toml`.

use crate::card::CardBrand;
use serde::{Deserialize, Serialize};

/// One payment product as the vendor defines it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProduct {
    /// Vendor's numeric product descriptor
    pub id: u32,
    pub brand: CardBrand,
    /// Display name for the payment form
    pub name: String,
}

/// Brand → product-descriptor table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentProducts {
    pub products: Vec<PaymentProduct>,
}

impl PaymentProducts {
    /// Resolve the product descriptor for a brand. Unknown brands fall back
    /// to the Visa descriptor, which the vendor treats as the generic card
    /// product.
    pub fn resolve(&self, brand: CardBrand) -> u32 {
        self.products
            .iter()
            .find(|p| p.brand == brand)
            .or_else(|| self.products.iter().find(|p| p.brand == CardBrand::Visa))
            .map(|p| p.id)
            .unwrap_or(1)
    }

    /// Load the table from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }
}

impl Default for PaymentProducts {
    fn default() -> Self {
        Self {
            products: vec![
                PaymentProduct {
                    id: 1,
                    brand: CardBrand::Visa,
                    name: "Visa".into(),
                },
                PaymentProduct {
                    id: 3,
                    brand: CardBrand::Mastercard,
                    name: "Mastercard".into(),
                },
                PaymentProduct {
                    id: 2,
                    brand: CardBrand::Amex,
                    name: "American Express".into(),
                },
                PaymentProduct {
                    id: 128,
                    brand: CardBrand::Discover,
                    name: "Discover".into(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_brands() {
        let products = PaymentProducts::default();
        assert_eq!(products.resolve(CardBrand::Visa), 1);
        assert_eq!(products.resolve(CardBrand::Amex), 2);
        assert_eq!(products.resolve(CardBrand::Mastercard), 3);
        assert_eq!(products.resolve(CardBrand::Discover), 128);
    }

    #[test]
    fn test_unknown_falls_back_to_visa() {
        let products = PaymentProducts::default();
        assert_eq!(products.resolve(CardBrand::Unknown), 1);
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r#"
            [[products]]
            id = 42
            brand = "VISA"
            name = "Visa"

            [[products]]
            id = 43
            brand = "AMEX"
            name = "American Express"
        "#;
        let products = PaymentProducts::from_toml(toml_str).unwrap();
        assert_eq!(products.resolve(CardBrand::Visa), 42);
        assert_eq!(products.resolve(CardBrand::Amex), 43);
        // no Mastercard entry; falls back to the Visa descriptor
        assert_eq!(products.resolve(CardBrand::Mastercard), 42);
    }
}
