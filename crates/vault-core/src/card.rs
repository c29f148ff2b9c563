//! # Card Types
//!
//! Card brand detection, number masking, expiry conversion, and the
//! persisted `CardToken`. The raw card number only ever exists transiently
//! inside the tokenization flow; everything kept here is display-safe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mask character used for all but the last 4 digits of a card number
pub const MASK_CHAR: char = '•';

/// Card brands detected from the leading digits of the card number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    Unknown,
}

impl CardBrand {
    /// Derive the brand from a cleaned (digits-only) card number.
    ///
    /// Prefix rules: 4 → Visa, 51–55 → Mastercard, 34/37 → Amex,
    /// 6011 → Discover, anything else → Unknown.
    pub fn detect(digits: &str) -> Self {
        if digits.starts_with('4') {
            return CardBrand::Visa;
        }
        if digits.starts_with("6011") {
            return CardBrand::Discover;
        }
        if let Some(prefix) = digits.get(0..2) {
            match prefix {
                "34" | "37" => return CardBrand::Amex,
                _ => {
                    if let Ok(n) = prefix.parse::<u8>() {
                        if (51..=55).contains(&n) {
                            return CardBrand::Mastercard;
                        }
                    }
                }
            }
        }
        CardBrand::Unknown
    }

    /// Returns the canonical tag for this brand
    pub fn as_str(&self) -> &'static str {
        match self {
            CardBrand::Visa => "VISA",
            CardBrand::Mastercard => "MASTERCARD",
            CardBrand::Amex => "AMEX",
            CardBrand::Discover => "DISCOVER",
            CardBrand::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Strip separators (spaces and dashes) from a card number as entered.
/// Digit-ness is checked by validation, not here.
pub fn clean_card_number(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Mask a cleaned card number: same length as the input, all but the last
/// 4 characters replaced by [`MASK_CHAR`].
pub fn mask_number(digits: &str) -> String {
    let len = digits.chars().count();
    if len <= 4 {
        return digits.to_string();
    }
    let mut masked = String::with_capacity(len * 3);
    for _ in 0..len - 4 {
        masked.push(MASK_CHAR);
    }
    masked.extend(digits.chars().skip(len - 4));
    masked
}

/// Card expiry in display form `MM/YY`.
///
/// Serialized as the display string. The wire form expands the two-digit
/// year: `12/25` becomes `122025`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Expiry {
    pub month: u8,
    pub year: u8,
}

impl Expiry {
    /// Parse from display form `MM/YY`. Both components must be exactly
    /// two digits and the month must be 01–12.
    pub fn parse(display: &str) -> Option<Self> {
        let (m, y) = display.split_once('/')?;
        if m.len() != 2 || y.len() != 2 {
            return None;
        }
        if !m.chars().all(|c| c.is_ascii_digit()) || !y.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let month: u8 = m.parse().ok()?;
        let year: u8 = y.parse().ok()?;
        if !(1..=12).contains(&month) {
            return None;
        }
        Some(Self { month, year })
    }

    /// Display form `MM/YY`
    pub fn display(&self) -> String {
        format!("{:02}/{:02}", self.month, self.year)
    }

    /// Wire form `MMYYYY` with the year expanded to `20YY`
    pub fn wire(&self) -> String {
        format!("{:02}20{:02}", self.month, self.year)
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<Expiry> for String {
    fn from(expiry: Expiry) -> Self {
        expiry.display()
    }
}

impl TryFrom<String> for Expiry {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Expiry::parse(&value).ok_or_else(|| format!("invalid expiry: {value}"))
    }
}

/// The single persisted card token.
///
/// Immutable once created: updating means deleting and recreating. The
/// `token` field is an opaque blob from the encryption collaborator and is
/// never parsed, decrypted, or logged (its `Debug` impl redacts it).
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct CardToken {
    /// Opaque encrypted blob; never inspected locally
    pub token: String,
    /// Display-only: last 4 digits, rest replaced by the mask character
    pub masked_number: String,
    /// Derived from the leading digits at creation time
    pub card_brand: CardBrand,
    /// Holder name as entered
    pub holder_name: String,
    /// Display form `MM/YY`
    pub expiry: Expiry,
    /// Session that produced the token; not independently validated
    pub customer_id: String,
    pub created_at: DateTime<Utc>,
}

impl CardToken {
    /// Build a token from a successful encryption result.
    ///
    /// `cleaned_number` must already be digits-only; it is used solely to
    /// derive the brand and the masked display string and is not retained.
    pub fn new(
        token: impl Into<String>,
        cleaned_number: &str,
        holder_name: impl Into<String>,
        expiry: Expiry,
        customer_id: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            masked_number: mask_number(cleaned_number),
            card_brand: CardBrand::detect(cleaned_number),
            holder_name: holder_name.into(),
            expiry,
            customer_id: customer_id.into(),
            created_at: Utc::now(),
        }
    }

    /// A token is persistable only if its opaque blob is non-empty
    pub fn is_persistable(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

impl fmt::Debug for CardToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardToken")
            .field("token", &"<opaque>")
            .field("masked_number", &self.masked_number)
            .field("card_brand", &self.card_brand)
            .field("holder_name", &self.holder_name)
            .field("expiry", &self.expiry.display())
            .field("customer_id", &self.customer_id)
            .field("created_at", &self.created_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_detection() {
        assert_eq!(CardBrand::detect("4111111111111111"), CardBrand::Visa);
        assert_eq!(CardBrand::detect("5105105105105100"), CardBrand::Mastercard);
        assert_eq!(CardBrand::detect("5555555555554444"), CardBrand::Mastercard);
        assert_eq!(CardBrand::detect("340000000000009"), CardBrand::Amex);
        assert_eq!(CardBrand::detect("378282246310005"), CardBrand::Amex);
        assert_eq!(CardBrand::detect("6011111111111117"), CardBrand::Discover);
        assert_eq!(CardBrand::detect("9999999999999999"), CardBrand::Unknown);
        // 56 is outside the Mastercard band
        assert_eq!(CardBrand::detect("5600000000000000"), CardBrand::Unknown);
    }

    #[test]
    fn test_clean_card_number() {
        assert_eq!(clean_card_number("4111 1111 1111 1111"), "4111111111111111");
        assert_eq!(clean_card_number("4111-1111-1111-1111"), "4111111111111111");
        assert_eq!(clean_card_number("4111111111111111"), "4111111111111111");
    }

    #[test]
    fn test_mask_number() {
        let masked = mask_number("4111111111111111");
        assert_eq!(masked.chars().count(), 16);
        assert!(masked.ends_with("1111"));
        assert!(masked.chars().take(12).all(|c| c == MASK_CHAR));

        // Amex: 15 digits, 11 mask characters
        let masked = mask_number("378282246310005");
        assert_eq!(masked.chars().count(), 15);
        assert!(masked.ends_with("0005"));
        assert!(masked.chars().take(11).all(|c| c == MASK_CHAR));
    }

    #[test]
    fn test_expiry_parse_and_wire() {
        let expiry = Expiry::parse("12/25").unwrap();
        assert_eq!(expiry.month, 12);
        assert_eq!(expiry.year, 25);
        assert_eq!(expiry.display(), "12/25");
        assert_eq!(expiry.wire(), "122025");

        let expiry = Expiry::parse("01/30").unwrap();
        assert_eq!(expiry.wire(), "012030");
    }

    #[test]
    fn test_expiry_rejects_bad_input() {
        assert!(Expiry::parse("13/25").is_none());
        assert!(Expiry::parse("00/25").is_none());
        assert!(Expiry::parse("1/25").is_none());
        assert!(Expiry::parse("12/2025").is_none());
        assert!(Expiry::parse("1225").is_none());
        assert!(Expiry::parse("ab/cd").is_none());
    }

    #[test]
    fn test_expiry_serde_round_trip() {
        let expiry = Expiry::parse("09/27").unwrap();
        let json = serde_json::to_string(&expiry).unwrap();
        assert_eq!(json, "\"09/27\"");
        let back: Expiry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expiry);
    }

    #[test]
    fn test_card_token_new() {
        let token = CardToken::new(
            "blob",
            "4111111111111111",
            "TEST USER",
            Expiry::parse("12/25").unwrap(),
            "cust-1",
        );
        assert_eq!(token.card_brand, CardBrand::Visa);
        assert!(token.masked_number.ends_with("1111"));
        assert!(token.is_persistable());
    }

    #[test]
    fn test_card_token_debug_redacts_blob() {
        let token = CardToken::new(
            "super-secret-blob",
            "4111111111111111",
            "TEST USER",
            Expiry::parse("12/25").unwrap(),
            "cust-1",
        );
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret-blob"));
        assert!(rendered.contains("<opaque>"));
    }
}
