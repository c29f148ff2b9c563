//! # Input Validation
//!
//! Local card-field validation and the collaborator error-code mapping.
//! Local validation runs first and independently of any collaborator: a
//! request that fails here never leaves the process.

use crate::card::{clean_card_number, Expiry};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// Field-keyed validation errors. Keys are field names, values are
/// user-displayable messages.
pub type FieldErrors = BTreeMap<String, String>;

/// Raw card fields as entered by the user.
///
/// `Debug` is hand-written to redact everything sensitive; this struct must
/// never reach a log line or error payload as-is.
#[derive(Clone, Deserialize)]
pub struct CardInput {
    pub card_number: String,
    /// Display form `MM/YY`
    pub expiry: String,
    pub cvv: String,
    pub holder_name: String,
}

impl fmt::Debug for CardInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardInput")
            .field("card_number", &"<redacted>")
            .field("expiry", &"<redacted>")
            .field("cvv", &"<redacted>")
            .field("holder_name", &self.holder_name)
            .finish()
    }
}

/// Card fields that passed local validation: number cleaned to digits only,
/// expiry parsed, holder name trimmed. Still sensitive; consumed by the
/// tokenization flow and dropped.
#[derive(Clone)]
pub struct ValidatedCard {
    pub number: String,
    pub expiry: Expiry,
    pub cvv: String,
    pub holder_name: String,
}

impl fmt::Debug for ValidatedCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedCard")
            .field("number", &"<redacted>")
            .field("cvv", &"<redacted>")
            .field("holder_name", &self.holder_name)
            .finish()
    }
}

/// Validate raw card input.
///
/// Checks every field and collects all failures into one field-keyed map,
/// so the caller can render per-field messages in a single pass:
/// - card number: 13–19 digits after stripping separators
/// - expiry: `MM/YY`
/// - cvv: 3–4 digits
/// - holder name: non-empty after trim
pub fn validate(input: &CardInput) -> Result<ValidatedCard, FieldErrors> {
    let mut errors = FieldErrors::new();

    let number = clean_card_number(&input.card_number);
    if !number.chars().all(|c| c.is_ascii_digit()) || !(13..=19).contains(&number.len()) {
        errors.insert(
            "card_number".into(),
            "card number must be 13 to 19 digits".into(),
        );
    }

    let expiry = Expiry::parse(&input.expiry);
    if expiry.is_none() {
        errors.insert("expiry".into(), "expiry must be in MM/YY form".into());
    }

    if !input.cvv.chars().all(|c| c.is_ascii_digit()) || !(3..=4).contains(&input.cvv.len()) {
        errors.insert("cvv".into(), "cvv must be 3 or 4 digits".into());
    }

    let holder_name = input.holder_name.trim();
    if holder_name.is_empty() {
        errors.insert("holder_name".into(), "holder name is required".into());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidatedCard {
        number,
        // checked above
        expiry: expiry.expect("expiry validated"),
        cvv: input.cvv.clone(),
        holder_name: holder_name.to_string(),
    })
}

/// Map a collaborator validation error code to user-facing text.
///
/// The table is deliberately non-exhaustive; unrecognized codes fall back
/// to a generic message rather than leaking vendor internals.
pub fn collaborator_error_message(code: &str) -> &'static str {
    match code {
        "LUHN_CHECK_FAILED" => "invalid card number",
        "EXPIRATION_DATE" => "card expired or invalid date",
        "REGULAR_EXPRESSION" => "invalid format",
        "LENGTH" => "incorrect field length",
        "REQUIRED" => "this field is required",
        _ => "card data was rejected; please check your input",
    }
}
