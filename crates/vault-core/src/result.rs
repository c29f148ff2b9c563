//! # Payment Result Stage
//!
//! Reconciles a redirect-return from an external step-up challenge with
//! locally recorded "last attempt" state, and guarantees a definitive
//! outcome is presented exactly once. State machine:
//! Awaiting → PendingDisplay → Shown → Awaiting.

use serde::{Deserialize, Serialize};

/// Status of a resolved payment attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    Succeeded,
    Failed,
    Declined,
    Pending,
    Unknown,
}

impl AttemptStatus {
    /// Parse from a redirect-return query parameter, case-insensitively.
    /// Anything unrecognized is `Unknown` rather than an error.
    pub fn from_param(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "SUCCEEDED" | "SUCCESS" | "CAPTURED" => AttemptStatus::Succeeded,
            "FAILED" => AttemptStatus::Failed,
            "DECLINED" | "REJECTED" => AttemptStatus::Declined,
            "PENDING" | "PENDING_CAPTURE" => AttemptStatus::Pending,
            _ => AttemptStatus::Unknown,
        }
    }
}

/// Where a pending result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultSource {
    /// Returned from an external step-up challenge redirect
    RedirectReturn,
    /// Resolved within the same session, no redirect involved
    LocalSession,
}

/// A resolved payment attempt awaiting display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub payment_id: String,
    pub status: AttemptStatus,
    pub source: ResultSource,
}

#[derive(Debug, Default)]
enum StageState {
    /// No result pending
    #[default]
    Awaiting,
    /// A result is stored and not yet shown
    PendingDisplay(AttemptResult),
    /// The result has been displayed; a refresh must not re-show it
    Shown,
}

/// Session-scoped reconciliation stage.
///
/// Redirect-return parameters always take precedence over a same-session
/// pending result; consuming them strips them from the query string so a
/// reload does not re-display the same outcome.
#[derive(Debug, Default)]
pub struct ResultStage {
    state: StageState,
}

impl ResultStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a same-session attempt. Overwrites any
    /// earlier pending result.
    pub fn record_local(&mut self, payment_id: impl Into<String>, status: AttemptStatus) {
        self.state = StageState::PendingDisplay(AttemptResult {
            payment_id: payment_id.into(),
            status,
            source: ResultSource::LocalSession,
        });
    }

    /// Absorb redirect-return parameters from a raw query string.
    ///
    /// When `paymentId` is present it wins over any same-session pending
    /// result. Returns the query string with the consumed parameters
    /// removed, ready for further rendering.
    pub fn absorb_redirect(&mut self, query: &str) -> String {
        let mut payment_id = None;
        let mut status = None;
        let mut remainder = Vec::new();

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            match pair.split_once('=') {
                Some(("paymentId", value)) => payment_id = Some(value.to_string()),
                Some(("status", value)) => status = Some(AttemptStatus::from_param(value)),
                _ => remainder.push(pair),
            }
        }

        if let Some(payment_id) = payment_id {
            self.state = StageState::PendingDisplay(AttemptResult {
                payment_id,
                status: status.unwrap_or(AttemptStatus::Unknown),
                source: ResultSource::RedirectReturn,
            });
        }

        remainder.join("&")
    }

    /// Consume the pending result for display, transitioning to `Shown`.
    /// Returns `None` when nothing is pending or the result was already
    /// displayed.
    pub fn take_for_display(&mut self) -> Option<AttemptResult> {
        match std::mem::replace(&mut self.state, StageState::Shown) {
            StageState::PendingDisplay(result) => Some(result),
            StageState::Awaiting => {
                self.state = StageState::Awaiting;
                None
            }
            StageState::Shown => None,
        }
    }

    /// User dismissed the displayed result
    pub fn dismiss(&mut self) {
        self.state = StageState::Awaiting;
    }

    /// A new attempt is starting; any stale result is dropped
    pub fn begin_attempt(&mut self) {
        self.state = StageState::Awaiting;
    }

    pub fn has_pending(&self) -> bool {
        matches!(self.state, StageState::PendingDisplay(_))
    }
}
