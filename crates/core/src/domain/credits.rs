use serde::{Deserialize, Serialize};

/// A user's reward ledger. The caller owns the authoritative copy; the dialogue
/// policy only ever sees a snapshot and answers with a [`CreditDelta`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserCredits {
    pub total: u64,
    pub pending: u64,
    pub redeemed: u64,
}

/// Partial ledger update. Every present field replaces the caller's value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CreditDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redeemed: Option<u64>,
}

impl UserCredits {
    pub fn new(total: u64, pending: u64, redeemed: u64) -> Self {
        Self { total, pending, redeemed }
    }

    pub fn apply(&mut self, delta: &CreditDelta) {
        if let Some(total) = delta.total {
            self.total = total;
        }
        if let Some(pending) = delta.pending {
            self.pending = pending;
        }
        if let Some(redeemed) = delta.redeemed {
            self.redeemed = redeemed;
        }
    }

    pub fn merged(mut self, delta: &CreditDelta) -> Self {
        self.apply(delta);
        self
    }
}

impl CreditDelta {
    pub fn pending(pending: u64) -> Self {
        Self { pending: Some(pending), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.total.is_none() && self.pending.is_none() && self.redeemed.is_none()
    }
}

/// Progress toward the long-term credit goal shown on the credit bar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CreditProgress {
    pub goal: u64,
    pub percent: f64,
    pub remaining: u64,
    pub eligible: bool,
}

impl CreditProgress {
    pub fn toward(credits: &UserCredits, goal: u64) -> Self {
        let percent = if goal == 0 {
            100.0
        } else {
            ((credits.total as f64 / goal as f64) * 100.0).min(100.0)
        };

        Self {
            goal,
            percent,
            remaining: goal.saturating_sub(credits.total),
            eligible: credits.total >= goal,
        }
    }
}
