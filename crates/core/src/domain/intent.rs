use std::fmt;

use serde::{Deserialize, Serialize};

/// The single classified purpose of a user utterance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    HumanSupport,
    RedemptionRequest,
    PlasticSubmission,
    CreditInquiry,
    RecyclingQuestion,
    Unrelated,
}

impl Intent {
    pub const ALL: [Intent; 7] = [
        Self::Greeting,
        Self::HumanSupport,
        Self::RedemptionRequest,
        Self::PlasticSubmission,
        Self::CreditInquiry,
        Self::RecyclingQuestion,
        Self::Unrelated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::HumanSupport => "human_support",
            Self::RedemptionRequest => "redemption_request",
            Self::PlasticSubmission => "plastic_submission",
            Self::CreditInquiry => "credit_inquiry",
            Self::RecyclingQuestion => "recycling_question",
            Self::Unrelated => "unrelated",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Intent;

    #[test]
    fn tags_match_serialized_names() {
        for intent in Intent::ALL {
            let json = serde_json::to_string(&intent).expect("serialize intent");
            assert_eq!(json, format!("\"{}\"", intent.as_str()));
        }
    }
}
