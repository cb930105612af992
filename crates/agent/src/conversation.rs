use std::sync::OnceLock;

use ecopay_core::config::ProgramConfig;
use ecopay_core::domain::intent::Intent;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::error;

/// One step of the classification cascade.
#[derive(Clone, Debug)]
pub struct IntentRule {
    intent: Intent,
    pattern: Regex,
}

impl IntentRule {
    pub fn new(intent: Intent, pattern: &str) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self { intent, pattern })
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

/// Ordered first-match-wins cascade. Text that satisfies several rules gets the
/// intent of the earliest one; text that satisfies none is `Unrelated`.
#[derive(Clone, Debug)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(&ProgramConfig::default().name)
    }
}

impl IntentClassifier {
    pub fn new(program_name: &str) -> Self {
        let rules = standard_patterns(program_name)
            .into_iter()
            .filter_map(|(intent, pattern)| match IntentRule::new(intent, &pattern) {
                Ok(rule) => Some(rule),
                Err(compile_error) => {
                    error!(
                        event_name = "agent.classifier.rule_skipped",
                        intent = intent.as_str(),
                        error = %compile_error,
                        "intent pattern failed to compile"
                    );
                    None
                }
            })
            .collect();

        Self { rules }
    }

    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    pub fn classify(&self, text: &str) -> Intent {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(IntentRule::intent)
            .unwrap_or(Intent::Unrelated)
    }
}

fn standard_patterns(program_name: &str) -> Vec<(Intent, String)> {
    let program = regex::escape(&program_name.trim().to_lowercase());
    let mut recycling = [
        "recycle",
        "recycling",
        "plastic",
        "waste",
        "environment",
        "location",
        "where",
        "address",
        "drop",
    ]
    .join("|");
    if !program.is_empty() {
        recycling.push('|');
        recycling.push_str(&program);
    }

    vec![
        (
            Intent::Greeting,
            r"^\s*(hi|hello|hey|good\s*(morning|afternoon|evening)|howdy)".to_string(),
        ),
        (Intent::HumanSupport, r"human|agent|support|speak.*person|talk.*someone".to_string()),
        (Intent::RedemptionRequest, r"redeem|cash\s*out|withdraw|reward|payout".to_string()),
        (
            Intent::PlasticSubmission,
            r"submit|drop.*off|recycle.*plastic|bring.*plastic|how.*submit|[0-9]+\s*plastic"
                .to_string(),
        ),
        (Intent::CreditInquiry, r"credit|balance|point|how\s*much|earned".to_string()),
        (Intent::RecyclingQuestion, recycling),
    ]
}

pub fn classify_intent(text: &str) -> Intent {
    static CLASSIFIER: OnceLock<IntentClassifier> = OnceLock::new();
    CLASSIFIER.get_or_init(IntentClassifier::default).classify(text)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityUnit {
    Plastic,
    Bottle,
    Item,
    Piece,
}

impl QuantityUnit {
    const ALL: [QuantityUnit; 4] = [Self::Plastic, Self::Bottle, Self::Item, Self::Piece];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plastic => "plastic",
            Self::Bottle => "bottle",
            Self::Item => "item",
            Self::Piece => "piece",
        }
    }

    /// Singular or plural unit word at the start of `text`, ending at a word boundary.
    fn is_word_at(&self, text: &str) -> bool {
        let Some(rest) = text.strip_prefix(self.as_str()) else {
            return false;
        };
        let rest = rest.strip_prefix('s').unwrap_or(rest);
        !rest.starts_with(|character: char| character.is_alphanumeric() || character == '_')
    }
}

/// The first number in a message and the unit word that follows it, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct QuantityMention {
    pub value: u64,
    pub unit: Option<QuantityUnit>,
}

impl QuantityMention {
    /// Digit runs too large for `u64` saturate to `u64::MAX`; bounding the
    /// value is the policy's job.
    pub fn find(text: &str) -> Option<Self> {
        let start = text.find(|character: char| character.is_ascii_digit())?;
        let rest = &text[start..];
        let end = rest
            .find(|character: char| !character.is_ascii_digit())
            .unwrap_or(rest.len());
        let digits = &rest[..end];
        let value = digits.parse::<u64>().unwrap_or(u64::MAX);

        let trailing = rest[end..].trim_start().to_ascii_lowercase();
        let unit = QuantityUnit::ALL.into_iter().find(|unit| unit.is_word_at(&trailing));

        Some(Self { value, unit })
    }
}

pub fn extract_quantity(text: &str) -> Option<u64> {
    QuantityMention::find(text).map(|mention| mention.value)
}
