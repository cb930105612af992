use ecopay_agent::conversation::{IntentClassifier, QuantityMention};
use serde::Serialize;

use crate::commands::{load_config, CommandResult};

#[derive(Debug, Serialize)]
struct Classification {
    intent: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quantity: Option<QuantityMention>,
}

/// Classification only: no session is opened and nothing is persisted.
pub fn run(text: &str) -> CommandResult {
    let config = match load_config("classify") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let classifier = IntentClassifier::new(&config.program.name);
    let classification = Classification {
        intent: classifier.classify(text).as_str(),
        quantity: QuantityMention::find(text),
    };

    CommandResult::success_with_data(
        "classify",
        format!("intent: {}", classification.intent),
        serde_json::to_value(&classification).ok(),
    )
}
