use ecopay_core::domain::credits::CreditProgress;
use serde_json::json;

use crate::commands::{open_session, prepare, CommandResult};
use crate::render::credit_bar;

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("credits") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async { open_session(&config).await });

    let session = match result {
        Ok(session) => session,
        Err(error) => return CommandResult::from_error("credits", &error),
    };

    let credits = session.credits();
    let progress = CreditProgress::toward(&credits, config.session.credit_goal);
    let cash = session.policy().format_cash(session.policy().cash_value(credits.total));

    CommandResult::success_with_data(
        "credits",
        credit_bar(&credits, &progress, &cash),
        Some(json!({
            "credits": credits,
            "cash_value": cash,
            "progress": progress,
        })),
    )
}
