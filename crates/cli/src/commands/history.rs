use crate::commands::{open_session, prepare, CommandResult};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("history") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    match runtime.block_on(async { open_session(&config).await }) {
        Ok(session) => CommandResult::success_with_data(
            "history",
            format!("message_count={}", session.messages().len()),
            serde_json::to_value(session.messages()).ok(),
        ),
        Err(error) => CommandResult::from_error("history", &error),
    }
}
