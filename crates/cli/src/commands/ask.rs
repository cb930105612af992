use crate::commands::{open_session, prepare, CommandResult};

pub fn run(text: &str) -> CommandResult {
    let (config, runtime) = match prepare("ask") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let mut session = open_session(&config).await?;
        session.send(text).await
    });

    match result {
        Ok(Some(exchange)) => {
            let message = exchange.reply.content.clone();
            CommandResult::success_with_data("ask", message, serde_json::to_value(&exchange).ok())
        }
        Ok(None) => CommandResult::success("ask", "blank input ignored"),
        Err(error) => CommandResult::from_error("ask", &error),
    }
}
