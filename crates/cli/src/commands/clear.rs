use crate::commands::{open_session, prepare, CommandResult};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("clear") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let mut session = open_session(&config).await?;
        session.clear().await
    });

    match result {
        Ok(()) => CommandResult::success("clear", "chat history and credits reset"),
        Err(error) => CommandResult::from_error("clear", &error),
    }
}
