use ecopay_core::config::StorageBackend;
use ecopay_db::{connect, migrations};

use crate::commands::{prepare, CommandResult};

pub fn run() -> CommandResult {
    let (config, runtime) = match prepare("migrate") {
        Ok(prepared) => prepared,
        Err(result) => return result,
    };

    if config.storage.backend == StorageBackend::Memory {
        return CommandResult::success("migrate", "memory backend has no migrations to apply");
    }

    let result = runtime.block_on(async {
        let pool = connect(&config.storage)
            .await
            .map_err(|error| ("db_connectivity", error.to_string()))?;
        migrations::run_pending(&pool).await.map_err(|error| ("migration", error.to_string()))?;
        pool.close().await;
        Ok::<(), (&'static str, String)>(())
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err((error_class, message)) => CommandResult::failure("migrate", error_class, message, 3),
    }
}
