pub mod ask;
pub mod chat;
pub mod classify;
pub mod clear;
pub mod config;
pub mod credits;
pub mod history;
pub mod migrate;

use std::sync::Arc;

use ecopay_agent::ChatSession;
use ecopay_core::config::{AppConfig, LoadOptions, StorageBackend};
use ecopay_core::errors::ApplicationError;
use ecopay_db::{
    connect, migrations, ConversationStore, InMemoryConversationStore, SqlConversationStore,
};
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        Self::success_with_data(command, message, None)
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            error.exit_code(),
        )
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            2,
        )
    })
}

pub(crate) fn build_runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        )
    })
}

/// Builds the configured backend. SQLite stores are migrated before use.
pub async fn open_store(
    config: &AppConfig,
) -> Result<Arc<dyn ConversationStore>, ApplicationError> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(InMemoryConversationStore::new())),
        StorageBackend::Sqlite => {
            let pool = connect(&config.storage)
                .await
                .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
            migrations::run_pending(&pool)
                .await
                .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
            Ok(Arc::new(SqlConversationStore::new(pool)))
        }
    }
}

pub async fn open_session(config: &AppConfig) -> Result<ChatSession, ApplicationError> {
    let store = open_store(config).await?;
    ChatSession::open_with_config(store, config).await
}

pub(crate) fn prepare(command: &str) -> Result<(AppConfig, Runtime), CommandResult> {
    let config = load_config(command)?;
    let runtime = build_runtime(command)?;
    Ok((config, runtime))
}
