use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use ecopay_core::config::AppConfig;
use toml::Value;

use crate::commands::{load_config, CommandResult};

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key_path,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key_path, &field.value, source));
    }

    CommandResult::success("config", lines.join("\n"))
}

fn fields(config: &AppConfig) -> Vec<Field> {
    vec![
        Field {
            key_path: "program.name",
            env_keys: &["ECOPAY_PROGRAM_NAME"],
            value: config.program.name.clone(),
        },
        Field {
            key_path: "program.location",
            env_keys: &["ECOPAY_PROGRAM_LOCATION"],
            value: config.program.location.clone(),
        },
        Field {
            key_path: "program.currency_symbol",
            env_keys: &["ECOPAY_PROGRAM_CURRENCY_SYMBOL"],
            value: config.program.currency_symbol.clone(),
        },
        Field {
            key_path: "policy.min_submission",
            env_keys: &["ECOPAY_POLICY_MIN_SUBMISSION"],
            value: config.policy.min_submission.to_string(),
        },
        Field {
            key_path: "policy.credits_per_item",
            env_keys: &["ECOPAY_POLICY_CREDITS_PER_ITEM"],
            value: config.policy.credits_per_item.to_string(),
        },
        Field {
            key_path: "policy.cash_per_item",
            env_keys: &["ECOPAY_POLICY_CASH_PER_ITEM"],
            value: config.policy.cash_per_item.to_string(),
        },
        Field {
            key_path: "policy.redemption_threshold",
            env_keys: &["ECOPAY_POLICY_REDEMPTION_THRESHOLD"],
            value: config.policy.redemption_threshold.to_string(),
        },
        Field {
            key_path: "policy.max_quantity",
            env_keys: &["ECOPAY_POLICY_MAX_QUANTITY"],
            value: config.policy.max_quantity.to_string(),
        },
        Field {
            key_path: "session.starting_credits",
            env_keys: &["ECOPAY_SESSION_STARTING_CREDITS"],
            value: config.session.starting_credits.to_string(),
        },
        Field {
            key_path: "session.credit_goal",
            env_keys: &["ECOPAY_SESSION_CREDIT_GOAL"],
            value: config.session.credit_goal.to_string(),
        },
        Field {
            key_path: "storage.backend",
            env_keys: &["ECOPAY_STORAGE_BACKEND"],
            value: format!("{:?}", config.storage.backend),
        },
        Field {
            key_path: "storage.database_url",
            env_keys: &["ECOPAY_STORAGE_DATABASE_URL"],
            value: config.storage.database_url.clone(),
        },
        Field {
            key_path: "storage.max_connections",
            env_keys: &["ECOPAY_STORAGE_MAX_CONNECTIONS"],
            value: config.storage.max_connections.to_string(),
        },
        Field {
            key_path: "storage.timeout_secs",
            env_keys: &["ECOPAY_STORAGE_TIMEOUT_SECS"],
            value: config.storage.timeout_secs.to_string(),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["ECOPAY_LOGGING_LEVEL", "ECOPAY_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["ECOPAY_LOGGING_FORMAT", "ECOPAY_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("ecopay.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/ecopay.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
