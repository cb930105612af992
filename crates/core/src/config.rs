use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub program: ProgramConfig,
    pub policy: PolicyConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Branding and location copy used in replies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProgramConfig {
    pub name: String,
    pub location: String,
    pub currency_symbol: String,
}

/// Fixed business parameters of the dialogue policy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolicyConfig {
    pub min_submission: u64,
    pub credits_per_item: u64,
    pub cash_per_item: Decimal,
    pub redemption_threshold: u64,
    pub max_quantity: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub starting_credits: u64,
    pub credit_goal: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub database_url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    Sqlite,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub storage_backend: Option<StorageBackend>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            name: "Ecopay".to_string(),
            location: "Ilara Mokin, Ondo State".to_string(),
            currency_symbol: "₦".to_string(),
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            min_submission: 100,
            credits_per_item: 1,
            cash_per_item: Decimal::new(5, 1),
            redemption_threshold: 1_000,
            max_quantity: 1_000_000,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { starting_credits: 250, credit_goal: 10_000 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            database_url: "sqlite://ecopay.db?mode=rwc".to_string(),
            max_connections: 1,
            timeout_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::Compact }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            program: ProgramConfig::default(),
            policy: PolicyConfig::default(),
            session: SessionConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::Validation(format!(
                "unsupported storage backend `{other}` (expected memory|sqlite)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("ecopay.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(program) = patch.program {
            if let Some(name) = program.name {
                self.program.name = name;
            }
            if let Some(location) = program.location {
                self.program.location = location;
            }
            if let Some(currency_symbol) = program.currency_symbol {
                self.program.currency_symbol = currency_symbol;
            }
        }

        if let Some(policy) = patch.policy {
            if let Some(min_submission) = policy.min_submission {
                self.policy.min_submission = min_submission;
            }
            if let Some(credits_per_item) = policy.credits_per_item {
                self.policy.credits_per_item = credits_per_item;
            }
            if let Some(cash_per_item) = policy.cash_per_item {
                self.policy.cash_per_item = cash_per_item;
            }
            if let Some(redemption_threshold) = policy.redemption_threshold {
                self.policy.redemption_threshold = redemption_threshold;
            }
            if let Some(max_quantity) = policy.max_quantity {
                self.policy.max_quantity = max_quantity;
            }
        }

        if let Some(session) = patch.session {
            if let Some(starting_credits) = session.starting_credits {
                self.session.starting_credits = starting_credits;
            }
            if let Some(credit_goal) = session.credit_goal {
                self.session.credit_goal = credit_goal;
            }
        }

        if let Some(storage) = patch.storage {
            if let Some(backend) = storage.backend {
                self.storage.backend = backend;
            }
            if let Some(database_url) = storage.database_url {
                self.storage.database_url = database_url;
            }
            if let Some(max_connections) = storage.max_connections {
                self.storage.max_connections = max_connections;
            }
            if let Some(timeout_secs) = storage.timeout_secs {
                self.storage.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("ECOPAY_PROGRAM_NAME") {
            self.program.name = value;
        }
        if let Some(value) = read_env("ECOPAY_PROGRAM_LOCATION") {
            self.program.location = value;
        }
        if let Some(value) = read_env("ECOPAY_PROGRAM_CURRENCY_SYMBOL") {
            self.program.currency_symbol = value;
        }

        if let Some(value) = read_env("ECOPAY_POLICY_MIN_SUBMISSION") {
            self.policy.min_submission = parse_u64("ECOPAY_POLICY_MIN_SUBMISSION", &value)?;
        }
        if let Some(value) = read_env("ECOPAY_POLICY_CREDITS_PER_ITEM") {
            self.policy.credits_per_item = parse_u64("ECOPAY_POLICY_CREDITS_PER_ITEM", &value)?;
        }
        if let Some(value) = read_env("ECOPAY_POLICY_CASH_PER_ITEM") {
            self.policy.cash_per_item = parse_decimal("ECOPAY_POLICY_CASH_PER_ITEM", &value)?;
        }
        if let Some(value) = read_env("ECOPAY_POLICY_REDEMPTION_THRESHOLD") {
            self.policy.redemption_threshold =
                parse_u64("ECOPAY_POLICY_REDEMPTION_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("ECOPAY_POLICY_MAX_QUANTITY") {
            self.policy.max_quantity = parse_u64("ECOPAY_POLICY_MAX_QUANTITY", &value)?;
        }

        if let Some(value) = read_env("ECOPAY_SESSION_STARTING_CREDITS") {
            self.session.starting_credits = parse_u64("ECOPAY_SESSION_STARTING_CREDITS", &value)?;
        }
        if let Some(value) = read_env("ECOPAY_SESSION_CREDIT_GOAL") {
            self.session.credit_goal = parse_u64("ECOPAY_SESSION_CREDIT_GOAL", &value)?;
        }

        if let Some(value) = read_env("ECOPAY_STORAGE_BACKEND") {
            self.storage.backend = value.parse()?;
        }
        if let Some(value) = read_env("ECOPAY_STORAGE_DATABASE_URL") {
            self.storage.database_url = value;
        }
        if let Some(value) = read_env("ECOPAY_STORAGE_MAX_CONNECTIONS") {
            self.storage.max_connections = parse_u32("ECOPAY_STORAGE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("ECOPAY_STORAGE_TIMEOUT_SECS") {
            self.storage.timeout_secs = parse_u64("ECOPAY_STORAGE_TIMEOUT_SECS", &value)?;
        }

        let log_level = read_env("ECOPAY_LOGGING_LEVEL").or_else(|| read_env("ECOPAY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("ECOPAY_LOGGING_FORMAT").or_else(|| read_env("ECOPAY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.storage.database_url = database_url;
        }
        if let Some(storage_backend) = overrides.storage_backend {
            self.storage.backend = storage_backend;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_program(&self.program)?;
        validate_policy(&self.policy)?;
        validate_session(&self.session)?;
        validate_storage(&self.storage)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("ecopay.toml"), PathBuf::from("config/ecopay.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_program(program: &ProgramConfig) -> Result<(), ConfigError> {
    if program.name.trim().is_empty() {
        return Err(ConfigError::Validation("program.name must not be empty".to_string()));
    }
    if program.location.trim().is_empty() {
        return Err(ConfigError::Validation("program.location must not be empty".to_string()));
    }
    Ok(())
}

fn validate_policy(policy: &PolicyConfig) -> Result<(), ConfigError> {
    if policy.min_submission == 0 {
        return Err(ConfigError::Validation(
            "policy.min_submission must be greater than zero".to_string(),
        ));
    }

    if policy.credits_per_item == 0 {
        return Err(ConfigError::Validation(
            "policy.credits_per_item must be greater than zero".to_string(),
        ));
    }

    if policy.cash_per_item.is_sign_negative() {
        return Err(ConfigError::Validation(
            "policy.cash_per_item must not be negative".to_string(),
        ));
    }

    if policy.redemption_threshold == 0 {
        return Err(ConfigError::Validation(
            "policy.redemption_threshold must be greater than zero".to_string(),
        ));
    }

    if policy.max_quantity < policy.min_submission {
        return Err(ConfigError::Validation(format!(
            "policy.max_quantity ({}) must be at least policy.min_submission ({})",
            policy.max_quantity, policy.min_submission
        )));
    }

    let largest_award = policy.max_quantity.checked_mul(policy.credits_per_item);
    if largest_award.is_none() {
        return Err(ConfigError::Validation(
            "policy.max_quantity * policy.credits_per_item overflows the credit range".to_string(),
        ));
    }

    Ok(())
}

fn validate_session(session: &SessionConfig) -> Result<(), ConfigError> {
    if session.credit_goal == 0 {
        return Err(ConfigError::Validation(
            "session.credit_goal must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_storage(storage: &StorageConfig) -> Result<(), ConfigError> {
    if storage.backend == StorageBackend::Memory {
        return Ok(());
    }

    let url = storage.database_url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "storage.database_url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if storage.max_connections == 0 {
        return Err(ConfigError::Validation(
            "storage.max_connections must be greater than zero".to_string(),
        ));
    }

    if storage.timeout_secs == 0 || storage.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "storage.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_decimal(key: &str, value: &str) -> Result<Decimal, ConfigError> {
    value.trim().parse::<Decimal>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    program: Option<ProgramPatch>,
    policy: Option<PolicyPatch>,
    session: Option<SessionPatch>,
    storage: Option<StoragePatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ProgramPatch {
    name: Option<String>,
    location: Option<String>,
    currency_symbol: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PolicyPatch {
    min_submission: Option<u64>,
    credits_per_item: Option<u64>,
    cash_per_item: Option<Decimal>,
    redemption_threshold: Option<u64>,
    max_quantity: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SessionPatch {
    starting_credits: Option<u64>,
    credit_goal: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct StoragePatch {
    backend: Option<StorageBackend>,
    database_url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, StorageBackend};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_match_program_policy() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.policy.min_submission == 100, "minimum submission should be 100")?;
        ensure(config.policy.credits_per_item == 1, "credit rate should be 1 per item")?;
        ensure(config.policy.cash_per_item == Decimal::new(5, 1), "cash rate should be 0.5")?;
        ensure(config.policy.redemption_threshold == 1_000, "threshold should be 1000")?;
        ensure(config.session.starting_credits == 250, "starting credits should be 250")?;
        ensure(config.program.name == "Ecopay", "program name should default to Ecopay")?;
        ensure(
            matches!(config.logging.format, LogFormat::Compact),
            "default logging format should be compact",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_ECOPAY_LOCATION", "Akure, Ondo State");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("ecopay.toml");
            fs::write(
                &path,
                r#"
[program]
location = "${TEST_ECOPAY_LOCATION}"

[policy]
cash_per_item = 0.75
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.program.location == "Akure, Ondo State",
                "location should be interpolated from environment",
            )?;
            ensure(
                config.policy.cash_per_item == Decimal::new(75, 2),
                "cash rate should be read from file",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_ECOPAY_LOCATION"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ECOPAY_LOG_LEVEL", "debug");
        env::set_var("ECOPAY_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "debug", "debug log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["ECOPAY_LOG_LEVEL", "ECOPAY_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ECOPAY_STORAGE_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("ECOPAY_POLICY_MIN_SUBMISSION", "150");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("ecopay.toml");
            fs::write(
                &path,
                r#"
[storage]
database_url = "sqlite://from-file.db"

[policy]
min_submission = 120
redemption_threshold = 2000

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    storage_backend: Some(StorageBackend::Memory),
                    log_level: Some("info".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.storage.database_url == "sqlite://from-env.db",
                "env database url should win over file",
            )?;
            ensure(config.policy.min_submission == 150, "env minimum should win over file")?;
            ensure(config.policy.redemption_threshold == 2_000, "file threshold should apply")?;
            ensure(config.logging.level == "info", "overridden log level should be info")?;
            ensure(
                config.storage.backend == StorageBackend::Memory,
                "override storage backend should win",
            )?;
            Ok(())
        })();

        clear_vars(&["ECOPAY_STORAGE_DATABASE_URL", "ECOPAY_POLICY_MIN_SUBMISSION"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ECOPAY_POLICY_MAX_QUANTITY", "50");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("policy.max_quantity")
            );
            ensure(has_message, "validation failure should mention policy.max_quantity")
        })();

        clear_vars(&["ECOPAY_POLICY_MAX_QUANTITY"]);
        result
    }

    #[test]
    fn malformed_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("ECOPAY_POLICY_CASH_PER_ITEM", "half");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected env override failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(
                    error,
                    ConfigError::InvalidEnvOverride { ref key, .. }
                        if key == "ECOPAY_POLICY_CASH_PER_ITEM"
                ),
                "invalid override should name the offending variable",
            )
        })();

        clear_vars(&["ECOPAY_POLICY_CASH_PER_ITEM"]);
        result
    }

    #[test]
    fn missing_required_file_is_an_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let result = AppConfig::load(LoadOptions {
            config_path: Some(dir.path().join("absent.toml")),
            require_file: true,
            ..LoadOptions::default()
        });

        ensure(
            matches!(result, Err(ConfigError::MissingConfigFile(_))),
            "required but absent file should fail",
        )
    }
}
