use thiserror::Error;

use crate::config::ConfigError;

/// Failures outside the pure dialogue core: the conversation store or the
/// configuration the session was opened with.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Persistence(_) => "persistence",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Persistence(_) => 3,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Persistence(_) => {
                "Your conversation could not be saved. Please retry shortly."
            }
            Self::Configuration(_) => {
                "The assistant is misconfigured. Check the configuration and try again."
            }
        }
    }
}

impl From<ConfigError> for ApplicationError {
    fn from(value: ConfigError) -> Self {
        Self::Configuration(value.to_string())
    }
}
