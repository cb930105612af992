pub mod config;
pub mod domain;
pub mod errors;

pub use config::{AppConfig, PolicyConfig, ProgramConfig, SessionConfig};
pub use domain::credits::{CreditDelta, CreditProgress, UserCredits};
pub use domain::intent::Intent;
pub use domain::message::{
    create_message, ChatMessage, Clock, FixedClock, IdSource, MessageFactory, MessageId, Role,
    SequentialIdSource, SystemClock, UuidIdSource,
};
pub use errors::ApplicationError;
