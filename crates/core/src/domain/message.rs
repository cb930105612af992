use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Ai,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "ai" => Ok(Self::Ai),
            other => Err(format!("unsupported message role `{other}` (expected user|ai)")),
        }
    }
}

/// One entry of a conversation log. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn is_ai(&self) -> bool {
        self.role == Role::Ai
    }
}

pub trait IdSource: Send + Sync {
    fn next_id(&self) -> MessageId;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn next_id(&self) -> MessageId {
        MessageId(Uuid::new_v4().to_string())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic ids (`<prefix>-1`, `<prefix>-2`, ...) for replays and tests.
#[derive(Debug)]
pub struct SequentialIdSource {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIdSource {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into(), counter: AtomicU64::new(0) }
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&self) -> MessageId {
        let next = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        MessageId(format!("{}-{next}", self.prefix))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct MessageFactory<I = UuidIdSource, C = SystemClock> {
    ids: I,
    clock: C,
}

impl<I, C> MessageFactory<I, C>
where
    I: IdSource,
    C: Clock,
{
    pub fn new(ids: I, clock: C) -> Self {
        Self { ids, clock }
    }

    pub fn create(&self, role: Role, content: impl Into<String>) -> ChatMessage {
        ChatMessage {
            id: self.ids.next_id(),
            role,
            content: content.into(),
            timestamp: self.clock.now(),
        }
    }
}

pub fn create_message(role: Role, content: impl Into<String>) -> ChatMessage {
    MessageFactory::<UuidIdSource, SystemClock>::default().create(role, content)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{
        create_message, ChatMessage, FixedClock, MessageFactory, MessageId, Role,
        SequentialIdSource,
    };

    #[test]
    fn factory_uses_injected_ids_and_clock() {
        let at = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).single().expect("valid timestamp");
        let factory = MessageFactory::new(SequentialIdSource::new("msg"), FixedClock(at));

        let first = factory.create(Role::User, "I want to submit 150 plastics");
        let second = factory.create(Role::Ai, "Great!");

        assert_eq!(first.id, MessageId("msg-1".to_string()));
        assert_eq!(second.id, MessageId("msg-2".to_string()));
        assert_eq!(first.timestamp, at);
        assert_eq!(first.role, Role::User);
        assert!(second.is_ai());
    }

    #[test]
    fn default_factory_generates_unique_ids() {
        let first = create_message(Role::User, "hello");
        let second = create_message(Role::User, "hello");

        assert_ne!(first.id, second.id);
    }

    #[test]
    fn stored_messages_keep_role_tags_and_timestamps() {
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single().expect("valid timestamp");
        let message = MessageFactory::new(SequentialIdSource::new("m"), FixedClock(at))
            .create(Role::Ai, "**Hello**");

        let json = serde_json::to_value(&message).expect("serialize message");
        assert_eq!(json["role"], "ai");
        assert_eq!(json["timestamp"], "2026-01-02T03:04:05Z");

        let restored: ChatMessage = serde_json::from_value(json).expect("deserialize message");
        assert_eq!(restored, message);
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("AI".parse::<Role>(), Ok(Role::Ai));
        assert!("bot".parse::<Role>().is_err());
    }
}
