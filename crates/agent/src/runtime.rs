use std::sync::Arc;

use ecopay_core::config::AppConfig;
use ecopay_core::domain::credits::{CreditDelta, UserCredits};
use ecopay_core::domain::intent::Intent;
use ecopay_core::domain::message::{
    ChatMessage, Clock, IdSource, MessageFactory, Role, SystemClock, UuidIdSource,
};
use ecopay_core::errors::ApplicationError;
use ecopay_db::ConversationStore;
use serde::Serialize;
use tracing::{error, info};

use crate::policy::DialoguePolicy;

/// Values a session resets to when storage is empty, unreadable, or cleared.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionDefaults {
    pub credits: UserCredits,
}

impl SessionDefaults {
    pub fn from_config(config: &AppConfig) -> Self {
        Self { credits: UserCredits::new(config.session.starting_credits, 0, 0) }
    }
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// One completed turn: the user's message, the reply, and the ledger after
/// merging any delta.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Exchange {
    pub user: ChatMessage,
    pub reply: ChatMessage,
    pub intent: Intent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_delta: Option<CreditDelta>,
    pub credits: UserCredits,
}

/// Owns a conversation log and the credit ledger for one user and persists
/// both after every turn. `&mut self` keeps a single request in flight.
pub struct ChatSession<I = UuidIdSource, C = SystemClock> {
    store: Arc<dyn ConversationStore>,
    policy: DialoguePolicy,
    factory: MessageFactory<I, C>,
    defaults: SessionDefaults,
    messages: Vec<ChatMessage>,
    credits: UserCredits,
}

impl ChatSession<UuidIdSource, SystemClock> {
    pub async fn open_with_config(
        store: Arc<dyn ConversationStore>,
        config: &AppConfig,
    ) -> Result<Self, ApplicationError> {
        Self::open(
            store,
            DialoguePolicy::new(config.policy.clone(), config.program.clone()),
            MessageFactory::default(),
            SessionDefaults::from_config(config),
        )
        .await
    }
}

impl<I, C> ChatSession<I, C>
where
    I: IdSource,
    C: Clock,
{
    pub async fn open(
        store: Arc<dyn ConversationStore>,
        policy: DialoguePolicy,
        factory: MessageFactory<I, C>,
        defaults: SessionDefaults,
    ) -> Result<Self, ApplicationError> {
        let stored_messages = store.load_messages().await?;
        let stored_credits = store.load_credits().await?;
        let restored = stored_messages.is_some() || stored_credits.is_some();

        let messages = match stored_messages {
            Some(messages) => messages,
            None => vec![factory.create(Role::Ai, policy.welcome())],
        };
        let credits = stored_credits.unwrap_or(defaults.credits);

        info!(
            event_name = "agent.session.opened",
            restored,
            message_count = messages.len(),
            credits_total = credits.total,
            credits_pending = credits.pending,
            "chat session opened"
        );

        Ok(Self { store, policy, factory, defaults, messages, credits })
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn credits(&self) -> UserCredits {
        self.credits
    }

    pub fn policy(&self) -> &DialoguePolicy {
        &self.policy
    }

    /// Runs one turn. Blank input is ignored and returns `None`.
    pub async fn send(&mut self, text: &str) -> Result<Option<Exchange>, ApplicationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }

        let user = self.factory.create(Role::User, trimmed);
        let decision = self.policy.decide(trimmed, &self.credits);
        let credits = match &decision.payload.credit_delta {
            Some(delta) => self.credits.merged(delta),
            None => self.credits,
        };
        let reply = self.factory.create(Role::Ai, decision.payload.content);

        let mut messages = Vec::with_capacity(self.messages.len() + 2);
        messages.extend_from_slice(&self.messages);
        messages.push(user.clone());
        messages.push(reply.clone());

        self.persist(&messages, &credits).await?;
        self.messages = messages;
        self.credits = credits;

        info!(
            event_name = "agent.session.reply",
            message_id = %reply.id,
            intent = decision.intent.as_str(),
            credit_delta_pending = decision.payload.credit_delta.and_then(|delta| delta.pending),
            credits_total = self.credits.total,
            credits_pending = self.credits.pending,
            "reply generated"
        );

        Ok(Some(Exchange {
            user,
            reply,
            intent: decision.intent,
            credit_delta: decision.payload.credit_delta,
            credits: self.credits,
        }))
    }

    /// Resets the log to a fresh welcome message and the ledger to its
    /// starting balance, and removes both stored records.
    pub async fn clear(&mut self) -> Result<(), ApplicationError> {
        self.store.clear().await?;
        self.messages = vec![self.factory.create(Role::Ai, self.policy.welcome())];
        self.credits = self.defaults.credits;

        info!(
            event_name = "agent.session.cleared",
            credits_total = self.credits.total,
            "chat history and credits reset"
        );
        Ok(())
    }

    /// Writes credits, then the log. A failed log write puts the previous
    /// credits back, so the stored log never references credits the stored
    /// ledger lacks.
    async fn persist(
        &self,
        messages: &[ChatMessage],
        credits: &UserCredits,
    ) -> Result<(), ApplicationError> {
        self.store.save_credits(credits).await?;

        if let Err(save_error) = self.store.save_messages(messages).await {
            if let Err(rollback_error) = self.store.save_credits(&self.credits).await {
                error!(
                    event_name = "agent.session.rollback_failed",
                    error = %rollback_error,
                    "could not restore stored credits after a failed log write"
                );
            }
            return Err(save_error.into());
        }
        Ok(())
    }
}
