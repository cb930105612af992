//! Agent Runtime - scripted intent routing and reply generation
//!
//! This crate is the conversational half of Ecopay:
//! - Classifies free text into one of a fixed set of intents (`conversation`)
//! - Pulls the first quantity out of a message (`conversation`)
//! - Picks a reply template and an optional credit change (`policy`)
//! - Keeps the message log and ledger in step with storage (`runtime`)
//!
//! # Key Types
//!
//! - `IntentClassifier` - ordered regex cascade, first match wins
//! - `DialoguePolicy` - intent + credits snapshot -> reply and delta
//! - `ChatSession` - one user's log and ledger behind a `ConversationStore`
//!
//! Every decision here is deterministic. The same text and the same credit
//! snapshot always produce the same reply.

pub mod conversation;
pub mod policy;
pub mod runtime;

pub use conversation::{classify_intent, extract_quantity, IntentClassifier, QuantityMention};
pub use policy::{generate_response, Decision, DialoguePolicy, ResponsePayload};
pub use runtime::{ChatSession, Exchange, SessionDefaults};
