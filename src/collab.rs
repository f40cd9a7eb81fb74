//! Trait seams for the external collaborators the engine talks to.
//!
//! The engine treats both collaborators as atomic request/response calls:
//! any serialization or retry policy is theirs, and failures surface as
//! Erroring-state transitions rather than panics.

use crate::engine::ActionDirective;
use crate::error::{DispatchError, StoreError};
use crate::message::MessageTree;
use crate::value::Value;
use ahash::AHashMap;

/// Durable per-user state across turns.
///
/// The execution context is discarded after every turn; anything a bot wants
/// to remember must be written here explicitly by an action block.
pub trait VariableStore {
    fn get(&self, user_id: &str, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&mut self, user_id: &str, key: &str, value: Value) -> Result<(), StoreError>;
}

/// Simple in-process store for tests and the demo binary.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: AHashMap<(String, String), Value>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VariableStore for InMemoryStore {
    fn get(&self, user_id: &str, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .entries
            .get(&(user_id.to_string(), key.to_string()))
            .cloned())
    }

    fn set(&mut self, user_id: &str, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries
            .insert((user_id.to_string(), key.to_string()), value);
        Ok(())
    }
}

/// What a turn hands to the messaging platform.
#[derive(Debug, Clone, Copy)]
pub enum DispatchPayload<'a> {
    Message(&'a MessageTree),
    Actions(&'a [ActionDirective]),
}

/// Delivery boundary toward the messaging platform.
///
/// The engine's responsibility ends once it produces a validated, composed
/// result; dispatch is the caller's step.
pub trait WebhookDispatcher {
    fn send(&mut self, user_id: &str, payload: DispatchPayload<'_>) -> Result<(), DispatchError>;
}

/// Prints payloads as JSON; used by the demo binary.
#[derive(Debug, Default)]
pub struct StdoutDispatcher;

impl WebhookDispatcher for StdoutDispatcher {
    fn send(&mut self, user_id: &str, payload: DispatchPayload<'_>) -> Result<(), DispatchError> {
        let body = match payload {
            DispatchPayload::Message(tree) => serde_json::to_string_pretty(tree),
            DispatchPayload::Actions(directives) => serde_json::to_string_pretty(directives),
        }
        .map_err(|e| DispatchError::Rejected(e.to_string()))?;
        println!("-> {}: {}", user_id, body);
        Ok(())
    }
}
