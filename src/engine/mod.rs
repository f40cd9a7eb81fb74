//! The execution engine: bounded, deterministic graph walking.
//!
//! One inbound event is one engine run. All per-run state lives in an
//! explicit [`ExecutionContext`] value created fresh for the turn and
//! returned inside the [`TurnReport`], so independent runs share nothing and
//! a fixed `(graph, context, event)` triple always reproduces the same
//! visited-block sequence and output.

use crate::error::ExecutionError;
use crate::message::MessageTree;
use crate::value::Value;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

mod walk;

pub use walk::Engine;

/// Default hard ceiling on blocks visited in one walk.
pub const DEFAULT_STEP_BUDGET: u32 = 256;

/// Per-turn, ephemeral state carried through a graph walk.
///
/// Discarded when the turn completes; durable cross-turn state lives only in
/// the external variable store.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Variable map the walk reads and writes. Keys are unique; insertion
    /// order is irrelevant.
    pub variables: AHashMap<String, Value>,
    /// Visited block ids in order, for diagnostics and the preview feature.
    pub execution_stack: Vec<String>,
    /// Remaining iterations per loop block, initialized on first visit.
    pub loop_counters: AHashMap<String, u32>,
    /// Hard ceiling on `current_step`; the engine's termination guarantee.
    pub max_execution_steps: u32,
    /// Monotonically increasing count of visited blocks.
    pub current_step: u32,
}

impl ExecutionContext {
    pub fn new(max_execution_steps: u32) -> Self {
        ExecutionContext {
            variables: AHashMap::new(),
            execution_stack: Vec::new(),
            loop_counters: AHashMap::new(),
            max_execution_steps,
            current_step: 0,
        }
    }

    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        ExecutionContext::new(DEFAULT_STEP_BUDGET)
    }
}

/// The stable inbound event shape handed over by the webhook layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub user_id: String,
    /// Message text or postback data; empty for follow/unfollow.
    #[serde(default)]
    pub payload: String,
    pub timestamp: i64,
}

impl InboundEvent {
    pub fn message(user_id: &str, text: &str) -> Self {
        InboundEvent {
            kind: EventKind::Message,
            user_id: user_id.to_string(),
            payload: text.to_string(),
            timestamp: 0,
        }
    }

    pub fn postback(user_id: &str, data: &str) -> Self {
        InboundEvent {
            kind: EventKind::Postback,
            ..InboundEvent::message(user_id, data)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Message,
    Postback,
    Follow,
    Unfollow,
}

/// An externally visible side effect applied during the walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ActionDirective {
    SetVariable {
        key: String,
        value: Value,
        durable: bool,
    },
}

/// Everything a finished turn reports back to the caller.
#[derive(Debug)]
pub struct TurnReport {
    /// Final context, including the full visited-block stack.
    pub context: ExecutionContext,
    pub outcome: TurnOutcome,
}

impl TurnReport {
    /// Visited block ids in walk order.
    pub fn visited(&self) -> &[String] {
        &self.context.execution_stack
    }
}

/// How a turn ended. Failures cross the boundary as data, never as a panic
/// or an opaque error.
#[derive(Debug)]
pub enum TurnOutcome {
    /// A message-producing action block composed a reply.
    Reply {
        message: MessageTree,
        directives: Vec<ActionDirective>,
    },
    /// The walk ended without composing a message.
    Actions(Vec<ActionDirective>),
    /// No trigger matched the event; the bot ignores it.
    NoTrigger,
    /// A run-time error with no ERROR edge to absorb it.
    Failed {
        block_id: String,
        error: ExecutionError,
    },
}
