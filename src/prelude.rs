//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types from the kaiwa crate so callers
//! can pull in the core surface with a single import.
//!
//! # Example
//!
//! ```rust,no_run
//! use kaiwa::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let graph_json = std::fs::read_to_string("path/to/graph.json")?;
//! let graph = ConnectionGraph::from_document(GraphDocument::from_json(&graph_json)?)?;
//!
//! let engine = Engine::new(graph, AHashMap::new())
//!     .map_err(|issues| format!("{} authoring issue(s)", issues.len()))?;
//!
//! let mut store = InMemoryStore::new();
//! let event = InboundEvent::message("user-1", "hi");
//! let report = engine.run(&event, ExecutionContext::default(), &mut store);
//!
//! println!("{}", TurnFormatter::format_turn(&report, engine.graph()));
//! # Ok(())
//! # }
//! ```

// Engine surface
pub use crate::engine::{
    ActionDirective, DEFAULT_STEP_BUDGET, Engine, EventKind, ExecutionContext, InboundEvent,
    TurnOutcome, TurnReport,
};

// Graph model
pub use crate::graph::{
    BlockInstance, Connection, ConnectionGraph, ConnectionPatch, ConnectionType, GraphDocument,
    Position,
};

// Registry
pub use crate::registry::{
    ActionOp, BlockFields, BlockKind, ContainerMode, TriggerPattern, describe, validate_fields,
};

// Predicates and values
pub use crate::predicate::{CompareOp, Predicate};
pub use crate::value::Value;

// Message composition
pub use crate::message::{
    Bubble, BoxComponent, Component, MAX_CAROUSEL_BUBBLES, MessageTree, TextComponent, compose,
    substitute,
};

// Collaborator seams
pub use crate::collab::{
    DispatchPayload, InMemoryStore, StdoutDispatcher, VariableStore, WebhookDispatcher,
};

// Error types
pub use crate::error::{
    CompositionError, DispatchError, DocumentError, ExecutionError, GraphError, StoreError,
    ValidationIssue,
};

// Trace formatting
pub use crate::trace::TurnFormatter;

// Commonly paired external types
pub use ahash::AHashMap;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
