//! # Kaiwa - Chatbot Flow Graph Engine
//!
//! **Kaiwa** turns a user-authored graph of typed blocks — the output of a
//! no-code chatbot builder's canvas — into deterministic, bounded,
//! replayable conversational behavior. It owns the connection graph and its
//! structural validation, a bounded graph-walking execution engine, and the
//! structured message component trees that composed replies must validate
//! against.
//!
//! ## Core Workflow
//!
//! 1. **Load**: parse the editor's persisted JSON into a [`graph::GraphDocument`]
//!    and admit it with [`graph::ConnectionGraph::from_document`], which applies
//!    the same per-edge legality rules as interactive editing.
//! 2. **Validate**: [`graph::ConnectionGraph::validate_all`] reports every fatal
//!    authoring error — cardinality violations, dangling references, and
//!    structural cycles that no LOOP edge bounds.
//! 3. **Execute**: build an [`engine::Engine`] (which refuses invalid graphs)
//!    and call [`engine::Engine::run`] once per inbound event. Each run gets a
//!    fresh [`engine::ExecutionContext`] and terminates within its step budget.
//! 4. **Deliver**: hand the composed [`message::MessageTree`] or directive list
//!    to the webhook dispatcher behind [`collab::WebhookDispatcher`].
//!
//! ## Quick Start
//!
//! ```rust
//! use kaiwa::prelude::*;
//!
//! // A minimal flow: a trigger for "hi" that replies with a greeting.
//! let mut graph = ConnectionGraph::new();
//! graph
//!     .add_block(BlockInstance::new(
//!         "greet",
//!         BlockFields::MessageTrigger {
//!             patterns: vec![TriggerPattern::Keyword {
//!                 text: "hi".to_string(),
//!                 exact: false,
//!             }],
//!         },
//!     ))
//!     .unwrap();
//! graph
//!     .add_block(BlockInstance::new(
//!         "reply",
//!         BlockFields::Action {
//!             op: ActionOp::SendMessage {
//!                 template_id: "hello".to_string(),
//!             },
//!         },
//!     ))
//!     .unwrap();
//! graph
//!     .create_connection(Connection::next("c1", "greet", "reply"))
//!     .unwrap();
//!
//! let mut templates = AHashMap::new();
//! templates.insert(
//!     "hello".to_string(),
//!     MessageTree::Bubble(Bubble {
//!         header: None,
//!         body: BoxComponent::vertical(vec![Component::Text(TextComponent::plain(
//!             "Hello {{name}}!",
//!         ))]),
//!         footer: None,
//!     }),
//! );
//!
//! let engine = Engine::new(graph, templates).expect("graph is valid");
//! let mut store = InMemoryStore::new();
//! let ctx = ExecutionContext::default().with_variable("name", "Amy");
//!
//! let report = engine.run(&InboundEvent::message("user-1", "hi"), ctx, &mut store);
//! match report.outcome {
//!     TurnOutcome::Reply { message, .. } => {
//!         println!("{}", serde_json::to_string_pretty(&message).unwrap());
//!     }
//!     other => panic!("expected a reply, got {:?}", other),
//! }
//! ```
//!
//! ## Determinism and Safety
//!
//! The engine's contract is that a fixed `(graph, context inputs, event)`
//! triple always produces the same visited-block sequence and the same
//! output. There is no wall-clock anywhere in the walk: termination is
//! guaranteed by the step budget plus per-loop iteration counters, both of
//! which are first-class, inspectable values.

pub mod collab;
pub mod engine;
pub mod error;
pub mod graph;
pub mod message;
pub mod predicate;
pub mod prelude;
pub mod registry;
pub mod trace;
pub mod value;
