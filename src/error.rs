use crate::graph::ConnectionType;
use crate::registry::BlockKind;
use thiserror::Error;

/// Errors that can occur while parsing a persisted graph or template document.
///
/// Duplicate ids are a structural concern and surface from
/// [`ConnectionGraph::from_document`] as [`GraphError`]s.
///
/// [`ConnectionGraph::from_document`]: crate::graph::ConnectionGraph::from_document
#[derive(Error, Debug, Clone)]
pub enum DocumentError {
    #[error("Failed to parse graph document JSON: {0}")]
    JsonParse(String),
}

/// Errors raised by structural mutations of a [`ConnectionGraph`].
///
/// These cover single-edge legality. Whole-graph concerns (cycles, missing
/// required edges) are reported by `validate_all` as [`ValidationIssue`]s.
///
/// [`ConnectionGraph`]: crate::graph::ConnectionGraph
#[derive(Error, Debug, Clone)]
pub enum GraphError {
    #[error("Block '{0}' does not exist in the graph")]
    UnknownBlock(String),

    #[error("Connection '{0}' does not exist in the graph")]
    UnknownConnection(String),

    #[error("A block with id '{0}' already exists")]
    DuplicateBlock(String),

    #[error("A connection with id '{0}' already exists")]
    DuplicateConnection(String),

    #[error("Block '{source_id}' of kind '{kind}' does not allow outgoing {connection_type} edges")]
    EdgeTypeNotAllowed {
        source_id: String,
        kind: BlockKind,
        connection_type: ConnectionType,
    },

    #[error(
        "Block '{source_id}' already has {max} outgoing {connection_type} edge(s), the maximum for its kind"
    )]
    OutDegreeExceeded {
        source_id: String,
        connection_type: ConnectionType,
        max: usize,
    },

    #[error("Block '{target}' of kind '{kind}' does not accept incoming edges")]
    IncomingNotAllowed { target: String, kind: BlockKind },

    #[error("CONDITION edge from '{source_id}' is missing its predicate")]
    MissingCondition { source_id: String },

    #[error(
        "{connection_type} edge from '{source_id}' carries a predicate, which only CONDITION edges may"
    )]
    UnexpectedCondition {
        source_id: String,
        connection_type: ConnectionType,
    },

    #[error("CONDITION edges from '{source_id}' share the order value {order:?}")]
    DuplicateConditionOrder {
        source_id: String,
        order: Option<u32>,
    },
}

/// A problem a placed block's fields have against its registry descriptor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldIssue {
    #[error("field '{field}' holds '{value}', which is not a #RRGGBB color")]
    InvalidColor { field: &'static str, value: String },

    #[error("field '{field}' must not be empty")]
    Empty { field: &'static str },

    #[error("field '{field}' value {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// A single finding from a whole-graph `validate_all` pass.
///
/// Every variant is a fatal authoring error: the editor must resolve all of
/// them before the graph is admissible for execution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    #[error(
        "Block '{block_id}' requires at least {min} outgoing {connection_type} edge(s) but has {found}"
    )]
    MissingRequiredEdge {
        block_id: String,
        connection_type: ConnectionType,
        min: usize,
        found: usize,
    },

    #[error(
        "Block '{block_id}' has {found} outgoing {connection_type} edges, more than the allowed {max}"
    )]
    TooManyEdges {
        block_id: String,
        connection_type: ConnectionType,
        max: usize,
        found: usize,
    },

    #[error("Connection '{connection_id}' references missing block '{block_id}'")]
    DanglingEndpoint {
        connection_id: String,
        block_id: String,
    },

    #[error(
        "Block '{block_id}' does not accept incoming edges but connection '{connection_id}' targets it"
    )]
    IncomingNotAllowed {
        block_id: String,
        connection_id: String,
    },

    #[error("Structural cycle with no LOOP edge through blocks: {}", block_ids.join(" -> "))]
    UnboundedCycle { block_ids: Vec<String> },

    #[error(
        "Loop block '{block_id}' has neither a finite iteration count nor a continuation condition"
    )]
    UnboundedLoop { block_id: String },

    #[error("Block '{block_id}': {issue}")]
    Field { block_id: String, issue: FieldIssue },
}

/// Errors that can occur while composing a message tree from a template.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositionError {
    #[error("Carousel holds {count} bubbles, more than the maximum of {max}")]
    CarouselTooLarge { count: usize, max: usize },

    #[error("Carousel must hold at least one bubble")]
    EmptyCarousel,

    #[error("Box container must hold at least one child component")]
    EmptyBox,

    #[error("{component} component rendered '{value}', which is not a #RRGGBB color")]
    InvalidColor {
        component: &'static str,
        value: String,
    },

    #[error("{component} component rendered an empty {field}")]
    EmptyField {
        component: &'static str,
        field: &'static str,
    },
}

/// Run-time failures surfaced through the engine's Erroring state.
///
/// Except for `StepBudgetExceeded`, each of these is routable through the
/// failing block's ERROR edge; without one the turn ends with a structured
/// `TurnOutcome::Failed`.
#[derive(Error, Debug, Clone)]
pub enum ExecutionError {
    #[error("Walk exceeded the step budget of {max_steps}")]
    StepBudgetExceeded { max_steps: u32 },

    #[error("No CONDITION edge matched and no fallback NEXT edge is present")]
    NoBranchMatched,

    #[error("Message template '{0}' is not loaded")]
    MissingTemplate(String),

    #[error("Block of kind '{0}' is not executable")]
    NotExecutable(BlockKind),

    #[error("Walk reached block '{0}', which is missing from the graph")]
    MissingBlock(String),

    #[error(transparent)]
    Composition(#[from] CompositionError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the external variable/session store collaborator.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Variable store unavailable: {0}")]
    Unavailable(String),

    #[error("Variable store rejected write for key '{key}': {reason}")]
    WriteRejected { key: String, reason: String },
}

/// Errors from the webhook dispatcher collaborator.
#[derive(Error, Debug, Clone)]
pub enum DispatchError {
    #[error("Messaging platform rejected the payload: {0}")]
    Rejected(String),

    #[error("Messaging platform unreachable: {0}")]
    Unreachable(String),
}
