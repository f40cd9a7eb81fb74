//! Static catalog of block kinds.
//!
//! The registry is the editor's source of truth for what can be dragged onto
//! the canvas: which fields each kind carries (and their allowed value
//! domains, for rendering dropdowns) and, for logic kinds, which outgoing
//! edge types are legal and in what number. Lookup is pure; the catalog is
//! baked into the binary. An unknown kind can only enter the system through
//! a persisted document, where it fails deserialization of [`BlockKind`] —
//! always a fatal authoring error, never recoverable at run time.

use crate::graph::ConnectionType;
use serde::{Deserialize, Serialize};
use std::fmt;

mod fields;

pub use fields::{
    ActionOp, BlockFields, ContainerMode, TriggerPattern, validate_fields,
};

/// Closed set of block kinds known to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    // Message components
    Container,
    Box,
    Text,
    Image,
    Button,
    Separator,
    Icon,
    Video,
    Span,
    // Logic nodes
    MessageTrigger,
    Condition,
    Action,
    Loop,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Container => "container",
            BlockKind::Box => "box",
            BlockKind::Text => "text",
            BlockKind::Image => "image",
            BlockKind::Button => "button",
            BlockKind::Separator => "separator",
            BlockKind::Icon => "icon",
            BlockKind::Video => "video",
            BlockKind::Span => "span",
            BlockKind::MessageTrigger => "message-trigger",
            BlockKind::Condition => "condition",
            BlockKind::Action => "action",
            BlockKind::Loop => "loop",
        }
    }

    /// Logic kinds participate in the connection graph's walk; message kinds
    /// only feed the composer.
    pub fn is_logic(&self) -> bool {
        matches!(
            self,
            BlockKind::MessageTrigger | BlockKind::Condition | BlockKind::Action | BlockKind::Loop
        )
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the editor and validator need to know about one kind.
#[derive(Debug)]
pub struct BlockDescriptor {
    pub kind: BlockKind,
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
    /// Legal outgoing edge types with out-degree bounds. Empty for message
    /// kinds, which never source logic edges.
    pub edge_rules: &'static [EdgeRule],
    /// Trigger and message kinds refuse incoming edges.
    pub accepts_incoming: bool,
}

impl BlockDescriptor {
    pub fn edge_rule(&self, connection_type: ConnectionType) -> Option<&'static EdgeRule> {
        self.edge_rules
            .iter()
            .find(|rule| rule.connection_type == connection_type)
    }
}

/// One field on a block, with the domain its values are drawn from.
#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
    pub domain: FieldDomain,
}

/// Allowed value domain for a field. Enumerated sets are closed; there are
/// no arbitrary-unit fields anywhere in the catalog.
#[derive(Debug)]
pub enum FieldDomain {
    Enum(&'static [&'static str]),
    Color,
    FreeText,
    Number { min: f64, max: f64 },
}

/// Out-degree bounds for one edge type from one kind.
#[derive(Debug)]
pub struct EdgeRule {
    pub connection_type: ConnectionType,
    pub min: usize,
    pub max: usize,
}

/// Upper bound on a loop block's explicit iteration count.
pub const LOOP_MAX_ITERATIONS: u32 = 10_000;

const SIZES: &[&str] = &["xxs", "xs", "sm", "md", "lg", "xl", "xxl", "full"];
const SPACINGS: &[&str] = &["none", "xs", "sm", "md", "lg", "xl", "xxl"];
const LAYOUTS: &[&str] = &["horizontal", "vertical", "baseline"];
const JUSTIFIES: &[&str] = &[
    "flex-start",
    "center",
    "flex-end",
    "space-between",
    "space-around",
    "space-evenly",
];
const ALIGNS: &[&str] = &["flex-start", "center", "flex-end"];
const WEIGHTS: &[&str] = &["regular", "bold"];
const BUTTON_STYLES: &[&str] = &["primary", "secondary", "link"];
const ASPECT_RATIOS: &[&str] = &["1:1", "4:3", "16:9", "20:13"];

macro_rules! field {
    ($name:expr, required, $domain:expr) => {
        FieldSpec {
            name: $name,
            required: true,
            domain: $domain,
        }
    };
    ($name:expr, optional, $domain:expr) => {
        FieldSpec {
            name: $name,
            required: false,
            domain: $domain,
        }
    };
}

macro_rules! edge {
    ($ty:ident, $min:expr, $max:expr) => {
        EdgeRule {
            connection_type: ConnectionType::$ty,
            min: $min,
            max: $max,
        }
    };
}

static CONTAINER: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Container,
    label: "Message container",
    fields: &[field!("mode", optional, FieldDomain::Enum(&["bubble", "carousel"]))],
    edge_rules: &[],
    accepts_incoming: false,
};

static BOX_BLOCK: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Box,
    label: "Layout box",
    fields: &[
        field!("layout", required, FieldDomain::Enum(LAYOUTS)),
        field!("justify", optional, FieldDomain::Enum(JUSTIFIES)),
        field!("align", optional, FieldDomain::Enum(ALIGNS)),
        field!("spacing", optional, FieldDomain::Enum(SPACINGS)),
    ],
    edge_rules: &[],
    accepts_incoming: false,
};

static TEXT: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Text,
    label: "Text",
    fields: &[
        field!("text", required, FieldDomain::FreeText),
        field!("color", optional, FieldDomain::Color),
        field!("size", optional, FieldDomain::Enum(SIZES)),
        field!("weight", optional, FieldDomain::Enum(WEIGHTS)),
    ],
    edge_rules: &[],
    accepts_incoming: false,
};

static IMAGE: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Image,
    label: "Image",
    fields: &[
        field!("url", required, FieldDomain::FreeText),
        field!("aspect-ratio", optional, FieldDomain::Enum(ASPECT_RATIOS)),
    ],
    edge_rules: &[],
    accepts_incoming: false,
};

static BUTTON: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Button,
    label: "Button",
    fields: &[
        field!("label", required, FieldDomain::FreeText),
        field!("style", optional, FieldDomain::Enum(BUTTON_STYLES)),
        field!("color", optional, FieldDomain::Color),
    ],
    edge_rules: &[],
    accepts_incoming: false,
};

static SEPARATOR: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Separator,
    label: "Separator",
    fields: &[
        field!("margin", optional, FieldDomain::Enum(SPACINGS)),
        field!("color", optional, FieldDomain::Color),
    ],
    edge_rules: &[],
    accepts_incoming: false,
};

static ICON: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Icon,
    label: "Icon",
    fields: &[
        field!("url", required, FieldDomain::FreeText),
        field!("size", optional, FieldDomain::Enum(SIZES)),
    ],
    edge_rules: &[],
    accepts_incoming: false,
};

static VIDEO: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Video,
    label: "Video",
    fields: &[
        field!("url", required, FieldDomain::FreeText),
        field!("preview-url", required, FieldDomain::FreeText),
    ],
    edge_rules: &[],
    accepts_incoming: false,
};

static SPAN: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Span,
    label: "Styled span",
    fields: &[
        field!("text", required, FieldDomain::FreeText),
        field!("color", optional, FieldDomain::Color),
        field!("weight", optional, FieldDomain::Enum(WEIGHTS)),
    ],
    edge_rules: &[],
    accepts_incoming: false,
};

static MESSAGE_TRIGGER: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::MessageTrigger,
    label: "Message trigger",
    fields: &[field!("patterns", required, FieldDomain::FreeText)],
    edge_rules: &[edge!(Next, 1, 1), edge!(Error, 0, 1)],
    accepts_incoming: false,
};

static CONDITION: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Condition,
    label: "Condition",
    fields: &[],
    // At least one CONDITION branch; at most one fallback NEXT.
    edge_rules: &[
        edge!(Condition, 1, usize::MAX),
        edge!(Next, 0, 1),
        edge!(Error, 0, 1),
    ],
    accepts_incoming: true,
};

static ACTION: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Action,
    label: "Action",
    fields: &[field!("op", required, FieldDomain::FreeText)],
    edge_rules: &[edge!(Next, 0, 1), edge!(Error, 0, 1)],
    accepts_incoming: true,
};

static LOOP: BlockDescriptor = BlockDescriptor {
    kind: BlockKind::Loop,
    label: "Loop",
    fields: &[field!(
        "iterations",
        required,
        FieldDomain::Number {
            min: 0.0,
            max: LOOP_MAX_ITERATIONS as f64,
        }
    )],
    edge_rules: &[edge!(Loop, 1, 1), edge!(Next, 1, 1), edge!(Error, 0, 1)],
    accepts_incoming: true,
};

/// Pure descriptor lookup. Total over [`BlockKind`]; unknown kind strings
/// never reach this point because they fail document parsing.
pub fn describe(kind: BlockKind) -> &'static BlockDescriptor {
    match kind {
        BlockKind::Container => &CONTAINER,
        BlockKind::Box => &BOX_BLOCK,
        BlockKind::Text => &TEXT,
        BlockKind::Image => &IMAGE,
        BlockKind::Button => &BUTTON,
        BlockKind::Separator => &SEPARATOR,
        BlockKind::Icon => &ICON,
        BlockKind::Video => &VIDEO,
        BlockKind::Span => &SPAN,
        BlockKind::MessageTrigger => &MESSAGE_TRIGGER,
        BlockKind::Condition => &CONDITION,
        BlockKind::Action => &ACTION,
        BlockKind::Loop => &LOOP,
    }
}
