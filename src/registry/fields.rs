//! Typed per-kind block fields.
//!
//! The source-of-truth editor stores fields as a loose JSON bag; here they
//! are a closed tagged variant keyed by `kind`, so an illegal field
//! combination is rejected at the document boundary instead of deep inside
//! execution.

use crate::error::FieldIssue;
use crate::message::{
    Align, AspectRatio, BoxLayout, ButtonStyle, Justify, SizeKeyword, Spacing, TextWeight,
    is_valid_color,
};
use crate::predicate::Predicate;
use crate::registry::{BlockKind, LOOP_MAX_ITERATIONS};
use serde::{Deserialize, Serialize};

/// Kind-specific fields of a placed block. The serde tag doubles as the
/// block's kind, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum BlockFields {
    Container {
        #[serde(default)]
        mode: ContainerMode,
    },
    Box {
        layout: BoxLayout,
        #[serde(default)]
        justify: Option<Justify>,
        #[serde(default)]
        align: Option<Align>,
        #[serde(default)]
        spacing: Option<Spacing>,
    },
    Text {
        text: String,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        size: Option<SizeKeyword>,
        #[serde(default)]
        weight: Option<TextWeight>,
    },
    Image {
        url: String,
        #[serde(default)]
        aspect_ratio: Option<AspectRatio>,
    },
    Button {
        label: String,
        #[serde(default)]
        style: Option<ButtonStyle>,
        #[serde(default)]
        color: Option<String>,
    },
    Separator {
        #[serde(default)]
        margin: Option<Spacing>,
        #[serde(default)]
        color: Option<String>,
    },
    Icon {
        url: String,
        #[serde(default)]
        size: Option<SizeKeyword>,
    },
    Video {
        url: String,
        preview_url: String,
    },
    Span {
        text: String,
        #[serde(default)]
        color: Option<String>,
        #[serde(default)]
        weight: Option<TextWeight>,
    },
    MessageTrigger {
        patterns: Vec<TriggerPattern>,
    },
    Condition {},
    Action {
        op: ActionOp,
    },
    Loop {
        #[serde(default)]
        iterations: u32,
        #[serde(default)]
        condition: Option<Predicate>,
    },
}

impl BlockFields {
    pub fn kind(&self) -> BlockKind {
        match self {
            BlockFields::Container { .. } => BlockKind::Container,
            BlockFields::Box { .. } => BlockKind::Box,
            BlockFields::Text { .. } => BlockKind::Text,
            BlockFields::Image { .. } => BlockKind::Image,
            BlockFields::Button { .. } => BlockKind::Button,
            BlockFields::Separator { .. } => BlockKind::Separator,
            BlockFields::Icon { .. } => BlockKind::Icon,
            BlockFields::Video { .. } => BlockKind::Video,
            BlockFields::Span { .. } => BlockKind::Span,
            BlockFields::MessageTrigger { .. } => BlockKind::MessageTrigger,
            BlockFields::Condition { .. } => BlockKind::Condition,
            BlockFields::Action { .. } => BlockKind::Action,
            BlockFields::Loop { .. } => BlockKind::Loop,
        }
    }
}

/// Whether a container block roots a single bubble or a carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerMode {
    #[default]
    Bubble,
    Carousel,
}

/// How a trigger block matches inbound events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum TriggerPattern {
    /// Matches a message event whose text contains (or, with `exact`,
    /// equals) the keyword.
    Keyword {
        text: String,
        #[serde(default)]
        exact: bool,
    },
    /// Matches a postback event with exactly this data payload.
    Postback { data: String },
    /// Matches a follow event.
    Follow,
    /// Matches an unfollow event.
    Unfollow,
}

/// The side-effecting directive an action block applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum ActionOp {
    /// Writes a variable into the turn context; with `durable`, also into
    /// the external session store. The value is a `{{var}}` template.
    SetVariable {
        key: String,
        value: String,
        #[serde(default)]
        durable: bool,
    },
    /// Reads a variable from the external session store into the turn
    /// context. A key the store has never seen leaves the variable unset.
    LoadVariable { key: String },
    /// Composes the named template and ends the walk with a reply.
    SendMessage { template_id: String },
}

/// Checks a block's field values against its descriptor domains.
///
/// This is the registry-boundary complement to serde's structural checks:
/// serde guarantees the shape, this guarantees the string-valued domains
/// (colors, non-empty keys) and numeric ranges.
pub fn validate_fields(fields: &BlockFields) -> Vec<FieldIssue> {
    let mut issues = Vec::new();
    match fields {
        BlockFields::Text { color, .. } | BlockFields::Span { color, .. } => {
            check_color("color", color, &mut issues);
        }
        BlockFields::Button { label, color, .. } => {
            check_nonempty("label", label, &mut issues);
            check_color("color", color, &mut issues);
        }
        BlockFields::Separator { color, .. } => {
            check_color("color", color, &mut issues);
        }
        BlockFields::Image { url, .. } | BlockFields::Icon { url, .. } => {
            check_nonempty("url", url, &mut issues);
        }
        BlockFields::Video { url, preview_url } => {
            check_nonempty("url", url, &mut issues);
            check_nonempty("preview-url", preview_url, &mut issues);
        }
        BlockFields::MessageTrigger { patterns } => {
            if patterns.is_empty() {
                issues.push(FieldIssue::Empty { field: "patterns" });
            }
            for pattern in patterns {
                match pattern {
                    TriggerPattern::Keyword { text, .. } => {
                        check_nonempty("patterns.text", text, &mut issues)
                    }
                    TriggerPattern::Postback { data } => {
                        check_nonempty("patterns.data", data, &mut issues)
                    }
                    TriggerPattern::Follow | TriggerPattern::Unfollow => {}
                }
            }
        }
        BlockFields::Action { op } => match op {
            ActionOp::SetVariable { key, .. } | ActionOp::LoadVariable { key } => {
                check_nonempty("op.key", key, &mut issues)
            }
            ActionOp::SendMessage { template_id } => {
                check_nonempty("op.template-id", template_id, &mut issues)
            }
        },
        BlockFields::Loop { iterations, .. } => {
            if *iterations > LOOP_MAX_ITERATIONS {
                issues.push(FieldIssue::OutOfRange {
                    field: "iterations",
                    value: *iterations as f64,
                    min: 0.0,
                    max: LOOP_MAX_ITERATIONS as f64,
                });
            }
        }
        BlockFields::Container { .. } | BlockFields::Box { .. } | BlockFields::Condition {} => {}
    }
    issues
}

fn check_color(field: &'static str, color: &Option<String>, issues: &mut Vec<FieldIssue>) {
    if let Some(value) = color {
        if !is_valid_color(value) {
            issues.push(FieldIssue::InvalidColor {
                field,
                value: value.clone(),
            });
        }
    }
}

fn check_nonempty(field: &'static str, value: &str, issues: &mut Vec<FieldIssue>) {
    if value.is_empty() {
        issues.push(FieldIssue::Empty { field });
    }
}
