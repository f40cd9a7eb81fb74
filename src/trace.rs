//! Human-readable rendering of a finished turn, for the preview feature.

use crate::engine::{TurnOutcome, TurnReport};
use crate::graph::ConnectionGraph;
use crate::message::MessageTree;
use std::fmt::Write;

/// Formats turn reports into human-readable walk traces.
pub struct TurnFormatter;

impl TurnFormatter {
    /// Renders the visited-block sequence and the outcome.
    ///
    /// Blocks removed from the graph since the run still appear by id, with
    /// an unknown kind marker, so stale previews stay readable.
    pub fn format_turn(report: &TurnReport, graph: &ConnectionGraph) -> String {
        let mut out = String::new();
        for (i, block_id) in report.visited().iter().enumerate() {
            let kind = graph
                .block(block_id)
                .map(|b| b.kind().as_str())
                .unwrap_or("?");
            let _ = writeln!(out, "{:>3}. {} [{}]", i + 1, block_id, kind);
        }
        let _ = writeln!(out, "outcome: {}", Self::describe_outcome(&report.outcome));
        out
    }

    fn describe_outcome(outcome: &TurnOutcome) -> String {
        match outcome {
            TurnOutcome::Reply { message, .. } => match message {
                MessageTree::Bubble(_) => "reply (1 bubble)".to_string(),
                MessageTree::Carousel { contents } => {
                    format!("reply (carousel, {} bubbles)", contents.len())
                }
            },
            TurnOutcome::Actions(directives) => {
                format!("done ({} directive(s), no reply)", directives.len())
            }
            TurnOutcome::NoTrigger => "ignored (no trigger matched)".to_string(),
            TurnOutcome::Failed { block_id, error } => {
                format!("failed at '{}': {}", block_id, error)
            }
        }
    }
}
