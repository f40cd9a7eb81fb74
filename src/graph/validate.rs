//! Whole-graph structural validation.
//!
//! `validate_all` is the editor's pre-flight and the engine's admission
//! check. Its cycle classifier is the load-bearing piece: iteration in this
//! system is expressed as a cyclic graph, so a cycle is only legal when it
//! runs through a LOOP edge (bounded at execution time by the loop block's
//! counter). A cycle closed purely over NEXT/CONDITION edges can never
//! terminate and is a fatal authoring error, reported with the cycle's
//! block ids. ERROR edges are exceptional control flow and are likewise
//! excluded from the structural walk.

use super::{ConnectionGraph, ConnectionType};
use crate::error::ValidationIssue;
use crate::registry::{self, BlockFields, validate_fields};
use ahash::AHashMap;

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    White,
    Gray,
    Black,
}

impl ConnectionGraph {
    /// Structural pass over every block and edge.
    ///
    /// Unreachable islands are deliberately not flagged; the editor keeps
    /// work-in-progress subgraphs around. Every issue returned is fatal for
    /// execution.
    pub fn validate_all(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        for block in self.blocks() {
            let descriptor = registry::describe(block.kind());

            for rule in descriptor.edge_rules {
                let found = self
                    .connections()
                    .iter()
                    .filter(|c| c.source == block.id && c.connection_type == rule.connection_type)
                    .count();
                if found < rule.min {
                    issues.push(ValidationIssue::MissingRequiredEdge {
                        block_id: block.id.clone(),
                        connection_type: rule.connection_type,
                        min: rule.min,
                        found,
                    });
                }
                if found > rule.max {
                    issues.push(ValidationIssue::TooManyEdges {
                        block_id: block.id.clone(),
                        connection_type: rule.connection_type,
                        max: rule.max,
                        found,
                    });
                }
            }

            for issue in validate_fields(&block.fields) {
                issues.push(ValidationIssue::Field {
                    block_id: block.id.clone(),
                    issue,
                });
            }

            if let BlockFields::Loop {
                iterations,
                condition,
            } = &block.fields
            {
                if *iterations == 0 && condition.is_none() {
                    issues.push(ValidationIssue::UnboundedLoop {
                        block_id: block.id.clone(),
                    });
                }
            }
        }

        for connection in self.connections() {
            for endpoint in [&connection.source, &connection.target] {
                if self.block(endpoint).is_none() {
                    issues.push(ValidationIssue::DanglingEndpoint {
                        connection_id: connection.id.clone(),
                        block_id: endpoint.clone(),
                    });
                }
            }
            if let Some(target) = self.block(&connection.target) {
                if !registry::describe(target.kind()).accepts_incoming {
                    issues.push(ValidationIssue::IncomingNotAllowed {
                        block_id: connection.target.clone(),
                        connection_id: connection.id.clone(),
                    });
                }
            }
        }

        if let Some(block_ids) = self.find_structural_cycle() {
            issues.push(ValidationIssue::UnboundedCycle { block_ids });
        }

        issues
    }

    /// Depth-first search restricted to NEXT and CONDITION edges. Any
    /// back-edge there closes a cycle with no bounding loop counter.
    fn find_structural_cycle(&self) -> Option<Vec<String>> {
        let mut marks: AHashMap<&str, Mark> = self
            .blocks()
            .iter()
            .map(|b| (b.id.as_str(), Mark::White))
            .collect();
        let mut path: Vec<&str> = Vec::new();

        for block in self.blocks() {
            if marks[block.id.as_str()] == Mark::White {
                if let Some(cycle) = self.visit(block.id.as_str(), &mut marks, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }

    fn visit<'a>(
        &'a self,
        id: &'a str,
        marks: &mut AHashMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        marks.insert(id, Mark::Gray);
        path.push(id);

        for connection in self.outgoing_connections(id) {
            if !matches!(
                connection.connection_type,
                ConnectionType::Next | ConnectionType::Condition
            ) {
                continue;
            }
            let target = connection.target.as_str();
            match marks.get(target).copied() {
                Some(Mark::Gray) => {
                    let start = path.iter().position(|&p| p == target).unwrap_or(0);
                    return Some(path[start..].iter().map(|s| s.to_string()).collect());
                }
                Some(Mark::White) => {
                    if let Some(cycle) = self.visit(target, marks, path) {
                        return Some(cycle);
                    }
                }
                // Black subtrees are already proven acyclic; dangling
                // targets are reported separately.
                Some(Mark::Black) | None => {}
            }
        }

        path.pop();
        marks.insert(id, Mark::Black);
        None
    }
}
