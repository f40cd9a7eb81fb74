//! The connection graph: placed blocks and the typed, directed edges the
//! editor draws between them.
//!
//! Single-edge legality (endpoint existence, edge-type rules, out-degree
//! caps) is enforced eagerly on every mutation so the editor gets immediate
//! feedback; whole-graph admission lives in [`validate_all`], which the
//! engine runs before any execution.
//!
//! [`validate_all`]: ConnectionGraph::validate_all

use crate::error::{DocumentError, GraphError};
use crate::predicate::Predicate;
use crate::registry::{self, BlockFields, BlockKind};
use ahash::AHashMap;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

mod validate;

/// A placed block. The `kind` is derived from the tagged fields, so a block
/// can never carry fields that disagree with its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockInstance {
    pub id: String,
    pub fields: BlockFields,
    /// Canvas layout hint; never semantically load-bearing.
    #[serde(default)]
    pub position: Position,
}

impl BlockInstance {
    pub fn new(id: impl Into<String>, fields: BlockFields) -> Self {
        BlockInstance {
            id: id.into(),
            fields,
            position: Position::default(),
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.fields.kind()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// The four edge types of the logic graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionType {
    Next,
    Condition,
    Loop,
    Error,
}

impl fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionType::Next => "NEXT",
            ConnectionType::Condition => "CONDITION",
            ConnectionType::Loop => "LOOP",
            ConnectionType::Error => "ERROR",
        };
        write!(f, "{}", name)
    }
}

/// A directed, typed edge between two blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub source: String,
    pub target: String,
    pub connection_type: ConnectionType,
    /// Present exactly when `connection_type` is CONDITION.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Predicate>,
    /// Disambiguates multiple same-type edges from one source; evaluation
    /// follows ascending order, insertion order breaking ties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    /// Soft-disable without deletion; inactive edges are never walked.
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Connection {
    pub fn next(id: &str, source: &str, target: &str) -> Self {
        Connection {
            id: id.to_string(),
            source: source.to_string(),
            target: target.to_string(),
            connection_type: ConnectionType::Next,
            condition: None,
            order: None,
            is_active: true,
        }
    }

    pub fn condition(id: &str, source: &str, target: &str, order: u32, pred: Predicate) -> Self {
        Connection {
            connection_type: ConnectionType::Condition,
            condition: Some(pred),
            order: Some(order),
            ..Connection::next(id, source, target)
        }
    }

    pub fn looping(id: &str, source: &str, target: &str) -> Self {
        Connection {
            connection_type: ConnectionType::Loop,
            ..Connection::next(id, source, target)
        }
    }

    pub fn error(id: &str, source: &str, target: &str) -> Self {
        Connection {
            connection_type: ConnectionType::Error,
            ..Connection::next(id, source, target)
        }
    }
}

/// Partial update for an existing connection; `Some` fields replace.
#[derive(Debug, Clone, Default)]
pub struct ConnectionPatch {
    pub condition: Option<Predicate>,
    pub order: Option<u32>,
    pub is_active: Option<bool>,
}

/// The persisted JSON shape the editor saves and the engine loads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    pub blocks: Vec<BlockInstance>,
    pub connections: Vec<Connection>,
}

impl GraphDocument {
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|e| DocumentError::JsonParse(e.to_string()))
    }
}

/// Owns blocks and edges; all queries are deterministic.
///
/// Blocks keep their declaration order, which is what makes trigger
/// tie-breaking auditable ("first-registered wins"), and edge queries sort
/// by `order` then insertion, which is what makes branch evaluation
/// deterministic.
#[derive(Debug, Clone, Default)]
pub struct ConnectionGraph {
    blocks: Vec<BlockInstance>,
    block_index: AHashMap<String, usize>,
    connections: Vec<Connection>,
    connection_index: AHashMap<String, usize>,
}

impl ConnectionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a persisted document, applying the same edge
    /// legality checks as interactive editing.
    pub fn from_document(doc: GraphDocument) -> Result<Self, GraphError> {
        let mut graph = ConnectionGraph::new();
        for block in doc.blocks {
            graph.add_block(block)?;
        }
        for connection in doc.connections {
            graph.create_connection(connection)?;
        }
        Ok(graph)
    }

    pub fn add_block(&mut self, block: BlockInstance) -> Result<(), GraphError> {
        if self.block_index.contains_key(&block.id) {
            return Err(GraphError::DuplicateBlock(block.id));
        }
        self.block_index.insert(block.id.clone(), self.blocks.len());
        self.blocks.push(block);
        Ok(())
    }

    /// Removes a block and cascades removal of every edge touching it.
    pub fn remove_block(&mut self, id: &str) -> Result<BlockInstance, GraphError> {
        let idx = *self
            .block_index
            .get(id)
            .ok_or_else(|| GraphError::UnknownBlock(id.to_string()))?;
        let removed = self.blocks.remove(idx);
        self.connections
            .retain(|c| c.source != removed.id && c.target != removed.id);
        self.rebuild_indices();
        Ok(removed)
    }

    /// Validates and inserts an edge, returning its id.
    pub fn create_connection(&mut self, connection: Connection) -> Result<String, GraphError> {
        if self.connection_index.contains_key(&connection.id) {
            return Err(GraphError::DuplicateConnection(connection.id));
        }
        let source = self
            .block(&connection.source)
            .ok_or_else(|| GraphError::UnknownBlock(connection.source.clone()))?;
        let target = self
            .block(&connection.target)
            .ok_or_else(|| GraphError::UnknownBlock(connection.target.clone()))?;

        let source_kind = source.kind();
        let descriptor = registry::describe(source_kind);
        let rule = descriptor.edge_rule(connection.connection_type).ok_or(
            GraphError::EdgeTypeNotAllowed {
                source_id: connection.source.clone(),
                kind: source_kind,
                connection_type: connection.connection_type,
            },
        )?;

        let existing = self
            .connections
            .iter()
            .filter(|c| {
                c.source == connection.source && c.connection_type == connection.connection_type
            })
            .count();
        if existing >= rule.max {
            return Err(GraphError::OutDegreeExceeded {
                source_id: connection.source.clone(),
                connection_type: connection.connection_type,
                max: rule.max,
            });
        }

        let target_kind = target.kind();
        if !registry::describe(target_kind).accepts_incoming {
            return Err(GraphError::IncomingNotAllowed {
                target: connection.target.clone(),
                kind: target_kind,
            });
        }

        match connection.connection_type {
            ConnectionType::Condition => {
                if connection.condition.is_none() {
                    return Err(GraphError::MissingCondition {
                        source_id: connection.source.clone(),
                    });
                }
                self.check_distinct_order(&connection.source, connection.order, None)?;
            }
            _ if connection.condition.is_some() => {
                return Err(GraphError::UnexpectedCondition {
                    source_id: connection.source.clone(),
                    connection_type: connection.connection_type,
                });
            }
            _ => {}
        }

        let id = connection.id.clone();
        self.connection_index
            .insert(id.clone(), self.connections.len());
        self.connections.push(connection);
        Ok(id)
    }

    pub fn remove_connection(&mut self, id: &str) -> Result<Connection, GraphError> {
        let idx = *self
            .connection_index
            .get(id)
            .ok_or_else(|| GraphError::UnknownConnection(id.to_string()))?;
        let removed = self.connections.remove(idx);
        self.rebuild_indices();
        Ok(removed)
    }

    /// Applies a partial update, revalidating CONDITION order uniqueness.
    pub fn update_connection(&mut self, id: &str, patch: ConnectionPatch) -> Result<(), GraphError> {
        let idx = *self
            .connection_index
            .get(id)
            .ok_or_else(|| GraphError::UnknownConnection(id.to_string()))?;
        if let Some(order) = patch.order {
            let conn = &self.connections[idx];
            if conn.connection_type == ConnectionType::Condition {
                let source = conn.source.clone();
                self.check_distinct_order(&source, Some(order), Some(id))?;
            }
        }
        let conn = &mut self.connections[idx];
        if let Some(pred) = patch.condition {
            if conn.connection_type != ConnectionType::Condition {
                return Err(GraphError::UnexpectedCondition {
                    source_id: conn.source.clone(),
                    connection_type: conn.connection_type,
                });
            }
            conn.condition = Some(pred);
        }
        if let Some(order) = patch.order {
            conn.order = Some(order);
        }
        if let Some(active) = patch.is_active {
            conn.is_active = active;
        }
        Ok(())
    }

    pub fn block(&self, id: &str) -> Option<&BlockInstance> {
        self.block_index.get(id).map(|&idx| &self.blocks[idx])
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connection_index
            .get(id)
            .map(|&idx| &self.connections[idx])
    }

    /// Blocks in declaration order.
    pub fn blocks(&self) -> &[BlockInstance] {
        &self.blocks
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Edges into a block, ordered by `order` ascending then insertion.
    pub fn incoming_connections(&self, block_id: &str) -> Vec<&Connection> {
        self.ordered(|c| c.target == block_id)
    }

    /// Edges out of a block, ordered by `order` ascending then insertion.
    pub fn outgoing_connections(&self, block_id: &str) -> Vec<&Connection> {
        self.ordered(|c| c.source == block_id)
    }

    /// Active outgoing edges of one type, in evaluation order.
    pub(crate) fn walkable(&self, block_id: &str, ty: ConnectionType) -> Vec<&Connection> {
        self.outgoing_connections(block_id)
            .into_iter()
            .filter(|c| c.is_active && c.connection_type == ty)
            .collect()
    }

    fn ordered(&self, keep: impl Fn(&Connection) -> bool) -> Vec<&Connection> {
        // Unordered edges sort after ordered ones; sorted_by_key is stable,
        // so insertion order breaks ties.
        self.connections
            .iter()
            .filter(|c| keep(c))
            .sorted_by_key(|c| c.order.unwrap_or(u32::MAX))
            .collect()
    }

    fn check_distinct_order(
        &self,
        source: &str,
        order: Option<u32>,
        skip_id: Option<&str>,
    ) -> Result<(), GraphError> {
        let clash = self.connections.iter().any(|c| {
            c.source == source
                && c.connection_type == ConnectionType::Condition
                && c.order == order
                && skip_id != Some(c.id.as_str())
        });
        if clash {
            Err(GraphError::DuplicateConditionOrder {
                source_id: source.to_string(),
                order,
            })
        } else {
            Ok(())
        }
    }

    fn rebuild_indices(&mut self) {
        self.block_index = self
            .blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.clone(), i))
            .collect();
        self.connection_index = self
            .connections
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
    }
}
