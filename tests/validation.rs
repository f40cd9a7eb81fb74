//! Tests for graph mutation legality and whole-graph validation.
mod common;
use common::*;
use kaiwa::prelude::*;

#[test]
fn test_second_next_edge_is_rejected() {
    let mut graph = ConnectionGraph::new();
    graph.add_block(trigger_block("start", "hi")).unwrap();
    graph.add_block(set_var_block("a", "x", "1")).unwrap();
    graph.add_block(set_var_block("b", "x", "2")).unwrap();
    graph
        .create_connection(Connection::next("c1", "start", "a"))
        .unwrap();

    let err = graph
        .create_connection(Connection::next("c2", "start", "b"))
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::OutDegreeExceeded {
            connection_type: ConnectionType::Next,
            max: 1,
            ..
        }
    ));
}

#[test]
fn test_message_kinds_cannot_source_edges() {
    let mut graph = ConnectionGraph::new();
    graph
        .add_block(BlockInstance::new(
            "caption",
            BlockFields::Text {
                text: "hi".to_string(),
                color: None,
                size: None,
                weight: None,
            },
        ))
        .unwrap();
    graph.add_block(set_var_block("a", "x", "1")).unwrap();

    let err = graph
        .create_connection(Connection::next("c1", "caption", "a"))
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::EdgeTypeNotAllowed {
            kind: BlockKind::Text,
            ..
        }
    ));
}

#[test]
fn test_triggers_refuse_incoming_edges() {
    let mut graph = ConnectionGraph::new();
    graph.add_block(set_var_block("a", "x", "1")).unwrap();
    graph.add_block(trigger_block("start", "hi")).unwrap();

    let err = graph
        .create_connection(Connection::next("c1", "a", "start"))
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::IncomingNotAllowed {
            kind: BlockKind::MessageTrigger,
            ..
        }
    ));
}

#[test]
fn test_condition_edge_requires_predicate() {
    let mut graph = ConnectionGraph::new();
    graph
        .add_block(BlockInstance::new("check", BlockFields::Condition {}))
        .unwrap();
    graph.add_block(set_var_block("a", "x", "1")).unwrap();

    let bare = Connection {
        condition: None,
        ..Connection::condition(
            "c1",
            "check",
            "a",
            0,
            Predicate::compare("x", CompareOp::Eq, 1.0),
        )
    };
    let err = graph.create_connection(bare).unwrap_err();
    assert!(matches!(err, GraphError::MissingCondition { .. }));
}

#[test]
fn test_predicate_on_next_edge_is_rejected() {
    let mut graph = ConnectionGraph::new();
    graph.add_block(trigger_block("start", "hi")).unwrap();
    graph.add_block(set_var_block("a", "x", "1")).unwrap();

    let decorated = Connection {
        condition: Some(Predicate::compare("x", CompareOp::Eq, 1.0)),
        ..Connection::next("c1", "start", "a")
    };
    let err = graph.create_connection(decorated).unwrap_err();
    assert!(matches!(
        err,
        GraphError::UnexpectedCondition {
            connection_type: ConnectionType::Next,
            ..
        }
    ));
}

#[test]
fn test_duplicate_condition_order_is_rejected() {
    let (mut graph, _) = score_flow();
    graph.add_block(set_var_block("mid", "tier", "mid")).unwrap();

    let err = graph
        .create_connection(Connection::condition(
            "c4",
            "check",
            "mid",
            0,
            Predicate::compare("score", CompareOp::Eq, 10.0),
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        GraphError::DuplicateConditionOrder { order: Some(0), .. }
    ));
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let (mut graph, _) = greeting_flow();
    let err = graph.add_block(trigger_block("greet", "yo")).unwrap_err();
    assert!(matches!(err, GraphError::DuplicateBlock(id) if id == "greet"));

    let err = graph
        .create_connection(Connection::error("c1", "reply", "reply"))
        .unwrap_err();
    assert!(matches!(err, GraphError::DuplicateConnection(id) if id == "c1"));
}

#[test]
fn test_remove_block_cascades_connections() {
    let (mut graph, _) = score_flow();
    graph.remove_block("check").unwrap();

    assert!(graph.block("check").is_none());
    assert!(graph.connection("c1").is_none());
    assert!(graph.connection("c2").is_none());
    assert!(graph.connection("c3").is_none());
    assert!(graph.outgoing_connections("start").is_empty());
}

#[test]
fn test_update_connection_patch() {
    let (mut graph, _) = score_flow();

    // Reordering onto a taken order value fails.
    let err = graph
        .update_connection(
            "c3",
            ConnectionPatch {
                order: Some(0),
                ..ConnectionPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, GraphError::DuplicateConditionOrder { .. }));

    graph
        .update_connection(
            "c3",
            ConnectionPatch {
                order: Some(5),
                is_active: Some(false),
                ..ConnectionPatch::default()
            },
        )
        .unwrap();
    let conn = graph.connection("c3").unwrap();
    assert_eq!(conn.order, Some(5));
    assert!(!conn.is_active);

    // Predicates only belong on CONDITION edges.
    let err = graph
        .update_connection(
            "c1",
            ConnectionPatch {
                condition: Some(Predicate::compare("x", CompareOp::Eq, 1.0)),
                ..ConnectionPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, GraphError::UnexpectedCondition { .. }));
}

#[test]
fn test_edge_ordering_is_order_then_insertion() {
    let mut graph = ConnectionGraph::new();
    graph
        .add_block(BlockInstance::new("check", BlockFields::Condition {}))
        .unwrap();
    for id in ["a", "b", "c"] {
        graph.add_block(set_var_block(id, "x", id)).unwrap();
    }
    let always = Predicate::Not {
        pred: Box::new(Predicate::IsSet {
            var: "never".to_string(),
        }),
    };
    graph
        .create_connection(Connection::condition("c1", "check", "a", 2, always.clone()))
        .unwrap();
    graph
        .create_connection(Connection::condition("c2", "check", "b", 0, always.clone()))
        .unwrap();
    graph
        .create_connection(Connection::condition("c3", "check", "c", 1, always))
        .unwrap();

    let targets: Vec<&str> = graph
        .outgoing_connections("check")
        .iter()
        .map(|c| c.target.as_str())
        .collect();
    assert_eq!(targets, vec!["b", "c", "a"]);
}

#[test]
fn test_validate_all_reports_missing_required_edges() {
    let mut graph = ConnectionGraph::new();
    graph.add_block(trigger_block("start", "hi")).unwrap();

    let issues = graph.validate_all();
    assert!(issues.iter().any(|i| matches!(
        i,
        ValidationIssue::MissingRequiredEdge {
            block_id,
            connection_type: ConnectionType::Next,
            min: 1,
            found: 0,
        } if block_id == "start"
    )));
}

#[test]
fn test_validate_all_reports_loop_without_edges() {
    let mut graph = ConnectionGraph::new();
    graph
        .add_block(BlockInstance::new(
            "repeat",
            BlockFields::Loop {
                iterations: 3,
                condition: None,
            },
        ))
        .unwrap();

    let issues = graph.validate_all();
    assert!(issues.iter().any(|i| matches!(
        i,
        ValidationIssue::MissingRequiredEdge {
            connection_type: ConnectionType::Loop,
            ..
        }
    )));
    assert!(issues.iter().any(|i| matches!(
        i,
        ValidationIssue::MissingRequiredEdge {
            connection_type: ConnectionType::Next,
            ..
        }
    )));
}

#[test]
fn test_validate_all_reports_unbounded_loop_fields() {
    let (mut graph, _) = loop_flow(3);
    graph.remove_block("repeat").unwrap();
    graph
        .add_block(BlockInstance::new(
            "repeat",
            BlockFields::Loop {
                iterations: 0,
                condition: None,
            },
        ))
        .unwrap();

    let issues = graph.validate_all();
    assert!(issues.iter().any(|i| matches!(
        i,
        ValidationIssue::UnboundedLoop { block_id } if block_id == "repeat"
    )));
}

#[test]
fn test_validate_all_reports_field_issues() {
    let mut graph = ConnectionGraph::new();
    graph
        .add_block(BlockInstance::new(
            "start",
            BlockFields::MessageTrigger { patterns: vec![] },
        ))
        .unwrap();

    let issues = graph.validate_all();
    assert!(issues.iter().any(|i| matches!(
        i,
        ValidationIssue::Field { block_id, .. } if block_id == "start"
    )));
}

#[test]
fn test_next_cycle_is_an_unbounded_cycle() {
    let mut graph = ConnectionGraph::new();
    graph.add_block(trigger_block("start", "hi")).unwrap();
    graph.add_block(set_var_block("a", "x", "1")).unwrap();
    graph.add_block(set_var_block("b", "x", "2")).unwrap();
    graph
        .create_connection(Connection::next("c1", "start", "a"))
        .unwrap();
    graph
        .create_connection(Connection::next("c2", "a", "b"))
        .unwrap();
    graph
        .create_connection(Connection::next("c3", "b", "a"))
        .unwrap();

    let issues = graph.validate_all();
    let cycle = issues
        .iter()
        .find_map(|i| match i {
            ValidationIssue::UnboundedCycle { block_ids } => Some(block_ids.clone()),
            _ => None,
        })
        .unwrap();
    assert!(cycle.contains(&"a".to_string()));
    assert!(cycle.contains(&"b".to_string()));

    // The engine refuses the graph outright.
    let err = Engine::new(graph, AHashMap::new()).unwrap_err();
    assert!(err
        .iter()
        .any(|i| matches!(i, ValidationIssue::UnboundedCycle { .. })));
}

#[test]
fn test_loop_edges_exempt_their_cycle() {
    let (graph, _) = loop_flow(3);
    assert!(graph.validate_all().is_empty());
}

#[test]
fn test_from_document_round_trip() {
    let (graph, _) = score_flow();
    let doc = GraphDocument {
        blocks: graph.blocks().to_vec(),
        connections: graph.connections().to_vec(),
    };
    let json = serde_json::to_string(&doc).unwrap();
    let reloaded = ConnectionGraph::from_document(GraphDocument::from_json(&json).unwrap()).unwrap();

    assert_eq!(reloaded.blocks(), graph.blocks());
    assert_eq!(reloaded.connections(), graph.connections());
    assert!(reloaded.validate_all().is_empty());
}
