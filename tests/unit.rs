//! Unit tests for values, predicates, substitution, and the block registry.
mod common;
use common::*;
use kaiwa::error::FieldIssue;
use kaiwa::prelude::*;

#[test]
fn test_value_display() {
    assert_eq!(format!("{}", Value::Number(42.0)), "42");
    assert_eq!(format!("{}", Value::Number(2.5)), "2.5");
    assert_eq!(format!("{}", Value::Bool(true)), "true");
    assert_eq!(format!("{}", Value::Null), "null");
    assert_eq!(format!("{}", Value::Text("hi".to_string())), "hi");
}

#[test]
fn test_value_numeric_coercion() {
    assert_eq!(Value::Text(" 12.5 ".to_string()).as_number(), Some(12.5));
    assert_eq!(Value::Text("twelve".to_string()).as_number(), None);
    assert_eq!(Value::Bool(true).as_number(), None);
    assert_eq!(Value::Null.render(), "");
}

#[test]
fn test_predicate_comparisons() {
    let vars: AHashMap<String, Value> = [
        ("score".to_string(), Value::Number(5.0)),
        ("name".to_string(), Value::Text("Amy".to_string())),
        ("count".to_string(), Value::Text("7".to_string())),
    ]
    .into_iter()
    .collect();

    assert!(Predicate::compare("score", CompareOp::Le, 10.0).evaluate(&vars));
    assert!(!Predicate::compare("score", CompareOp::Gt, 10.0).evaluate(&vars));
    // Text holding a number participates in ordered comparison.
    assert!(Predicate::compare("count", CompareOp::Ge, 7.0).evaluate(&vars));
    // Loose equality across representations.
    assert!(Predicate::compare("count", CompareOp::Eq, 7.0).evaluate(&vars));
    assert!(Predicate::compare("name", CompareOp::Contains, "my").evaluate(&vars));
    // Ordered comparison on non-numeric text is false, never an error.
    assert!(!Predicate::compare("name", CompareOp::Lt, 10.0).evaluate(&vars));
}

#[test]
fn test_predicate_missing_variable_reads_null() {
    let vars = AHashMap::new();
    assert!(!Predicate::compare("absent", CompareOp::Gt, 0.0).evaluate(&vars));
    assert!(!Predicate::IsSet {
        var: "absent".to_string()
    }
    .evaluate(&vars));
    assert!(Predicate::Not {
        pred: Box::new(Predicate::IsSet {
            var: "absent".to_string()
        })
    }
    .evaluate(&vars));
}

#[test]
fn test_predicate_combinators_short_circuit() {
    let vars: AHashMap<String, Value> =
        [("a".to_string(), Value::Number(1.0))].into_iter().collect();
    let yes = Predicate::compare("a", CompareOp::Eq, 1.0);
    let no = Predicate::compare("a", CompareOp::Eq, 2.0);

    assert!(Predicate::All {
        preds: vec![yes.clone(), yes.clone()]
    }
    .evaluate(&vars));
    assert!(!Predicate::All {
        preds: vec![yes.clone(), no.clone()]
    }
    .evaluate(&vars));
    assert!(Predicate::Any {
        preds: vec![no.clone(), yes.clone()]
    }
    .evaluate(&vars));
    assert!(!Predicate::Any { preds: vec![no] }.evaluate(&vars));
}

#[test]
fn test_substitution() {
    let vars: AHashMap<String, Value> = [
        ("name".to_string(), Value::Text("Amy".to_string())),
        ("n".to_string(), Value::Number(3.0)),
    ]
    .into_iter()
    .collect();

    assert_eq!(substitute("Hello {{name}}!", &vars), "Hello Amy!");
    assert_eq!(substitute("{{n}} item(s) for {{ name }}", &vars), "3 item(s) for Amy");
    // Missing variable renders empty rather than failing.
    assert_eq!(substitute("Hi {{missing}}.", &vars), "Hi .");
    // Unterminated reference is kept verbatim.
    assert_eq!(substitute("broken {{name", &vars), "broken {{name");
    assert_eq!(substitute("no refs", &vars), "no refs");
}

#[test]
fn test_compose_rejects_oversized_carousel() {
    let bubble = match text_bubble("card") {
        MessageTree::Bubble(b) => b,
        _ => unreachable!(),
    };
    let carousel = MessageTree::Carousel {
        contents: vec![bubble; 13],
    };
    let err = compose(&carousel, &AHashMap::new()).unwrap_err();
    assert!(matches!(
        err,
        CompositionError::CarouselTooLarge { count: 13, max: 12 }
    ));
}

#[test]
fn test_compose_rejects_bad_color() {
    let tree = MessageTree::Bubble(Bubble {
        header: None,
        body: BoxComponent::vertical(vec![Component::Text(TextComponent {
            color: Some("red".to_string()),
            ..TextComponent::plain("hi")
        })]),
        footer: None,
    });
    let err = compose(&tree, &AHashMap::new()).unwrap_err();
    assert!(matches!(err, CompositionError::InvalidColor { .. }));
}

#[test]
fn test_compose_substitutes_missing_variable_as_empty() {
    let tree = text_bubble("Hello {{name}}!");
    let composed = compose(&tree, &AHashMap::new()).unwrap();
    match composed {
        MessageTree::Bubble(bubble) => match &bubble.body.contents[0] {
            Component::Text(t) => assert_eq!(t.text, "Hello !"),
            other => panic!("unexpected component: {:?}", other),
        },
        other => panic!("unexpected tree: {:?}", other),
    }
}

#[test]
fn test_registry_edge_rules() {
    let condition = describe(BlockKind::Condition);
    let rule = condition.edge_rule(ConnectionType::Condition).unwrap();
    assert_eq!(rule.min, 1);
    let fallback = condition.edge_rule(ConnectionType::Next).unwrap();
    assert_eq!((fallback.min, fallback.max), (0, 1));

    let trigger = describe(BlockKind::MessageTrigger);
    assert!(!trigger.accepts_incoming);
    let next = trigger.edge_rule(ConnectionType::Next).unwrap();
    assert_eq!((next.min, next.max), (1, 1));
    assert!(trigger.edge_rule(ConnectionType::Loop).is_none());

    // Message kinds never source logic edges.
    assert!(describe(BlockKind::Text).edge_rules.is_empty());
}

#[test]
fn test_registry_field_validation() {
    let issues = validate_fields(&BlockFields::Text {
        text: "hi".to_string(),
        color: Some("#12345G".to_string()),
        size: None,
        weight: None,
    });
    assert!(matches!(issues[0], FieldIssue::InvalidColor { .. }));

    let issues = validate_fields(&BlockFields::MessageTrigger { patterns: vec![] });
    assert!(matches!(issues[0], FieldIssue::Empty { field: "patterns" }));

    assert!(validate_fields(&BlockFields::Condition {}).is_empty());
}

#[test]
fn test_block_fields_serialize_kebab_case() {
    let json = serde_json::to_string(&BlockFields::Video {
        url: "https://cdn/v.mp4".to_string(),
        preview_url: "https://cdn/p.png".to_string(),
    })
    .unwrap();
    assert!(json.contains("\"preview-url\""));

    let json = serde_json::to_string(&ActionOp::SendMessage {
        template_id: "hello".to_string(),
    })
    .unwrap();
    assert!(json.contains("\"template-id\""));

    let parsed: BlockFields =
        serde_json::from_str(r#"{"kind":"image","url":"https://cdn/i.png","aspect-ratio":"1:1"}"#)
            .unwrap();
    assert_eq!(parsed.kind(), BlockKind::Image);
}

#[test]
fn test_error_display() {
    let err = GraphError::OutDegreeExceeded {
        source_id: "check".to_string(),
        connection_type: ConnectionType::Next,
        max: 1,
    };
    assert!(err.to_string().contains("check"));
    assert!(err.to_string().contains("NEXT"));

    let issue = ValidationIssue::UnboundedCycle {
        block_ids: vec!["a".to_string(), "b".to_string()],
    };
    assert!(issue.to_string().contains("a -> b"));

    let exec = ExecutionError::StepBudgetExceeded { max_steps: 50 };
    assert!(exec.to_string().contains("50"));
}

#[test]
fn test_block_kind_display() {
    assert_eq!(BlockKind::MessageTrigger.to_string(), "message-trigger");
    assert_eq!(BlockKind::Box.to_string(), "box");
    assert!(BlockKind::Loop.is_logic());
    assert!(!BlockKind::Span.is_logic());
}
