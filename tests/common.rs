//! Common test utilities for building flow graphs and message templates.
use kaiwa::prelude::*;

/// A single-bubble template with one text component.
#[allow(dead_code)]
pub fn text_bubble(text: &str) -> MessageTree {
    MessageTree::Bubble(Bubble {
        header: None,
        body: BoxComponent::vertical(vec![Component::Text(TextComponent::plain(text))]),
        footer: None,
    })
}

#[allow(dead_code)]
pub fn trigger_block(id: &str, keyword: &str) -> BlockInstance {
    BlockInstance::new(
        id,
        BlockFields::MessageTrigger {
            patterns: vec![TriggerPattern::Keyword {
                text: keyword.to_string(),
                exact: false,
            }],
        },
    )
}

#[allow(dead_code)]
pub fn send_block(id: &str, template_id: &str) -> BlockInstance {
    BlockInstance::new(
        id,
        BlockFields::Action {
            op: ActionOp::SendMessage {
                template_id: template_id.to_string(),
            },
        },
    )
}

#[allow(dead_code)]
pub fn set_var_block(id: &str, key: &str, value: &str) -> BlockInstance {
    BlockInstance::new(
        id,
        BlockFields::Action {
            op: ActionOp::SetVariable {
                key: key.to_string(),
                value: value.to_string(),
                durable: false,
            },
        },
    )
}

/// Creates the simplest complete flow.
///
/// Logic: trigger on "hi" -> send template "hello" ("Hello {{name}}!")
#[allow(dead_code)]
pub fn greeting_flow() -> (ConnectionGraph, AHashMap<String, MessageTree>) {
    let mut graph = ConnectionGraph::new();
    graph.add_block(trigger_block("greet", "hi")).unwrap();
    graph.add_block(send_block("reply", "hello")).unwrap();
    graph
        .create_connection(Connection::next("c1", "greet", "reply"))
        .unwrap();

    let mut templates = AHashMap::new();
    templates.insert("hello".to_string(), text_bubble("Hello {{name}}!"));
    (graph, templates)
}

/// Creates a branching flow over a `score` variable.
///
/// Logic: trigger on "score" -> condition:
///   order 0: score > 10  -> set tier = "high"
///   order 1: score <= 10 -> set tier = "low"
#[allow(dead_code)]
pub fn score_flow() -> (ConnectionGraph, AHashMap<String, MessageTree>) {
    let mut graph = ConnectionGraph::new();
    graph.add_block(trigger_block("start", "score")).unwrap();
    graph
        .add_block(BlockInstance::new("check", BlockFields::Condition {}))
        .unwrap();
    graph.add_block(set_var_block("high", "tier", "high")).unwrap();
    graph.add_block(set_var_block("low", "tier", "low")).unwrap();
    graph
        .create_connection(Connection::next("c1", "start", "check"))
        .unwrap();
    graph
        .create_connection(Connection::condition(
            "c2",
            "check",
            "high",
            0,
            Predicate::compare("score", CompareOp::Gt, 10.0),
        ))
        .unwrap();
    graph
        .create_connection(Connection::condition(
            "c3",
            "check",
            "low",
            1,
            Predicate::compare("score", CompareOp::Le, 10.0),
        ))
        .unwrap();

    (graph, AHashMap::new())
}

/// Creates a counted loop flow.
///
/// Logic: trigger on "go" -> loop(iterations) -LOOP-> body -NEXT-> loop,
/// loop -NEXT-> set done = "yes"
#[allow(dead_code)]
pub fn loop_flow(iterations: u32) -> (ConnectionGraph, AHashMap<String, MessageTree>) {
    let mut graph = ConnectionGraph::new();
    graph.add_block(trigger_block("start", "go")).unwrap();
    graph
        .add_block(BlockInstance::new(
            "repeat",
            BlockFields::Loop {
                iterations,
                condition: None,
            },
        ))
        .unwrap();
    graph.add_block(set_var_block("body", "last", "body")).unwrap();
    graph.add_block(set_var_block("after", "done", "yes")).unwrap();
    graph
        .create_connection(Connection::next("c1", "start", "repeat"))
        .unwrap();
    graph
        .create_connection(Connection::looping("c2", "repeat", "body"))
        .unwrap();
    graph
        .create_connection(Connection::next("c3", "body", "repeat"))
        .unwrap();
    graph
        .create_connection(Connection::next("c4", "repeat", "after"))
        .unwrap();

    (graph, AHashMap::new())
}

/// A store whose writes always fail, for ERROR-edge routing tests.
#[derive(Default)]
#[allow(dead_code)]
pub struct FailingStore;

impl VariableStore for FailingStore {
    fn get(&self, _user_id: &str, _key: &str) -> std::result::Result<Option<Value>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn set(
        &mut self,
        _user_id: &str,
        key: &str,
        _value: Value,
    ) -> std::result::Result<(), StoreError> {
        Err(StoreError::WriteRejected {
            key: key.to_string(),
            reason: "store offline".to_string(),
        })
    }
}
