use kaiwa::prelude::*;
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 4 {
        eprintln!("Usage: kaiwa-run <path/to/graph.json> <path/to/templates.json> <path/to/event.json>");
        process::exit(1);
    }

    let graph_json = read_file(&args[1]);
    let templates_json = read_file(&args[2]);
    let event_json = read_file(&args[3]);

    let document = match GraphDocument::from_json(&graph_json) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Failed to parse graph document: {}", e);
            process::exit(1);
        }
    };

    let graph = match ConnectionGraph::from_document(document) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("Graph document is structurally invalid: {}", e);
            process::exit(1);
        }
    };

    let templates: AHashMap<String, MessageTree> = match serde_json::from_str(&templates_json) {
        Ok(templates) => templates,
        Err(e) => {
            eprintln!("Failed to parse templates: {}", e);
            process::exit(1);
        }
    };

    let event: InboundEvent = match serde_json::from_str(&event_json) {
        Ok(event) => event,
        Err(e) => {
            eprintln!("Failed to parse inbound event: {}", e);
            process::exit(1);
        }
    };

    let engine = match Engine::new(graph, templates) {
        Ok(engine) => engine,
        Err(issues) => {
            eprintln!("Graph has {} authoring issue(s):", issues.len());
            for issue in issues {
                eprintln!("  - {}", issue);
            }
            process::exit(1);
        }
    };

    let mut store = InMemoryStore::new();
    let report = engine.run(&event, ExecutionContext::default(), &mut store);

    println!("{}", TurnFormatter::format_turn(&report, engine.graph()));

    let mut dispatcher = StdoutDispatcher;
    let sent = match &report.outcome {
        TurnOutcome::Reply { message, .. } => {
            dispatcher.send(&event.user_id, DispatchPayload::Message(message))
        }
        TurnOutcome::Actions(directives) if !directives.is_empty() => {
            dispatcher.send(&event.user_id, DispatchPayload::Actions(directives))
        }
        TurnOutcome::Actions(_) | TurnOutcome::NoTrigger => Ok(()),
        TurnOutcome::Failed { block_id, error } => {
            eprintln!("Turn failed at block '{}': {}", block_id, error);
            process::exit(2);
        }
    };

    if let Err(e) = sent {
        eprintln!("Dispatch failed: {}", e);
        process::exit(2);
    }
}

fn read_file(path: &str) -> String {
    match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Failed to read '{}': {}", path, e);
            process::exit(1);
        }
    }
}
