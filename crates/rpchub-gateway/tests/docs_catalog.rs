#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use rpchub_gateway::docs::{CatalogSink, TypeSink};
use rpchub_gateway::realtime::Hub;
use rpchub_gateway::services;

mod hub_support;
use hub_support::{register_add, settings, Ping};

#[test]
fn registrations_reach_the_sink() {
    let sink = Arc::new(CatalogSink::in_memory());
    let (hub, _runtime) = Hub::builder(settings())
        .type_sink(Arc::clone(&sink) as Arc<dyn TypeSink>)
        .build();
    services::register_builtins(&hub).unwrap();
    register_add(&hub);
    hub.register_event::<Ping>("ping", "test event");

    let methods = sink.methods();
    let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["add", "subscribe", "system.ping", "system.status", "unsubscribe"]
    );
    let add = methods.iter().find(|m| m.name == "add").unwrap();
    assert!(add.params.ends_with("AddParams"));
    assert!(add.result.ends_with("AddResult"));

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| e.name == "ping" && e.docs == "test event"));
}

#[test]
fn duplicate_event_is_reported_once() {
    let sink = Arc::new(CatalogSink::in_memory());
    let (hub, _runtime) = Hub::builder(settings())
        .type_sink(Arc::clone(&sink) as Arc<dyn TypeSink>)
        .build();

    assert!(hub.register_event::<Ping>("ping", "first"));
    assert!(!hub.register_event::<Ping>("ping", "second"));
    assert_eq!(sink.events()[0].docs, "first");
}

#[test]
fn generate_writes_json_catalog() {
    let path = std::env::temp_dir().join(format!("rpchub-catalog-{}.json", std::process::id()));
    let sink = Arc::new(CatalogSink::new(&path));
    let (hub, _runtime) = Hub::builder(settings())
        .type_sink(Arc::clone(&sink) as Arc<dyn TypeSink>)
        .build();
    services::register_builtins(&hub).unwrap();

    hub.generate_docs().unwrap();

    let doc: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    std::fs::remove_file(&path).ok();
    assert!(doc["methods"]
        .as_array()
        .unwrap()
        .iter()
        .any(|m| m["name"] == "system.ping"));
    assert_eq!(doc["events"][0]["name"], "system.tick");
}
