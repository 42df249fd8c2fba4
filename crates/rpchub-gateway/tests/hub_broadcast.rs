//! Hub subscriptions and broadcast fan-out.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use serde_json::json;

use rpchub_core::error::HubError;
use rpchub_gateway::realtime::{Connection, Hub};

mod hub_support;
use hub_support::*;

async fn settle() {
    // Let the control loop drain its channels.
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn subscribed_connection_receives_event_and_other_does_not() {
    let (hub, _stop) = start(settings());
    hub.register_event::<Ping>("ping", "");
    let (c, mut c_rx) = connected(&hub, 8).await;
    let (_d, mut d_rx) = connected(&hub, 8).await;

    assert!(hub.subscribe(&c, "ping").unwrap());
    hub.publish_event("ping", &Ping { n: 1 }).await.unwrap();
    settle().await;

    let frame = c_rx.try_recv().expect("C gets the event");
    assert_eq!(frame_json(&frame), json!({"event":"ping","data":{"n":1}}));
    assert!(c_rx.try_recv().is_err(), "exactly one frame");
    assert!(d_rx.try_recv().is_err(), "D is not subscribed");
}

#[tokio::test]
async fn unknown_event_subscription_fails_without_mutation() {
    let (hub, _stop) = start(settings());
    let (c, _rx) = connected(&hub, 8).await;

    let err = hub.subscribe(&c, "nope").expect_err("must fail");
    assert!(matches!(err, HubError::UnknownEvent(ref e) if e == "nope"));
    assert_eq!(hub.subscriptions().total_subscriptions(), 0);
    assert!(hub.subscriptions().subscribers("nope").is_none());
}

#[tokio::test]
async fn concurrent_subscribes_are_idempotent() {
    let (hub, _stop) = start(settings());
    hub.register_event::<Ping>("ping", "");
    let (c, _rx) = connected(&hub, 8).await;

    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let hub = hub.clone();
            let c = c.clone();
            tokio::spawn(async move { hub.subscribe(&c, "ping").unwrap() })
        })
        .collect();

    let mut added = 0;
    for t in tasks {
        if t.await.unwrap() {
            added += 1;
        }
    }
    assert_eq!(added, 1);
    assert_eq!(hub.subscriptions().subscriber_count("ping"), 1);
}

#[tokio::test]
async fn full_queue_drops_for_that_connection_only() {
    let (hub, _stop) = start(settings());
    hub.register_event::<Ping>("ping", "");
    let (slow, mut slow_rx) = connected(&hub, 1).await;
    let (fast, mut fast_rx) = connected(&hub, 8).await;
    hub.subscribe(&slow, "ping").unwrap();
    hub.subscribe(&fast, "ping").unwrap();

    hub.publish_event("ping", &Ping { n: 1 }).await.unwrap();
    hub.publish_event("ping", &Ping { n: 2 }).await.unwrap();
    settle().await;

    assert_eq!(frame_json(&slow_rx.try_recv().unwrap())["data"]["n"], json!(1));
    assert!(slow_rx.try_recv().is_err(), "newest event dropped for slow consumer");
    assert_eq!(frame_json(&fast_rx.try_recv().unwrap())["data"]["n"], json!(1));
    assert_eq!(frame_json(&fast_rx.try_recv().unwrap())["data"]["n"], json!(2));
    assert_eq!(
        hub.metrics()
            .events_dropped
            .get(&[("event", "ping"), ("reason", "queue_full")]),
        1
    );
}

#[tokio::test]
async fn disconnect_purges_every_subscription() {
    let (hub, _stop) = start(settings());
    hub.register_event::<Ping>("ping", "");
    hub.register_event::<Ping>("pong", "");
    let (c, _rx) = connected(&hub, 8).await;
    hub.subscribe(&c, "ping").unwrap();
    hub.subscribe(&c, "pong").unwrap();
    assert_eq!(hub.connections().len(), 1);

    hub.disconnect(c.id()).await;

    assert!(c.is_closed());
    assert_eq!(hub.connections().len(), 0);
    assert_eq!(hub.subscriptions().total_subscriptions(), 0);
    assert_eq!(hub.metrics().connections_active.get(&[]), 0);
    assert!(matches!(hub.subscribe(&c, "ping"), Err(HubError::ConnectionClosed)));
}

#[tokio::test]
async fn publish_without_subscribers_does_not_block_or_fail() {
    let (hub, _stop) = start(settings());
    hub.register_event::<Ping>("quiet", "");

    let publish = async {
        for n in 0..10_000 {
            hub.publish_event("quiet", &Ping { n }).await.unwrap();
        }
    };
    tokio::time::timeout(Duration::from_secs(5), publish)
        .await
        .expect("publishing to nobody never stalls");
}

#[tokio::test]
async fn unsubscribe_reports_membership() {
    let (hub, _stop) = start(settings());
    hub.register_event::<Ping>("ping", "");
    let (c, _rx) = connected(&hub, 8).await;

    assert!(!hub.unsubscribe(&c, "ping"));
    hub.subscribe(&c, "ping").unwrap();
    assert!(hub.unsubscribe(&c, "ping"));
    assert!(!hub.unsubscribe(&c, "never-registered"));
}

#[tokio::test]
async fn try_publish_fails_fast_when_buffer_is_full() {
    // No control loop: nothing drains the broadcast channel.
    let (hub, _runtime) = Hub::builder(rpchub_gateway::config::HubSettings {
        event_buffer: 1,
        ..settings()
    })
    .build();
    hub.register_event::<Ping>("ping", "");

    hub.try_publish_event("ping", &Ping { n: 1 }).unwrap();
    let err = hub.try_publish_event("ping", &Ping { n: 2 }).expect_err("buffer full");
    assert!(matches!(err, HubError::QueueFull));
}

#[tokio::test]
async fn shutdown_closes_live_connections() {
    let (hub, stop) = start(settings());
    let (c, _rx) = connected(&hub, 8).await;

    stop.cancel();
    tokio::time::timeout(Duration::from_secs(1), c.closed())
        .await
        .expect("connection closed on shutdown");
    settle().await;
    assert_eq!(hub.connections().len(), 0);
}

#[tokio::test]
async fn subscribe_requires_registered_connection() {
    let (hub, _stop) = start(settings());
    hub.register_event::<Ping>("ping", "");
    let (stranger, _rx) = Connection::new(None, 4);

    assert!(matches!(hub.subscribe(&stranger, "ping"), Err(HubError::ConnectionClosed)));
    assert_eq!(hub.subscriptions().subscriber_count("ping"), 0);
}
