//! Nodes, the registry and the log bridge wired together as the server
//! wires them.

use std::sync::Arc;

use flowscope_core::NodeId;
use flowscope_debug::{
    CommsMessage, DebugNode, DebugNodeConfig, DebugNodeRegistry, DebugPublisher, DebugSettings,
    LogBridge,
};
use flowscope_log::{HandlerLayer, HandlerRegistry, NodeContext};
use flowscope_telemetry::{EventBus, EventSubscriber, MetricsRegistry};
use flowscope_value::Value;
use pretty_assertions::assert_eq;
use serde_json::json;
use tracing_subscriber::layer::SubscriberExt;

struct Harness {
    publisher: Arc<DebugPublisher>,
    registry: DebugNodeRegistry,
    metrics: MetricsRegistry,
    comms: EventSubscriber<CommsMessage>,
}

fn harness() -> Harness {
    let metrics = MetricsRegistry::new();
    let bus = Arc::new(EventBus::<CommsMessage>::new(64));
    let comms = bus.subscribe();
    let publisher = Arc::new(DebugPublisher::new(DebugSettings::default(), bus, &metrics));
    Harness {
        registry: DebugNodeRegistry::new(&metrics),
        publisher,
        metrics,
        comms,
    }
}

fn add_node(h: &Harness, raw: serde_json::Value) -> Arc<DebugNode> {
    let config: DebugNodeConfig = serde_json::from_value(raw).unwrap();
    let node = Arc::new(DebugNode::new(config, Arc::clone(&h.publisher)));
    h.registry.register(Arc::clone(&node)).unwrap();
    node
}

#[test]
fn toggling_through_registry_gates_publishing() {
    let mut h = harness();
    let node = add_node(&h, json!({"id": "n1", "z": "f1"}));
    let msg = Value::from(json!({"payload": "hello"}));

    node.receive(&msg);
    assert_eq!(h.comms.try_recv().unwrap().data.msg, "hello");

    h.registry.set_active("n1", false).unwrap();
    node.receive(&msg);
    assert!(h.comms.try_recv().is_none());

    h.registry.set_active("n1", true).unwrap();
    node.receive(&msg);
    assert!(h.comms.try_recv().is_some());

    assert_eq!(h.metrics.counter("debug_published_total").get(), 2);
    assert_eq!(h.metrics.counter("debug_skipped_inactive_total").get(), 1);
}

#[test]
fn comms_message_serializes_with_topic_and_wire_names() {
    let mut h = harness();
    let node = add_node(&h, json!({"id": "n1", "z": "f1", "name": "tap"}));
    node.receive(&Value::from(json!({"payload": [1, 2], "topic": "t", "_path": "f1/n1"})));

    let message = h.comms.try_recv().unwrap();
    assert_eq!(
        serde_json::to_value(&message).unwrap(),
        json!({
            "topic": "debug",
            "data": {
                "id": "n1",
                "name": "tap",
                "z": "f1",
                "topic": "t",
                "property": "payload",
                "format": "array[2]",
                "msg": "[\n 1,\n 2\n]",
                "_path": "f1/n1"
            }
        })
    );
}

#[test]
fn warnings_inside_a_node_reach_observers() {
    let mut h = harness();
    let handlers = HandlerRegistry::new();
    handlers.register(Arc::new(LogBridge::new(Arc::clone(&h.publisher), &h.metrics)));
    let subscriber = tracing_subscriber::registry().with(HandlerLayer::new(handlers));

    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("not forwarded");
        NodeContext::new("n9").with_name("worker").with_type("function").scope_sync(|| {
            tracing::warn!("queue is backing up");
        });
        tracing::error!(error = "connection reset", "upstream failed");
    });

    let warn = h.comms.try_recv().unwrap().data;
    assert_eq!(warn.id, "n9");
    assert_eq!(warn.node_type.as_deref(), Some("function"));
    assert_eq!(warn.level, Some(30));
    assert_eq!(warn.msg, "queue is backing up");

    let error = h.comms.try_recv().unwrap().data;
    assert_eq!(error.id, "flow");
    assert_eq!(error.level, Some(20));
    assert_eq!(error.format, "error");
    assert_eq!(error.msg, r#"{"name":"Error","message":"connection reset"}"#);

    assert!(h.comms.try_recv().is_none());
    assert_eq!(h.metrics.counter("debug_log_forwarded_total").get(), 2);
}

#[test]
fn unknown_ids_are_reported() {
    let h = harness();
    add_node(&h, json!({"id": "n1"}));
    assert!(h.registry.set_active("n2", true).is_err());
    assert_eq!(h.registry.ids(), vec![NodeId::new("n1").unwrap()]);
}
