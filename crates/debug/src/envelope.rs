//! The record handed to the publish primitive.

use flowscope_telemetry::TopicMessage;
use serde::{Deserialize, Serialize};

use crate::encode::EncodedValue;

/// What a debug consumer receives for one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugEnvelope {
    /// Id of the emitting node.
    pub id: String,
    /// Display name of the emitting node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Type of the emitting node (log records only).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    /// Flow the node belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<String>,
    /// Topic of the inbound message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Message property that was encoded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Numeric severity (log records only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    /// Type descriptor of the payload.
    pub format: String,
    /// The encoded payload.
    pub msg: String,
    /// Path of the inbound message through the flow.
    #[serde(rename = "_path", default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Message on the communications channel.
pub type CommsMessage = TopicMessage<DebugEnvelope>;

/// Identity and routing fields of a publish call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishContext {
    /// Id of the emitting node.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Node type.
    pub node_type: Option<String>,
    /// Owning flow.
    pub z: Option<String>,
    /// Inbound message topic.
    pub topic: Option<String>,
    /// Encoded message property.
    pub property: Option<String>,
    /// Numeric severity.
    pub level: Option<u8>,
    /// Inbound message path.
    pub path: Option<String>,
}

impl PublishContext {
    /// Context for node `id`, all other fields empty.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

impl DebugEnvelope {
    /// Combine routing fields with an encoded value.
    #[must_use]
    pub fn new(context: PublishContext, encoded: EncodedValue) -> Self {
        Self {
            id: context.id,
            name: context.name,
            node_type: context.node_type,
            z: context.z,
            topic: context.topic,
            property: context.property,
            level: context.level,
            format: encoded.format,
            msg: encoded.payload,
            path: context.path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn absent_fields_are_not_serialized() {
        let envelope = DebugEnvelope::new(
            PublishContext {
                property: Some("payload".into()),
                path: Some("f1/n1".into()),
                ..PublishContext::new("n1")
            },
            EncodedValue {
                format: "number".into(),
                payload: "1".into(),
            },
        );
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"id": "n1", "property": "payload", "format": "number", "msg": "1", "_path": "f1/n1"})
        );
    }

    #[test]
    fn log_fields_use_wire_names() {
        let envelope = DebugEnvelope::new(
            PublishContext {
                node_type: Some("http in".into()),
                level: Some(30),
                ..PublishContext::new("n2")
            },
            EncodedValue {
                format: "string[2]".into(),
                payload: "hi".into(),
            },
        );
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "http in");
        assert_eq!(json["level"], 30);
    }
}
