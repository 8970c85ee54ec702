//! The debug node: configuration and per-message behaviour.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use flowscope_core::{FlowId, NodeId};
use flowscope_value::{Value, format_number, get_property};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::envelope::PublishContext;
use crate::inspect::{CONSOLE_DEPTH, DEFAULT_DEPTH, Inspector};
use crate::publish::DebugPublisher;

/// Property shown when none is configured.
pub const DEFAULT_PROPERTY: &str = "payload";

/// Node type reported in log fields.
pub const NODE_TYPE: &str = "debug";

/// What part of an inbound message a node shows.
///
/// Configured as a string (or boolean): `"true"` selects the whole
/// message, anything else is a property path. An absent, empty or
/// `"false"` value means `payload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Complete {
    /// The whole message.
    Message,
    /// One property, by path.
    Property(String),
}

impl Complete {
    /// Interpret a configured value.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "true" => Self::Message,
            "" | "false" => Self::default(),
            path => Self::Property(path.to_owned()),
        }
    }
}

impl Default for Complete {
    fn default() -> Self {
        Self::Property(DEFAULT_PROPERTY.to_owned())
    }
}

impl Serialize for Complete {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Message => serializer.serialize_str("true"),
            Self::Property(path) => serializer.serialize_str(path),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagOrText {
    Flag(bool),
    Text(String),
}

impl FlagOrText {
    fn into_text(self) -> String {
        match self {
            Self::Flag(flag) => flag.to_string(),
            Self::Text(text) => text,
        }
    }
}

impl<'de> Deserialize<'de> for Complete {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<FlagOrText>::deserialize(deserializer)?;
        Ok(raw.map_or_else(Self::default, |raw| Self::parse(&raw.into_text())))
    }
}

fn deserialize_console<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = Option::<FlagOrText>::deserialize(deserializer)?;
    Ok(raw.is_some_and(|raw| raw.into_text() == "true"))
}

fn deserialize_active<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

const fn active_by_default() -> bool {
    true
}

/// Configuration of one debug node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugNodeConfig {
    /// Node id.
    pub id: NodeId,
    /// Owning flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<FlowId>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Shown part of each message.
    #[serde(default)]
    pub complete: Complete,
    /// Mirror shown values to the process log.
    #[serde(default, deserialize_with = "deserialize_console")]
    pub console: bool,
    /// Publish shown values. `null` counts as enabled.
    #[serde(default = "active_by_default", deserialize_with = "deserialize_active")]
    pub active: bool,
}

impl DebugNodeConfig {
    /// Active node `id` showing `payload`.
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            z: None,
            name: None,
            complete: Complete::default(),
            console: false,
            active: true,
        }
    }
}

/// A running debug node.
pub struct DebugNode {
    id: NodeId,
    z: Option<FlowId>,
    name: Option<String>,
    complete: Complete,
    console: bool,
    active: AtomicBool,
    publisher: Arc<DebugPublisher>,
}

impl DebugNode {
    /// Start a node from its configuration.
    pub fn new(config: DebugNodeConfig, publisher: Arc<DebugPublisher>) -> Self {
        Self {
            id: config.id,
            z: config.z,
            name: config.name,
            complete: config.complete,
            console: config.console,
            active: AtomicBool::new(config.active),
            publisher,
        }
    }

    /// Node id.
    pub fn id(&self) -> &NodeId {
        &self.id
    }

    /// Owning flow.
    pub fn z(&self) -> Option<&FlowId> {
        self.z.as_ref()
    }

    /// Display name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Shown part of each message.
    pub fn complete(&self) -> &Complete {
        &self.complete
    }

    /// Whether shown values are mirrored to the log.
    pub fn console(&self) -> bool {
        self.console
    }

    /// Whether shown values are published.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    /// Enable or disable publishing. Returns the previous state.
    ///
    /// Outside this crate the state changes through
    /// [`DebugNodeRegistry::set_active`](crate::DebugNodeRegistry::set_active),
    /// which keeps the `debug_nodes_active` gauge in step.
    pub(crate) fn set_active(&self, active: bool) -> bool {
        self.active.swap(active, Ordering::Relaxed)
    }

    /// Handle one inbound message.
    ///
    /// Console mirroring happens whether or not the node is active.
    pub fn receive(&self, msg: &Value) {
        let (value, property) = match &self.complete {
            Complete::Message => (msg.clone(), None),
            Complete::Property(path) => {
                let value = get_property(msg, path).unwrap_or_else(|err| {
                    tracing::debug!(node.id = %self.id, %err, "property lookup failed");
                    Value::Undefined
                });
                (value, Some(path.clone()))
            }
        };

        if self.console {
            self.mirror(&value, property.is_none());
        }

        if !self.is_active() {
            self.publisher.skip_inactive();
            return;
        }

        let context = PublishContext {
            name: self.name.clone(),
            // The flow id is only reported for property output.
            z: property.as_ref().and(self.z.as_ref()).map(ToString::to_string),
            topic: message_topic(msg),
            path: message_field(msg, "_path").and_then(|v| v.as_str().map(str::to_owned)),
            property,
            ..PublishContext::new(self.id.as_str())
        };
        self.publisher.publish(&value, context);
    }

    fn mirror(&self, value: &Value, whole_message: bool) {
        let colors = self.publisher.settings().use_colors;
        let text = match value {
            _ if whole_message => format!("\n{}", Inspector::new(CONSOLE_DEPTH, colors).inspect(value)),
            Value::String(s) if s.contains('\n') => format!("\n{s}"),
            Value::String(s) => s.clone(),
            Value::Null | Value::Bytes(_) | Value::Array(_) | Value::Object(_) | Value::Error(_) => {
                format!("\n{}", Inspector::new(CONSOLE_DEPTH, colors).inspect(value))
            }
            Value::Undefined | Value::Bool(_) | Value::Number(_) => {
                Inspector::new(DEFAULT_DEPTH, colors).inspect(value)
            }
        };
        tracing::info!(
            node.id = %self.id,
            node.name = self.name.as_deref().unwrap_or_default(),
            "node.type" = NODE_TYPE,
            node.z = self.z.as_ref().map(FlowId::as_str).unwrap_or_default(),
            "{text}"
        );
    }
}

impl fmt::Debug for DebugNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugNode")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("complete", &self.complete)
            .field("console", &self.console)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}

fn message_field(msg: &Value, key: &str) -> Option<Value> {
    msg.as_object().and_then(|object| object.get(key))
}

fn message_topic(msg: &Value) -> Option<String> {
    match message_field(msg, "topic")? {
        Value::String(topic) => Some(topic),
        Value::Number(n) => Some(format_number(n)),
        _ => None,
    }
}
