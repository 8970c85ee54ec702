//! Lookup of running debug nodes by id.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use flowscope_core::NodeId;
use flowscope_telemetry::{Gauge, MetricsRegistry};

use crate::error::DebugError;
use crate::node::DebugNode;

/// The set of debug nodes the control endpoint can address.
///
/// Also maintains the `debug_nodes_active` gauge.
#[derive(Debug)]
pub struct DebugNodeRegistry {
    nodes: DashMap<NodeId, Arc<DebugNode>>,
    active: Gauge,
}

impl DebugNodeRegistry {
    /// Empty registry recording into `metrics`.
    pub fn new(metrics: &MetricsRegistry) -> Self {
        Self {
            nodes: DashMap::new(),
            active: metrics.gauge("debug_nodes_active"),
        }
    }

    /// Add a node.
    ///
    /// # Errors
    ///
    /// [`DebugError::DuplicateNode`] if the id is taken.
    pub fn register(&self, node: Arc<DebugNode>) -> Result<(), DebugError> {
        match self.nodes.entry(node.id().clone()) {
            Entry::Occupied(entry) => Err(DebugError::DuplicateNode(entry.key().clone())),
            Entry::Vacant(entry) => {
                if node.is_active() {
                    self.active.inc();
                }
                tracing::debug!(node.id = %node.id(), "debug node registered");
                entry.insert(node);
                Ok(())
            }
        }
    }

    /// The node with this id.
    pub fn get(&self, id: &str) -> Option<Arc<DebugNode>> {
        self.nodes.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Remove and return a node.
    pub fn remove(&self, id: &str) -> Option<Arc<DebugNode>> {
        let (_, node) = self.nodes.remove(id)?;
        if node.is_active() {
            self.active.dec();
        }
        Some(node)
    }

    /// Enable or disable publishing for a node.
    ///
    /// The entry stays locked until the gauge is updated, so a concurrent
    /// [`DebugNodeRegistry::remove`] sees either the old or the new state,
    /// never a node that is already gone.
    ///
    /// # Errors
    ///
    /// [`DebugError::UnknownNode`] if no node has this id.
    pub fn set_active(&self, id: &str, active: bool) -> Result<(), DebugError> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| DebugError::UnknownNode(id.to_owned()))?;
        let previous = node.set_active(active);
        match (previous, active) {
            (false, true) => self.active.inc(),
            (true, false) => self.active.dec(),
            _ => {}
        }
        drop(node);
        tracing::debug!(node.id = id, active, "debug node state changed");
        Ok(())
    }

    /// Number of registered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node is registered.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of all registered nodes, sorted.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }
}
