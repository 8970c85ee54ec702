//! Node identity for log records.
//!
//! When the `async` feature is enabled, the context uses `tokio::task_local!`
//! and survives across `.await` points in multi-thread Tokio runtimes.
//! Without it, the context uses `thread_local!` (synchronous code only).
//!
//! ```rust
//! use flowscope_log::NodeContext;
//!
//! NodeContext::new("n1").with_name("tap").scope_sync(|| {
//!     assert_eq!(NodeContext::current().unwrap().id, "n1");
//! });
//! assert!(NodeContext::current().is_none());
//! ```

use std::sync::Arc;

#[cfg(feature = "async")]
mod storage {
    use super::*;
    use std::future::Future;

    tokio::task_local! {
        static NODE_CTX: Arc<NodeContext>;
    }

    #[inline]
    pub fn current() -> Option<Arc<NodeContext>> {
        NODE_CTX.try_with(Arc::clone).ok()
    }

    pub async fn with_node<F: Future>(ctx: Arc<NodeContext>, f: F) -> F::Output {
        NODE_CTX.scope(ctx, f).await
    }

    pub fn with_node_sync<R>(ctx: Arc<NodeContext>, f: impl FnOnce() -> R) -> R {
        NODE_CTX.sync_scope(ctx, f)
    }
}

#[cfg(not(feature = "async"))]
mod storage {
    use super::*;
    use std::cell::RefCell;

    thread_local! {
        static NODE_CTX: RefCell<Option<Arc<NodeContext>>> = const { RefCell::new(None) };
    }

    #[inline]
    pub fn current() -> Option<Arc<NodeContext>> {
        NODE_CTX.with(|ctx| ctx.borrow().clone())
    }

    pub fn with_node_sync<R>(ctx: Arc<NodeContext>, f: impl FnOnce() -> R) -> R {
        NODE_CTX.with(|cell| {
            let prev = cell.borrow_mut().replace(ctx);
            let result = f();
            *cell.borrow_mut() = prev;
            result
        })
    }
}

/// Identity of the node on whose behalf code is running.
///
/// Records emitted inside [`NodeContext::scope`] / [`NodeContext::scope_sync`]
/// carry it in [`crate::LogRecord::node`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeContext {
    /// Node id.
    pub id: String,
    /// Display name, if the node has one.
    pub name: Option<String>,
    /// Node type (e.g. `debug`).
    pub node_type: Option<String>,
    /// Id of the flow the node belongs to.
    pub z: Option<String>,
}

impl NodeContext {
    /// Context for node `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the node type.
    #[must_use]
    pub fn with_type(mut self, node_type: impl Into<String>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }

    /// Set the owning flow id.
    #[must_use]
    pub fn with_flow(mut self, z: impl Into<String>) -> Self {
        self.z = Some(z.into());
        self
    }

    /// The context active on this task (or thread), if any.
    #[inline]
    #[must_use]
    pub fn current() -> Option<Arc<Self>> {
        storage::current()
    }

    /// Run a synchronous closure with this context active.
    ///
    /// Inner scopes shadow outer ones and restore on return.
    pub fn scope_sync<R>(self, f: impl FnOnce() -> R) -> R {
        storage::with_node_sync(Arc::new(self), f)
    }

    /// Run a future with this context active.
    #[cfg(feature = "async")]
    pub async fn scope<F: std::future::Future>(self, f: F) -> F::Output {
        storage::with_node(Arc::new(self), f).await
    }
}
