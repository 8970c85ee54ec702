//! Wiring of nodes, logging, HTTP and the stdio streams.

use std::sync::Arc;

use anyhow::{Context, Result};
use flowscope_api::{AllowAll, AppState, Authorizer, TokenAuthorizer};
use flowscope_debug::{
    CommsMessage, DebugNode, DebugNodeRegistry, DebugPublisher, LogBridge,
};
use flowscope_log::HandlerRegistry;
use flowscope_telemetry::{EventBus, EventSubscriber, MetricsRegistry};
use flowscope_value::Value;
use serde::Deserialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;

use crate::config::ServerConfig;

/// Buffered communications messages before slow readers start skipping.
pub const COMMS_CAPACITY: usize = 1024;

/// One line of input: a message addressed to a node.
#[derive(Debug, Deserialize)]
pub struct Inbound {
    /// Target node id.
    pub node: String,
    /// The message.
    #[serde(default)]
    pub msg: serde_json::Value,
}

/// The running pieces of a server.
pub struct App {
    pub metrics: MetricsRegistry,
    pub bus: Arc<EventBus<CommsMessage>>,
    pub registry: Arc<DebugNodeRegistry>,
    pub bridge: Arc<LogBridge>,
    pub state: AppState,
}

impl App {
    /// Build every node and service described by `config`.
    pub fn build(config: &ServerConfig) -> Result<Self> {
        let metrics = MetricsRegistry::new();
        let bus = Arc::new(EventBus::<CommsMessage>::new(COMMS_CAPACITY));
        let publisher = Arc::new(DebugPublisher::new(config.debug, bus.clone(), &metrics));

        let registry = Arc::new(DebugNodeRegistry::new(&metrics));
        for node in &config.nodes {
            registry
                .register(Arc::new(DebugNode::new(node.clone(), Arc::clone(&publisher))))
                .with_context(|| format!("starting debug node {}", node.id))?;
        }

        let authorizer: Arc<dyn Authorizer> = if config.auth.enabled {
            if config.auth.tokens.is_empty() {
                tracing::warn!("auth is enabled but no tokens are configured");
            }
            Arc::new(TokenAuthorizer::new(config.auth.tokens.clone()))
        } else {
            Arc::new(AllowAll)
        };

        Ok(Self {
            bridge: Arc::new(LogBridge::new(publisher, &metrics)),
            state: AppState::new(Arc::clone(&registry), authorizer),
            metrics,
            bus,
            registry,
        })
    }

    /// Forward warnings and errors logged through `handlers`.
    pub fn attach_log_bridge(&self, handlers: &HandlerRegistry) {
        handlers.register(self.bridge.clone());
    }

    /// Deliver one input line. Malformed lines and unknown nodes are
    /// logged and skipped.
    pub fn deliver_line(&self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        let inbound: Inbound = match serde_json::from_str(line) {
            Ok(inbound) => inbound,
            Err(err) => {
                tracing::warn!(error = %err, "ignoring malformed input line");
                return;
            }
        };
        match self.registry.get(&inbound.node) {
            Some(node) => node.receive(&Value::from(inbound.msg)),
            None => tracing::warn!(node.id = %inbound.node, "message for unknown node"),
        }
    }

    /// Log every metric.
    pub fn log_metrics(&self) {
        for (name, value) in self.metrics.snapshot() {
            tracing::info!(metric = %name, value = ?value, "metric");
        }
    }
}

/// Read lines from `input` until EOF or cancellation.
pub async fn pump_input<R>(app: &App, input: R, shutdown: &CancellationToken) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        tokio::select! {
            () = shutdown.cancelled() => return Ok(()),
            line = lines.next_line() => match line.context("reading stdin")? {
                Some(line) => app.deliver_line(&line),
                None => return Ok(()),
            },
        }
    }
}

/// Write each comms message as one JSON line until cancellation.
pub async fn print_comms<W>(
    mut comms: EventSubscriber<CommsMessage>,
    mut output: W,
    shutdown: CancellationToken,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    loop {
        let message = tokio::select! {
            () = shutdown.cancelled() => break,
            message = comms.recv() => match message {
                Some(message) => message,
                None => break,
            },
        };
        write_line(&mut output, &message).await?;
    }
    // Whatever was published before shutdown still goes out.
    while let Some(message) = comms.try_recv() {
        write_line(&mut output, &message).await?;
    }
    output.flush().await.context("flushing stdout")
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, message: &CommsMessage) -> Result<()> {
    let mut line = serde_json::to_vec(message).context("serializing debug message")?;
    line.push(b'\n');
    output.write_all(&line).await.context("writing stdout")?;
    output.flush().await.context("flushing stdout")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config(raw: serde_json::Value) -> ServerConfig {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn duplicate_nodes_fail_startup() {
        let config = config(json!({"nodes": [{"id": "n1"}, {"id": "n1"}]}));
        let err = App::build(&config).err().unwrap();
        assert!(format!("{err:#}").contains("already registered"));
    }

    #[tokio::test]
    async fn stdin_lines_become_stdout_lines() {
        let app = App::build(&config(json!({"nodes": [{"id": "n1", "name": "tap"}]}))).unwrap();
        let shutdown = CancellationToken::new();
        let comms = app.bus.subscribe();

        let input: &[u8] = b"{\"node\":\"n1\",\"msg\":{\"payload\":42,\"topic\":\"t\"}}\n\nnot json\n{\"node\":\"ghost\",\"msg\":{}}\n";
        pump_input(&app, input, &shutdown).await.unwrap();
        shutdown.cancel();

        let mut output = Vec::new();
        print_comms(comms, &mut output, shutdown).await.unwrap();

        let lines: Vec<serde_json::Value> = output
            .split(|b| *b == b'\n')
            .filter(|l| !l.is_empty())
            .map(|l| serde_json::from_slice(l).unwrap())
            .collect();
        assert_eq!(
            lines,
            vec![json!({
                "topic": "debug",
                "data": {"id": "n1", "name": "tap", "topic": "t", "property": "payload", "format": "number", "msg": "42"}
            })]
        );
        assert_eq!(app.metrics.counter("debug_published_total").get(), 1);
    }

    #[test]
    fn auth_selects_token_authorizer() {
        let app = App::build(&config(json!({
            "auth": {"enabled": true, "tokens": {"t": ["debug.write"]}}
        })))
        .unwrap();
        let headers = http::HeaderMap::new();
        assert!(app.state.authorizer.authorize(&headers, flowscope_api::DEBUG_WRITE).is_err());
    }
}
