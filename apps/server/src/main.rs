//! `flowscope` -- runs debug nodes over stdin/stdout with an HTTP control
//! surface.

mod app;
mod cli;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::app::{App, print_comms, pump_input};
use crate::cli::{Cli, Command, ServeArgs};
use crate::config::ServerConfig;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = ServerConfig::load(&args).context("loading configuration")?;
    let logger = flowscope_log::init_with(config.log.clone()).context("initialising logging")?;

    let app = App::build(&config)?;
    app.attach_log_bridge(logger.handlers());
    tracing::info!(nodes = app.registry.len(), max_length = config.debug.max_length, "flowscope starting");

    let shutdown = CancellationToken::new();
    let printer = tokio::spawn(print_comms(
        app.bus.subscribe(),
        tokio::io::stdout(),
        shutdown.clone(),
    ));

    let addr = config.http.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    let router = flowscope_api::router(app.state.clone(), config.viewer_dir.clone());
    let server = tokio::spawn(flowscope_api::serve(listener, router, shutdown.clone()));

    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
        }
        signal.cancel();
    });

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let input = pump_input(&app, stdin, &shutdown).await;
    tracing::info!("shutting down");
    shutdown.cancel();

    server.await.context("http server task")?.context("http server")?;
    printer.await.context("printer task")??;
    app.log_metrics();
    input
}
