//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Flowscope: bounded debug output for dataflow messages.
#[derive(Debug, Parser)]
#[command(name = "flowscope", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run debug nodes, reading messages from stdin and printing debug
    /// records to stdout.
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// Configuration file (TOML). Defaults to `flowscope.toml` when present.
    #[arg(short, long, env = "FLOWSCOPE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind the HTTP server to.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory with the debug viewer assets.
    #[arg(long)]
    pub viewer_dir: Option<PathBuf>,
}
