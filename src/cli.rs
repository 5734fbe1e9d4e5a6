//! CLI for brandforge
//!
//! `serve` starts the HTTP server; with no subcommand the help is printed.

use clap::{Parser, Subcommand};

/// Brandforge marketing content generation server
#[derive(Parser, Debug)]
#[command(name = "brandforge")]
#[command(about = "AI marketing content generation")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the server
    Serve,
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Serve) => crate::server::run().await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}
