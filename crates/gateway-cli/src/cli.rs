//! CLI argument definitions using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;
use crate::output::OutputFormat;
use crate::service::ServiceContext;

/// llm-relay - route one chat API onto many providers
#[derive(Parser, Debug)]
#[command(name = "llm-relay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Relay home directory
    #[arg(long, env = "LLM_RELAY_HOME", global = true)]
    pub home: Option<PathBuf>,

    /// Relay service binary
    #[arg(long, env = "LLM_RELAY_SERVER", global = true)]
    pub server_bin: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the relay service in the background
    Start(commands::start::StartArgs),

    /// Stop the relay service
    Stop(commands::stop::StopArgs),

    /// Show whether the relay service is running
    Status,

    /// Run a command against the relay service
    Exec(commands::exec::ExecArgs),

    /// Manage the configuration document
    Config(commands::config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command.
    pub async fn execute(self) -> Result<()> {
        let format = OutputFormat::from(self.json);
        let context = ServiceContext::resolve(self.home, self.server_bin)?;

        match self.command {
            Commands::Start(args) => commands::start::execute(args, &context, format).await,
            Commands::Stop(args) => commands::stop::execute(&args, &context, format),
            Commands::Status => commands::status::execute(&context, format).await,
            Commands::Exec(args) => commands::exec::execute(args, &context).await,
            Commands::Config(args) => commands::config::execute(args, &context, format).await,
        }
    }
}
