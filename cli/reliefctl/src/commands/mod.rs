//! CLI commands.

mod alerts;
mod camps;
mod stats;
mod tasks;
mod volunteers;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::config::Config;
use crate::output::OutputFormat;

/// rctl - coordinate camps, volunteers, tasks and alerts.
#[derive(Debug, Parser)]
#[command(name = "rctl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Inspect camps, their stock and their urgency.
    Camps(camps::CampsCommand),

    /// Manage volunteers and find matches for a need.
    Volunteers(volunteers::VolunteersCommand),

    /// Create and advance tasks.
    Tasks(tasks::TasksCommand),

    /// Send or watch alerts.
    Alerts(alerts::AlertsCommand),

    /// Show a summary of the whole operation.
    Stats,

    /// Show CLI version.
    Version,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let ctx = CommandContext {
            config: Config::load()?,
            format: self.format,
        };

        match self.command {
            Commands::Camps(cmd) => cmd.run(ctx).await,
            Commands::Volunteers(cmd) => cmd.run(ctx).await,
            Commands::Tasks(cmd) => cmd.run(ctx).await,
            Commands::Alerts(cmd) => cmd.run(ctx).await,
            Commands::Stats => stats::run(ctx).await,
            Commands::Version => {
                println!("rctl {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

/// Shared command context.
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
}

impl CommandContext {
    pub fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.config)
    }
}

/// List envelope returned by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Prints a list as a table of `rows`, or the raw response as JSON.
pub fn print_list<T, R>(ctx: &CommandContext, response: &ListResponse<T>, rows: impl Fn(&T) -> R)
where
    T: Serialize,
    R: Serialize + tabled::Tabled,
{
    match ctx.format {
        OutputFormat::Table => {
            let rows: Vec<R> = response.items.iter().map(rows).collect();
            crate::output::print_output(&rows, ctx.format);
        }
        OutputFormat::Json => crate::output::print_single(response),
    }
}
