use std::error::Error;

use clap::{Parser, Subcommand};
use netplace::{parser, planner, Netmap};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "netplace")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a placement policy and print its canonical form
    Check { policy: String },
    /// Evaluate a placement policy against a netmap snapshot file
    Plan {
        /// Path to a JSON netmap snapshot
        #[arg(long)]
        netmap: String,
        policy: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Check { policy } => {
            let parsed = parser::parse(&policy)?;
            println!("{parsed}");
        }
        Command::Plan { netmap, policy } => {
            let raw = std::fs::read_to_string(&netmap)?;
            let map = Netmap::from_snapshot_json(&raw)?;
            let parsed = parser::parse(&policy)?;
            let result = planner::plan(&parsed, &map)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }
    Ok(())
}
