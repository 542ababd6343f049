// reconcile/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug reconcile review entradas.xlsx to see the details
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let project_dir = cli.project_dir;

    match cli.command {
        Commands::Files => commands::files::execute(project_dir).await,
        Commands::Upload { path } => commands::upload::execute(project_dir, path).await,
        Commands::Review { batch } => commands::review::execute(project_dir, batch).await,
        Commands::Rules { action } => commands::rules::execute(project_dir, action).await,
    }
}
