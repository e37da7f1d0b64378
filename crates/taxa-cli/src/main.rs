//! Taxa CLI - Main entry point

use std::process;

use clap::Parser;
use taxa_cli::output::unescape_delimiter;
use taxa_cli::{commands, normalize_args, Cli, Commands, LineageMode};
use taxa_common::logging::{init_logging, LogConfig, LogLevel};
use taxa_core::TaxonomyStore;
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(log_level)
        .filter_directives("sqlx=warn")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The CLI works without logging
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> anyhow::Result<()> {
    let config = cli.db.into_config()?;
    let store = TaxonomyStore::connect(&config).await?;
    let mut stdout = std::io::stdout();

    let result = match cli.command {
        Commands::Create { taxdump } => commands::create::run(&store, &taxdump).await.map(|_| ()),

        Commands::Lineage {
            taxa,
            mode,
            delimiter,
        } => match mode {
            LineageMode::Ancestors => {
                let delimiter = unescape_delimiter(&delimiter);
                commands::lineage::run_ancestors(&store, &taxa, &delimiter, &mut stdout).await
            },
            LineageMode::Descendants => {
                commands::lineage::run_descendants(&store, &taxa, &mut stdout).await
            },
        },

        Commands::Custom { file } => commands::custom::run(&store, &file, &mut stdout).await,
    };

    store.close().await;

    Ok(result?)
}
