use std::io::Write;

use anyhow::Context;
use bookshelf_app::App;
use bookshelf_kernel::settings::{DatabaseSettings, Settings};
use clap::{Parser, Subcommand};

/// Operator commands for the Bookshelf catalog service.
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve HTTP until Ctrl-C (default)
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the merged OpenAPI document
    Openapi {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings =
        Settings::load().with_context(|| "failed to load Bookshelf settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "bookshelf serve");
            App::build(settings).await?.serve().await
        }
        Command::Migrate => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            let app = App::build(settings).await?;
            let applied = app.migrate().await?;
            tracing::info!(applied, "migrations complete");
            Ok(())
        }
        Command::Openapi { pretty } => {
            // The document does not depend on stored data.
            settings.database = DatabaseSettings::in_memory();
            let spec = App::build(settings).await?.openapi();

            let rendered = if pretty {
                serde_json::to_string_pretty(&spec)?
            } else {
                serde_json::to_string(&spec)?
            };
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}").context("failed to write to stdout")?;
            Ok(())
        }
    }
}
