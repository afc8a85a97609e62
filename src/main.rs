use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod core;
mod daemon;
mod providers;
mod ui;

use cli::visibility::VisibilityArg;

#[derive(Parser)]
#[command(name = "wall-dash")]
#[command(author, version, about = "Wall display dashboard: clock, cached weather and spreadsheet notes")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard daemon
    Daemon,

    /// Show cached data without touching the network
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Filter by source name (weather, notes)
        #[arg(long)]
        source: Option<String>,
    },

    /// Trigger daemon refresh via D-Bus
    Refresh,

    /// Report display visibility to the daemon via D-Bus
    Visibility {
        #[arg(value_enum)]
        state: VisibilityArg,
    },

    /// Show recent outbound weather requests
    Log {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Under systemd, log straight to the journal
    let journald = if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_journald::layer().ok()
    } else {
        None
    };
    let use_fmt = journald.is_none();

    let plain = (use_fmt && !json).then(|| tracing_subscriber::fmt::layer().with_writer(io::stderr));
    let structured = (use_fmt && json).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(io::stderr)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(journald)
        .with(plain)
        .with(structured)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon => {
            init_logging(cli.json_logs);
            daemon::run().await
        }
        Commands::Status { json, source } => {
            init_logging(cli.json_logs);
            cli::status::run(json, source).await
        }
        Commands::Refresh => {
            init_logging(cli.json_logs);
            cli::refresh::run().await
        }
        Commands::Visibility { state } => {
            init_logging(cli.json_logs);
            cli::visibility::run(state).await
        }
        Commands::Log { json } => {
            init_logging(cli.json_logs);
            cli::log::run(json).await
        }
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}
