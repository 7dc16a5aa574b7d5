use std::io;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mdbook_stories::{StoriesConfig, VhsRecorder};

/// mdBook preprocessor that renders terminal stories with vhs.
#[derive(Parser, Debug)]
#[command(name = "mdbook-stories", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report whether a renderer is supported. Every renderer is.
    Supports {
        /// Renderer name, plus anything else mdBook passes along.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if let Some(Command::Supports { .. }) = cli.cmd {
        return Ok(());
    }

    init_logging();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stats = mdbook_stories::run(
        stdin.lock(),
        stdout.lock(),
        StoriesConfig::from_env(),
        VhsRecorder::from_config,
    )?;

    tracing::info!(
        rendered = stats.rendered,
        skipped = stats.skipped,
        "stories up to date"
    );
    Ok(())
}

// stdout belongs to mdBook, so logs go to stderr.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
