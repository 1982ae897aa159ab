//! tasksmith: a declarative task runner.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

/// Default manifest filename, read from the current directory unless
/// overridden with `--config`.
const DEFAULT_MANIFEST: &str = "taskfile.yaml";

#[derive(Parser)]
#[command(name = "tasksmith", version, about = "Run tasks and their workflows in dependency order", long_about = None)]
struct Cli {
    /// Path to the manifest file.
    #[arg(short, long, default_value = DEFAULT_MANIFEST)]
    config: String,

    /// Number of tasks to run concurrently.
    #[arg(short = 'j', long, default_value_t = 4)]
    workers: i64,

    /// Print what would run without spawning any commands.
    #[arg(short = 'n', long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Validate a manifest without running anything.
    Validate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let exit_code = match cli.command {
        Some(Command::Validate) => commands::validate::run(&cli.config)?,
        None => commands::run::run(&cli.config, cli.workers, cli.dry_run).await?,
    };

    std::process::exit(exit_code);
}
