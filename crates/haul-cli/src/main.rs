//! CLI application for waste-disposal ticket intake.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, export, extract, ingest, review};

/// Haul tickets - Extract, review and export waste-disposal tickets
#[derive(Parser)]
#[command(name = "haul")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract ticket fields from one recognized text file
    Extract(extract::ExtractArgs),

    /// Extract ticket fields from multiple files
    Batch(batch::BatchArgs),

    /// Record uploaded tickets in the ticket store
    Ingest(ingest::IngestArgs),

    /// Review stored tickets
    Review(review::ReviewArgs),

    /// Export tickets in a date range to CSV
    Export(export::ExportArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Extract(args) => extract::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Ingest(args) => ingest::run(args, config_path).await,
        Commands::Review(args) => review::run(args, config_path).await,
        Commands::Export(args) => export::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
