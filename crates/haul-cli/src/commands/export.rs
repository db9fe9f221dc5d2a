//! Export command - write tickets in a date range to CSV.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use console::style;

use haul_core::{export_csv, ExportFilter, StatusFilter, TicketStore};

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// First day to include (YYYY-MM-DD, UTC)
    #[arg(long)]
    start: NaiveDate,

    /// Last day to include (YYYY-MM-DD, UTC)
    #[arg(long)]
    end: NaiveDate,

    /// Only tickets in this status, or "fixed" for manually corrected ones
    #[arg(long)]
    status: Option<StatusFilter>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ticket store file (default: from config)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Field delimiter (default: from config)
    #[arg(short, long)]
    delimiter: Option<char>,
}

pub async fn run(args: ExportArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;
    if let Some(delimiter) = args.delimiter {
        config.export.delimiter = delimiter;
    }

    let mut filter = ExportFilter::new(args.start, args.end)?;
    if let Some(status) = args.status {
        filter = filter.with_status(status);
    }

    let store = super::open_store(args.store.as_ref(), &config);
    let records = store.list()?;

    match &args.output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            let rows = export_csv(&records, &filter, &config.export, writer)?;
            println!(
                "{} Exported {} tickets to {}",
                style("✓").green(),
                rows,
                path.display()
            );
        }
        None => {
            export_csv(&records, &filter, &config.export, io::stdout().lock())?;
        }
    }

    Ok(())
}
