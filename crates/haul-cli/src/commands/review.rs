//! Review command - manager review of stored tickets.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Subcommand};
use console::style;
use rust_decimal::Decimal;

use haul_core::ticket::rules::parse_weight;
use haul_core::{
    ExtractedFields, ReviewService, TicketQuery, TicketRecord, TicketStats, TicketStatus,
    TicketStore,
};

/// Arguments for the review command.
#[derive(Args)]
pub struct ReviewArgs {
    /// Ticket store file (default: from config)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    /// Caller id of the reviewing manager
    #[arg(short, long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: ReviewCommand,
}

#[derive(Subcommand)]
enum ReviewCommand {
    /// List stored tickets
    List(ListArgs),

    /// Dashboard counts: pending, fix needed, approved
    Summary,

    /// Show one ticket as JSON
    Show {
        /// Ticket id
        id: String,
    },

    /// Correct fields of a ticket and send it back for approval
    Fix {
        /// Ticket id
        id: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Approve a ticket
    Approve {
        /// Ticket id
        id: String,
    },

    /// Reject a ticket
    Reject {
        /// Ticket id
        id: String,
    },

    /// Enter a ticket by hand
    Manual {
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Permanently delete a ticket
    Discard {
        /// Ticket id
        id: String,
    },
}

#[derive(Args)]
struct ListArgs {
    /// Only tickets in this status
    #[arg(long)]
    status: Option<TicketStatus>,

    /// Only tickets uploaded by this caller id
    #[arg(long)]
    uploader: Option<String>,

    /// Only tickets flagged for a manual fix
    #[arg(long)]
    fix_needed: bool,

    /// Newest tickets first
    #[arg(long)]
    newest_first: bool,

    /// Show at most this many tickets
    #[arg(long)]
    limit: Option<usize>,

    /// Uploader history: newest first, at most 50 (same as --uploader ID --newest-first --limit 50)
    #[arg(long, value_name = "UPLOADER", conflicts_with_all = ["uploader", "newest_first"])]
    history: Option<String>,
}

impl ListArgs {
    fn into_query(self) -> TicketQuery {
        let mut query = match self.history {
            Some(uploader) => TicketQuery::history(uploader),
            None => TicketQuery::new(),
        };
        if let Some(status) = self.status {
            query = query.with_status(status);
        }
        if let Some(uploader) = self.uploader {
            query = query.with_uploader(uploader);
        }
        if self.fix_needed {
            query = query.with_fix_needed(true);
        }
        if self.newest_first {
            query = query.newest_first();
        }
        if let Some(limit) = self.limit {
            query = query.with_limit(limit);
        }
        query
    }
}

/// Field values given on the command line.
#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    ticket_number: Option<String>,

    /// Weight in tons
    #[arg(long, value_parser = parse_weight_arg)]
    weight: Option<Decimal>,

    #[arg(long)]
    truck: Option<String>,

    #[arg(long)]
    driver: Option<String>,

    #[arg(long)]
    badge: Option<String>,

    #[arg(long)]
    debris: Option<String>,
}

impl FieldArgs {
    fn into_fields(self) -> ExtractedFields {
        ExtractedFields {
            ticket_number: self.ticket_number,
            weight_tons: self.weight,
            truck_number: self.truck,
            driver_actual: self.driver,
            driver_badge: self.badge,
            debris_type: self.debris,
        }
    }
}

fn parse_weight_arg(s: &str) -> Result<Decimal, String> {
    parse_weight(s).ok_or_else(|| format!("invalid weight: {}", s))
}

pub async fn run(args: ReviewArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = super::open_store(args.store.as_ref(), &config);
    let service = ReviewService::new(&store);
    let caller = args.user.as_deref();

    match args.command {
        ReviewCommand::List(list) => {
            let records = list.into_query().apply(store.list()?);
            print_list(&records);
        }
        ReviewCommand::Summary => {
            let stats = TicketStats::collect(&store.list()?, Utc::now().date_naive());
            print_summary(&stats);
        }
        ReviewCommand::Show { id } => {
            let record = store
                .get(&id)?
                .with_context(|| format!("ticket not found: {}", id))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        ReviewCommand::Fix { id, fields } => {
            let record = service.submit_fix(caller, &id, &fields.into_fields())?;
            report("Fixed", &record);
        }
        ReviewCommand::Approve { id } => {
            let record = service.approve(caller, &id)?;
            report("Approved", &record);
        }
        ReviewCommand::Reject { id } => {
            let record = service.reject(caller, &id)?;
            report("Rejected", &record);
        }
        ReviewCommand::Manual { fields } => {
            let record = service.create_manual(caller, fields.into_fields())?;
            report("Created", &record);
        }
        ReviewCommand::Discard { id } => {
            service.discard(caller, &id)?;
            println!("{} Discarded ticket {}", style("✓").green(), id);
        }
    }

    Ok(())
}

fn report(verb: &str, record: &TicketRecord) {
    println!(
        "{} {} ticket {} ({})",
        style("✓").green(),
        verb,
        record.id,
        record.status
    );
    if record.fix_needed {
        let missing: Vec<_> = record
            .fields
            .missing_required()
            .iter()
            .map(|f| f.label())
            .collect();
        println!("  {} missing: {}", style("!").yellow(), missing.join(", "));
    }
}

fn print_summary(stats: &TicketStats) {
    println!("Pending:         {}", style(stats.pending).yellow());
    println!("Fix needed:      {}", style(stats.fix_needed).red());
    println!("Approved today:  {}", style(stats.approved_today).green());
    println!("Approved total:  {}", stats.approved);
    println!("All tickets:     {}", stats.total);
}

fn print_list(records: &[TicketRecord]) {
    if records.is_empty() {
        println!("No tickets.");
        return;
    }

    println!(
        "{:<32}  {:<14}  {:<12}  {:>10}  {:<20}  {}",
        "ID", "STATUS", "TICKET", "WEIGHT", "DRIVER", "CREATED"
    );
    for record in records {
        let fields = &record.fields;
        println!(
            "{:<32}  {:<14}  {:<12}  {:>10}  {:<20}  {}",
            record.id,
            record.status.as_str(),
            fields.ticket_number.as_deref().unwrap_or("-"),
            fields
                .weight_tons
                .map(|w| w.to_string())
                .unwrap_or_else(|| "-".to_string()),
            fields.driver_actual.as_deref().unwrap_or("-"),
            record.created_at.format("%Y-%m-%d %H:%M")
        );
    }
}
