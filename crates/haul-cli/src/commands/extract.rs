//! Extract command - pull ticket fields from one recognized text file.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use haul_core::models::ticket::ExtractedFields;
use haul_core::{ExtractionResult, TicketFieldExtractor, TicketParser};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Recognized text file ("-" reads stdin)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Show which rule produced each field
    #[arg(long)]
    explain: bool,

    /// Do not fall back to an all-digit line for the ticket number
    #[arg(long)]
    no_line_fallback: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// JSON shape of an extraction.
#[derive(Serialize)]
struct ExtractOutput<'a> {
    #[serde(flatten)]
    fields: &'a ExtractedFields,
    needs_fix: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let text = read_input(&args.input)?;
    info!("Extracting fields from {} characters of text", text.len());

    let extractor = TicketFieldExtractor::from_config(&config.extraction)
        .with_ticket_line_fallback(config.extraction.ticket_line_fallback && !args.no_line_fallback);
    let result = extractor.parse(&text);

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.explain {
        print_explanation(&result);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn read_input(input: &Path) -> anyhow::Result<String> {
    if input.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    Ok(fs::read_to_string(input)?)
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(&ExtractOutput {
            fields: &result.fields,
            needs_fix: result.needs_fix,
            warnings: result.warnings.clone(),
        })?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let fields = &result.fields;

    wtr.write_record([
        "ticket_number",
        "weight_tons",
        "truck_number",
        "driver_actual",
        "driver_badge",
        "debris_type",
        "needs_fix",
    ])?;

    let weight = fields.weight_tons.map(|w| w.to_string()).unwrap_or_default();
    let needs_fix = result.needs_fix.to_string();
    wtr.write_record([
        fields.ticket_number.as_deref().unwrap_or(""),
        weight.as_str(),
        fields.truck_number.as_deref().unwrap_or(""),
        fields.driver_actual.as_deref().unwrap_or(""),
        fields.driver_badge.as_deref().unwrap_or(""),
        fields.debris_type.as_deref().unwrap_or(""),
        needs_fix.as_str(),
    ])?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(result: &ExtractionResult) -> String {
    let fields = &result.fields;
    let or_dash = |v: Option<&str>| v.unwrap_or("-").to_string();
    let mut output = String::new();

    output.push_str(&format!("Ticket:  {}\n", or_dash(fields.ticket_number.as_deref())));
    output.push_str(&format!(
        "Weight:  {}\n",
        fields
            .weight_tons
            .map(|w| format!("{} t", w))
            .unwrap_or_else(|| "-".to_string())
    ));
    output.push_str(&format!("Truck:   {}\n", or_dash(fields.truck_number.as_deref())));
    output.push_str(&format!("Driver:  {}\n", or_dash(fields.driver_actual.as_deref())));
    output.push_str(&format!("Badge:   {}\n", or_dash(fields.driver_badge.as_deref())));
    output.push_str(&format!("Debris:  {}\n", or_dash(fields.debris_type.as_deref())));
    output.push('\n');

    if result.needs_fix {
        output.push_str("Status:  needs fix\n");
        for warning in &result.warnings {
            output.push_str(&format!("  - {}\n", warning));
        }
    } else {
        output.push_str("Status:  complete\n");
    }

    output
}

fn print_explanation(result: &ExtractionResult) {
    eprintln!();
    eprintln!("{}", style("Matched rules:").bold());
    if result.matches.is_empty() {
        eprintln!("  (none)");
    }
    for m in &result.matches {
        eprintln!(
            "  {:<14} {:<20} {} {:?} ({:.0}%)",
            m.field.as_str(),
            m.value,
            style(m.rule).cyan(),
            m.source,
            m.confidence * 100.0
        );
    }
}
