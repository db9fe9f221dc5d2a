//! Ingest command - record tickets from uploaded files in the ticket store.

use std::path::{Component, Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use haul_core::workflow::{FsBlobStore, PlainTextRecognizer};
use haul_core::{IngestOutcome, IngestionPipeline, Upload};

/// Arguments for the ingest command.
#[derive(Args)]
pub struct IngestArgs {
    /// Recognized text dumps, relative to the blob root
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Ticket store file (default: from config)
    #[arg(short, long)]
    store: Option<PathBuf>,

    /// Blob root directory (default: from config)
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Caller id of the uploader
    #[arg(short, long)]
    uploader: Option<String>,
}

pub async fn run(args: IngestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = super::load_config(config_path)?;

    // Inputs are text dumps produced by an external OCR step
    if !config.ingest.accepts("text/plain") {
        config.ingest.accepted_content_types.push("text/".to_string());
    }

    let root = args.root.clone().unwrap_or_else(|| config.ingest.blob_root.clone());
    let store = super::open_store(args.store.as_ref(), &config);
    let blobs = FsBlobStore::new(&root);
    let recognizer = PlainTextRecognizer;

    let pipeline = IngestionPipeline::new(&store, &blobs, &recognizer).with_config(&config);

    let mut processed = 0;
    for file in &args.files {
        let storage_path = storage_path(&root, file)?;
        let mut upload = Upload::new(storage_path.clone(), content_type_for(file));
        if let Some(uploader) = &args.uploader {
            upload = upload.with_uploader(uploader.clone());
        }

        match pipeline.ingest(&upload)? {
            IngestOutcome::Processed { id, status } => {
                processed += 1;
                println!(
                    "{} {} -> ticket {} ({})",
                    style("✓").green(),
                    storage_path,
                    id,
                    status
                );
            }
            IngestOutcome::Duplicate { existing_id } => {
                println!(
                    "{} {} already ingested as ticket {}",
                    style("ℹ").blue(),
                    storage_path,
                    existing_id
                );
            }
            IngestOutcome::Skipped { reason } => {
                println!("{} {} skipped: {}", style("!").yellow(), storage_path, reason);
            }
        }
    }

    info!("Ingested {} of {} files into {}", processed, args.files.len(), store.path().display());

    Ok(())
}

/// Storage path of `file` relative to the blob root, with `/` separators.
fn storage_path(root: &Path, file: &Path) -> anyhow::Result<String> {
    let relative = if file.is_absolute() {
        let root = root.canonicalize()?;
        let file = file.canonicalize()?;
        file.strip_prefix(&root)
            .map_err(|_| {
                anyhow::anyhow!("{} is outside the blob root {}", file.display(), root.display())
            })?
            .to_path_buf()
    } else {
        file.to_path_buf()
    };

    let parts: Vec<String> = relative
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

fn content_type_for(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "txt" | "text" => "text/plain",
        _ => "application/octet-stream",
    }
    .to_string()
}
