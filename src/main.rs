//! metasift — cluster digital-forensic artifacts by shared metadata
//!
//! Subcommands:
//! - `scan`    collect files from the manifest's sources, run exiftool,
//!             write the flattened record table to CSV
//! - `analyze` load a record table and print/export the clustering report
//! - `run`     scan + analyze in one pass

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use metasift::config::CaseConfig;
use metasift::records::RecordStore;
use metasift::services::{
    load_records, render_summary, save_records, write_json, FileScanner, MetadataExtractor,
};

#[derive(Parser)]
#[command(name = "metasift", version, about = "Clusters forensic artifacts by shared metadata")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan manifest sources and write the record table
    Scan {
        /// Case manifest (TOML)
        #[arg(short, long, env = "METASIFT_MANIFEST")]
        manifest: PathBuf,
        /// Output record table (CSV)
        #[arg(short, long, default_value = "records.csv")]
        output: PathBuf,
    },
    /// Analyze a record table
    Analyze {
        /// Input record table (CSV)
        #[arg(short, long, default_value = "records.csv")]
        input: PathBuf,
        /// Also write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Scan and analyze in one pass
    Run {
        /// Case manifest (TOML)
        #[arg(short, long, env = "METASIFT_MANIFEST")]
        manifest: PathBuf,
        /// Keep the intermediate record table at this path
        #[arg(long)]
        records: Option<PathBuf>,
        /// Also write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("metasift {}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Scan { manifest, output } => {
            let config = CaseConfig::load(&manifest)?;
            let store = scan_sources(&config).await?;
            save_records(&output, &store)?;
            println!("Wrote {} records to {}", store.len(), output.display());
        }
        Command::Analyze { input, json } => {
            let (store, issues) = load_records(&input)?;
            for issue in &issues {
                warn!(issue = %issue, "Record table issue");
            }
            report(&store, json.as_deref())?;
        }
        Command::Run {
            manifest,
            records,
            json,
        } => {
            let config = CaseConfig::load(&manifest)?;
            let store = scan_sources(&config).await?;
            if let Some(path) = &records {
                save_records(path, &store)?;
            }
            report(&store, json.as_deref())?;
        }
    }

    Ok(())
}

/// Scan every manifest source and extract metadata into one record store
///
/// A source that cannot be scanned is logged and skipped; the run carries
/// on with the sources that worked.
async fn scan_sources(config: &CaseConfig) -> Result<RecordStore> {
    let mut scanner = FileScanner::new();
    if let Some(extensions) = &config.extensions {
        scanner = scanner.with_extensions(extensions.clone());
    }
    let extractor = match &config.exiftool {
        Some(binary) => MetadataExtractor::with_binary(binary.clone()),
        None => MetadataExtractor::new(),
    };

    let mut raw = Vec::new();
    for source in &config.sources {
        info!(source = %source.id, path = %source.path.display(), "Scanning source");
        let scan = match scanner.scan(&source.id, &source.path) {
            Ok(scan) => scan,
            Err(e) => {
                warn!(source = %source.id, error = %e, "Skipping unscannable source");
                continue;
            }
        };
        let (mut records, errors) = extractor.extract_all(&scan.files).await;
        if !errors.is_empty() {
            warn!(
                source = %source.id,
                failed_files = errors.len(),
                "Some files could not be extracted"
            );
        }
        raw.append(&mut records);
    }

    let (store, rejected) = RecordStore::ingest(raw);
    if !rejected.is_empty() {
        warn!(rejected = rejected.len(), "Rejected malformed records");
    }
    Ok(store)
}

/// Run the pipeline and emit the console summary (plus optional JSON)
fn report(store: &RecordStore, json: Option<&std::path::Path>) -> Result<()> {
    let report = metasift::analyze(store);
    print!("{}", render_summary(&report));
    if let Some(path) = json {
        write_json(path, &report)?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}
