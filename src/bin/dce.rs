//! `dce` CLI: the command-line surface for the document canonicalization
//! engine. Three subcommand groups — `canonicalize` (run the
//! batch pipeline over a directory), `query` (read-only index access),
//! and `init` (idempotently create an empty store) — each a thin
//! wrapper over the `dce` library crate.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use dce::config::EngineConfig;
use dce::index::{SourceAuthority, SourceFormat, Store};
use dce::{BatchContext, CancellationToken, IngestConfigs, PipelineConfig, ProgressEvent};
use query::ExportFormat;

#[derive(Parser, Debug)]
#[command(name = "dce", author, version, about = "Document canonicalization and deduplication engine", long_about = None)]
struct Cli {
    /// Path to a YAML configuration file. Falls back to
    /// built-in defaults, then `DCE_*` environment overrides, when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Path to the index store file (overrides the config's `store.path`).
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Batch-ingest a source directory into the index.
    Canonicalize {
        #[arg(long)]
        source_dir: PathBuf,
        #[arg(long)]
        source_name: String,
        #[arg(long)]
        collection: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long, value_enum)]
        format: Option<CliFormat>,
        #[arg(long)]
        batch_size: Option<usize>,
        #[arg(long)]
        workers: Option<usize>,
        /// Root directory for canonical `.md` output artifacts.
        /// Omit to skip artifact writing; the index store is always
        /// updated regardless.
        #[arg(long)]
        artifacts_dir: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        skip_duplicates: bool,
        #[arg(long, value_enum, default_value_t = CliAuthority::Archive)]
        authority: CliAuthority,
        #[arg(long, default_value_t = 1.0)]
        quality_score: f64,
        /// Write the run's `Report` as JSON to this path as well as stdout.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Read-only queries over the index.
    Query {
        #[command(subcommand)]
        query: QueryCommand,
    },

    /// Create an empty store at the configured path. Idempotent: running
    /// `init` against an existing store is a no-op.
    Init,
}

#[derive(Subcommand, Debug)]
enum QueryCommand {
    /// Aggregate counts over the whole index.
    Stats,
    /// The `n` most recently updated canonicals.
    Recent { n: usize },
    /// Canonicals with two or more attached sources.
    Duplicates,
    /// Every source attached to one canonical.
    Sources { canonical_id: String },
    /// Canonical counts by OCR-quality band.
    Quality,
    /// Case-insensitive substring search over title/subject.
    Search { query: String },
    /// Dump every canonical to disk as JSON or CSV.
    Export {
        #[arg(value_enum)]
        format: CliExportFormat,
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    Pdf,
    Txt,
    Markdown,
    Docx,
    Other,
}

impl From<CliFormat> for SourceFormat {
    fn from(f: CliFormat) -> Self {
        match f {
            CliFormat::Pdf => SourceFormat::Pdf,
            CliFormat::Txt => SourceFormat::Txt,
            CliFormat::Markdown => SourceFormat::Markdown,
            CliFormat::Docx => SourceFormat::Docx,
            CliFormat::Other => SourceFormat::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAuthority {
    CourtRecord,
    GovernmentFoia,
    OfficialRelease,
    Media,
    Archive,
    Other,
}

impl From<CliAuthority> for SourceAuthority {
    fn from(a: CliAuthority) -> Self {
        match a {
            CliAuthority::CourtRecord => SourceAuthority::CourtRecord,
            CliAuthority::GovernmentFoia => SourceAuthority::GovernmentFoia,
            CliAuthority::OfficialRelease => SourceAuthority::OfficialRelease,
            CliAuthority::Media => SourceAuthority::Media,
            CliAuthority::Archive => SourceAuthority::Archive,
            CliAuthority::Other => SourceAuthority::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliExportFormat {
    Json,
    Csv,
}

impl From<CliExportFormat> for ExportFormat {
    fn from(f: CliExportFormat) -> Self {
        match f {
            CliExportFormat::Json => ExportFormat::Json,
            CliExportFormat::Csv => ExportFormat::Csv,
        }
    }
}

/// Exit codes: `0` success, `1` bad args, `2` runtime failure, `3` partial
/// failure (some files logged as errors).
const EXIT_OK: u8 = 0;
const EXIT_BAD_ARGS: u8 = 1;
const EXIT_RUNTIME: u8 = 2;
const EXIT_PARTIAL: u8 = 3;

fn main() -> ExitCode {
    dce::init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{} {err:?}", "error:".red().bold());
            ExitCode::from(EXIT_RUNTIME)
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let engine_config = load_engine_config(cli.config.as_deref())?;
    let store_path = cli
        .store
        .clone()
        .unwrap_or_else(|| engine_config.store.path.clone());

    match cli.command {
        Command::Init => {
            if store_path.exists() {
                println!(
                    "{} store already exists at {}",
                    "ok:".green().bold(),
                    store_path.display()
                );
            } else {
                if let Some(parent) = store_path.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                let _ = Store::open(&store_path)
                    .with_context(|| format!("creating store at {}", store_path.display()))?;
                println!(
                    "{} created empty store at {}",
                    "ok:".green().bold(),
                    store_path.display()
                );
            }
            Ok(EXIT_OK)
        }

        Command::Canonicalize {
            source_dir,
            source_name,
            collection,
            url,
            format,
            batch_size,
            workers,
            artifacts_dir,
            skip_duplicates,
            authority,
            quality_score,
            report,
        } => {
            if !source_dir.is_dir() {
                eprintln!(
                    "{} --source-dir {} is not a directory",
                    "error:".red().bold(),
                    source_dir.display()
                );
                return Ok(EXIT_BAD_ARGS);
            }
            if !(0.0..=1.0).contains(&quality_score) {
                eprintln!(
                    "{} --quality-score must be in [0.0, 1.0]",
                    "error:".red().bold()
                );
                return Ok(EXIT_BAD_ARGS);
            }

            let store = Store::open(&store_path)
                .with_context(|| format!("opening store at {}", store_path.display()))?;

            let mut pipeline_cfg = engine_config.pipeline.clone();
            if let Some(n) = batch_size {
                pipeline_cfg.batch_size = n;
            }
            if let Some(n) = workers {
                pipeline_cfg.workers = n;
            }
            if let Some(dir) = artifacts_dir {
                pipeline_cfg.artifacts_dir = Some(dir);
            }
            pipeline_cfg.skip_fuzzy = skip_duplicates;

            let mut dedup_cfg = engine_config.dedup.clone();
            dedup_cfg.skip_fuzzy = skip_duplicates;

            let ingest_cfg = IngestConfigs {
                canonical: engine_config.canonical.clone(),
                quality: engine_config.quality.clone(),
                dedup: dedup_cfg,
                selector: engine_config.selector.clone(),
            };

            let batch = BatchContext {
                source_name,
                source_url: url,
                collection,
                authority: SourceAuthority::from(authority),
                quality_score,
                format_override: format.map(SourceFormat::from),
            };

            let cancel = CancellationToken::new();
            let ctrlc_handle = cancel.clone();
            // Ctrl-C requests a graceful stop: finish the in-flight file,
            // commit what's decided so far, exit 2. If the handler can't be
            // installed the run still completes normally, just without a
            // way to cancel it early.
            let _ = ctrlc::set_handler(move || {
                eprintln!("\n{} Ctrl-C received, finishing the current file and stopping...", "dce:".yellow().bold());
                ctrlc_handle.cancel();
            });

            let report_value = dce::run_ingest(
                &store,
                &source_dir,
                &batch,
                &pipeline_cfg,
                &ingest_cfg,
                &cancel,
                print_progress,
            )
            .context("ingest run failed")?;

            println!();
            print_report(&report_value);

            if let Some(path) = report {
                write_report_json(&path, &report_value)?;
            }

            Ok(u8::try_from(report_value.exit_code()).unwrap_or(EXIT_RUNTIME))
        }

        Command::Query { query } => run_query(&store_path, query),
    }
}

fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let mut config = match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    apply_env_overrides(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Apply `DCE_*` environment overrides mirroring the YAML keys.
/// Only the handful of knobs an operator is likely to flip per-run without
/// editing a file are covered; anything more structural belongs in YAML.
fn apply_env_overrides(config: &mut EngineConfig) {
    if let Ok(path) = std::env::var("DCE_STORE_PATH") {
        config.store.path = PathBuf::from(path);
    }
    if let Ok(v) = std::env::var("DCE_PIPELINE_BATCH_SIZE") {
        if let Ok(n) = v.parse() {
            config.pipeline.batch_size = n;
        }
    }
    if let Ok(v) = std::env::var("DCE_PIPELINE_WORKERS") {
        if let Ok(n) = v.parse() {
            config.pipeline.workers = n;
        }
    }
    if let Ok(v) = std::env::var("DCE_DEDUP_FUZZY_THRESHOLD") {
        if let Ok(n) = v.parse() {
            config.dedup.fuzzy_threshold = n;
        }
    }
    if let Ok(v) = std::env::var("DCE_DEDUP_SKIP_FUZZY") {
        if let Ok(b) = v.parse() {
            config.dedup.skip_fuzzy = b;
        }
    }
    if let Ok(v) = std::env::var("DCE_PIPELINE_MIN_OCR_QUALITY") {
        if let Ok(n) = v.parse() {
            config.pipeline.min_ocr_quality = n;
        }
    }
}

fn print_progress(event: ProgressEvent) {
    eprintln!(
        "{} {}/{} processed ({} dup, {} err) — {:.1} files/s",
        "progress:".cyan(),
        event.processed,
        event.total,
        event.duplicates,
        event.errors,
        event.throughput_per_sec,
    );
}

fn print_report(report: &pipeline::Report) {
    println!("{}", "Run summary".bold());
    println!("{}", "-".repeat(40));
    println!("status:              {:?}", report.status);
    println!("total files:         {}", report.total_files);
    println!("already indexed:     {}", report.already_indexed);
    println!("new canonicals:      {}", report.new_canonicals);
    println!("attached duplicates: {}", report.attached_as_duplicate);
    println!("partial overlaps:    {}", report.partial_overlaps_recorded);
    println!("low quality sources: {}", report.low_quality_sources);
    println!("errors:              {}", report.errors.len());
    if !report.errors.is_empty() {
        println!();
        println!("{}", "first errors:".yellow());
        for err in report.errors.iter().take(5) {
            println!("  {} [{:?}] {}", err.file_path.display(), err.kind, err.message);
        }
    }
    println!();
    println!("duration: {}ms", report.duration().num_milliseconds());
}

fn write_report_json(path: &Path, report: &pipeline::Report) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating report file {}", path.display()))?;
    serde_json::to_writer_pretty(file, report).context("writing report JSON")
}

fn run_query(store_path: &Path, query: QueryCommand) -> Result<u8> {
    if !store_path.exists() {
        eprintln!(
            "{} no store found at {}; run `dce init` first",
            "error:".red().bold(),
            store_path.display()
        );
        return Ok(EXIT_BAD_ARGS);
    }
    let store = Store::open(store_path)
        .with_context(|| format!("opening store at {}", store_path.display()))?;

    match query {
        QueryCommand::Stats => {
            let stats = query::stats(&store)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        QueryCommand::Recent { n } => {
            let docs = query::recent(&store, n)?;
            println!("{}", serde_json::to_string_pretty(&docs)?);
        }
        QueryCommand::Duplicates => {
            let groups = query::duplicates(&store)?;
            println!("{}", serde_json::to_string_pretty(&groups)?);
        }
        QueryCommand::Sources { canonical_id } => {
            let sources = query::sources(&store, &canonical_id)?;
            println!("{}", serde_json::to_string_pretty(&sources)?);
        }
        QueryCommand::Quality => {
            let bands = query::quality_bands(&store)?;
            println!("{}", serde_json::to_string_pretty(&bands)?);
        }
        QueryCommand::Search { query: needle } => {
            let docs = query::search(&store, &needle)?;
            println!("{}", serde_json::to_string_pretty(&docs)?);
        }
        QueryCommand::Export { format, path } => {
            let count = query::export(&store, ExportFormat::from(format), &path)?;
            println!(
                "{} wrote {} canonicals to {}",
                "ok:".green().bold(),
                count,
                path.display()
            );
        }
    }
    Ok(EXIT_OK)
}
