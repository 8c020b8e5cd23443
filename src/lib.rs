//! Umbrella crate for the document canonicalization and deduplication
//! engine (DCE). It re-exports the hasher, metadata, quality, dedup,
//! selector, index, artifact, pipeline, and query layers so applications
//! and the `dce` CLI binary can drive the full engine through a single
//! dependency, and provides the top-level [`EngineConfig`] (see
//! [`config`]) that ties every component's configuration together.
//!
//! ## Quick start
//!
//! ```ignore
//! use dce::{BatchContext, IngestConfigs, PipelineConfig};
//! use dce::index::{SourceAuthority, Store};
//!
//! # fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::open("./data/index.redb")?;
//! let batch = BatchContext {
//!     source_name: "foia-batch-7".into(),
//!     source_url: None,
//!     collection: "county-records".into(),
//!     authority: SourceAuthority::GovernmentFoia,
//!     quality_score: 0.9,
//!     format_override: None,
//! };
//!
//! let report = dce::run_ingest(
//!     &store,
//!     std::path::Path::new("./incoming"),
//!     &batch,
//!     &PipelineConfig::default(),
//!     &IngestConfigs::default(),
//!     &dce::CancellationToken::default(),
//!     |event| eprintln!("{} / {} processed", event.processed, event.total),
//! )?;
//!
//! println!("new canonicals: {}", report.new_canonicals);
//! # Ok(())
//! # }
//! ```
//!
//! ## Observability
//!
//! Every stage of [`run_ingest`] emits structured [`tracing`] events
//! (`tracing::info!`/`debug!`/`warn!` in the `pipeline` crate); installing a
//! subscriber with [`init_tracing`] is enough to see them. This engine has
//! no per-call metrics-hook registry the way a request/response service
//! would: a batch run emits one [`Report`] and a cadence-gated stream of
//! [`ProgressEvent`]s, both of which already carry every counter an
//! operator needs, so there is nothing a global recorder would add.

use std::path::Path;

pub use pipeline::{
    BatchContext, CancellationToken, CommitOutcome, FileError, FileErrorKind, IngestConfigs,
    PipelineConfig, PipelineError, ProgressEvent, ProgressTracker, Report, RunStatus,
};

pub mod config;

pub use artifact;
pub use canonical;
pub use dedup;
pub use hasher;
pub use index;
pub use metadata;
pub use quality;
pub use query;
pub use selector;

pub use canonical::{CanonicalError, CanonicalizeConfig, CanonicalizedDocument};
pub use dedup::{Classification, DedupConfig, DedupError, DedupOutcome, IncomingDocument};
pub use index::{CanonicalDocument, CanonicalId, IndexError, Store};
pub use quality::{Completeness, QualityAssessment, QualityConfig};
pub use selector::{SelectorConfig, SelectorError};

pub use config::EngineConfig;

/// Install a `tracing` subscriber driven by `RUST_LOG` (or `info` if
/// unset). Call this once at process startup; the library itself never
/// installs a subscriber on its own.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// Process every file under `root` through the full engine pipeline —
/// hash, extract metadata, assess quality, deduplicate against `store`,
/// reselect the primary source when an attach changes it, and commit —
/// emitting a cadence-gated [`ProgressEvent`] as the batch runs.
///
/// This is a thin pass-through to [`pipeline::process_directory`]; it
/// exists so callers depend on one crate (`dce`) instead of threading
/// through `pipeline`, `index`, and the engine config types themselves.
/// Pass [`CancellationToken::default`] for a run that always finishes on
/// its own.
pub fn run_ingest(
    store: &Store,
    root: &Path,
    batch: &BatchContext,
    cfg: &PipelineConfig,
    ingest_cfg: &IngestConfigs,
    cancel: &CancellationToken,
    on_progress: impl FnMut(ProgressEvent),
) -> Result<Report, PipelineError> {
    pipeline::process_directory(store, root, batch, cfg, ingest_cfg, cancel, on_progress)
}
