//! CLI command implementations.
//!
//! The binary parses arguments and renders responses; everything between
//! lives here so it can be driven directly from tests.

use std::path::{Path, PathBuf};

use tracing::info;

use classindex_core::config::{CliOverrides, ProjectConfig, ResolvedConfig, PROJECT_CONFIG_FILE};
use classindex_core::engine::ClassIndexer;
use classindex_core::error::IndexResult;
use classindex_core::output::{IndexResponse, PathResponse};
use classindex_core::paths::index_path;
use classindex_core::registry::IndexKind;
use classindex_core::store::FsResourceStore;

use crate::manifest::Manifest;

/// Arguments of the `index` command.
#[derive(Debug, Clone, Default)]
pub struct IndexArgs {
    /// Manifest file or directory (relative to the workspace).
    pub manifest: PathBuf,
    /// Explicit project config file; defaults to `classindex.json` in the workspace if present.
    pub config: Option<PathBuf>,
    pub overrides: CliOverrides,
}

/// Run one indexing session described by a manifest.
pub fn run_index(workspace: &Path, args: &IndexArgs) -> IndexResult<IndexResponse> {
    let _span = tracing::info_span!("index", manifest = %args.manifest.display()).entered();

    let project = load_project_config(workspace, args.config.as_deref())?;
    let config = ResolvedConfig::resolve(project.as_ref(), &args.overrides);
    let registry = config.to_registry();
    let annotation_driven = registry.is_annotation_driven();

    let manifest = Manifest::load(&workspace.join(&args.manifest))?;
    let output_dir = workspace.join(&config.output_dir.value);
    info!(
        output = %output_dir.display(),
        types = manifest.declarations.len(),
        rounds = manifest.rounds.len(),
        annotation_driven,
        "starting indexing session"
    );

    let mut indexer = ClassIndexer::new(registry, FsResourceStore::new(&output_dir));
    let last = manifest.rounds.len();
    for (i, round) in manifest.rounds.iter().enumerate() {
        let roots = manifest.roots(round)?;
        indexer.process(&manifest.declarations, roots, i + 1 == last)?;
    }
    let report = match indexer.last_report() {
        Some(report) => report.clone(),
        // No rounds at all: still honor the end-of-processing signal.
        None => indexer.finalize()?,
    };

    info!(indexes = report.indexes.len(), "indexing session finished");
    Ok(IndexResponse::new(
        output_dir.display().to_string(),
        annotation_driven,
        indexer.stats(),
        report,
    ))
}

/// Resolve the resource path for a key.
pub fn run_paths(kind: IndexKind, key: &str) -> PathResponse {
    PathResponse::new(kind, key, index_path(kind, key))
}

fn load_project_config(
    workspace: &Path,
    explicit: Option<&Path>,
) -> IndexResult<Option<ProjectConfig>> {
    match explicit {
        Some(path) => ProjectConfig::load(&workspace.join(path)).map(Some),
        None => {
            let default = workspace.join(PROJECT_CONFIG_FILE);
            if default.is_file() {
                ProjectConfig::load(&default).map(Some)
            } else {
                Ok(None)
            }
        }
    }
}
