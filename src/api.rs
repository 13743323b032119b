//! Library API for depmap.
//!
//! The engine consumes per-file facts produced by external language
//! adapters and returns derived views of one immutable dependency graph
//! per analysis run. Nothing here aborts an analysis: parse failures
//! become stub modules, unresolved imports become flagged edges, a bad
//! layer config falls back to the built-in scheme, and an expired
//! deadline returns whatever was computed with a truncation flag.
//!
//! # Example
//!
//! ```
//! use depmap::adapter::{FactsEntry, FileFacts, ImportedSymbol, RawImport};
//! use depmap::model::Language;
//! use depmap::{AnalyzeOptions, analyze};
//!
//! let entries = vec![
//!     FactsEntry::new("app.py", Language::Python, FileFacts {
//!         imports: vec![RawImport::symbols("lib", vec![ImportedSymbol::plain("helper")])],
//!         ..Default::default()
//!     }),
//!     FactsEntry::new("lib.py", Language::Python, FileFacts {
//!         definitions: vec!["helper".to_string()],
//!         ..Default::default()
//!     }),
//! ];
//!
//! let graph = analyze(entries, &AnalyzeOptions::default());
//! assert_eq!(graph.module_count(), 2);
//! assert_eq!(graph.edges().len(), 1);
//! ```

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::adapter::FactsEntry;
use crate::analysis::{self, Neighborhood, NeighborhoodParams, TaintFlow};
use crate::config::{ConfigError, LayerConfig};
use crate::graph::{DependencyGraph, GraphBuilder};
use crate::index::ModuleIndex;
use crate::limits::{Deadline, Limits};
use crate::model::ViolationReport;
use crate::resolve::Resolver;

/// Errors that can occur during depmap operations.
#[derive(Debug, Error)]
pub enum DepmapError {
    /// The requested module is not in the graph.
    #[error("Module not in graph: {0}")]
    UnknownModule(PathBuf),

    /// Layer configuration error, from the strict loading path.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Options for the `analyze` function.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub limits: Limits,
    pub deadline: Deadline,
    /// Analysis entry point for the `max_depth` cap. Defaults to the
    /// first indexed file.
    pub entry: Option<PathBuf>,
}

/// Build the dependency graph for a set of files.
///
/// Fact extraction is the adapter's job; resolution fans out across a
/// worker pool and merges through a single writer, so reruns over an
/// unchanged file set produce identical graphs. An empty entry list
/// returns an explicit empty graph, not an error.
pub fn analyze(entries: Vec<FactsEntry>, options: &AnalyzeOptions) -> DependencyGraph {
    let index = ModuleIndex::build(entries, &options.limits);

    let batches: Vec<Vec<crate::model::ImportEdge>> = {
        let resolver = Resolver::new(&index, &options.limits, options.deadline);
        index
            .modules()
            .par_iter()
            .map(|module| resolver.resolve_module(module))
            .collect()
    };

    let entry = options
        .entry
        .as_deref()
        .and_then(|path| index.lookup_path(path));

    let mut builder = GraphBuilder::new(index);
    for batch in batches {
        builder.merge(batch);
    }

    let graph = builder.finish(&options.limits, options.deadline, entry);
    debug!(
        modules = graph.module_count(),
        edges = graph.edges().len(),
        "analysis complete"
    );
    graph
}

/// Extract the bounded k-hop neighborhood around a module.
pub fn neighborhood(
    graph: &DependencyGraph,
    center: &Path,
    params: &NeighborhoodParams,
) -> Result<Neighborhood, DepmapError> {
    let id = graph
        .module_id(center)
        .ok_or_else(|| DepmapError::UnknownModule(center.to_path_buf()))?;
    Ok(analysis::extract_neighborhood(graph, id, params))
}

/// Check every architectural rule against a finished graph.
pub fn check_rules(
    graph: &DependencyGraph,
    config: &LayerConfig,
    deadline: Deadline,
) -> ViolationReport {
    analysis::check_rules(graph, config, deadline)
}

/// Propagate taint labels across resolved import edges.
pub fn taint_flows(graph: &DependencyGraph, limits: &Limits, deadline: Deadline) -> Vec<TaintFlow> {
    analysis::propagate_taint(graph, limits.taint_threshold, deadline)
}

/// Load layer configuration, falling back to the built-in scheme when no
/// path is given or the file is missing or malformed.
pub fn load_layers(path: Option<&Path>) -> LayerConfig {
    match path {
        Some(path) => LayerConfig::load(path),
        None => LayerConfig::builtin(),
    }
}
