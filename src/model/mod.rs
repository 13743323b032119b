mod edge;
mod layer;
mod module;
mod violation;

pub use edge::{EdgeTarget, ImportEdge, ImportKind};
pub use layer::{CouplingLimits, DependencyOrder, Layer, glob_match};
pub use module::{ExportSet, Language, Module, ModuleId};
pub use violation::{Severity, Violation, ViolationKind, ViolationReport};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Serializable summary of a built graph, consumed by external renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphView {
    pub modules: Vec<ModuleView>,
    pub edges: Vec<EdgeView>,
    pub cycle_groups: Vec<Vec<PathBuf>>,
    pub truncated_files: bool,
    pub truncated_depth: bool,
    pub truncated_by_timeout: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleView {
    pub path: PathBuf,
    pub language: Language,
    /// Layer the module classified into, when a layer set was supplied.
    pub layer: Option<String>,
    pub parse_failed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeView {
    pub source: PathBuf,
    pub target: Option<PathBuf>,
    /// Raw module reference, for edges that never resolved.
    pub unresolved_reference: Option<String>,
    pub symbol: String,
    pub alias: Option<String>,
    pub kind: ImportKind,
    pub confidence: f64,
    pub resolved: bool,
    pub via: Vec<PathBuf>,
}

impl EdgeView {
    pub(crate) fn from_edge(edge: &ImportEdge, modules: &[Module]) -> Self {
        let (target, unresolved_reference) = match &edge.target {
            EdgeTarget::Module(id) => (Some(modules[id.0].path.clone()), None),
            EdgeTarget::Unresolved(reference) => (None, Some(reference.clone())),
        };

        Self {
            source: modules[edge.source.0].path.clone(),
            target,
            unresolved_reference,
            symbol: edge.symbol.clone(),
            alias: edge.alias.clone(),
            kind: edge.kind,
            confidence: edge.confidence,
            resolved: edge.resolved,
            via: edge.via.clone(),
        }
    }
}

impl GraphView {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
