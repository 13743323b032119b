use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::ModuleId;

/// How an import binding was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImportKind {
    Direct,
    Aliased,
    Wildcard,
    ReExport,
}

/// Resolution target of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeTarget {
    Module(ModuleId),
    /// Target never resolved; the edge is retained so the graph stays a
    /// complete record of intent, not just of successful resolution.
    Unresolved(String),
}

/// One resolved (or deliberately unresolved) import binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportEdge {
    pub source: ModuleId,
    pub target: EdgeTarget,
    /// Symbol name as requested by the importing module.
    pub symbol: String,
    /// Local alias, when the import binds one.
    pub alias: Option<String>,
    pub kind: ImportKind,
    /// In (0, 1] for resolved edges, exactly 0 for unresolved ones.
    /// Decays geometrically with each alias/re-export/wildcard hop.
    pub confidence: f64,
    pub resolved: bool,
    /// Intermediate aggregator files crossed while chasing a re-export
    /// chain, kept for diagnostics.
    pub via: Vec<PathBuf>,
}

impl ImportEdge {
    pub fn resolved(
        source: ModuleId,
        target: ModuleId,
        symbol: impl Into<String>,
        alias: Option<String>,
        kind: ImportKind,
        confidence: f64,
        via: Vec<PathBuf>,
    ) -> Self {
        Self {
            source,
            target: EdgeTarget::Module(target),
            symbol: symbol.into(),
            alias,
            kind,
            confidence,
            resolved: true,
            via,
        }
    }

    pub fn unresolved(
        source: ModuleId,
        reference: impl Into<String>,
        symbol: impl Into<String>,
        alias: Option<String>,
        kind: ImportKind,
    ) -> Self {
        Self {
            source,
            target: EdgeTarget::Unresolved(reference.into()),
            symbol: symbol.into(),
            alias,
            kind,
            confidence: 0.0,
            resolved: false,
            via: Vec::new(),
        }
    }

    pub fn target_module(&self) -> Option<ModuleId> {
        match self.target {
            EdgeTarget::Module(id) => Some(id),
            EdgeTarget::Unresolved(_) => None,
        }
    }

    /// Name this edge binds in the importing module.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.symbol)
    }
}
