//! Contract with the per-language fact extractors.
//!
//! Parsing source into import/export facts is the job of external language
//! adapters; this engine only consumes their output. `FactsEntry` is the
//! unit of exchange: one file's facts, or the reason none could be produced.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::Language;

#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    /// The adapter could not produce facts for the file (e.g. syntax error).
    /// The module is still indexed as an empty-facts stub.
    #[error("no facts available for {}: {reason}", path.display())]
    ParseUnavailable { path: PathBuf, reason: String },
}

/// One symbol named by an import, with its optional local alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedSymbol {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportedSymbol {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// Name this symbol is bound to in the importing module.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A raw import statement, as written in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawImport {
    /// Module reference as written: `pkg.core`, `.sibling`, `./util`.
    pub module: String,
    /// Symbols named by the import; empty means the module itself is bound.
    pub symbols: Vec<ImportedSymbol>,
    /// Local alias for a whole-module import (`import numpy as np`).
    pub alias: Option<String>,
    /// `from x import *`.
    pub wildcard: bool,
}

impl RawImport {
    /// `import module` / `import module as alias`.
    pub fn module_binding(module: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            module: module.into(),
            symbols: Vec::new(),
            alias,
            wildcard: false,
        }
    }

    /// `from module import a, b as c`.
    pub fn symbols(module: impl Into<String>, symbols: Vec<ImportedSymbol>) -> Self {
        Self {
            module: module.into(),
            symbols,
            alias: None,
            wildcard: false,
        }
    }

    /// `from module import *`.
    pub fn wildcard(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            symbols: Vec::new(),
            alias: None,
            wildcard: true,
        }
    }
}

/// Local flow from a (possibly imported) symbol into a named sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkFlow {
    /// Local name of the symbol reaching the sink.
    pub symbol: String,
    /// Sink identifier the adapter matched (e.g. `sql_query`).
    pub sink: String,
}

/// Per-file taint markers supplied by the language adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaintFacts {
    /// Locally defined symbols matching a taint-source pattern.
    pub sources: Vec<String>,
    /// Local flows from a symbol into a sink.
    pub sink_flows: Vec<SinkFlow>,
}

/// Everything the engine needs to know about one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFacts {
    pub imports: Vec<RawImport>,
    /// Explicit export list (`__all__`, `export { .. }`), if the file has one.
    pub export_list: Option<Vec<String>>,
    /// Top-level definitions.
    pub definitions: Vec<String>,
    #[serde(default)]
    pub taint: TaintFacts,
}

/// One file's worth of adapter output, ready for indexing.
#[derive(Debug, Clone)]
pub struct FactsEntry {
    pub path: PathBuf,
    pub language: Language,
    pub facts: Result<FileFacts, AdapterError>,
}

impl FactsEntry {
    pub fn new(path: impl Into<PathBuf>, language: Language, facts: FileFacts) -> Self {
        Self {
            path: path.into(),
            language,
            facts: Ok(facts),
        }
    }

    /// Entry for a file the adapter could not parse.
    pub fn unavailable(
        path: impl Into<PathBuf>,
        language: Language,
        reason: impl Into<String>,
    ) -> Self {
        let path = path.into();
        Self {
            facts: Err(AdapterError::ParseUnavailable {
                path: path.clone(),
                reason: reason.into(),
            }),
            path,
            language,
        }
    }
}

/// Implemented by external language adapters.
///
/// The engine never calls `extract` itself; the trait exists so adapters and
/// the engine agree on one contract for producing `FactsEntry` streams.
pub trait FactSource: Send + Sync {
    /// File extensions this adapter handles.
    fn extensions(&self) -> &[&str];

    fn extract(&self, path: &Path, source: &str) -> Result<FileFacts, AdapterError>;

    fn entry(&self, path: &Path, language: Language, source: &str) -> FactsEntry {
        FactsEntry {
            path: path.to_path_buf(),
            language,
            facts: self.extract(path, source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name_prefers_alias() {
        assert_eq!(ImportedSymbol::plain("engine").local_name(), "engine");
        assert_eq!(ImportedSymbol::aliased("engine", "eng").local_name(), "eng");
    }

    #[test]
    fn test_unavailable_entry_keeps_reason() {
        let entry = FactsEntry::unavailable("bad.py", Language::Python, "syntax error");
        match entry.facts {
            Err(AdapterError::ParseUnavailable { ref reason, .. }) => {
                assert_eq!(reason, "syntax error");
            }
            Ok(_) => panic!("expected ParseUnavailable"),
        }
    }
}
