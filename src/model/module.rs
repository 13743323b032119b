use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::adapter::{FileFacts, RawImport, TaintFacts};

/// Handle into the module arena.
///
/// Import graphs are inherently cyclic; modules reference each other by
/// index so cycles are plain graph structure, never an ownership problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    Python,
    TypeScript,
    JavaScript,
    Rust,
    Other(String),
}

impl Language {
    /// Source extensions for module files of this language.
    pub fn extensions(&self) -> &[&'static str] {
        match self {
            Language::Python => &["py"],
            Language::TypeScript => &["ts", "tsx"],
            Language::JavaScript => &["js", "jsx"],
            Language::Rust => &["rs"],
            Language::Other(_) => &[],
        }
    }

    /// File names that stand in for a package directory.
    pub fn aggregator_files(&self) -> &[&'static str] {
        match self {
            Language::Python => &["__init__.py"],
            Language::TypeScript => &["index.ts", "index.tsx"],
            Language::JavaScript => &["index.js", "index.jsx"],
            Language::Rust => &["mod.rs", "lib.rs"],
            Language::Other(_) => &[],
        }
    }
}

/// Exported symbol names of a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportSet {
    /// Explicit export list (`__all__`, `export { .. }`).
    Explicit(Vec<String>),
    /// No explicit list: exports are the public-named top-level bindings.
    Implicit,
}

/// One analyzed file. Immutable after indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub path: PathBuf,
    pub name: String,
    pub language: Language,
    pub imports: Vec<RawImport>,
    pub exports: ExportSet,
    pub definitions: Vec<String>,
    pub taint: TaintFacts,
    /// The adapter could not produce facts; kept as an empty stub so
    /// downstream components never special-case missing files.
    pub parse_failed: bool,
}

impl Module {
    pub fn from_facts(id: ModuleId, path: PathBuf, language: Language, facts: FileFacts) -> Self {
        let name = file_stem(&path);
        let exports = match facts.export_list {
            Some(list) => ExportSet::Explicit(list),
            None => ExportSet::Implicit,
        };

        Self {
            id,
            path,
            name,
            language,
            imports: facts.imports,
            exports,
            definitions: facts.definitions,
            taint: facts.taint,
            parse_failed: false,
        }
    }

    /// Empty-facts stub for a file the adapter could not parse.
    pub fn stub(id: ModuleId, path: PathBuf, language: Language) -> Self {
        let name = file_stem(&path);
        Self {
            id,
            path,
            name,
            language,
            imports: Vec::new(),
            exports: ExportSet::Implicit,
            definitions: Vec::new(),
            taint: TaintFacts::default(),
            parse_failed: true,
        }
    }

    pub fn defines_symbol(&self, symbol: &str) -> bool {
        self.definitions.iter().any(|d| d == symbol)
    }

    /// Names a wildcard import of this module binds.
    ///
    /// With an explicit export list, exactly that list. Without one, the
    /// public-named top-level bindings: definitions plus import bindings,
    /// minus anything underscore-prefixed.
    pub fn exported_names(&self) -> Vec<&str> {
        match &self.exports {
            ExportSet::Explicit(list) => list.iter().map(String::as_str).collect(),
            ExportSet::Implicit => {
                let mut names: Vec<&str> = self
                    .definitions
                    .iter()
                    .map(String::as_str)
                    .filter(|n| !n.starts_with('_'))
                    .collect();
                for import in &self.imports {
                    for symbol in &import.symbols {
                        let bound = symbol.local_name();
                        if !bound.starts_with('_') && !names.contains(&bound) {
                            names.push(bound);
                        }
                    }
                    if let Some(alias) = import.alias.as_deref()
                        && !alias.starts_with('_')
                        && !names.contains(&alias)
                    {
                        names.push(alias);
                    }
                }
                names
            }
        }
    }

    pub fn exports_symbol(&self, symbol: &str) -> bool {
        self.exported_names().contains(&symbol)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unknown")
        .to_string()
}
