//! Module index: file path → parsed import/export facts.
//!
//! Built once per analysis run from the adapter's facts stream. Files the
//! adapter could not parse are kept as empty-facts stubs so downstream
//! components never special-case missing modules. The index also answers
//! the resolver's module-reference lookups: project-root-relative paths,
//! package-relative references, and package aggregator files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::adapter::FactsEntry;
use crate::limits::Limits;
use crate::model::{Language, Module, ModuleId};

/// Extensions tried when the importer's language alone finds nothing.
const ALL_EXTENSIONS: &[&str] = &["py", "ts", "tsx", "js", "jsx", "rs"];
const ALL_AGGREGATORS: &[&str] = &[
    "__init__.py",
    "index.ts",
    "index.tsx",
    "index.js",
    "index.jsx",
    "mod.rs",
    "lib.rs",
];

pub struct ModuleIndex {
    modules: Vec<Module>,
    by_path: HashMap<String, ModuleId>,
    truncated_files: bool,
}

impl ModuleIndex {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            by_path: HashMap::new(),
            truncated_files: false,
        }
    }

    /// Index every entry, stopping at the `max_files` cap.
    pub fn build(entries: Vec<FactsEntry>, limits: &Limits) -> Self {
        let mut index = Self::new();
        for entry in entries {
            if index.insert(entry, limits.max_files).is_none() && index.truncated_files {
                break;
            }
        }
        debug!(
            modules = index.modules.len(),
            truncated = index.truncated_files,
            "module index built"
        );
        index
    }

    /// Add one file to the index. Returns `None` once the file cap is hit.
    /// A duplicate path returns the already-indexed module unchanged.
    pub fn insert(&mut self, entry: FactsEntry, max_files: usize) -> Option<ModuleId> {
        let key = normalize(&entry.path);
        if let Some(&existing) = self.by_path.get(&key) {
            return Some(existing);
        }

        if self.modules.len() >= max_files {
            self.truncated_files = true;
            return None;
        }

        let id = ModuleId(self.modules.len());
        let path = PathBuf::from(&key);
        let module = match entry.facts {
            Ok(facts) => Module::from_facts(id, path, entry.language, facts),
            Err(err) => {
                debug!(path = %key, error = %err, "indexing parse-failed file as stub");
                Module::stub(id, path, entry.language)
            }
        };

        self.by_path.insert(key, id);
        self.modules.push(module);
        Some(id)
    }

    pub fn get(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn truncated_files(&self) -> bool {
        self.truncated_files
    }

    pub(crate) fn into_parts(self) -> (Vec<Module>, HashMap<String, ModuleId>, bool) {
        (self.modules, self.by_path, self.truncated_files)
    }

    pub fn lookup_path(&self, path: &Path) -> Option<ModuleId> {
        self.by_path.get(&normalize(path)).copied()
    }

    /// Resolve a raw module reference from `importer` to an indexed module.
    ///
    /// Tries, in order: the exact candidate paths derived from the
    /// reference (relative first, then project-root-relative), then a
    /// suffix match over the whole index. Returns the lowest-id match so
    /// resolution is deterministic.
    pub fn resolve_ref(&self, importer: &Module, reference: &str) -> Option<ModuleId> {
        let bases = candidate_bases(importer, reference);

        for base in &bases {
            for candidate in candidate_files(base, &importer.language) {
                if let Some(&id) = self.by_path.get(&candidate) {
                    return Some(id);
                }
            }
        }

        // No exact hit; fall back to matching candidates as path suffixes,
        // which covers imports rooted somewhere below the project root.
        let mut best: Option<ModuleId> = None;
        for base in &bases {
            for candidate in candidate_files(base, &importer.language) {
                let suffix = format!("/{}", candidate);
                for module in &self.modules {
                    let path = module.path.to_string_lossy();
                    if path.ends_with(&suffix) && best.is_none_or(|b| module.id < b) {
                        best = Some(module.id);
                    }
                }
            }
            if best.is_some() {
                break;
            }
        }
        best
    }
}

impl Default for ModuleIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    s.strip_prefix("./").unwrap_or(&s).to_string()
}

/// Base paths (no extension) a reference could point at.
fn candidate_bases(importer: &Module, reference: &str) -> Vec<String> {
    let mut bases = Vec::new();

    // Python-style relative references: ".core", "..pkg.core".
    if reference.starts_with('.') && !reference.starts_with("./") && !reference.starts_with("../") {
        let dots = reference.len() - reference.trim_start_matches('.').len();
        let rest = &reference[dots..];
        if let Some(base) = relative_base(&importer.path, dots - 1, rest, '.') {
            bases.push(base);
        }
        return bases;
    }

    // JS-style relative references: "./util", "../shared/util".
    if reference.starts_with("./") || reference.starts_with("../") {
        let mut pops = 0;
        let mut rest = reference;
        while let Some(r) = rest.strip_prefix("../") {
            pops += 1;
            rest = r;
        }
        rest = rest.strip_prefix("./").unwrap_or(rest);
        if let Some(base) = relative_base(&importer.path, pops, rest, '/') {
            bases.push(base);
        }
        return bases;
    }

    // Rust-style paths: "crate::graph::builder", "super::util".
    if reference.contains("::") {
        let segments: Vec<&str> = reference.split("::").collect();
        match segments.first() {
            Some(&"crate") => bases.push(segments[1..].join("/")),
            Some(&"super") => {
                if let Some(base) = relative_base(&importer.path, 1, &segments[1..].join("/"), '/')
                {
                    bases.push(base);
                }
            }
            Some(&"self") => {
                if let Some(base) = relative_base(&importer.path, 0, &segments[1..].join("/"), '/')
                {
                    bases.push(base);
                }
            }
            _ => bases.push(segments.join("/")),
        }
        return bases;
    }

    // Dotted or slashed project-root-relative reference.
    bases.push(reference.replace('.', "/"));
    if reference.contains('/') {
        bases.push(reference.to_string());
    }
    bases
}

/// Resolve a reference relative to the importer's directory, popping
/// `pops` parent directories first.
fn relative_base(importer: &Path, pops: usize, rest: &str, separator: char) -> Option<String> {
    let mut dir = importer.parent()?.to_path_buf();
    for _ in 0..pops {
        dir = dir.parent()?.to_path_buf();
    }

    let mut base = dir.to_string_lossy().replace('\\', "/");
    if !rest.is_empty() {
        let tail = rest
            .split(separator)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        if base.is_empty() {
            base = tail;
        } else {
            base = format!("{}/{}", base, tail);
        }
    }
    Some(base)
}

/// Concrete file paths a base could resolve to: `base.<ext>` first, then
/// package aggregators `base/<agg>`. The importer's language is tried
/// before the cross-language fallbacks.
fn candidate_files(base: &str, language: &Language) -> Vec<String> {
    let mut candidates = Vec::new();
    if base.is_empty() {
        return candidates;
    }

    let mut push = |candidate: String| {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    for ext in language.extensions() {
        push(format!("{}.{}", base, ext));
    }
    for agg in language.aggregator_files() {
        push(format!("{}/{}", base, agg));
    }
    for ext in ALL_EXTENSIONS {
        push(format!("{}.{}", base, ext));
    }
    for agg in ALL_AGGREGATORS {
        push(format!("{}/{}", base, agg));
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FactsEntry, FileFacts};

    fn entry(path: &str) -> FactsEntry {
        FactsEntry::new(path, Language::Python, FileFacts::default())
    }

    fn index_of(paths: &[&str]) -> ModuleIndex {
        ModuleIndex::build(paths.iter().map(|p| entry(p)).collect(), &Limits::default())
    }

    #[test]
    fn test_max_files_cap_truncates() {
        let limits = Limits {
            max_files: 2,
            ..Limits::default()
        };
        let entries = vec![entry("a.py"), entry("b.py"), entry("c.py")];
        let index = ModuleIndex::build(entries, &limits);

        assert_eq!(index.len(), 2);
        assert!(index.truncated_files());
    }

    #[test]
    fn test_parse_failure_becomes_stub() {
        let entries = vec![FactsEntry::unavailable(
            "broken.py",
            Language::Python,
            "syntax error",
        )];
        let index = ModuleIndex::build(entries, &Limits::default());

        assert_eq!(index.len(), 1);
        assert!(index.get(ModuleId(0)).parse_failed);
    }

    #[test]
    fn test_duplicate_path_keeps_first_module() {
        let mut index = ModuleIndex::new();
        let first = index.insert(entry("a.py"), 10).unwrap();
        let second = index.insert(entry("a.py"), 10).unwrap();
        assert_eq!(first, second);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_resolve_dotted_reference() {
        let index = index_of(&["pkg/core.py", "app/main.py"]);
        let main = index.get(index.lookup_path(Path::new("app/main.py")).unwrap());

        let target = index.resolve_ref(main, "pkg.core").unwrap();
        assert_eq!(index.get(target).path, PathBuf::from("pkg/core.py"));
    }

    #[test]
    fn test_resolve_package_aggregator() {
        let index = index_of(&["pkg/__init__.py", "pkg/core.py"]);
        let core = index.get(index.lookup_path(Path::new("pkg/core.py")).unwrap());

        let target = index.resolve_ref(core, "pkg").unwrap();
        assert_eq!(index.get(target).path, PathBuf::from("pkg/__init__.py"));
    }

    #[test]
    fn test_resolve_python_relative_reference() {
        let index = index_of(&["pkg/__init__.py", "pkg/core.py", "pkg/sub/leaf.py"]);
        let init = index.get(index.lookup_path(Path::new("pkg/__init__.py")).unwrap());
        let leaf = index.get(index.lookup_path(Path::new("pkg/sub/leaf.py")).unwrap());

        // `.core` from pkg/__init__.py → pkg/core.py
        let target = index.resolve_ref(init, ".core").unwrap();
        assert_eq!(index.get(target).path, PathBuf::from("pkg/core.py"));

        // `..core` from pkg/sub/leaf.py → pkg/core.py
        let target = index.resolve_ref(leaf, "..core").unwrap();
        assert_eq!(index.get(target).path, PathBuf::from("pkg/core.py"));
    }

    #[test]
    fn test_resolve_js_relative_reference() {
        let entries = vec![
            FactsEntry::new("src/app/main.ts", Language::TypeScript, FileFacts::default()),
            FactsEntry::new("src/app/util.ts", Language::TypeScript, FileFacts::default()),
            FactsEntry::new("src/shared/index.ts", Language::TypeScript, FileFacts::default()),
        ];
        let index = ModuleIndex::build(entries, &Limits::default());
        let main = index.get(index.lookup_path(Path::new("src/app/main.ts")).unwrap());

        let util = index.resolve_ref(main, "./util").unwrap();
        assert_eq!(index.get(util).path, PathBuf::from("src/app/util.ts"));

        let shared = index.resolve_ref(main, "../shared").unwrap();
        assert_eq!(index.get(shared).path, PathBuf::from("src/shared/index.ts"));
    }

    #[test]
    fn test_resolve_suffix_fallback() {
        // Import rooted below the project root still resolves by suffix.
        let index = index_of(&["backend/pkg/core.py", "backend/app/main.py"]);
        let main = index.get(index.lookup_path(Path::new("backend/app/main.py")).unwrap());

        let target = index.resolve_ref(main, "pkg.core").unwrap();
        assert_eq!(index.get(target).path, PathBuf::from("backend/pkg/core.py"));
    }

    #[test]
    fn test_unresolvable_reference_is_none() {
        let index = index_of(&["a.py"]);
        let a = index.get(ModuleId(0));
        assert!(index.resolve_ref(a, "numpy").is_none());
    }
}
