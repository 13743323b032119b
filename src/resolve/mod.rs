//! Import resolution: raw import statements → confidence-scored edges.
//!
//! Resolution is total. A missing or ambiguous target never raises; it
//! produces an unresolved edge so the graph remains a complete record of
//! intent, not just of successful resolution.

mod chain;
mod wildcard;

use tracing::trace;

use crate::adapter::{ImportedSymbol, RawImport};
use crate::index::ModuleIndex;
use crate::limits::{Deadline, Limits};
use crate::model::{ImportEdge, ImportKind, Module, ModuleId};

pub struct Resolver<'a> {
    index: &'a ModuleIndex,
    limits: &'a Limits,
    deadline: Deadline,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a ModuleIndex, limits: &'a Limits, deadline: Deadline) -> Self {
        Self {
            index,
            limits,
            deadline,
        }
    }

    /// Resolve every raw import of one module into edges.
    pub fn resolve_module(&self, module: &Module) -> Vec<ImportEdge> {
        let mut edges = Vec::new();
        for import in &module.imports {
            if self.deadline.expired() {
                break;
            }
            self.resolve_import(module, import, &mut edges);
        }
        trace!(
            module = %module.path.display(),
            edges = edges.len(),
            "resolved module imports"
        );
        edges
    }

    fn resolve_import(&self, module: &Module, import: &RawImport, out: &mut Vec<ImportEdge>) {
        let target = self.index.resolve_ref(module, &import.module);

        if import.wildcard {
            match target {
                Some(target) => wildcard::expand(
                    self.index,
                    self.limits,
                    self.deadline,
                    module,
                    target,
                    out,
                ),
                None => out.push(ImportEdge::unresolved(
                    module.id,
                    import.module.clone(),
                    "*",
                    None,
                    ImportKind::Wildcard,
                )),
            }
            return;
        }

        if import.symbols.is_empty() {
            out.push(self.resolve_module_binding(module, import, target));
            return;
        }

        for imported in &import.symbols {
            match target {
                Some(target) => out.push(self.resolve_symbol(module, target, imported)),
                None => {
                    let kind = if imported.alias.is_some() {
                        ImportKind::Aliased
                    } else {
                        ImportKind::Direct
                    };
                    out.push(ImportEdge::unresolved(
                        module.id,
                        import.module.clone(),
                        imported.name.clone(),
                        imported.alias.clone(),
                        kind,
                    ));
                }
            }
        }
    }

    /// `import pkg` / `import numpy as np`: the module itself is bound.
    fn resolve_module_binding(
        &self,
        module: &Module,
        import: &RawImport,
        target: Option<ModuleId>,
    ) -> ImportEdge {
        let symbol = binding_name(&import.module);
        let kind = if import.alias.is_some() {
            ImportKind::Aliased
        } else {
            ImportKind::Direct
        };

        match target {
            Some(target) => ImportEdge::resolved(
                module.id,
                target,
                symbol,
                import.alias.clone(),
                kind,
                1.0,
                Vec::new(),
            ),
            None => ImportEdge::unresolved(
                module.id,
                import.module.clone(),
                symbol,
                import.alias.clone(),
                kind,
            ),
        }
    }

    /// `from module import symbol [as alias]`, chasing re-export chains to
    /// the ultimate defining module.
    fn resolve_symbol(
        &self,
        module: &Module,
        target: ModuleId,
        imported: &ImportedSymbol,
    ) -> ImportEdge {
        let chase = chain::chase_symbol(
            self.index,
            self.limits,
            self.deadline,
            target,
            &imported.name,
        );

        let kind = if chase.hops > 0 {
            ImportKind::ReExport
        } else if imported.alias.is_some() {
            ImportKind::Aliased
        } else {
            ImportKind::Direct
        };

        let confidence = if chase.resolved {
            self.limits.confidence_decay_factor.powi(chase.hops as i32)
        } else {
            0.0
        };

        let mut edge = ImportEdge::resolved(
            module.id,
            chase.target,
            imported.name.clone(),
            imported.alias.clone(),
            kind,
            confidence,
            chase.via,
        );
        edge.resolved = chase.resolved;
        edge
    }
}

/// Local name a whole-module import binds: the last path segment.
fn binding_name(reference: &str) -> String {
    let normalized = reference.replace("::", "/");
    normalized
        .rsplit(['/', '.'])
        .find(|s| !s.is_empty())
        .unwrap_or(reference)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FactsEntry, FileFacts};
    use crate::model::{EdgeTarget, Language};
    use std::path::Path;

    fn build_index(files: Vec<(&str, FileFacts)>) -> ModuleIndex {
        let entries = files
            .into_iter()
            .map(|(path, facts)| FactsEntry::new(path, Language::Python, facts))
            .collect();
        ModuleIndex::build(entries, &Limits::default())
    }

    fn resolve_all(index: &ModuleIndex, limits: &Limits, path: &str) -> Vec<ImportEdge> {
        let resolver = Resolver::new(index, limits, Deadline::none());
        let module = index.get(index.lookup_path(Path::new(path)).unwrap());
        resolver.resolve_module(module)
    }

    #[test]
    fn test_direct_import_full_confidence() {
        let index = build_index(vec![
            (
                "app.py",
                FileFacts {
                    imports: vec![RawImport::symbols(
                        "lib",
                        vec![ImportedSymbol::plain("helper")],
                    )],
                    ..Default::default()
                },
            ),
            (
                "lib.py",
                FileFacts {
                    definitions: vec!["helper".to_string()],
                    ..Default::default()
                },
            ),
        ]);

        let edges = resolve_all(&index, &Limits::default(), "app.py");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].kind, ImportKind::Direct);
        assert_eq!(edges[0].confidence, 1.0);
        assert!(edges[0].resolved);
        assert!(edges[0].via.is_empty());
    }

    #[test]
    fn test_missing_target_keeps_edge() {
        let index = build_index(vec![(
            "app.py",
            FileFacts {
                imports: vec![RawImport::symbols(
                    "numpy",
                    vec![ImportedSymbol::aliased("array", "arr")],
                )],
                ..Default::default()
            },
        )]);

        let edges = resolve_all(&index, &Limits::default(), "app.py");
        assert_eq!(edges.len(), 1);
        assert!(!edges[0].resolved);
        assert_eq!(edges[0].confidence, 0.0);
        assert_eq!(
            edges[0].target,
            EdgeTarget::Unresolved("numpy".to_string())
        );
        assert_eq!(edges[0].local_name(), "arr");
    }

    #[test]
    fn test_module_binding_uses_last_segment() {
        let index = build_index(vec![
            (
                "app.py",
                FileFacts {
                    imports: vec![RawImport::module_binding("pkg.core", None)],
                    ..Default::default()
                },
            ),
            ("pkg/core.py", FileFacts::default()),
        ]);

        let edges = resolve_all(&index, &Limits::default(), "app.py");
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].symbol, "core");
        assert_eq!(edges[0].kind, ImportKind::Direct);
    }

    #[test]
    fn test_reexport_chain_decays_confidence() {
        let limits = Limits::default();
        let index = build_index(vec![
            (
                "app.py",
                FileFacts {
                    imports: vec![RawImport::symbols(
                        "pkg",
                        vec![ImportedSymbol::plain("Engine")],
                    )],
                    ..Default::default()
                },
            ),
            (
                "pkg/__init__.py",
                FileFacts {
                    imports: vec![RawImport::symbols(
                        ".core",
                        vec![ImportedSymbol::plain("Engine")],
                    )],
                    export_list: Some(vec!["Engine".to_string()]),
                    ..Default::default()
                },
            ),
            (
                "pkg/core.py",
                FileFacts {
                    definitions: vec!["Engine".to_string()],
                    ..Default::default()
                },
            ),
        ]);

        let edges = resolve_all(&index, &limits, "app.py");
        assert_eq!(edges.len(), 1);

        let edge = &edges[0];
        let core = index.lookup_path(Path::new("pkg/core.py")).unwrap();
        assert_eq!(edge.target, EdgeTarget::Module(core));
        assert_eq!(edge.kind, ImportKind::ReExport);
        assert_eq!(edge.via, vec![std::path::PathBuf::from("pkg/__init__.py")]);

        // one hop: confidence = 1.0 × decay^1
        let expected = limits.confidence_decay_factor;
        assert!((edge.confidence - expected).abs() < 1e-9);
    }

    #[test]
    fn test_decay_formula_over_chain() {
        // app → a → b → c, each hop forwarding Deep onward
        let forward = |to: &str| FileFacts {
            imports: vec![RawImport::symbols(to, vec![ImportedSymbol::plain("Deep")])],
            export_list: Some(vec!["Deep".to_string()]),
            ..Default::default()
        };
        let limits = Limits::default();
        let index = build_index(vec![
            (
                "app.py",
                FileFacts {
                    imports: vec![RawImport::symbols("a", vec![ImportedSymbol::plain("Deep")])],
                    ..Default::default()
                },
            ),
            ("a.py", forward("b")),
            ("b.py", forward("c")),
            (
                "c.py",
                FileFacts {
                    definitions: vec!["Deep".to_string()],
                    ..Default::default()
                },
            ),
        ]);

        let edges = resolve_all(&index, &limits, "app.py");
        assert_eq!(edges.len(), 1);

        let expected = limits.confidence_decay_factor.powi(2);
        assert!((edges[0].confidence - expected).abs() < 1e-9);
        assert_eq!(edges[0].via.len(), 2);
    }

    #[test]
    fn test_circular_reexport_resolves_false() {
        let forward = |to: &str| FileFacts {
            imports: vec![RawImport::symbols(
                to,
                vec![ImportedSymbol::plain("Engine")],
            )],
            export_list: Some(vec!["Engine".to_string()]),
            ..Default::default()
        };
        let index = build_index(vec![
            (
                "app.py",
                FileFacts {
                    imports: vec![RawImport::symbols(
                        "a",
                        vec![ImportedSymbol::plain("Engine")],
                    )],
                    ..Default::default()
                },
            ),
            ("a.py", forward("b")),
            ("b.py", forward("a")),
        ]);

        let edges = resolve_all(&index, &Limits::default(), "app.py");
        assert_eq!(edges.len(), 1);
        assert!(!edges[0].resolved);
        assert_eq!(edges[0].confidence, 0.0);
    }

    #[test]
    fn test_binding_name_variants() {
        assert_eq!(binding_name("numpy"), "numpy");
        assert_eq!(binding_name("pkg.core"), "core");
        assert_eq!(binding_name("crate::graph::builder"), "builder");
        assert_eq!(binding_name("./util"), "util");
    }
}
