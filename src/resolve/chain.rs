//! Re-export and alias chain chasing.
//!
//! When a package aggregator imports a symbol from a submodule and exports
//! it onward, consumers of the aggregator should be wired to the ultimate
//! defining module. The chase is bounded by a hop limit and a visited set
//! so circular chains and pathological inputs always terminate.

use std::collections::HashSet;
use std::path::PathBuf;
use tracing::trace;

use crate::index::ModuleIndex;
use crate::limits::{Deadline, Limits};
use crate::model::{Module, ModuleId};

/// Outcome of chasing one symbol through aggregator re-exports.
pub(crate) struct Chase {
    /// Best-known defining module. On a failed chase this is the last
    /// module reached, so graph topology stays complete.
    pub target: ModuleId,
    pub hops: usize,
    /// Aggregator files crossed, in order, for diagnostics.
    pub via: Vec<PathBuf>,
    /// False when the chase hit the hop bound or a circular chain.
    pub resolved: bool,
}

pub(crate) fn chase_symbol(
    index: &ModuleIndex,
    limits: &Limits,
    deadline: Deadline,
    start: ModuleId,
    symbol: &str,
) -> Chase {
    let mut visited: HashSet<(ModuleId, String)> = HashSet::new();
    let mut current = start;
    let mut current_symbol = symbol.to_string();
    let mut hops = 0;
    let mut via: Vec<PathBuf> = Vec::new();

    loop {
        if deadline.expired() {
            // Partial chase; whatever was reached so far stands.
            return Chase {
                target: current,
                hops,
                via,
                resolved: true,
            };
        }

        if !visited.insert((current, current_symbol.clone())) {
            trace!(symbol, module = current.0, "circular re-export chain");
            return Chase {
                target: current,
                hops,
                via,
                resolved: false,
            };
        }

        let module = index.get(current);
        if module.defines_symbol(&current_symbol) {
            return Chase {
                target: current,
                hops,
                via,
                resolved: true,
            };
        }

        let Some((next, next_symbol)) = forwarding_import(index, module, &current_symbol) else {
            // Not forwarded further; this module is the best-known binding.
            return Chase {
                target: current,
                hops,
                via,
                resolved: true,
            };
        };

        if hops >= limits.alias_hop_limit {
            trace!(symbol, limit = limits.alias_hop_limit, "hop bound exceeded");
            return Chase {
                target: current,
                hops,
                via,
                resolved: false,
            };
        }

        via.push(module.path.clone());
        hops += 1;
        current = next;
        current_symbol = next_symbol;
    }
}

/// The next hop of a re-export chain: the import that binds `symbol` in
/// `module`, provided `module` exports it onward. Returns the target
/// module and the symbol's name there (aliases translate back to the
/// original name).
fn forwarding_import(
    index: &ModuleIndex,
    module: &Module,
    symbol: &str,
) -> Option<(ModuleId, String)> {
    if !module.exports_symbol(symbol) {
        return None;
    }

    for import in &module.imports {
        for imported in &import.symbols {
            if imported.local_name() == symbol {
                return index
                    .resolve_ref(module, &import.module)
                    .map(|target| (target, imported.name.clone()));
            }
        }
    }

    // `from sub import *` can forward the symbol too, when the wildcard
    // target exports it.
    for import in &module.imports {
        if !import.wildcard {
            continue;
        }
        if let Some(target) = index.resolve_ref(module, &import.module)
            && index.get(target).exports_symbol(symbol)
        {
            return Some((target, symbol.to_string()));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FactsEntry, FileFacts, ImportedSymbol, RawImport};
    use crate::model::Language;
    use std::path::Path;

    fn build_index(files: Vec<(&str, FileFacts)>) -> ModuleIndex {
        let entries = files
            .into_iter()
            .map(|(path, facts)| FactsEntry::new(path, Language::Python, facts))
            .collect();
        ModuleIndex::build(entries, &Limits::default())
    }

    fn id_of(index: &ModuleIndex, path: &str) -> ModuleId {
        index.lookup_path(Path::new(path)).unwrap()
    }

    #[test]
    fn test_chase_single_reexport_hop() {
        let index = build_index(vec![
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

        let chase = chase_symbol(
            &index,
            &Limits::default(),
            Deadline::none(),
            id_of(&index, "pkg/__init__.py"),
            "Engine",
        );

        assert!(chase.resolved);
        assert_eq!(chase.target, id_of(&index, "pkg/core.py"));
        assert_eq!(chase.hops, 1);
        assert_eq!(chase.via, vec![PathBuf::from("pkg/__init__.py")]);
    }

    #[test]
    fn test_chase_translates_aliases() {
        // mid.py binds `Engine as Eng` and exports Eng; the chase must
        // translate back to Engine when it hops into core.py.
        let index = build_index(vec![
            (
                "mid.py",
                FileFacts {
                    imports: vec![RawImport::symbols(
                        "core",
                        vec![ImportedSymbol::aliased("Engine", "Eng")],
                    )],
                    export_list: Some(vec!["Eng".to_string()]),
                    ..Default::default()
                },
            ),
            (
                "core.py",
                FileFacts {
                    definitions: vec!["Engine".to_string()],
                    ..Default::default()
                },
            ),
        ]);

        let chase = chase_symbol(
            &index,
            &Limits::default(),
            Deadline::none(),
            id_of(&index, "mid.py"),
            "Eng",
        );

        assert!(chase.resolved);
        assert_eq!(chase.target, id_of(&index, "core.py"));
        assert_eq!(chase.hops, 1);
    }

    #[test]
    fn test_circular_chain_terminates_unresolved() {
        let facts_forwarding = |from: &str| FileFacts {
            imports: vec![RawImport::symbols(
                from,
                vec![ImportedSymbol::plain("Engine")],
            )],
            export_list: Some(vec!["Engine".to_string()]),
            ..Default::default()
        };
        let index = build_index(vec![
            ("a/__init__.py", facts_forwarding("b")),
            ("b/__init__.py", facts_forwarding("a")),
        ]);

        let chase = chase_symbol(
            &index,
            &Limits::default(),
            Deadline::none(),
            id_of(&index, "a/__init__.py"),
            "Engine",
        );

        assert!(!chase.resolved);
        assert!(chase.hops <= Limits::default().alias_hop_limit);
    }

    #[test]
    fn test_hop_bound_stops_chase() {
        // chain0 → chain1 → ... → chain5, each forwarding Engine onward
        let mut files = Vec::new();
        let names: Vec<String> = (0..6).map(|i| format!("chain{}.py", i)).collect();
        for i in 0..5 {
            files.push((
                names[i].as_str(),
                FileFacts {
                    imports: vec![RawImport::symbols(
                        names[i + 1].trim_end_matches(".py"),
                        vec![ImportedSymbol::plain("Engine")],
                    )],
                    export_list: Some(vec!["Engine".to_string()]),
                    ..Default::default()
                },
            ));
        }
        files.push((
            names[5].as_str(),
            FileFacts {
                definitions: vec!["Engine".to_string()],
                ..Default::default()
            },
        ));
        let index = build_index(files);

        let limits = Limits {
            alias_hop_limit: 3,
            ..Limits::default()
        };
        let chase = chase_symbol(
            &index,
            &limits,
            Deadline::none(),
            ModuleId(0),
            "Engine",
        );

        assert!(!chase.resolved);
        assert_eq!(chase.hops, 3);
    }
}
