//! Circular import groups as violations.

use crate::config::LayerSet;
use crate::graph::DependencyGraph;
use crate::model::Violation;

pub fn circular_violations(graph: &DependencyGraph, layers: &LayerSet) -> Vec<Violation> {
    graph
        .cycle_groups()
        .iter()
        .map(|group| {
            let members: Vec<_> = group
                .iter()
                .map(|&id| graph.module(id).path.clone())
                .collect();
            let exempt = members.iter().any(|path| layers.is_exempt(path));
            let violation = Violation::circular_import(members);
            if exempt {
                violation.suppress()
            } else {
                violation
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FactsEntry, FileFacts};
    use crate::graph::GraphBuilder;
    use crate::index::ModuleIndex;
    use crate::limits::{Deadline, Limits};
    use crate::model::{ImportEdge, ImportKind, Language, ModuleId, ViolationKind};

    fn graph_of(paths: &[&str], edges: Vec<(usize, usize)>) -> DependencyGraph {
        let entries = paths
            .iter()
            .map(|p| FactsEntry::new(*p, Language::Python, FileFacts::default()))
            .collect();
        let index = ModuleIndex::build(entries, &Limits::default());

        let mut builder = GraphBuilder::new(index);
        builder.merge(
            edges
                .into_iter()
                .enumerate()
                .map(|(i, (s, t))| {
                    ImportEdge::resolved(
                        ModuleId(s),
                        ModuleId(t),
                        format!("sym{}", i),
                        None,
                        ImportKind::Direct,
                        1.0,
                        Vec::new(),
                    )
                })
                .collect(),
        );
        builder.finish(&Limits::default(), Deadline::none(), None)
    }

    #[test]
    fn test_three_cycle_is_one_violation() {
        let graph = graph_of(&["a.py", "b.py", "c.py"], vec![(0, 1), (1, 2), (2, 0)]);
        let violations = circular_violations(&graph, &LayerSet::builtin());

        assert_eq!(violations.len(), 1);
        match &violations[0].kind {
            ViolationKind::CircularImport { members } => assert_eq!(members.len(), 3),
            other => panic!("expected circular import violation, got {:?}", other),
        }
    }

    #[test]
    fn test_aggregator_cycle_is_suppressed() {
        let graph = graph_of(
            &["pkg/__init__.py", "pkg/core.py"],
            vec![(0, 1), (1, 0)],
        );
        let violations = circular_violations(&graph, &LayerSet::builtin());

        assert_eq!(violations.len(), 1);
        assert!(violations[0].suppressed);
    }
}
