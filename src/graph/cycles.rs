//! Circular import detection.
//!
//! Every strongly-connected component of size ≥ 2 (or a self-loop) is one
//! cycle group, not one report per pairwise edge.

use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashSet;

use crate::model::{ImportEdge, ModuleId};

pub(crate) fn cycle_groups(module_count: usize, edges: &[ImportEdge]) -> Vec<Vec<ModuleId>> {
    let mut graph: DiGraph<ModuleId, ()> = DiGraph::with_capacity(module_count, edges.len());
    let nodes: Vec<NodeIndex> = (0..module_count)
        .map(|i| graph.add_node(ModuleId(i)))
        .collect();

    let mut seen_pairs: HashSet<(ModuleId, ModuleId)> = HashSet::new();
    for edge in edges {
        if let Some(target) = edge.target_module()
            && seen_pairs.insert((edge.source, target))
        {
            graph.add_edge(nodes[edge.source.0], nodes[target.0], ());
        }
    }

    let mut groups = Vec::new();
    for scc in tarjan_scc(&graph) {
        if scc.len() > 1 {
            let mut members: Vec<ModuleId> = scc.iter().map(|idx| graph[*idx]).collect();
            members.sort();
            groups.push(members);
        } else if scc.len() == 1 {
            let idx = scc[0];
            let has_self_loop = graph
                .neighbors_directed(idx, Direction::Outgoing)
                .any(|n| n == idx);
            if has_self_loop {
                groups.push(vec![graph[idx]]);
            }
        }
    }

    groups.sort_by_key(|group| group.first().copied());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImportKind;

    fn edge(source: usize, target: usize) -> ImportEdge {
        ImportEdge::resolved(
            ModuleId(source),
            ModuleId(target),
            format!("sym_{}_{}", source, target),
            None,
            ImportKind::Direct,
            1.0,
            Vec::new(),
        )
    }

    #[test]
    fn test_three_cycle_is_one_group() {
        let edges = vec![edge(0, 1), edge(1, 2), edge(2, 0)];
        let groups = cycle_groups(3, &edges);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], vec![ModuleId(0), ModuleId(1), ModuleId(2)]);
    }

    #[test]
    fn test_acyclic_graph_has_no_groups() {
        let edges = vec![edge(0, 1), edge(1, 2), edge(0, 2)];
        assert!(cycle_groups(3, &edges).is_empty());
    }

    #[test]
    fn test_self_loop_is_a_group() {
        let edges = vec![edge(0, 0)];
        let groups = cycle_groups(1, &edges);
        assert_eq!(groups, vec![vec![ModuleId(0)]]);
    }

    #[test]
    fn test_two_disjoint_cycles() {
        let edges = vec![edge(0, 1), edge(1, 0), edge(2, 3), edge(3, 2)];
        let groups = cycle_groups(4, &edges);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0], vec![ModuleId(0), ModuleId(1)]);
        assert_eq!(groups[1], vec![ModuleId(2), ModuleId(3)]);
    }
}
