//! Graph assembly under a single-writer discipline.
//!
//! Resolution fans out across workers; the builder is the one place edges
//! merge. Replacement for the same (source, symbol) pair follows
//! highest-confidence-wins, ties broken by earliest discovery.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::debug;

use crate::graph::{DependencyGraph, cycles};
use crate::index::ModuleIndex;
use crate::limits::{Deadline, Limits};
use crate::model::{ImportEdge, ModuleId};

pub struct GraphBuilder {
    index: ModuleIndex,
    edges: Vec<ImportEdge>,
    slots: HashMap<(ModuleId, String), usize>,
}

impl GraphBuilder {
    pub fn new(index: ModuleIndex) -> Self {
        Self {
            index,
            edges: Vec::new(),
            slots: HashMap::new(),
        }
    }

    /// Merge one worker's edge batch.
    pub fn merge(&mut self, batch: Vec<ImportEdge>) {
        for edge in batch {
            self.insert(edge);
        }
    }

    fn insert(&mut self, edge: ImportEdge) {
        let key = (edge.source, edge.symbol.clone());
        match self.slots.entry(key) {
            Entry::Occupied(slot) => {
                let existing = &mut self.edges[*slot.get()];
                // strictly greater: equal confidence keeps the earlier edge
                if edge.confidence > existing.confidence {
                    *existing = edge;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(self.edges.len());
                self.edges.push(edge);
            }
        }
    }

    /// Seal the graph: sort edges into canonical order, apply the depth
    /// cap, and detect cycle groups.
    pub fn finish(self, limits: &Limits, deadline: Deadline, entry: Option<ModuleId>) -> DependencyGraph {
        let Self { index, mut edges, .. } = self;

        // Canonical edge order: worker scheduling must never affect content.
        edges.sort_by(|a, b| {
            (a.source, a.symbol.as_str()).cmp(&(b.source, b.symbol.as_str()))
        });

        let mut truncated_depth = false;
        if let Some(max_depth) = limits.max_depth {
            let entry = entry.or_else(|| (!index.is_empty()).then_some(ModuleId(0)));
            if let Some(entry) = entry {
                (edges, truncated_depth) =
                    apply_depth_cap(index.len(), edges, entry, max_depth, deadline);
            }
        }

        let truncated_by_timeout = deadline.expired();
        let cycle_groups = if truncated_by_timeout {
            // partial result; cycle detection is skipped once time is up
            Vec::new()
        } else {
            cycles::cycle_groups(index.len(), &edges)
        };

        debug!(
            modules = index.len(),
            edges = edges.len(),
            cycles = cycle_groups.len(),
            truncated_depth,
            truncated_by_timeout,
            "dependency graph sealed"
        );

        DependencyGraph::seal(index, edges, cycle_groups, truncated_depth, truncated_by_timeout)
    }
}

/// Drop edges sourced at or beyond `max_depth` hops from the entry module.
/// Modules unreachable from the entry are not followed from it and keep
/// their edges.
fn apply_depth_cap(
    module_count: usize,
    edges: Vec<ImportEdge>,
    entry: ModuleId,
    max_depth: usize,
    deadline: Deadline,
) -> (Vec<ImportEdge>, bool) {
    use std::collections::VecDeque;

    let mut out_adjacency: Vec<Vec<ModuleId>> = vec![Vec::new(); module_count];
    for edge in &edges {
        if let Some(target) = edge.target_module() {
            out_adjacency[edge.source.0].push(target);
        }
    }

    let mut distance: HashMap<ModuleId, usize> = HashMap::new();
    distance.insert(entry, 0);
    let mut queue = VecDeque::from([entry]);

    while let Some(node) = queue.pop_front() {
        if deadline.expired() {
            break;
        }
        let depth = distance[&node];
        if depth >= max_depth {
            continue;
        }
        for &next in &out_adjacency[node.0] {
            if let Entry::Vacant(slot) = distance.entry(next) {
                slot.insert(depth + 1);
                queue.push_back(next);
            }
        }
    }

    let before = edges.len();
    let kept: Vec<ImportEdge> = edges
        .into_iter()
        .filter(|edge| match distance.get(&edge.source) {
            Some(&depth) => depth < max_depth,
            None => true,
        })
        .collect();
    let truncated = kept.len() != before;
    (kept, truncated)
}
