//! The sealed dependency graph.
//!
//! Append-only during construction, immutable afterwards. Nodes live in an
//! arena addressed by `ModuleId`, edges in a flat list addressed by index,
//! so cyclic import structure is plain data. All traversal operations are
//! read-only and may run in parallel across independent queries.

mod builder;
mod cycles;

pub use builder::GraphBuilder;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::LayerSet;
use crate::limits::Deadline;
use crate::model::{EdgeView, GraphView, ImportEdge, Module, ModuleId, ModuleView};

pub struct DependencyGraph {
    modules: Vec<Module>,
    by_path: HashMap<String, ModuleId>,
    edges: Vec<ImportEdge>,
    out_edges: Vec<Vec<usize>>,
    in_edges: Vec<Vec<usize>>,
    cycle_groups: Vec<Vec<ModuleId>>,
    truncated_files: bool,
    truncated_depth: bool,
    truncated_by_timeout: bool,
}

impl DependencyGraph {
    pub(crate) fn seal(
        index: crate::index::ModuleIndex,
        edges: Vec<ImportEdge>,
        cycle_groups: Vec<Vec<ModuleId>>,
        truncated_depth: bool,
        truncated_by_timeout: bool,
    ) -> Self {
        let (modules, by_path, truncated_files) = index.into_parts();

        let mut out_edges: Vec<Vec<usize>> = vec![Vec::new(); modules.len()];
        let mut in_edges: Vec<Vec<usize>> = vec![Vec::new(); modules.len()];
        for (i, edge) in edges.iter().enumerate() {
            out_edges[edge.source.0].push(i);
            if let Some(target) = edge.target_module() {
                in_edges[target.0].push(i);
            }
        }

        Self {
            modules,
            by_path,
            edges,
            out_edges,
            in_edges,
            cycle_groups,
            truncated_files,
            truncated_depth,
            truncated_by_timeout,
        }
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Look up a module by path; exact match first, then unique suffix.
    pub fn module_id(&self, path: &Path) -> Option<ModuleId> {
        let key = path.to_string_lossy().replace('\\', "/");
        let key = key.strip_prefix("./").unwrap_or(&key).to_string();
        if let Some(&id) = self.by_path.get(&key) {
            return Some(id);
        }

        let suffix = format!("/{}", key);
        self.modules
            .iter()
            .find(|m| m.path.to_string_lossy().ends_with(&suffix))
            .map(|m| m.id)
    }

    pub fn edges(&self) -> &[ImportEdge] {
        &self.edges
    }

    pub fn edges_from(&self, id: ModuleId) -> impl Iterator<Item = &ImportEdge> {
        self.out_edges[id.0].iter().map(|&i| &self.edges[i])
    }

    pub fn edges_into(&self, id: ModuleId) -> impl Iterator<Item = &ImportEdge> {
        self.in_edges[id.0].iter().map(|&i| &self.edges[i])
    }

    /// Distinct modules importing this one, over resolved edges.
    pub fn fan_in(&self, id: ModuleId) -> usize {
        let peers: HashSet<ModuleId> = self.edges_into(id).map(|e| e.source).collect();
        peers.len()
    }

    /// Distinct modules this one imports, over resolved edges.
    pub fn fan_out(&self, id: ModuleId) -> usize {
        let peers: HashSet<ModuleId> = self
            .edges_from(id)
            .filter_map(|e| e.target_module())
            .collect();
        peers.len()
    }

    /// Strongly-connected groups of mutually importing modules.
    pub fn cycle_groups(&self) -> &[Vec<ModuleId>] {
        &self.cycle_groups
    }

    pub fn truncated_files(&self) -> bool {
        self.truncated_files
    }

    pub fn truncated_depth(&self) -> bool {
        self.truncated_depth
    }

    pub fn truncated_by_timeout(&self) -> bool {
        self.truncated_by_timeout
    }

    /// Longest simple outgoing chain from `id`, counted in edges and
    /// capped at `cap`. The cap bounds the search, so layer depth checks
    /// stay cheap even on dense graphs.
    pub fn longest_chain_from(&self, id: ModuleId, cap: usize, deadline: Deadline) -> usize {
        let mut on_path = HashSet::new();
        self.chain_depth(id, cap, &mut on_path, deadline)
    }

    fn chain_depth(
        &self,
        node: ModuleId,
        cap: usize,
        on_path: &mut HashSet<ModuleId>,
        deadline: Deadline,
    ) -> usize {
        if cap == 0 || deadline.expired() {
            return 0;
        }
        on_path.insert(node);

        let mut best = 0;
        for edge in self.edges_from(node) {
            let Some(target) = edge.target_module() else {
                continue;
            };
            if on_path.contains(&target) {
                continue;
            }
            best = best.max(1 + self.chain_depth(target, cap - 1, on_path, deadline));
            if best == cap {
                break;
            }
        }

        on_path.remove(&node);
        best
    }

    /// Serializable summary for external renderers. Passing a layer set
    /// annotates each module with its classification.
    pub fn view(&self, layers: Option<&LayerSet>) -> GraphView {
        let modules = self
            .modules
            .iter()
            .map(|m| ModuleView {
                path: m.path.clone(),
                language: m.language.clone(),
                layer: layers
                    .and_then(|set| set.classify(&m.path))
                    .map(|layer| layer.name.clone()),
                parse_failed: m.parse_failed,
            })
            .collect();

        let edges = self
            .edges
            .iter()
            .map(|e| EdgeView::from_edge(e, &self.modules))
            .collect();

        let cycle_groups = self
            .cycle_groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|id| self.modules[id.0].path.clone())
                    .collect()
            })
            .collect();

        GraphView {
            modules,
            edges,
            cycle_groups,
            truncated_files: self.truncated_files,
            truncated_depth: self.truncated_depth,
            truncated_by_timeout: self.truncated_by_timeout,
        }
    }
}
