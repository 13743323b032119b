//! Bounded k-hop neighborhood extraction.
//!
//! Breadth-first expansion from a center module. Edges failing the
//! direction or confidence filters are invisible to further traversal,
//! not merely hidden from the output. When the node cap would be
//! exceeded, admission keeps closer, higher-confidence nodes.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::graph::DependencyGraph;
use crate::limits::Deadline;
use crate::model::{EdgeView, ModuleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Incoming,
    Outgoing,
    Both,
}

#[derive(Debug, Clone)]
pub struct NeighborhoodParams {
    /// Hop count `k`.
    pub hops: usize,
    pub direction: Direction,
    /// Edges below this confidence are invisible to the traversal.
    pub min_confidence: f64,
    /// Node cap, center included.
    pub max_nodes: usize,
    pub deadline: Deadline,
}

impl Default for NeighborhoodParams {
    fn default() -> Self {
        Self {
            hops: 2,
            direction: Direction::Both,
            min_confidence: 0.0,
            max_nodes: 50,
            deadline: Deadline::none(),
        }
    }
}

impl NeighborhoodParams {
    /// Derive traversal bounds from the caller-supplied limits.
    pub fn from_limits(limits: &crate::limits::Limits) -> Self {
        Self {
            min_confidence: limits.min_confidence,
            max_nodes: limits.max_nodes,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodNode {
    pub path: PathBuf,
    /// Hop distance from the center.
    pub hops: usize,
    /// Best edge confidence that admitted this node; 1.0 for the center.
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Neighborhood {
    pub center: PathBuf,
    pub nodes: Vec<NeighborhoodNode>,
    pub edges: Vec<EdgeView>,
    /// The node cap was hit; `nodes` sits exactly at the cap.
    pub truncated: bool,
    /// Which limit was hit, with discovered vs. returned counts.
    pub truncation_reason: Option<String>,
    pub truncated_by_timeout: bool,
}

impl Neighborhood {
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

pub fn extract_neighborhood(
    graph: &DependencyGraph,
    center: ModuleId,
    params: &NeighborhoodParams,
) -> Neighborhood {
    let max_nodes = params.max_nodes.max(1);

    let mut admitted: HashMap<ModuleId, (usize, f64)> = HashMap::new();
    admitted.insert(center, (0, 1.0));
    let mut frontier = vec![center];

    let mut truncated = false;
    let mut truncation_reason = None;
    let mut truncated_by_timeout = false;

    'expansion: for hop in 1..=params.hops {
        if frontier.is_empty() {
            break;
        }

        // Candidates discovered from this frontier, keyed by best confidence.
        let mut candidates: HashMap<ModuleId, f64> = HashMap::new();
        for &node in &frontier {
            if params.deadline.expired() {
                truncated_by_timeout = true;
                break 'expansion;
            }
            for (peer, confidence) in neighbor_edges(graph, node, params.direction) {
                if confidence < params.min_confidence {
                    continue;
                }
                if admitted.contains_key(&peer) {
                    continue;
                }
                let best = candidates.entry(peer).or_insert(confidence);
                if confidence > *best {
                    *best = confidence;
                }
            }
        }

        // Hop distance already orders admission; within a hop, higher
        // confidence first, then module id for determinism.
        let mut ranked: Vec<(ModuleId, f64)> = candidates.into_iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut rejected = 0;
        let mut next_frontier = Vec::new();
        for (peer, confidence) in ranked {
            if admitted.len() >= max_nodes {
                rejected += 1;
                continue;
            }
            admitted.insert(peer, (hop, confidence));
            next_frontier.push(peer);
        }

        if rejected > 0 {
            truncated = true;
            truncation_reason = Some(format!(
                "max_nodes limit hit at hop {}: discovered {} nodes, returned {}",
                hop,
                admitted.len() + rejected,
                admitted.len(),
            ));
            break;
        }

        frontier = next_frontier;
    }

    let mut nodes: Vec<NeighborhoodNode> = admitted
        .iter()
        .map(|(&id, &(hops, confidence))| NeighborhoodNode {
            path: graph.module(id).path.clone(),
            hops,
            confidence,
        })
        .collect();
    nodes.sort_by(|a, b| a.hops.cmp(&b.hops).then_with(|| a.path.cmp(&b.path)));

    // Edges within the admitted set that pass the confidence filter.
    let edges = graph
        .edges()
        .iter()
        .filter(|edge| {
            let Some(target) = edge.target_module() else {
                return false;
            };
            edge.confidence >= params.min_confidence
                && admitted.contains_key(&edge.source)
                && admitted.contains_key(&target)
        })
        .map(|edge| EdgeView::from_edge(edge, graph.modules()))
        .collect();

    Neighborhood {
        center: graph.module(center).path.clone(),
        nodes,
        edges,
        truncated,
        truncation_reason,
        truncated_by_timeout,
    }
}

fn neighbor_edges(
    graph: &DependencyGraph,
    node: ModuleId,
    direction: Direction,
) -> Vec<(ModuleId, f64)> {
    let mut peers = Vec::new();

    if matches!(direction, Direction::Outgoing | Direction::Both) {
        for edge in graph.edges_from(node) {
            if let Some(target) = edge.target_module() {
                peers.push((target, edge.confidence));
            }
        }
    }
    if matches!(direction, Direction::Incoming | Direction::Both) {
        for edge in graph.edges_into(node) {
            peers.push((edge.source, edge.confidence));
        }
    }
    peers
}
