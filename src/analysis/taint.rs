//! Cross-file taint propagation mechanics.
//!
//! Local taint semantics (which expressions are sources, which are sinks)
//! are a sibling system's concern and arrive as per-module facts. This
//! pass only carries labels across resolved import edges: a tainted
//! symbol imported into a module whose local facts flow it into a sink
//! becomes a `TaintFlow`.
//!
//! A flow's confidence is the product of the confidences of every edge it
//! traversed: its certainty depends on the specific resolutions it relies
//! on, not merely on distance.

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;

use crate::graph::DependencyGraph;
use crate::limits::Deadline;
use crate::model::{Module, ModuleId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaintFlow {
    /// Module defining the tainted symbol.
    pub source_module: PathBuf,
    /// The tainted symbol, under its name at the source.
    pub symbol: String,
    /// Module whose local facts flow the symbol into a sink.
    pub sink_module: PathBuf,
    pub sink: String,
    /// Module chain from source to sink.
    pub path: Vec<PathBuf>,
    /// Product of the confidences of every edge traversed.
    pub confidence: f64,
    /// Below the caller's threshold; reported anyway.
    pub low_confidence: bool,
}

pub fn propagate_taint(
    graph: &DependencyGraph,
    threshold: f64,
    deadline: Deadline,
) -> Vec<TaintFlow> {
    let mut flows = Vec::new();

    for module in graph.modules() {
        for symbol in &module.taint.sources {
            if deadline.expired() {
                return flows;
            }
            propagate_from(graph, module, symbol, threshold, deadline, &mut flows);
        }
    }

    flows
}

fn propagate_from(
    graph: &DependencyGraph,
    origin: &Module,
    symbol: &str,
    threshold: f64,
    deadline: Deadline,
    flows: &mut Vec<TaintFlow>,
) {
    // BFS along importing edges, tracking the symbol's local name and the
    // accumulated confidence product per branch.
    let mut visited: HashSet<(ModuleId, String)> = HashSet::new();
    let mut queue: VecDeque<(ModuleId, String, f64, Vec<PathBuf>)> = VecDeque::new();

    visited.insert((origin.id, symbol.to_string()));
    queue.push_back((origin.id, symbol.to_string(), 1.0, vec![origin.path.clone()]));

    while let Some((at, name, confidence, trail)) = queue.pop_front() {
        if deadline.expired() {
            return;
        }

        for edge in graph.edges_into(at) {
            if !edge.resolved || edge.symbol != name {
                continue;
            }

            let importer = graph.module(edge.source);
            let local = edge.local_name().to_string();
            let flow_confidence = confidence * edge.confidence;

            let mut chain = trail.clone();
            chain.push(importer.path.clone());

            for sink_flow in &importer.taint.sink_flows {
                if sink_flow.symbol == local {
                    flows.push(TaintFlow {
                        source_module: origin.path.clone(),
                        symbol: symbol.to_string(),
                        sink_module: importer.path.clone(),
                        sink: sink_flow.sink.clone(),
                        path: chain.clone(),
                        confidence: flow_confidence,
                        low_confidence: flow_confidence < threshold,
                    });
                }
            }

            if visited.insert((edge.source, local.clone())) {
                queue.push_back((edge.source, local, flow_confidence, chain));
            }
        }
    }
}
