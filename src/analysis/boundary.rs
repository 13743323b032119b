//! Layer boundary checks.
//!
//! Every resolved edge whose endpoints both classified into layers is
//! checked against the configured rank order. Violations matching an
//! exemption glob are kept with `suppressed=true` rather than dropped.

use std::collections::BTreeMap;

use crate::config::LayerSet;
use crate::graph::DependencyGraph;
use crate::model::{ModuleId, Violation};

pub fn check_boundaries(graph: &DependencyGraph, layers: &LayerSet) -> Vec<Violation> {
    let classification: Vec<Option<&crate::model::Layer>> = graph
        .modules()
        .iter()
        .map(|m| layers.classify(&m.path))
        .collect();

    // One violation per offending module pair, carrying the symbol list,
    // so a wide import surface doesn't explode the report.
    let mut offending: BTreeMap<(ModuleId, ModuleId), (String, String, Vec<String>)> =
        BTreeMap::new();

    for edge in graph.edges() {
        let Some(target) = edge.target_module() else {
            continue;
        };
        if target == edge.source {
            // self-edges belong to cycle reporting
            continue;
        }
        let (Some(source_layer), Some(target_layer)) =
            (classification[edge.source.0], classification[target.0])
        else {
            continue;
        };
        if layers.order.allows(source_layer.rank, target_layer.rank) {
            continue;
        }

        offending
            .entry((edge.source, target))
            .or_insert_with(|| {
                (
                    source_layer.name.clone(),
                    target_layer.name.clone(),
                    Vec::new(),
                )
            })
            .2
            .push(edge.symbol.clone());
    }

    offending
        .into_iter()
        .map(|((source, target), (source_layer, target_layer, symbols))| {
            let source_path = &graph.module(source).path;
            let target_path = &graph.module(target).path;
            let violation = Violation::boundary(
                source_path.clone(),
                target_path.clone(),
                source_layer,
                target_layer,
                symbols,
            );
            if layers.is_exempt(source_path) || layers.is_exempt(target_path) {
                violation.suppress()
            } else {
                violation
            }
        })
        .collect()
}
