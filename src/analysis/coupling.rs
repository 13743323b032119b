//! Per-layer coupling limits: fan-in, fan-out, and chain depth.

use crate::config::LayerSet;
use crate::graph::DependencyGraph;
use crate::limits::Deadline;
use crate::model::Violation;

pub fn check_coupling(
    graph: &DependencyGraph,
    layers: &LayerSet,
    deadline: Deadline,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for module in graph.modules() {
        if deadline.expired() {
            break;
        }
        // Unlayered modules still count in every peer's metrics, but have
        // no limits of their own to exceed.
        let Some(layer) = layers.classify(&module.path) else {
            continue;
        };
        let exempt = layers.is_exempt(&module.path);

        let mut record = |violation: Violation| {
            violations.push(if exempt { violation.suppress() } else { violation });
        };

        if let Some(limit) = layer.limits.max_fan_in {
            let fan_in = graph.fan_in(module.id);
            if fan_in > limit {
                record(Violation::coupling(
                    module.path.clone(),
                    &layer.name,
                    "fan_in",
                    fan_in,
                    limit,
                ));
            }
        }

        if let Some(limit) = layer.limits.max_fan_out {
            let fan_out = graph.fan_out(module.id);
            if fan_out > limit {
                record(Violation::coupling(
                    module.path.clone(),
                    &layer.name,
                    "fan_out",
                    fan_out,
                    limit,
                ));
            }
        }

        if let Some(limit) = layer.limits.max_depth {
            let depth = graph.longest_chain_from(module.id, limit + 1, deadline);
            if depth > limit {
                record(Violation::coupling(
                    module.path.clone(),
                    &layer.name,
                    "chain_depth",
                    depth,
                    limit,
                ));
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FactsEntry, FileFacts};
    use crate::graph::GraphBuilder;
    use crate::index::ModuleIndex;
    use crate::limits::Limits;
    use crate::model::{
        CouplingLimits, DependencyOrder, ImportEdge, ImportKind, Language, Layer, ModuleId,
        ViolationKind,
    };

    fn graph_of(paths: &[&str], edges: Vec<(usize, usize, &str)>) -> DependencyGraph {
        let entries = paths
            .iter()
            .map(|p| FactsEntry::new(*p, Language::Python, FileFacts::default()))
            .collect();
        let index = ModuleIndex::build(entries, &Limits::default());

        let mut builder = GraphBuilder::new(index);
        builder.merge(
            edges
                .into_iter()
                .map(|(s, t, sym)| {
                    ImportEdge::resolved(
                        ModuleId(s),
                        ModuleId(t),
                        sym,
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

    fn domain_layer(limits: CouplingLimits) -> LayerSet {
        LayerSet {
            layers: vec![Layer::new("domain", 1, vec!["domain/**".to_string()]).with_limits(limits)],
            exemptions: Vec::new(),
            order: DependencyOrder::HigherDependsOnLower,
        }
    }

    #[test]
    fn test_fan_in_limit() {
        let set = domain_layer(CouplingLimits {
            max_fan_in: Some(1),
            ..Default::default()
        });
        let paths = ["domain/core.py", "a.py", "b.py"];
        let graph = graph_of(&paths, vec![(1, 0, "x"), (2, 0, "y")]);

        let violations = check_coupling(&graph, &set, Deadline::none());
        assert_eq!(violations.len(), 1);
        match &violations[0].kind {
            ViolationKind::Coupling { metric, actual, limit, .. } => {
                assert_eq!(metric, "fan_in");
                assert_eq!(*actual, 2);
                assert_eq!(*limit, 1);
            }
            other => panic!("expected coupling violation, got {:?}", other),
        }
    }

    #[test]
    fn test_fan_out_within_limit_passes() {
        let set = domain_layer(CouplingLimits {
            max_fan_out: Some(2),
            ..Default::default()
        });
        let paths = ["domain/core.py", "a.py", "b.py"];
        let graph = graph_of(&paths, vec![(0, 1, "x"), (0, 2, "y")]);

        assert!(check_coupling(&graph, &set, Deadline::none()).is_empty());
    }

    #[test]
    fn test_chain_depth_limit() {
        let set = domain_layer(CouplingLimits {
            max_depth: Some(2),
            ..Default::default()
        });
        let paths = ["domain/core.py", "a.py", "b.py", "c.py"];
        let graph = graph_of(&paths, vec![(0, 1, "x"), (1, 2, "y"), (2, 3, "z")]);

        let violations = check_coupling(&graph, &set, Deadline::none());
        assert_eq!(violations.len(), 1);
        match &violations[0].kind {
            ViolationKind::Coupling { metric, actual, .. } => {
                assert_eq!(metric, "chain_depth");
                assert_eq!(*actual, 3);
            }
            other => panic!("expected coupling violation, got {:?}", other),
        }
    }

    #[test]
    fn test_unlayered_modules_have_no_limits() {
        let set = domain_layer(CouplingLimits {
            max_fan_in: Some(0),
            ..Default::default()
        });
        let paths = ["lib/util.py", "a.py", "b.py"];
        let graph = graph_of(&paths, vec![(1, 0, "x"), (2, 0, "y")]);

        assert!(check_coupling(&graph, &set, Deadline::none()).is_empty());
    }
}
