mod boundary;
mod circular;
mod coupling;
mod neighborhood;
mod taint;

pub use boundary::check_boundaries;
pub use circular::circular_violations;
pub use coupling::check_coupling;
pub use neighborhood::{
    Direction, Neighborhood, NeighborhoodNode, NeighborhoodParams, extract_neighborhood,
};
pub use taint::{TaintFlow, propagate_taint};

use crate::config::LayerConfig;
use crate::graph::DependencyGraph;
use crate::limits::Deadline;
use crate::model::ViolationReport;

/// Run every architectural rule over a finished graph.
pub fn check_rules(
    graph: &DependencyGraph,
    config: &LayerConfig,
    deadline: Deadline,
) -> ViolationReport {
    let layers = config.layers();

    let mut violations = Vec::new();
    violations.extend(circular_violations(graph, layers));
    violations.extend(check_boundaries(graph, layers));
    violations.extend(check_coupling(graph, layers, deadline));

    ViolationReport::new(violations)
}
