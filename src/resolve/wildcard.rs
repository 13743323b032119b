//! Wildcard import expansion.
//!
//! `from x import *` becomes one edge per name in x's export list, or in
//! the public-named-bindings heuristic set when no explicit list exists.
//! Wildcard provenance is less certain than a named import, so every
//! expanded edge pays one decay step on top of any re-export hops chased
//! for its symbol.

use crate::index::ModuleIndex;
use crate::limits::{Deadline, Limits};
use crate::model::{ImportEdge, ImportKind, Module, ModuleId};

use super::chain;

pub(crate) fn expand(
    index: &ModuleIndex,
    limits: &Limits,
    deadline: Deadline,
    importer: &Module,
    target: ModuleId,
    out: &mut Vec<ImportEdge>,
) {
    let exported: Vec<String> = index
        .get(target)
        .exported_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    for symbol in exported {
        if deadline.expired() {
            break;
        }

        let chase = chain::chase_symbol(index, limits, deadline, target, &symbol);
        let confidence = if chase.resolved {
            limits
                .confidence_decay_factor
                .powi(1 + chase.hops as i32)
        } else {
            0.0
        };

        let mut edge = ImportEdge::resolved(
            importer.id,
            chase.target,
            symbol,
            None,
            ImportKind::Wildcard,
            confidence,
            chase.via,
        );
        edge.resolved = chase.resolved;
        out.push(edge);
    }
}
