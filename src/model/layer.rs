use serde::{Deserialize, Serialize};
use std::path::Path;

/// A named architectural grouping of modules.
///
/// Rank expresses the allowed dependency direction: under the default
/// order, higher-rank layers may depend on lower-rank layers but not the
/// other way around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub rank: u32,
    /// Glob patterns matching module paths. First matching layer wins.
    pub patterns: Vec<String>,
    #[serde(default)]
    pub limits: CouplingLimits,
}

/// Per-layer coupling limits. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CouplingLimits {
    pub max_fan_in: Option<usize>,
    pub max_fan_out: Option<usize>,
    /// Longest outgoing dependency chain rooted in this layer's modules.
    pub max_depth: Option<usize>,
}

impl Layer {
    pub fn new(name: impl Into<String>, rank: u32, patterns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            rank,
            patterns,
            limits: CouplingLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: CouplingLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn matches(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.patterns.iter().any(|p| glob_match(p, &path_str))
    }
}

/// Which rank direction an edge is allowed to cross.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DependencyOrder {
    /// Higher-rank layers may depend on lower-rank layers only.
    #[default]
    HigherDependsOnLower,
    /// Lower-rank layers may depend on higher-rank layers only.
    LowerDependsOnHigher,
}

impl DependencyOrder {
    /// Whether an edge from a module ranked `from` to one ranked `to` is
    /// allowed. Same-layer edges are always allowed.
    pub fn allows(&self, from: u32, to: u32) -> bool {
        match self {
            DependencyOrder::HigherDependsOnLower => from >= to,
            DependencyOrder::LowerDependsOnHigher => from <= to,
        }
    }
}

/// Simple glob matching supporting ** and * wildcards.
/// Language-independent path pattern matching; no filesystem access.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    let path = path.replace('\\', "/");
    let pattern = pattern.replace('\\', "/");

    glob_match_recursive(&pattern, &path)
}

fn glob_match_recursive(pattern: &str, path: &str) -> bool {
    if let Some(pos) = pattern.find("**") {
        // ** matches any number of path segments
        let prefix = &pattern[..pos];
        let suffix = &pattern[pos + 2..];
        let suffix = suffix.strip_prefix('/').unwrap_or(suffix);

        if !prefix.is_empty() && !path.starts_with(prefix) {
            return false;
        }

        let remaining = &path[prefix.len()..];

        if suffix.is_empty() {
            return true;
        }

        for (i, _) in remaining.char_indices() {
            if glob_match_recursive(suffix, &remaining[i..]) {
                return true;
            }
        }
        glob_match_recursive(suffix, "")
    } else if let Some(pos) = pattern.find('*') {
        // single * matches within one segment
        let prefix = &pattern[..pos];
        let suffix = &pattern[pos + 1..];

        if !path.starts_with(prefix) {
            return false;
        }

        let remaining = &path[prefix.len()..];

        for (i, c) in remaining.char_indices() {
            if c == '/' {
                return glob_match_recursive(suffix, &remaining[i..]);
            }
            if glob_match_recursive(suffix, &remaining[i..]) {
                return true;
            }
        }
        glob_match_recursive(suffix, "")
    } else {
        pattern == path || path.ends_with(&format!("/{}", pattern))
    }
}
