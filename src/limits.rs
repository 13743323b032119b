//! Caller-supplied resource bounds.
//!
//! The engine performs no licensing or tier logic itself; an external gate
//! decides the numeric limits and hands them in here as plain values.

use std::time::{Duration, Instant};

/// Hard bounds applied during graph construction and traversal.
#[derive(Debug, Clone)]
pub struct Limits {
    /// Stop indexing new modules once this many files are in the index.
    pub max_files: usize,
    /// Stop following edges beyond this many hops from the analysis entry
    /// point. `None` leaves the whole project in.
    pub max_depth: Option<usize>,
    /// Node cap for neighborhood extraction.
    pub max_nodes: usize,
    /// Geometric decay applied per alias/re-export/wildcard hop.
    pub confidence_decay_factor: f64,
    /// Edges below this confidence are invisible to neighborhood traversal.
    pub min_confidence: f64,
    /// Upper bound on alias/re-export chain chasing.
    pub alias_hop_limit: usize,
    /// Taint flows below this confidence are flagged `low_confidence`.
    pub taint_threshold: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_files: 10_000,
            max_depth: None,
            max_nodes: 50,
            confidence_decay_factor: 0.9,
            min_confidence: 0.0,
            alias_hop_limit: 10,
            taint_threshold: 0.5,
        }
    }
}

/// Wall-clock deadline threaded through every bounded loop.
///
/// Expiry never raises: loops return whatever has been computed so far and
/// the result carries `truncated_by_timeout=true`.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    /// No deadline; loops run to their structural bounds.
    pub fn none() -> Self {
        Self { expires_at: None }
    }

    /// Deadline `duration` from now.
    pub fn after(duration: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + duration),
        }
    }

    pub fn expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Instant::now() >= at,
            None => false,
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}
