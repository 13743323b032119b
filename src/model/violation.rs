use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An architectural rule that fired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub severity: Severity,
    pub message: String,
    /// Name of the rule that fired.
    pub rule: String,
    /// An exemption pattern matched; the violation is retained for
    /// auditability but excluded from the blocking count.
    pub suppressed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// An edge crossing layers in a disallowed direction.
    Boundary {
        source: PathBuf,
        target: PathBuf,
        source_layer: String,
        target_layer: String,
        symbols: Vec<String>,
    },
    /// A module exceeding a coupling limit configured for its layer.
    Coupling {
        module: PathBuf,
        layer: String,
        metric: String,
        actual: usize,
        limit: usize,
    },
    /// One strongly-connected group of mutually importing modules.
    CircularImport { members: Vec<PathBuf> },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Violation {
    pub fn boundary(
        source: PathBuf,
        target: PathBuf,
        source_layer: impl Into<String>,
        target_layer: impl Into<String>,
        symbols: Vec<String>,
    ) -> Self {
        let source_layer = source_layer.into();
        let target_layer = target_layer.into();
        let message = format!(
            "{} ({}) must not depend on {} ({})",
            source.display(),
            source_layer,
            target.display(),
            target_layer,
        );

        Self {
            kind: ViolationKind::Boundary {
                source,
                target,
                source_layer,
                target_layer,
                symbols,
            },
            severity: Severity::Critical,
            message,
            rule: "layer-boundary".to_string(),
            suppressed: false,
        }
    }

    pub fn coupling(
        module: PathBuf,
        layer: impl Into<String>,
        metric: impl Into<String>,
        actual: usize,
        limit: usize,
    ) -> Self {
        let layer = layer.into();
        let metric = metric.into();
        let message = format!(
            "{}: {} is {} (layer '{}' allows {})",
            module.display(),
            metric,
            actual,
            layer,
            limit,
        );

        Self {
            kind: ViolationKind::Coupling {
                module,
                layer,
                metric,
                actual,
                limit,
            },
            severity: Severity::Warning,
            message,
            rule: "coupling-limit".to_string(),
            suppressed: false,
        }
    }

    pub fn circular_import(members: Vec<PathBuf>) -> Self {
        let cycle: Vec<_> = members
            .iter()
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()))
            .collect();
        let message = format!("Circular import group: {}", cycle.join(" → "));

        Self {
            kind: ViolationKind::CircularImport { members },
            severity: Severity::Critical,
            message,
            rule: "circular-import".to_string(),
            suppressed: false,
        }
    }

    pub fn suppress(mut self) -> Self {
        self.suppressed = true;
        self
    }

    /// Counts toward the blocking total: unsuppressed and above info.
    pub fn is_blocking(&self) -> bool {
        !self.suppressed && self.severity > Severity::Info
    }
}

/// The typed violation list exposed to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationReport {
    pub violations: Vec<Violation>,
    pub blocking_count: usize,
}

impl ViolationReport {
    pub fn new(violations: Vec<Violation>) -> Self {
        let blocking_count = violations.iter().filter(|v| v.is_blocking()).count();
        Self {
            violations,
            blocking_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warning),
            "critical" | "error" => Ok(Severity::Critical),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}
