//! Layer configuration.
//!
//! Loaded once from a `.depmap.toml` at analysis start. A missing or
//! malformed file never fails the analysis: the engine falls back to a
//! built-in three-layer scheme and carries on, recording which of the two
//! it is running with in the `LayerConfig` tag.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::model::{CouplingLimits, DependencyOrder, Layer};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Resolved once at startup so downstream components operate on one
/// concrete layer set instead of re-checking whether a config loaded.
#[derive(Debug, Clone)]
pub enum LayerConfig {
    Loaded(LayerSet),
    BuiltinDefault(LayerSet),
}

impl LayerConfig {
    /// Load layer configuration from a file, falling back to the built-in
    /// scheme if the file is missing or malformed.
    pub fn load(path: &Path) -> Self {
        match LayerSet::from_file(path) {
            Ok(set) => Self::Loaded(set),
            Err(err) => {
                warn!(
                    config = %path.display(),
                    error = %err,
                    "layer config unavailable, using built-in layering"
                );
                Self::BuiltinDefault(LayerSet::builtin())
            }
        }
    }

    pub fn builtin() -> Self {
        Self::BuiltinDefault(LayerSet::builtin())
    }

    pub fn layers(&self) -> &LayerSet {
        match self {
            Self::Loaded(set) | Self::BuiltinDefault(set) => set,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }
}

/// An ordered set of layers plus exemption patterns.
#[derive(Debug, Clone)]
pub struct LayerSet {
    /// Classification order; the first layer with a matching pattern wins.
    pub layers: Vec<Layer>,
    /// Paths matching any of these globs suppress violations they appear in.
    pub exemptions: Vec<String>,
    pub order: DependencyOrder,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    order: Option<String>,
    exemptions: Option<Vec<String>>,
    #[serde(default)]
    layers: Vec<RawLayer>,
}

#[derive(Debug, Deserialize)]
struct RawLayer {
    name: String,
    rank: u32,
    patterns: Vec<String>,
    max_fan_in: Option<usize>,
    max_fan_out: Option<usize>,
    max_depth: Option<usize>,
}

impl LayerSet {
    /// Built-in three-layer scheme used when no configuration loads.
    pub fn builtin() -> Self {
        Self {
            layers: vec![
                Layer::new(
                    "presentation",
                    3,
                    vec![
                        "**/ui/**".to_string(),
                        "**/views/**".to_string(),
                        "**/api/**".to_string(),
                        "**/handlers/**".to_string(),
                        "**/presentation/**".to_string(),
                    ],
                ),
                Layer::new(
                    "domain",
                    2,
                    vec![
                        "**/domain/**".to_string(),
                        "**/services/**".to_string(),
                        "**/core/**".to_string(),
                    ],
                ),
                Layer::new(
                    "data",
                    1,
                    vec![
                        "**/db/**".to_string(),
                        "**/storage/**".to_string(),
                        "**/repository/**".to_string(),
                        "**/models/**".to_string(),
                    ],
                ),
            ],
            exemptions: default_exemptions(),
            order: DependencyOrder::default(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        if raw.layers.is_empty() {
            return Err(ConfigError::Invalid("no layers defined".to_string()));
        }

        let order = match raw.order.as_deref() {
            None | Some("higher_depends_on_lower") => DependencyOrder::HigherDependsOnLower,
            Some("lower_depends_on_higher") => DependencyOrder::LowerDependsOnHigher,
            Some(other) => {
                return Err(ConfigError::Invalid(format!(
                    "unknown dependency order '{}'",
                    other
                )));
            }
        };

        let layers = raw
            .layers
            .into_iter()
            .map(|raw_layer| {
                if raw_layer.patterns.is_empty() {
                    return Err(ConfigError::Invalid(format!(
                        "layer '{}' has no patterns",
                        raw_layer.name
                    )));
                }
                Ok(
                    Layer::new(raw_layer.name, raw_layer.rank, raw_layer.patterns).with_limits(
                        CouplingLimits {
                            max_fan_in: raw_layer.max_fan_in,
                            max_fan_out: raw_layer.max_fan_out,
                            max_depth: raw_layer.max_depth,
                        },
                    ),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            layers,
            exemptions: raw.exemptions.unwrap_or_else(default_exemptions),
            order,
        })
    }

    /// Classify a module path into at most one layer. First match wins.
    pub fn classify(&self, path: &Path) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.matches(path))
    }

    pub fn is_exempt(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exemptions
            .iter()
            .any(|p| crate::model::glob_match(p, &path_str))
    }
}

fn default_exemptions() -> Vec<String> {
    vec![
        "tests/**".to_string(),
        "**/tests/**".to_string(),
        "**/test_*".to_string(),
        "**/__init__.py".to_string(),
        "**/index.ts".to_string(),
        "**/mod.rs".to_string(),
    ]
}
