//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! navigator. All types derive Serde traits for deserialization from config
//! files. The defaults describe the demo application: a `root` flow with
//! flows `a`, `b` and `c` below it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::navigation::{CommonAncestor, Rebuild, RoutingStrategy};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Navigation defaults.
    pub navigation: NavigationConfig,

    /// Flow kinds and the children each can enter.
    pub flows: Vec<FlowConfig>,

    /// Destination keys and named paths.
    pub table: TableConfig,

    /// Demo presenter timing.
    pub presentation: PresentationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            navigation: NavigationConfig::default(),
            flows: FlowConfig::demo(),
            table: TableConfig::default(),
            presentation: PresentationConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl NavigatorConfig {
    pub fn flow(&self, identifier: &str) -> Option<&FlowConfig> {
        self.flows.iter().find(|flow| flow.identifier == identifier)
    }
}

/// Which routing strategy table-driven requests use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    CommonAncestor,
    Rebuild,
}

impl StrategyKind {
    pub fn strategy(self) -> Arc<dyn RoutingStrategy> {
        match self {
            StrategyKind::CommonAncestor => Arc::new(CommonAncestor),
            StrategyKind::Rebuild => Arc::new(Rebuild),
        }
    }
}

/// Navigation defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Identifier of the root flow; must be declared in `flows`.
    pub root: String,

    /// Animate transitions unless a request says otherwise.
    pub animated: bool,

    /// Strategy for table-driven requests.
    pub strategy: StrategyKind,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            root: "root".to_string(),
            animated: true,
            strategy: StrategyKind::CommonAncestor,
        }
    }
}

/// One flow kind.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FlowConfig {
    /// Unique flow identifier.
    pub identifier: String,

    /// Flows this one can enter.
    #[serde(default)]
    pub children: Vec<String>,
}

impl FlowConfig {
    fn new(identifier: &str, children: &[&str]) -> Self {
        Self {
            identifier: identifier.to_string(),
            children: children.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// The demo application's flows.
    pub fn demo() -> Vec<Self> {
        vec![
            Self::new("root", &["a", "b", "c"]),
            Self::new("a", &["b", "c"]),
            Self::new("b", &["a", "c"]),
            Self::new("c", &["a", "b"]),
        ]
    }
}

/// Routing table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TableConfig {
    /// Static destination entries.
    pub entries: Vec<TableEntryConfig>,

    /// Named sequences of entry keys.
    pub paths: Vec<PathConfig>,

    /// Keys whose entries are registered in code at runtime. Paths may
    /// reference them like static keys.
    pub dynamic_keys: Vec<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        let entry = |key: &str| TableEntryConfig {
            key: key.to_string(),
            identifier: key.to_string(),
            context: None,
        };
        let path = |name: &str, segments: &[&str]| PathConfig {
            name: name.to_string(),
            segments: segments.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            entries: vec![entry("a"), entry("b"), entry("c")],
            paths: vec![
                path("a-b", &["a", "b"]),
                path("a-b-c", &["a", "b", "c"]),
                path("c-a", &["c", "a"]),
                path("a-visit", &["a", "visit"]),
            ],
            dynamic_keys: vec!["visit".to_string()],
        }
    }
}

/// A static routing table entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableEntryConfig {
    /// Lookup key.
    pub key: String,

    /// Identifier of the destination flow.
    pub identifier: String,

    /// Optional context passed to the entered flow.
    #[serde(default)]
    pub context: Option<BTreeMap<String, serde_json::Value>>,
}

/// A named path through the table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathConfig {
    pub name: String,

    /// Entry keys, outermost first.
    pub segments: Vec<String>,
}

/// Timing of the demo console presenter.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Simulated animation time in milliseconds.
    pub animation_ms: u64,

    /// Random extra time added to each animation, in milliseconds.
    pub jitter_ms: u64,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            animation_ms: 250,
            jitter_ms: 50,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
