mod metrics;
mod schema;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

pub use metrics::{GraphMetrics, RankedNode, compute_metrics};
pub use schema::parse_analysis_json;

/// One file in the analyzed repository.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub category: String,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub function_count: Option<u32>,
    #[serde(default)]
    pub dependency_count: Option<u32>,
    #[serde(default)]
    pub external_libs: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Import,
    Require,
    Internal,
}

impl EdgeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Require => "require",
            Self::Internal => "internal",
        }
    }
}

/// One dependency relation between two files. Directed source -> target for
/// rendering; connectivity and degree treat it as undirected.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

/// A validated graph snapshot. Immutable once handed to the view layer; the
/// app only derives position and hover state from it.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub dropped_nodes: usize,
    pub dropped_edges: usize,
}

impl DependencyGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub fn load_analysis_file(path: &Path) -> Result<DependencyGraph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read analysis file {}", path.display()))?;
    let graph = parse_analysis_json(&raw)
        .with_context(|| format!("failed to parse analysis file {}", path.display()))?;

    log::info!(
        "loaded {} nodes / {} edges from {} ({} malformed nodes, {} bad edges dropped)",
        graph.nodes.len(),
        graph.edges.len(),
        path.display(),
        graph.dropped_nodes,
        graph.dropped_edges,
    );

    Ok(graph)
}
