use std::collections::HashMap;

use anyhow::{Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::{DependencyGraph, GraphEdge, GraphNode};

/// Decodes the upstream analyzer's JSON into a validated snapshot.
///
/// The upstream pipeline infers dependencies heuristically, so partial and
/// slightly broken payloads are expected: individual malformed records are
/// dropped rather than failing the whole file. Only a payload that is not a
/// JSON object at all is an error.
pub fn parse_analysis_json(raw: &str) -> Result<DependencyGraph> {
    let parsed: Value = serde_json::from_str(raw)?;
    let mut object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("analysis payload is not a JSON object"))?;

    // The service wraps the graph in an "analysis" envelope; accept both.
    if let Some(inner) = object.get("analysis").and_then(Value::as_object) {
        object = inner;
    }

    let raw_nodes = object
        .get("nodes")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let raw_edges = object
        .get("edges")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut nodes: Vec<GraphNode> = Vec::with_capacity(raw_nodes.len());
    let mut index_by_id: HashMap<String, usize> = HashMap::with_capacity(raw_nodes.len());
    let mut dropped_nodes = 0usize;

    for value in raw_nodes {
        let Ok(node) = GraphNode::deserialize(value) else {
            dropped_nodes += 1;
            continue;
        };
        if node.id.is_empty() {
            dropped_nodes += 1;
            continue;
        }

        // Duplicate ids: last write wins, keeping the first occurrence's slot
        // so ranking tie-breaks stay in input order.
        match index_by_id.get(&node.id) {
            Some(&index) => nodes[index] = node,
            None => {
                index_by_id.insert(node.id.clone(), nodes.len());
                nodes.push(node);
            }
        }
    }

    let mut edges: Vec<GraphEdge> = Vec::with_capacity(raw_edges.len());
    let mut dropped_edges = 0usize;

    for value in raw_edges {
        let Ok(edge) = GraphEdge::deserialize(value) else {
            dropped_edges += 1;
            continue;
        };

        let known = index_by_id.contains_key(&edge.source) && index_by_id.contains_key(&edge.target);
        if !known || edge.source == edge.target {
            dropped_edges += 1;
            continue;
        }

        edges.push(edge);
    }

    if dropped_nodes > 0 || dropped_edges > 0 {
        log::warn!("dropped {dropped_nodes} malformed node records and {dropped_edges} bad edges");
    }

    Ok(DependencyGraph {
        nodes,
        edges,
        dropped_nodes,
        dropped_edges,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EdgeKind;

    #[test]
    fn parses_wrapped_and_bare_payloads() {
        let bare = r#"{"nodes": [{"id": "a.py", "label": "a", "category": "python"}], "edges": []}"#;
        let graph = parse_analysis_json(bare).unwrap();
        assert_eq!(graph.nodes.len(), 1);

        let wrapped = r#"{"repo_url": "x", "analysis": {"nodes": [{"id": "a.py", "label": "a", "category": "python"}], "edges": []}}"#;
        let graph = parse_analysis_json(wrapped).unwrap();
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn drops_malformed_nodes_not_whole_file() {
        let raw = r#"{"nodes": [
            {"id": "a.py", "label": "a", "category": "python"},
            {"label": "missing id", "category": "python"},
            42
        ], "edges": []}"#;
        let graph = parse_analysis_json(raw).unwrap();
        assert_eq!(graph.nodes.len(), 1);
        assert_eq!(graph.dropped_nodes, 2);
    }

    #[test]
    fn duplicate_ids_are_last_write_wins_in_place() {
        let raw = r#"{"nodes": [
            {"id": "a.py", "label": "old", "category": "python"},
            {"id": "b.py", "label": "b", "category": "python"},
            {"id": "a.py", "label": "new", "category": "python"}
        ], "edges": []}"#;
        let graph = parse_analysis_json(raw).unwrap();
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[0].id, "a.py");
        assert_eq!(graph.nodes[0].label, "new");
        assert_eq!(graph.nodes[1].id, "b.py");
    }

    #[test]
    fn drops_dangling_self_loop_and_unknown_kind_edges() {
        let raw = r#"{"nodes": [
            {"id": "a.py", "label": "a", "category": "python"},
            {"id": "b.py", "label": "b", "category": "python"}
        ], "edges": [
            {"source": "a.py", "target": "b.py", "kind": "import"},
            {"source": "x.py", "target": "b.py", "kind": "import"},
            {"source": "a.py", "target": "a.py", "kind": "import"},
            {"source": "a.py", "target": "b.py", "kind": "telepathy"}
        ]}"#;
        let graph = parse_analysis_json(raw).unwrap();
        assert_eq!(graph.edges.len(), 1);
        assert_eq!(graph.dropped_edges, 3);
        assert_eq!(graph.edges[0].kind, EdgeKind::Import);
    }

    #[test]
    fn parallel_edges_are_preserved() {
        let raw = r#"{"nodes": [
            {"id": "a.py", "label": "a", "category": "python"},
            {"id": "b.py", "label": "b", "category": "python"}
        ], "edges": [
            {"source": "a.py", "target": "b.py", "kind": "import"},
            {"source": "a.py", "target": "b.py", "kind": "require"}
        ]}"#;
        let graph = parse_analysis_json(raw).unwrap();
        assert_eq!(graph.edges.len(), 2);
    }

    #[test]
    fn optional_metadata_round_trips() {
        let raw = r#"{"nodes": [
            {"id": "a.py", "label": "a", "category": "python",
             "size": 1024, "functionCount": 3, "dependencyCount": 2,
             "externalLibs": ["numpy"]}
        ], "edges": []}"#;
        let graph = parse_analysis_json(raw).unwrap();
        let node = &graph.nodes[0];
        assert_eq!(node.size, Some(1024));
        assert_eq!(node.function_count, Some(3));
        assert_eq!(node.dependency_count, Some(2));
        assert_eq!(node.external_libs, vec!["numpy".to_string()]);
    }

    #[test]
    fn non_object_payload_is_an_error() {
        assert!(parse_analysis_json("[1, 2, 3]").is_err());
        assert!(parse_analysis_json("not json").is_err());
    }

    #[test]
    fn empty_nodes_is_ok_not_an_error() {
        let graph = parse_analysis_json(r#"{"nodes": [], "edges": []}"#).unwrap();
        assert!(graph.is_empty());
    }
}
