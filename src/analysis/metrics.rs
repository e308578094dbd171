use std::collections::{HashMap, VecDeque};

use super::{GraphEdge, GraphNode};

const MOST_CONNECTED_LIMIT: usize = 5;

/// Structural statistics over one graph snapshot.
#[derive(Clone, Debug)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub avg_in_degree: f64,
    pub density: f64,
    pub connected_components: usize,
    pub most_connected: Vec<RankedNode>,
}

#[derive(Clone, Debug)]
pub struct RankedNode {
    pub id: String,
    pub label: String,
    pub category: String,
    pub in_degree: usize,
    pub out_degree: usize,
}

impl RankedNode {
    pub fn degree(&self) -> usize {
        self.in_degree + self.out_degree
    }
}

/// Pure derivation of metrics from a snapshot; `None` when there are no nodes.
/// Edges are assumed pre-validated (both endpoints present), but an edge with
/// an unknown endpoint only skews counts, it cannot panic here.
pub fn compute_metrics(nodes: &[GraphNode], edges: &[GraphEdge]) -> Option<GraphMetrics> {
    if nodes.is_empty() {
        return None;
    }

    let node_count = nodes.len();
    let edge_count = edges.len();

    let mut index_by_id = HashMap::with_capacity(node_count);
    for (index, node) in nodes.iter().enumerate() {
        index_by_id.insert(node.id.as_str(), index);
    }

    let mut in_degree = vec![0usize; node_count];
    let mut out_degree = vec![0usize; node_count];
    let mut undirected: Vec<Vec<usize>> = vec![Vec::new(); node_count];

    for edge in edges {
        let (Some(&source), Some(&target)) = (
            index_by_id.get(edge.source.as_str()),
            index_by_id.get(edge.target.as_str()),
        ) else {
            continue;
        };

        out_degree[source] += 1;
        in_degree[target] += 1;
        undirected[source].push(target);
        undirected[target].push(source);
    }

    let avg_in_degree = edge_count as f64 / node_count as f64;
    let density = if node_count > 1 {
        edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    } else {
        0.0
    };

    let connected_components = count_components(&undirected);

    let mut ranked = (0..node_count).collect::<Vec<_>>();
    // Stable sort so equal degrees keep input order.
    ranked.sort_by(|&a, &b| (in_degree[b] + out_degree[b]).cmp(&(in_degree[a] + out_degree[a])));
    ranked.truncate(MOST_CONNECTED_LIMIT);

    let most_connected = ranked
        .into_iter()
        .map(|index| RankedNode {
            id: nodes[index].id.clone(),
            label: nodes[index].label.clone(),
            category: nodes[index].category.clone(),
            in_degree: in_degree[index],
            out_degree: out_degree[index],
        })
        .collect();

    Some(GraphMetrics {
        node_count,
        edge_count,
        avg_in_degree,
        density,
        connected_components,
        most_connected,
    })
}

/// Weakly-connected component count: BFS from every unvisited seed over the
/// undirected adjacency list.
fn count_components(undirected: &[Vec<usize>]) -> usize {
    let mut visited = vec![false; undirected.len()];
    let mut components = 0usize;
    let mut queue = VecDeque::new();

    for seed in 0..undirected.len() {
        if visited[seed] {
            continue;
        }

        components += 1;
        visited[seed] = true;
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            for &next in &undirected[current] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::EdgeKind;

    fn node(id: &str) -> GraphNode {
        GraphNode {
            id: id.to_owned(),
            label: id.to_owned(),
            category: "python".to_owned(),
            size: None,
            function_count: None,
            dependency_count: None,
            external_libs: Vec::new(),
        }
    }

    fn edge(source: &str, target: &str) -> GraphEdge {
        GraphEdge {
            source: source.to_owned(),
            target: target.to_owned(),
            kind: EdgeKind::Import,
        }
    }

    #[test]
    fn empty_nodes_yield_none() {
        assert!(compute_metrics(&[], &[]).is_none());
        assert!(compute_metrics(&[], &[edge("a", "b")]).is_none());
    }

    #[test]
    fn degree_sums_match_edge_count() {
        let nodes = vec![node("a"), node("b"), node("c"), node("d")];
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("a", "c"), edge("a", "b")];
        let metrics = compute_metrics(&nodes, &edges).unwrap();

        // With four nodes the top-5 ranking covers every node.
        let in_sum: usize = metrics.most_connected.iter().map(|n| n.in_degree).sum();
        let out_sum: usize = metrics.most_connected.iter().map(|n| n.out_degree).sum();
        assert_eq!(in_sum, metrics.edge_count);
        assert_eq!(out_sum, metrics.edge_count);
    }

    #[test]
    fn worked_example_a_b_c() {
        let nodes = vec![node("A"), node("B"), node("C")];
        let edges = vec![edge("A", "B"), edge("B", "C")];
        let metrics = compute_metrics(&nodes, &edges).unwrap();

        assert_eq!(metrics.node_count, 3);
        assert_eq!(metrics.edge_count, 2);
        assert_eq!(metrics.connected_components, 1);
        assert!((metrics.density - 2.0 / 6.0).abs() < 1e-12);
        assert!((metrics.avg_in_degree - 2.0 / 3.0).abs() < 1e-12);

        let ranked = &metrics.most_connected;
        assert_eq!(ranked[0].id, "B");
        assert_eq!((ranked[0].in_degree, ranked[0].out_degree), (1, 1));
        assert_eq!(ranked[1].id, "A");
        assert_eq!((ranked[1].in_degree, ranked[1].out_degree), (0, 1));
        assert_eq!(ranked[2].id, "C");
        assert_eq!((ranked[2].in_degree, ranked[2].out_degree), (1, 0));
    }

    #[test]
    fn density_zero_for_single_node_and_exact_otherwise() {
        let metrics = compute_metrics(&[node("a")], &[]).unwrap();
        assert_eq!(metrics.density, 0.0);

        let nodes = vec![node("a"), node("b")];
        let edges = vec![edge("a", "b"), edge("b", "a"), edge("a", "b")];
        let metrics = compute_metrics(&nodes, &edges).unwrap();
        // Parallel edges may push density above 1; no dedup by design.
        assert!((metrics.density - 3.0 / 2.0).abs() < 1e-12);
    }

    #[test]
    fn component_count_edgeless_equals_node_count() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let metrics = compute_metrics(&nodes, &[]).unwrap();
        assert_eq!(metrics.connected_components, 3);
    }

    #[test]
    fn components_ignore_edge_direction() {
        let nodes = vec![node("a"), node("b"), node("c"), node("d")];
        // a -> b, c -> b: one component despite no directed path a..c.
        let edges = vec![edge("a", "b"), edge("c", "b")];
        let metrics = compute_metrics(&nodes, &edges).unwrap();
        assert_eq!(metrics.connected_components, 2);
    }

    #[test]
    fn ranking_is_non_increasing_and_ties_keep_input_order() {
        let nodes = vec![node("w"), node("x"), node("y"), node("z")];
        let edges = vec![edge("x", "y"), edge("y", "x"), edge("w", "z")];
        let metrics = compute_metrics(&nodes, &edges).unwrap();
        let ranked = &metrics.most_connected;

        for pair in ranked.windows(2) {
            assert!(pair[0].degree() >= pair[1].degree());
        }
        // x and y both have degree 2; w and z both have degree 1.
        assert_eq!(ranked[0].id, "x");
        assert_eq!(ranked[1].id, "y");
        assert_eq!(ranked[2].id, "w");
        assert_eq!(ranked[3].id, "z");
    }

    #[test]
    fn ranking_is_capped_at_five() {
        let nodes = (0..8).map(|i| node(&format!("n{i}"))).collect::<Vec<_>>();
        let edges = (1..8).map(|i| edge("n0", &format!("n{i}"))).collect::<Vec<_>>();
        let metrics = compute_metrics(&nodes, &edges).unwrap();
        assert_eq!(metrics.most_connected.len(), 5);
        assert_eq!(metrics.most_connected[0].id, "n0");
    }
}
