use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::analysis::{DependencyGraph, compute_metrics};
use crate::util::stable_pair;

use super::super::physics::{CANVAS_PADDING, DEFAULT_BOUNDS};
use super::super::render_utils::node_radius;
use super::super::{
    PhysicsScratch, RenderEdge, RenderGraph, RenderNode, ViewModel, ViewScratch,
};

impl ViewModel {
    /// Deterministic scatter inside the padded default canvas.
    fn initial_position(id: &str) -> Vec2 {
        let (jx, jy) = stable_pair(id);
        let half = DEFAULT_BOUNDS * 0.5 - vec2(CANVAS_PADDING, CANVAS_PADDING);
        DEFAULT_BOUNDS * 0.5 + vec2(jx * half.x, jy * half.y)
    }

    /// Installs a freshly loaded snapshot. Metrics are recomputed once here;
    /// the render arena is rebuilt lazily on the next frame.
    pub(in crate::app) fn replace_snapshot(&mut self, graph: DependencyGraph) {
        self.metrics = compute_metrics(&graph.nodes, &graph.edges);
        self.graph = graph;
        self.graph_dirty = true;
    }

    /// Rebuilds the render arena from the current snapshot. Nodes whose id
    /// survived keep their position and velocity; ids gone from the snapshot
    /// are pruned outright. If any id is new, the tick cap is re-armed so the
    /// simulation runs again and folds the newcomers into the layout.
    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        self.search_match_cache = None;

        if self.graph.nodes.is_empty() {
            self.graph_cache = None;
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            self.graph_dirty = false;
            return;
        }

        let mut min_size = u64::MAX;
        let mut max_size = 1u64;
        for node in &self.graph.nodes {
            let size = node.size.unwrap_or(1).max(1);
            min_size = min_size.min(size);
            max_size = max_size.max(size);
        }
        if min_size == u64::MAX {
            min_size = 1;
        }

        let mut prior_nodes = self
            .graph_cache
            .take()
            .map(|cache| {
                cache
                    .nodes
                    .into_iter()
                    .map(|node| (node.id.clone(), node))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();

        let mut index_by_id = HashMap::with_capacity(self.graph.nodes.len());
        let mut nodes = Vec::with_capacity(self.graph.nodes.len());
        let mut any_new = false;

        for (node_index, snapshot_node) in self.graph.nodes.iter().enumerate() {
            let size = snapshot_node.size.unwrap_or(1).max(1);
            let base_radius = node_radius(size, min_size, max_size);

            let render_node = match prior_nodes.remove(&snapshot_node.id) {
                Some(mut node) => {
                    node.node_index = node_index;
                    node.base_radius = base_radius;
                    node
                }
                None => {
                    any_new = true;
                    RenderNode {
                        id: snapshot_node.id.clone(),
                        node_index,
                        world_pos: Self::initial_position(&snapshot_node.id),
                        velocity: Vec2::ZERO,
                        base_radius,
                    }
                }
            };

            index_by_id.insert(snapshot_node.id.clone(), nodes.len());
            nodes.push(render_node);
        }

        let mut edges = Vec::with_capacity(self.graph.edges.len());
        let mut outgoing = vec![Vec::new(); nodes.len()];
        let mut incoming = vec![Vec::new(); nodes.len()];
        for edge in &self.graph.edges {
            let (Some(&from), Some(&to)) = (
                index_by_id.get(edge.source.as_str()),
                index_by_id.get(edge.target.as_str()),
            ) else {
                continue;
            };

            outgoing[from].push(to);
            incoming[to].push(from);
            edges.push(RenderEdge {
                from,
                to,
                kind: edge.kind,
            });
        }

        self.visible_node_count = nodes.len();
        self.visible_edge_count = edges.len();
        self.graph_cache = Some(RenderGraph {
            nodes,
            edges,
            index_by_id,
            outgoing,
            incoming,
            physics_scratch: PhysicsScratch::default(),
            view_scratch: ViewScratch::default(),
        });

        if any_new {
            self.physics_ticks = 0;
        }
        self.graph_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use crate::analysis::{DependencyGraph, EdgeKind, GraphEdge, GraphNode, parse_analysis_json};

    use super::super::super::ViewModel;
    use super::super::super::physics::TICK_CAP;

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

    fn snapshot(ids: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        DependencyGraph {
            nodes: ids.iter().map(|id| node(id)).collect(),
            edges: edges
                .iter()
                .map(|&(source, target)| GraphEdge {
                    source: source.to_owned(),
                    target: target.to_owned(),
                    kind: EdgeKind::Import,
                })
                .collect(),
            dropped_nodes: 0,
            dropped_edges: 0,
        }
    }

    #[test]
    fn rebuild_maps_edges_to_indices() {
        let mut model = ViewModel::new(snapshot(&["a", "b", "c"], &[("a", "b"), ("b", "c")]));
        model.rebuild_render_graph();

        let cache = model.graph_cache.as_ref().unwrap();
        assert_eq!(cache.nodes.len(), 3);
        assert_eq!(cache.edges.len(), 2);
        assert_eq!(cache.outgoing[cache.index_by_id["a"]], vec![cache.index_by_id["b"]]);
        assert_eq!(cache.incoming[cache.index_by_id["c"]], vec![cache.index_by_id["b"]]);
    }

    #[test]
    fn surviving_ids_keep_positions_and_stale_ids_are_pruned() {
        let mut model = ViewModel::new(snapshot(&["a", "b", "c"], &[]));
        model.rebuild_render_graph();

        {
            let cache = model.graph_cache.as_mut().unwrap();
            let index = cache.index_by_id["b"];
            cache.nodes[index].world_pos = vec2(333.0, 222.0);
        }

        model.replace_snapshot(snapshot(&["b", "d"], &[]));
        model.rebuild_render_graph();

        let cache = model.graph_cache.as_ref().unwrap();
        assert_eq!(cache.nodes.len(), 2);
        assert!(!cache.index_by_id.contains_key("a"));
        let kept = &cache.nodes[cache.index_by_id["b"]];
        assert_eq!(kept.world_pos, vec2(333.0, 222.0));
    }

    #[test]
    fn new_node_ids_rearm_the_tick_cap() {
        let mut model = ViewModel::new(snapshot(&["a"], &[]));
        model.rebuild_render_graph();
        model.physics_ticks = TICK_CAP;

        // Same ids again: stays settled.
        model.replace_snapshot(snapshot(&["a"], &[]));
        model.rebuild_render_graph();
        assert_eq!(model.physics_ticks, TICK_CAP);

        // A new id re-arms the cap.
        model.replace_snapshot(snapshot(&["a", "fresh"], &[]));
        model.rebuild_render_graph();
        assert_eq!(model.physics_ticks, 0);
    }

    #[test]
    fn empty_snapshot_clears_the_cache() {
        let mut model = ViewModel::new(snapshot(&["a"], &[]));
        model.rebuild_render_graph();
        assert!(model.graph_cache.is_some());

        model.replace_snapshot(parse_analysis_json(r#"{"nodes": [], "edges": []}"#).unwrap());
        model.rebuild_render_graph();
        assert!(model.graph_cache.is_none());
        assert!(model.metrics.is_none());
    }
}
