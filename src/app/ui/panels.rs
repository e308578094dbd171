use std::collections::VecDeque;
use std::path::Path;

use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::analysis::{DependencyGraph, compute_metrics};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(graph: DependencyGraph) -> Self {
        let metrics = compute_metrics(&graph.nodes, &graph.edges);

        Self {
            graph,
            metrics,
            search: String::new(),
            pan: Vec2::ZERO,
            zoom: 1.0,
            physics_repulsion: 1.0,
            physics_attraction: 1.0,
            physics_damping: 0.92,
            physics_ticks: 0,
            show_edge_labels: true,
            show_quadtree_overlay: false,
            show_fps_bar: true,
            fps_current: 0.0,
            fps_samples: VecDeque::new(),
            graph_dirty: true,
            graph_cache: None,
            search_match_cache: None,
            visible_node_count: 0,
            visible_edge_count: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        input_path: &Path,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        self.update_fps_counter(ctx);
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("repomap");
                    ui.separator();
                    ui.label(format!("file: {}", input_path.display()));
                    ui.label(format!("nodes: {}", self.graph.nodes.len()));
                    ui.label(format!("edges: {}", self.graph.edges.len()));
                    if self.graph.dropped_nodes > 0 || self.graph.dropped_edges > 0 {
                        ui.colored_label(
                            egui::Color32::from_rgb(233, 172, 88),
                            format!(
                                "dropped: {} nodes / {} edges",
                                self.graph.dropped_nodes, self.graph.dropped_edges
                            ),
                        );
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload analysis"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if let Some(fps_text) = self.fps_display_text() {
                            ui.label(fps_text);
                        }
                        ui.label(format!(
                            "visible: {} nodes / {} edges",
                            self.visible_node_count, self.visible_edge_count
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(280.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("metrics")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_metrics(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading dependency graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }
}
