use std::collections::HashSet;

use eframe::egui::{
    self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2, vec2,
};

use crate::analysis::EdgeKind;
use crate::util::format_bytes;

use super::super::physics::{TICK_CAP, quadtree_cells, step_physics};
use super::super::render_utils::{
    blend_color, category_color, circle_visible, dim_color, draw_background, draw_node_glow,
    edge_visible, world_to_screen,
};
use super::super::{HoverFrame, PhysicsConfig, RenderGraph, ViewModel};

fn edge_kind_color(kind: EdgeKind) -> Color32 {
    match kind {
        EdgeKind::Import => Color32::from_rgb(108, 164, 238),
        EdgeKind::Require => Color32::from_rgb(233, 172, 88),
        EdgeKind::Internal => Color32::from_rgb(128, 198, 136),
    }
}

fn draw_arrowhead(painter: &egui::Painter, tip: Pos2, direction: Vec2, size: f32, color: Color32) {
    let perp = vec2(-direction.y, direction.x);
    let base = tip - direction * size;
    painter.add(Shape::convex_polygon(
        vec![tip, base + perp * (size * 0.45), base - perp * (size * 0.45)],
        color,
        Stroke::NONE,
    ));
}

impl ViewModel {
    fn update_screen_space(rect: egui::Rect, pan: Vec2, zoom: f32, cache: &mut RenderGraph) {
        let scratch = &mut cache.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        scratch.screen_positions.reserve(cache.nodes.len());
        scratch.screen_radii.reserve(cache.nodes.len());

        for node in &cache.nodes {
            scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, node.world_pos));
            scratch
                .screen_radii
                .push((node.base_radius * zoom.powf(0.40)).clamp(2.5, 40.0));
        }

        scratch.visible_indices.clear();
        scratch.visible_mask.clear();
        scratch.visible_mask.resize(cache.nodes.len(), false);
        for index in 0..cache.nodes.len() {
            if circle_visible(rect, scratch.screen_positions[index], scratch.screen_radii[index]) {
                scratch.visible_indices.push(index);
                scratch.visible_mask[index] = true;
            }
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let search_matches = self.search_matches();
        let pan = self.pan;
        let zoom = self.zoom;
        let zoom_sqrt = zoom.sqrt();
        let show_edge_labels = self.show_edge_labels;
        let show_quadtree_overlay = self.show_quadtree_overlay;
        let running = self.physics_ticks < TICK_CAP;
        let physics = PhysicsConfig {
            repulsion_scale: self.physics_repulsion,
            attraction_scale: self.physics_attraction,
            damping: self.physics_damping,
            bounds: rect.size(),
        };

        let Some(cache) = self.graph_cache.as_mut() else {
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No analysis data to display",
                FontId::proportional(15.0),
                Color32::from_gray(150),
            );
            return;
        };

        // One writer then one reader per frame: physics first, draw after.
        // While ticks remain the next frame is always scheduled, so
        // the cap winds down even when the layout has already gone quiet.
        if running {
            step_physics(cache, physics);
            self.physics_ticks += 1;
        }
        if (running && self.physics_ticks < TICK_CAP) || response.dragged() {
            ui.ctx().request_repaint();
        }

        Self::update_screen_space(rect, pan, zoom, cache);
        self.visible_node_count = cache.view_scratch.visible_indices.len();

        if show_quadtree_overlay {
            quadtree_cells(
                &cache.nodes,
                &mut cache.view_scratch.quadtree_positions,
                &mut cache.view_scratch.quadtree_cells,
            );
            for cell in &cache.view_scratch.quadtree_cells {
                let min = cell.center - vec2(cell.half_extent, cell.half_extent);
                let max = cell.center + vec2(cell.half_extent, cell.half_extent);
                let top_left = world_to_screen(rect, pan, zoom, min);
                let bottom_right = world_to_screen(rect, pan, zoom, max);

                let alpha = if cell.is_leaf { 110 } else { 55 };
                let line_width =
                    (1.4_f32 - (cell.depth as f32 * 0.09_f32)).clamp(0.45_f32, 1.4_f32);
                painter.rect_stroke(
                    egui::Rect::from_min_max(top_left, bottom_right),
                    0.0,
                    Stroke::new(
                        line_width,
                        Color32::from_rgba_unmultiplied(106, 198, 255, alpha),
                    ),
                    egui::StrokeKind::Middle,
                );
            }
        }

        let hover = Self::hover_frame(
            ui,
            rect,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
        );
        let hover_active = hover.hovered.is_some();

        if hover_active {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        // Adjacency of the hovered node, either edge direction.
        let hover_neighbors: HashSet<usize> = hover
            .hovered
            .map(|hovered| {
                cache.outgoing[hovered]
                    .iter()
                    .chain(cache.incoming[hovered].iter())
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        let mut drawn_edges = 0usize;
        for edge in &cache.edges {
            let start = cache.view_scratch.screen_positions[edge.from];
            let end = cache.view_scratch.screen_positions[edge.to];
            let from_visible = cache.view_scratch.visible_mask[edge.from];
            let to_visible = cache.view_scratch.visible_mask[edge.to];
            if !from_visible && !to_visible && !edge_visible(rect, start, end, 2.5) {
                continue;
            }

            let span = end - start;
            let length = span.length();
            let radius_from = cache.view_scratch.screen_radii[edge.from];
            let radius_to = cache.view_scratch.screen_radii[edge.to];
            if length <= radius_from + radius_to + 4.0 {
                continue;
            }

            let direction = span / length;
            let arrow_size = (7.0 * zoom_sqrt).clamp(5.0, 11.0);
            // Touch the node boundary, not its center; leave room for the arrow.
            let line_start = start + direction * (radius_from + 1.0);
            let line_end = end - direction * (radius_to + 2.0);

            let touches_hover = hover.hovered == Some(edge.from) || hover.hovered == Some(edge.to);
            let (width, color) = if touches_hover {
                ((2.4 * zoom_sqrt).clamp(1.4, 4.0), edge_kind_color(edge.kind))
            } else if hover_active {
                (
                    (0.9 * zoom_sqrt).clamp(0.5, 2.0),
                    Color32::from_rgba_unmultiplied(70, 76, 84, 70),
                )
            } else {
                (
                    (1.2 * zoom_sqrt).clamp(0.6, 3.0),
                    Color32::from_rgba_unmultiplied(112, 118, 126, 170),
                )
            };

            painter.line_segment(
                [line_start, line_end - direction * (arrow_size * 0.6)],
                Stroke::new(width, color),
            );
            draw_arrowhead(&painter, line_end, direction, arrow_size, color);

            if show_edge_labels && touches_hover {
                let midpoint = line_start + (line_end - line_start) * 0.5;
                painter.text(
                    midpoint + vec2(0.0, -7.0),
                    Align2::CENTER_BOTTOM,
                    edge.kind.label(),
                    FontId::proportional(10.5),
                    Color32::from_gray(205),
                );
            }
            drawn_edges += 1;
        }
        self.visible_edge_count = drawn_edges;

        for &index in &cache.view_scratch.visible_indices {
            let node = &cache.nodes[index];
            let position = cache.view_scratch.screen_positions[index];
            let mut radius = cache.view_scratch.screen_radii[index];

            let is_hovered = hover.hovered == Some(index);
            let is_connected = hover_neighbors.contains(&index);
            let is_search_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let meta = &self.graph.nodes[node.node_index];
            let base_color = category_color(&meta.category);

            let color = if is_hovered {
                radius *= 1.25;
                blend_color(base_color, Color32::WHITE, 0.22)
            } else if is_connected {
                base_color
            } else if hover_active {
                dim_color(base_color, 0.42)
            } else if search_active && !is_search_match {
                dim_color(base_color, 0.38)
            } else if is_search_match {
                Color32::from_rgb(103, 196, 255)
            } else {
                base_color
            };

            if is_hovered || is_connected {
                draw_node_glow(&painter, position, radius, base_color);
            }

            painter.circle_filled(position, radius, color);
            let (stroke_width, stroke_color) = if is_hovered {
                (2.2, Color32::from_gray(235))
            } else if is_connected || is_search_match {
                (1.6, Color32::from_gray(200))
            } else {
                (1.0, Color32::from_rgba_unmultiplied(12, 14, 16, 190))
            };
            painter.circle_stroke(position, radius, Stroke::new(stroke_width, stroke_color));

            let show_label = is_hovered
                || is_connected
                || (is_search_match && zoom > 0.35)
                || radius > 14.0
                || zoom > 1.35;
            if show_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    &meta.label,
                    FontId::proportional(12.0),
                    Color32::from_gray(235),
                );
            }
        }

        if let (Some(hovered), Some(pointer)) = (hover.hovered, hover.pointer) {
            let meta = &self.graph.nodes[cache.nodes[hovered].node_index];
            egui::show_tooltip_at(
                ui.ctx(),
                ui.layer_id(),
                egui::Id::new("node-tooltip"),
                pointer + vec2(14.0, 14.0),
                |ui| {
                    ui.set_max_width(320.0);
                    ui.strong(&meta.label);
                    ui.label(&meta.id);
                    ui.label(format!("category: {}", meta.category));
                    if let Some(size) = meta.size {
                        ui.label(format!("size: {}", format_bytes(size)));
                    }
                    if let Some(functions) = meta.function_count {
                        ui.label(format!("functions: {functions}"));
                    }
                    if let Some(dependencies) = meta.dependency_count {
                        ui.label(format!("dependencies: {dependencies}"));
                    }
                    if !meta.external_libs.is_empty() {
                        let mut shown =
                            meta.external_libs.iter().take(3).cloned().collect::<Vec<_>>();
                        if meta.external_libs.len() > 3 {
                            shown.push(format!("+{} more", meta.external_libs.len() - 3));
                        }
                        ui.label(format!("external: {}", shown.join(", ")));
                    }
                },
            );
        }
    }
}
