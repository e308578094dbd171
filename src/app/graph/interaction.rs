use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::render_utils::screen_to_world;
use super::super::{HoverFrame, ViewModel};

/// On-screen distance within which a pointer counts as "over" a node. This is
/// a floor, not a fixed threshold: a node drawn larger than this is pickable
/// across its whole circle, so the effective reach per node is
/// `max(drawn radius, PICK_RADIUS)`. Pointers outside that reach for every
/// node never match.
pub(in crate::app) const PICK_RADIUS: f32 = 10.0;

/// Nearest node under the pointer, by squared distance. A linear scan over
/// every node; at repository scale (hundreds of files) a spatial index would
/// cost more than it saves.
pub(in crate::app) fn hit_test(pointer: Pos2, positions: &[Pos2], radii: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (index, position) in positions.iter().enumerate() {
        let pick = radii.get(index).copied().unwrap_or(0.0).max(PICK_RADIUS);
        let distance_sq = position.distance_sq(pointer);
        if distance_sq <= pick * pick && best.is_none_or(|(_, nearest)| distance_sq < nearest) {
            best = Some((index, distance_sq));
        }
    }

    best.map(|(index, _)| index)
}

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 6.0);
        self.pan = pointer - rect.left_top() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// The frame's hover snapshot: latest pointer position wins, computed
    /// once and passed by value into the draw pass.
    pub(in crate::app) fn hover_frame(
        ui: &Ui,
        rect: Rect,
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> HoverFrame {
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer));

        HoverFrame {
            hovered: pointer.and_then(|pointer| hit_test(pointer, screen_positions, screen_radii)),
            pointer,
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    #[test]
    fn pointer_exactly_on_a_node_hits_it() {
        let positions = vec![pos2(100.0, 100.0), pos2(400.0, 250.0)];
        let radii = vec![8.0, 8.0];
        assert_eq!(hit_test(pos2(400.0, 250.0), &positions, &radii), Some(1));
    }

    #[test]
    fn pointer_beyond_pick_radius_misses() {
        let positions = vec![pos2(100.0, 100.0)];
        let radii = vec![8.0];
        assert_eq!(hit_test(pos2(100.0, 111.0), &positions, &radii), None);
        assert_eq!(hit_test(pos2(500.0, 500.0), &positions, &radii), None);
    }

    #[test]
    fn pointer_within_pick_radius_hits() {
        let positions = vec![pos2(100.0, 100.0)];
        let radii = vec![4.0];
        // Drawn radius is 4 but the pick radius floor is 10.
        assert_eq!(hit_test(pos2(106.0, 100.0), &positions, &radii), Some(0));
    }

    #[test]
    fn nearest_of_overlapping_nodes_wins() {
        let positions = vec![pos2(100.0, 100.0), pos2(104.0, 100.0)];
        let radii = vec![10.0, 10.0];
        assert_eq!(hit_test(pos2(103.0, 100.0), &positions, &radii), Some(1));
        assert_eq!(hit_test(pos2(101.0, 100.0), &positions, &radii), Some(0));
    }

    #[test]
    fn large_node_extends_its_pick_area() {
        let positions = vec![pos2(200.0, 200.0)];
        let radii = vec![30.0];
        // Reach is the drawn radius once it exceeds the pick-radius floor.
        assert_eq!(hit_test(pos2(225.0, 200.0), &positions, &radii), Some(0));
        assert_eq!(hit_test(pos2(231.0, 200.0), &positions, &radii), None);
    }

    #[test]
    fn empty_position_set_never_matches() {
        assert_eq!(hit_test(pos2(0.0, 0.0), &[], &[]), None);
    }
}
