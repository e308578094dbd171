use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

/// Direction for a coincident pair, derived from the pair's indices so the
/// two nodes are pushed along different axes and actually separate.
fn separation_direction(index: usize, other: usize) -> Vec2 {
    let angle =
        ((index as f32) * 0.618_034 + (other as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Inverse-square repulsion between two points. The `+ 1` on the distance
/// keeps coincident nodes from producing a singular force.
fn repulsion_between(point: Vec2, other: Vec2, strength: f32, fallback: Vec2) -> Vec2 {
    let delta = point - other;
    let distance = delta.length() + 1.0;
    let direction = if distance > 1.0001 {
        delta / distance
    } else {
        fallback
    };
    direction * (strength / (distance * distance))
}

/// Accumulates repulsion on one node, walking the quadtree Barnes-Hut style:
/// cells far enough away (side/distance below theta) act as a single body at
/// their center of mass, everything nearer is resolved exactly.
pub(super) fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
    force: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            *force += repulsion_between(
                point,
                positions[other_index],
                strength,
                separation_direction(index, other_index),
            );
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance = delta.length().max(0.0001);
    let can_approximate = !node.bounds.contains(point)
        && ((node.bounds.side_length() / distance) < theta)
        && node.mass > 1.0;

    if can_approximate {
        *force += repulsion_between(
            point,
            node.center_of_mass,
            strength * node.mass,
            separation_direction(index, 0),
        );
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(child, index, positions, strength, theta, force);
    }
}
