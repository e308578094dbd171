mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

use super::{PhysicsConfig, RenderGraph};
use forces::accumulate_repulsion_for_node;
pub(in crate::app) use quadtree::QuadtreeCell;
use quadtree::{QuadNode, collect_quadtree_cells};

/// Physics stops after this many ticks; the layout then free-runs as a
/// render-only settled state. Re-armed when a snapshot brings new node ids.
pub(in crate::app) const TICK_CAP: u32 = 300;

/// Nodes are clamped into [padding, dimension - padding] on both axes.
pub(in crate::app) const CANVAS_PADDING: f32 = 24.0;

/// World bounds used before the first frame reports the real canvas size.
pub(in crate::app) const DEFAULT_BOUNDS: Vec2 = vec2(1280.0, 800.0);

const BARNES_HUT_THETA: f32 = 0.72;
const REPULSION_STRENGTH: f32 = 4200.0;
const ATTRACTION_STRENGTH: f32 = 0.012;
const CENTER_PULL: f32 = 0.0045;

const MIN_SLEEP_SPEED_SQ: f32 = 0.015 * 0.015;
const MIN_SLEEP_FORCE_SQ: f32 = 0.05 * 0.05;

pub(in crate::app) fn quadtree_cells(
    nodes: &[super::RenderNode],
    positions: &mut Vec<Vec2>,
    cells: &mut Vec<QuadtreeCell>,
) {
    positions.clear();
    positions.reserve(nodes.len());
    for node in nodes {
        positions.push(node.world_pos);
    }

    cells.clear();
    let Some(quadtree) = QuadNode::build(positions) else {
        return;
    };

    collect_quadtree_cells(&quadtree, 0, cells);
}

/// One simulation tick over the arena: all-node repulsion (Barnes-Hut
/// approximated), per-edge spring attraction, a weak pull toward the canvas
/// center, damped integration, then a mirrored clamp into the canvas bounds.
/// Returns whether anything still moved.
pub(in crate::app) fn step_physics(cache: &mut RenderGraph, config: PhysicsConfig) -> bool {
    let node_count = cache.nodes.len();
    if node_count == 0 {
        return false;
    }

    let scratch = &mut cache.physics_scratch;
    scratch.forces.clear();
    scratch.forces.resize(node_count, Vec2::ZERO);
    scratch.positions.clear();
    scratch.positions.reserve(node_count);
    for node in &cache.nodes {
        scratch.positions.push(node.world_pos);
    }

    let forces = &mut scratch.forces;
    let positions = &scratch.positions;

    let repulsion = REPULSION_STRENGTH * config.repulsion_scale.clamp(0.1, 4.0);
    let attraction = ATTRACTION_STRENGTH * config.attraction_scale.clamp(0.1, 4.0);
    let damping = config.damping.clamp(0.5, 0.99);
    let center = config.bounds * 0.5;

    if node_count > 1
        && let Some(quadtree) = QuadNode::build(positions)
    {
        for (index, force) in forces.iter_mut().enumerate() {
            accumulate_repulsion_for_node(
                &quadtree,
                index,
                positions,
                repulsion,
                BARNES_HUT_THETA,
                force,
            );
        }
    }

    // Spring attraction proportional to distance: delta * C is d * C along
    // the edge direction. Long range it beats the inverse-square repulsion,
    // short range repulsion wins, which is what keeps endpoints separated.
    for edge in &cache.edges {
        if edge.from >= node_count || edge.to >= node_count || edge.from == edge.to {
            continue;
        }

        let pull = (positions[edge.to] - positions[edge.from]) * attraction;
        forces[edge.from] += pull;
        forces[edge.to] -= pull;
    }

    for (index, force) in forces.iter_mut().enumerate() {
        *force += (center - positions[index]) * CENTER_PULL;
    }

    let mut any_motion = false;
    for (index, force) in forces.iter().enumerate() {
        let node = &mut cache.nodes[index];
        let force_sq = force.length_sq();

        let mut velocity = (node.velocity + *force) * damping;
        let speed_sq = velocity.length_sq();
        if speed_sq < MIN_SLEEP_SPEED_SQ && force_sq < MIN_SLEEP_FORCE_SQ {
            velocity = Vec2::ZERO;
        }

        node.velocity = velocity;
        node.world_pos += velocity;
        clamp_mirrored(&mut node.world_pos, &mut node.velocity, config.bounds);

        if node.velocity.length_sq() > 0.000_001 {
            any_motion = true;
        }
    }

    any_motion
}

/// Clamps a position into the padded canvas rectangle, reflecting the
/// velocity component that hit the wall. Non-finite positions (which a
/// pathological force balance could produce) snap back to the center.
fn clamp_mirrored(position: &mut Vec2, velocity: &mut Vec2, bounds: Vec2) {
    let max_x = (bounds.x - CANVAS_PADDING).max(CANVAS_PADDING);
    let max_y = (bounds.y - CANVAS_PADDING).max(CANVAS_PADDING);

    if !position.x.is_finite() || !position.y.is_finite() {
        *position = bounds * 0.5;
        *velocity = Vec2::ZERO;
        return;
    }

    if position.x < CANVAS_PADDING {
        position.x = CANVAS_PADDING;
        velocity.x = -velocity.x;
    } else if position.x > max_x {
        position.x = max_x;
        velocity.x = -velocity.x;
    }

    if position.y < CANVAS_PADDING {
        position.y = CANVAS_PADDING;
        velocity.y = -velocity.y;
    } else if position.y > max_y {
        position.y = max_y;
        velocity.y = -velocity.y;
    }
}
