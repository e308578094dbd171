use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::analysis::{DependencyGraph, EdgeKind, GraphMetrics, load_analysis_file};

mod graph;
mod physics;
mod render_utils;
mod ui;

pub struct RepoMapApp {
    input_path: PathBuf,
    state: AppState,
    reload_rx: Option<Receiver<Result<DependencyGraph, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<DependencyGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    graph: DependencyGraph,
    metrics: Option<GraphMetrics>,
    search: String,
    pan: Vec2,
    zoom: f32,
    physics_repulsion: f32,
    physics_attraction: f32,
    physics_damping: f32,
    physics_ticks: u32,
    show_edge_labels: bool,
    show_quadtree_overlay: bool,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
    graph_dirty: bool,
    graph_cache: Option<RenderGraph>,
    search_match_cache: Option<SearchMatchCache>,
    visible_node_count: usize,
    visible_edge_count: usize,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

/// The arena the simulation and renderer work on: dense per-node records plus
/// an id -> index map, rebuilt whenever the snapshot changes. Records for ids
/// no longer in the snapshot are pruned at rebuild; surviving ids keep their
/// position so re-layouts feel stable rather than jarring.
struct RenderGraph {
    nodes: Vec<RenderNode>,
    edges: Vec<RenderEdge>,
    index_by_id: HashMap<String, usize>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    physics_scratch: PhysicsScratch,
    view_scratch: ViewScratch,
}

struct RenderNode {
    id: String,
    /// Index into the snapshot's node list for metadata lookups.
    node_index: usize,
    world_pos: Vec2,
    velocity: Vec2,
    base_radius: f32,
}

struct RenderEdge {
    from: usize,
    to: usize,
    kind: EdgeKind,
}

#[derive(Default)]
struct PhysicsScratch {
    forces: Vec<Vec2>,
    positions: Vec<Vec2>,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
    visible_mask: Vec<bool>,
    quadtree_positions: Vec<Vec2>,
    quadtree_cells: Vec<physics::QuadtreeCell>,
}

#[derive(Clone, Copy)]
struct PhysicsConfig {
    repulsion_scale: f32,
    attraction_scale: f32,
    damping: f32,
    bounds: Vec2,
}

/// Hover computed once at the top of a frame and passed by value into the
/// draw pass, so every draw call sees the same snapshot.
#[derive(Clone, Copy, Default)]
struct HoverFrame {
    hovered: Option<usize>,
    pointer: Option<Pos2>,
}

impl RepoMapApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, input_path: PathBuf) -> Self {
        let state = Self::start_load(input_path.clone());
        Self {
            input_path,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(input_path: PathBuf) -> Receiver<Result<DependencyGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result =
                load_analysis_file(Path::new(&input_path)).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(input_path: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(input_path),
        }
    }
}

impl eframe::App for RepoMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(graph) => AppState::Ready(Box::new(ViewModel::new(graph))),
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading dependency graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load dependency graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.input_path.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.input_path, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.input_path.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(new_graph)) => model.replace_snapshot(new_graph),
                        Ok(Err(error)) => transition = Some(AppState::Error(error)),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
