use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Slider, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::util::short_name;

use super::super::physics::TICK_CAP;
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    /// Render-arena indices matching the search box, cached per query; the
    /// cache is invalidated whenever the arena is rebuilt.
    pub(in crate::app) fn search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let cache = self.graph_cache.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = cache
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, short_name(&node.id), query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Search");
        ui.add_space(4.0);
        ui.add(egui::TextEdit::singleline(&mut self.search).hint_text("file name..."));
        if let Some(matches) = self.search_matches() {
            ui.label(format!("{} file(s) matched", matches.len()));
        }

        ui.add_space(10.0);
        ui.separator();
        ui.heading("Layout");
        ui.add_space(4.0);

        ui.add(
            Slider::new(&mut self.physics_repulsion, 0.1..=4.0)
                .text("repulsion")
                .logarithmic(true),
        );
        ui.add(
            Slider::new(&mut self.physics_attraction, 0.1..=4.0)
                .text("attraction")
                .logarithmic(true),
        );
        ui.add(Slider::new(&mut self.physics_damping, 0.5..=0.99).text("damping"));

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui.button("Re-run layout").clicked() {
                self.physics_ticks = 0;
            }
            if self.physics_ticks < TICK_CAP {
                ui.label(format!("running ({}/{TICK_CAP})", self.physics_ticks));
            } else {
                ui.label("settled");
            }
        });

        ui.add_space(10.0);
        ui.separator();
        ui.heading("Display");
        ui.add_space(4.0);
        ui.checkbox(&mut self.show_edge_labels, "Edge kind labels on hover");
        ui.checkbox(&mut self.show_quadtree_overlay, "Quadtree overlay");
        ui.checkbox(&mut self.show_fps_bar, "FPS readout");
    }
}
