use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, Ui};

use crate::util::short_name;

use super::super::ViewModel;
use super::super::render_utils::category_color;

impl ViewModel {
    pub(in crate::app) fn draw_metrics(&self, ui: &mut Ui) {
        ui.heading("Graph metrics");
        ui.add_space(6.0);

        let Some(metrics) = &self.metrics else {
            ui.label("No data.");
            return;
        };

        egui::Grid::new("metrics_grid")
            .num_columns(2)
            .spacing([18.0, 4.0])
            .show(ui, |ui| {
                ui.label("Nodes");
                ui.label(metrics.node_count.to_string());
                ui.end_row();

                ui.label("Edges");
                ui.label(metrics.edge_count.to_string());
                ui.end_row();

                ui.label("Avg in-degree");
                ui.label(format!("{:.2}", metrics.avg_in_degree));
                ui.end_row();

                ui.label("Density");
                ui.label(format!("{:.3}", metrics.density));
                ui.end_row();

                ui.label("Components");
                ui.label(metrics.connected_components.to_string());
                ui.end_row();
            });

        ui.add_space(10.0);
        ui.separator();
        ui.heading("Most connected");
        ui.add_space(4.0);

        for ranked in &metrics.most_connected {
            ui.horizontal(|ui| {
                ui.label(RichText::new("●").color(category_color(&ranked.category)));
                ui.label(short_name(&ranked.id));
                ui.label(
                    RichText::new(format!(
                        "{} (in {} / out {})",
                        ranked.degree(),
                        ranked.in_degree,
                        ranked.out_degree
                    ))
                    .color(Color32::from_gray(160)),
                );
            });
        }

        ui.add_space(10.0);
        ui.separator();
        ui.heading("Legend");
        ui.add_space(4.0);

        let categories = self
            .graph
            .nodes
            .iter()
            .map(|node| node.category.as_str())
            .collect::<BTreeSet<_>>();
        for category in categories {
            ui.horizontal(|ui| {
                ui.label(RichText::new("●").color(category_color(category)));
                ui.label(category);
            });
        }
    }
}
