mod analysis;
mod app;
mod util;

use std::path::PathBuf;

use clap::Parser;

/// Renders a repository's file-dependency graph, as emitted by the upstream
/// analysis service, as an interactive force-directed diagram.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the analysis JSON (nodes + edges).
    #[arg(long)]
    input: PathBuf,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "repomap",
        options,
        Box::new(move |cc| Ok(Box::new(app::RepoMapApp::new(cc, args.input.clone())))),
    )
}
