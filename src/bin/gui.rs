use anyhow::Result;
use clap::Parser;
use eframe::egui;
use flow_canvas::{EngineConfig, FlowViewerApp, GraphPayload};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "flow-canvas-gui")]
#[command(about = "Interactive viewer for flow graphs")]
struct Args {
    /// Graph payload (JSON); a built-in sample flow is used when omitted
    #[arg(long, short = 'p')]
    payload: Option<PathBuf>,

    /// Engine configuration (JSON)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Start with node dragging disabled
    #[arg(long)]
    locked: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let payload = match &args.payload {
        Some(path) => GraphPayload::load(path)?,
        None => GraphPayload::sample(),
    };

    if args.locked {
        config.edit_mode = false;
    }

    let app = FlowViewerApp::from_payload(config, &payload)?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Flow Canvas"),
        ..Default::default()
    };

    eframe::run_native(
        "Flow Canvas",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("Viewer failed: {}", e))
}
