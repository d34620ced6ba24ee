use anyhow::{Context, Result};
use clap::Parser;
use flow_canvas::{DiagramEngine, EngineConfig, GraphPayload};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "flow-canvas")]
#[command(about = "Load a flow graph, fit it to a viewport and print the engine outputs")]
struct Args {
    /// Graph payload (JSON); a built-in sample flow is used when omitted
    #[arg(long, short = 'p')]
    payload: Option<PathBuf>,

    /// Engine configuration (JSON)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Viewport width used for the initial fit
    #[arg(long, default_value_t = 800.0)]
    width: f64,

    /// Viewport height used for the initial fit
    #[arg(long, default_value_t = 600.0)]
    height: f64,

    /// Print the scene event log as JSON
    #[arg(long)]
    events: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let payload = match &args.payload {
        Some(path) => GraphPayload::load(path)?,
        None => {
            info!("no payload given, using the sample flow");
            GraphPayload::sample()
        }
    };

    let mut engine =
        DiagramEngine::with_payload(config, &payload).context("Failed to build the diagram")?;
    engine.reset_to_fit(args.width, args.height);

    println!("transform: {}", engine.viewport().transform());
    println!("disabled:  {}", engine.serialize_disabled());
    println!("nodes:     {}", engine.node_values());

    if args.events {
        let events = engine.drain_events();
        println!("{}", serde_json::to_string_pretty(&events)?);
    }

    Ok(())
}
