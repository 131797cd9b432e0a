mod controller;
mod render;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use mission_core::{
    analysis_service_from_settings, load_settings, spawn_orchestrator, MissionSnapshot,
    MissionState, OrchestratorOptions, Settings,
};
use registry::{intervention_catalog, CityRegistry};
use shared::domain::CityId;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::watch,
};
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tracing::error;
use tracing_subscriber::EnvFilter;

use controller::{
    commands::{parse_command, ConsoleCommand, ParseError, HELP},
    orchestration::{dispatch_mission_command, resolve_city_args},
};
use render::{render_cities, render_interventions, render_status, FrameTracker};

#[derive(Parser, Debug)]
#[command(name = "twin_skies", about = "Air-quality mission console")]
struct Args {
    /// Settings file; defaults to ./twin_skies.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Initial primary city id.
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    debounce_ms: Option<u64>,
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    model: Option<String>,
}

fn resolve_settings(args: &Args) -> Result<Settings> {
    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(city) = &args.city {
        settings.default_city = city.clone();
    }
    if let Some(ms) = args.debounce_ms {
        settings.debounce_ms = ms;
    }
    if let Some(key) = &args.api_key {
        settings.analysis.api_key = Some(key.clone());
    }
    if let Some(model) = &args.model {
        settings.analysis.model = model.clone();
    }
    Ok(settings)
}

async fn render_loop(snapshots: watch::Receiver<MissionSnapshot>) {
    let mut frames = FrameTracker::default();
    let mut stream = WatchStream::new(snapshots);
    while let Some(snapshot) = stream.next().await {
        if let Some(frame) = frames.next_frame(&snapshot) {
            println!("{frame}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();
    let settings = resolve_settings(&args)?;

    let registry = Arc::new(CityRegistry::builtin());
    let primary = CityId::new(settings.default_city.clone());
    anyhow::ensure!(
        registry.contains(&primary),
        "unknown default city '{primary}'"
    );

    let service = analysis_service_from_settings(&settings.analysis, Arc::clone(&registry));
    let state = MissionState::new(Arc::clone(&registry), primary);
    let (handle, task) = spawn_orchestrator(
        state,
        service,
        OrchestratorOptions::from_settings(&settings),
    )
    .context("failed to start mission orchestrator")?;
    let renderer = tokio::spawn(render_loop(handle.subscribe()));

    println!(
        "Twin Skies console: {} cities loaded. Type 'help' for commands.",
        registry.len()
    );

    let catalog = intervention_catalog();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let mut status = String::new();
        match parse_command(&line, &catalog) {
            Ok(ConsoleCommand::Quit) => break,
            Ok(ConsoleCommand::Help) => println!("{HELP}"),
            Ok(ConsoleCommand::Status) => {
                println!("{}", render_status(&handle.snapshot(), &registry));
            }
            Ok(ConsoleCommand::Cities(query)) => {
                println!(
                    "{}",
                    render_cities(&registry.search(query.as_deref().unwrap_or_default()))
                );
            }
            Ok(ConsoleCommand::Interventions) => {
                println!(
                    "{}",
                    render_interventions(&catalog, &handle.snapshot().interventions)
                );
            }
            Ok(ConsoleCommand::Mission(cmd)) => match resolve_city_args(cmd, &registry) {
                Ok(cmd) => dispatch_mission_command(&handle, cmd, &mut status),
                Err(id) => status = format!("unknown city '{id}'; try 'cities'"),
            },
            Err(ParseError::Empty) => {}
            Err(err) => status = err.to_string(),
        }
        if !status.is_empty() {
            println!("{status}");
        }
    }

    if handle.shutdown().await.is_err() {
        error!("mission orchestrator stopped before shutdown");
    }
    if let Err(err) = task.await {
        error!(%err, "mission orchestrator task failed");
    }
    let _ = renderer.await;
    Ok(())
}
