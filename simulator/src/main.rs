use anyhow::Context;
use clap::Parser;
use gui_bridge::bridge::GuiBridge;
use ndvicore::DashboardLoop;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod export;
mod generator;
mod gui_bridge;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline driver and HTTP bridge for the annual NDVI dashboard")]
struct Args {
    /// Replay the scripted session and append a report
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Keep the GUI bridge alive for the visualizer
    #[arg(long, default_value_t = false)]
    serve: bool,
    /// Year to select before inspecting
    #[arg(long)]
    year: Option<String>,
    /// Point to inspect as lon,lat; repeatable
    #[arg(long = "click", allow_hyphen_values = true)]
    clicks: Vec<String>,
    /// Submit an export after the last click
    #[arg(long, default_value_t = false)]
    export: bool,
    /// Seed for the synthetic archive
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let (offline, serve) = (args.offline, args.serve);

    let mut workflow_config = if let Some(path) = args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::default()
    };
    workflow_config.apply_overrides(args.year, &args.clicks, args.export, args.seed)?;

    let runner = Runner::new(workflow_config);
    let (dashboard, drive) = runner.build_dashboard()?;
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating dashboard runtime")?;

    let dashboard = runtime.block_on(async {
        let (event_loop, handle) = DashboardLoop::new(dashboard);
        let loop_task = tokio::spawn(event_loop.run());

        let mut report = None;
        if offline {
            let session = runner.run_session(&handle).await?;
            for click in &session.clicks {
                println!(
                    "{} | {} | {}",
                    click.value, click.class, click.availability
                );
            }
            println!(
                "Offline run -> year {}, clicks {}, export {}",
                session.year,
                session.clicks.len(),
                session.export_task.as_deref().unwrap_or("none")
            );
            report = Some(session);
        }

        if serve {
            let gui_bridge = GuiBridge::new(handle.clone());
            gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
            let shutdown = async {
                if let Err(err) = signal::ctrl_c().await {
                    log::error!("awaiting Ctrl+C failed: {err}");
                }
            };
            gui_bridge.serve(runner.config().bind, shutdown).await?;
        }

        drop(handle);
        let dashboard = loop_task.await.context("joining dashboard loop")?;
        if let Some(mut session) = report {
            session.metrics = Some(dashboard.metrics());
            runner.append_report(&session)?;
        }
        Ok::<_, anyhow::Error>(dashboard)
    })?;

    let metrics = dashboard.metrics();
    log::info!(
        "inspections {}, applied {}, stale {}, provider failures {}, exports {}",
        metrics.inspections,
        metrics.responses_applied,
        metrics.stale_dropped,
        metrics.provider_failures,
        metrics.exports
    );
    let written = drive.finish();
    log::info!("drive worker wrote {} export(s)", written);

    Ok(())
}
