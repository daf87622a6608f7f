use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use edgedock::actor::config_watcher::ConfigWatcher;
use edgedock::actor::replay::{self, SIMULATED_FRAME_MS, Script, Stage};
use edgedock::common::config::{Config, DockConfig, config_file};
use edgedock::common::log;
use edgedock::layout_engine::compute_layout;
use edgedock::sys::geometry::Rect;
use edgedock::sys::screen::{MonitorGeometry, MonitorId};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "edgedock")]
#[command(about = "Headless driver for the edgedock layout and animation core")]
struct Cli {
    /// Config file to use instead of ~/.edgedock.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dock geometry for a monitor as JSON
    Layout {
        #[arg(long, default_value_t = 1920.0)]
        width: f64,
        #[arg(long, default_value_t = 1080.0)]
        height: f64,
        #[arg(long, default_value_t = 1.0)]
        scale_factor: f64,
        #[arg(long, default_value_t = 8)]
        icons: usize,
    },
    /// Replay a script in virtual time and print every visible change
    Simulate {
        script: PathBuf,
        /// Replace the script's icons with this many apps.
        #[arg(long)]
        icons: Option<usize>,
        #[arg(long, default_value_t = SIMULATED_FRAME_MS)]
        frame_ms: f64,
    },
    /// Replay a script in real time against a running dock
    Run {
        script: PathBuf,
        #[arg(long)]
        icons: Option<usize>,
        /// How long to keep animating after the last step.
        #[arg(long, default_value_t = 1000)]
        settle_ms: u64,
        /// Reload the config file while running.
        #[arg(long)]
        watch: bool,
    },
    /// Validate a config file and report what would be repaired
    CheckConfig { path: Option<PathBuf> },
}

/// One JSON line per action, after the records.
fn print_performed(stage: &Stage) {
    for action in stage.performed() {
        println!("{}", serde_json::json!({ "performed": action }));
    }
}

fn main() -> anyhow::Result<()> {
    sigpipe::reset();
    let opt: Cli = Parser::parse();
    log::init_logging();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    match opt.command {
        Commands::Layout { width, height, scale_factor, icons } => {
            let config = load_config(&config_path)?;
            let monitor = MonitorGeometry {
                id: MonitorId::new(1),
                frame: Rect::from_xywh(0.0, 0.0, width, height),
                scale_factor,
                is_primary: true,
                panel_height: 0.0,
            };
            let geometry = compute_layout(&config, &monitor, icons);
            println!("{}", serde_json::to_string_pretty(&geometry)?);
        }
        Commands::Simulate { script, icons, frame_ms } => {
            let config = load_config(&config_path)?;
            let script = Script::read(&script)?;
            let stage = Stage::new(&script, icons);
            let mut dock = stage.dock(config);
            for record in replay::replay_simulated(&mut dock, &script, frame_ms) {
                println!("{}", serde_json::to_string(&record)?);
            }
            print_performed(&stage);
        }
        Commands::Run { script, icons, settle_ms, watch } => {
            let config = load_config(&config_path)?;
            let script = Script::read(&script)?;
            let stage = Stage::new(&script, icons);
            run_realtime(&stage, config, &script, settle_ms, watch.then_some(config_path))?;
            print_performed(&stage);
        }
        Commands::CheckConfig { path } => {
            let path = path.unwrap_or(config_path);
            let mut config = Config::read(&path)?;
            let issues = config.validate();
            for issue in &issues {
                println!("{issue}");
            }
            let fixes = config.auto_fix_values();
            if issues.is_empty() {
                println!("{}: ok", path.display());
            } else {
                println!("{}: {} issue(s), {fixes} fixable", path.display(), issues.len());
            }
        }
    }
    Ok(())
}

/// Reads and repairs the config, falling back to the defaults when the file
/// does not exist.
fn load_config(path: &Path) -> anyhow::Result<DockConfig> {
    let mut config = Config::read_or_default(path)?;
    for issue in config.validate() {
        warn!("config: {issue}");
    }
    config.auto_fix_values();
    Ok(config.dock)
}

fn run_realtime(
    stage: &Stage,
    config: DockConfig,
    script: &Script,
    settle_ms: u64,
    watch: Option<PathBuf>,
) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    let local = tokio::task::LocalSet::new();

    let (dock_tx, dock_rx) = edgedock::actor::channel();
    if let Some(path) = watch {
        // Detached; it goes down with the process.
        ConfigWatcher::new(path, dock_tx.clone()).spawn()?;
    }

    let dock = stage.dock(config);
    let shutdown = CancellationToken::new();
    local.block_on(&runtime, async {
        let handle = tokio::task::spawn_local(dock.run(dock_rx, shutdown.clone()));
        replay::replay_realtime(script, &dock_tx).await;
        tokio::time::sleep(Duration::from_millis(settle_ms)).await;
        info!(duration = ?script.duration(), "script finished");
        shutdown.cancel();
        if let Err(e) = handle.await {
            warn!("dock task failed: {e}");
        }
    });
    Ok(())
}
