//! monitor-napd - Per-monitor idle dimming daemon.
//!
//! Watches cursor and foreground-window activity per display and dims idle
//! monitors over DDC/CI hardware brightness and a software overlay, restoring
//! them the moment activity returns.

use monitor_napd::activity::ActivitySource;
use monitor_napd::channel::{self, DdcChannel, SharedChannel};
use monitor_napd::config::{Config, MonitorConfig};
use monitor_napd::controller::MonitorController;
use monitor_napd::geometry::GeometryProvider;
use monitor_napd::overlay::NullOverlay;
use monitor_napd::platform::X11Backend;
use monitor_napd::set::ControllerSet;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::signal::unix::{SignalKind, signal};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Seconds between activity polls.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Seconds between display geometry refreshes.
const GEOMETRY_INTERVAL: Duration = Duration::from_secs(3);

/// Identify flash length and opacity.
const IDENTIFY_DURATION: Duration = Duration::from_secs(2);
const IDENTIFY_OPACITY: f64 = 0.6;

/// Idle dimming daemon for multi-monitor X11 desktops.
///
/// Dims each monitor independently after inactivity, over DDC/CI hardware
/// brightness and a software overlay.
#[derive(Parser, Debug)]
#[command(name = "monitor-napd")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// List detected displays and DDC/CI endpoints, then exit.
    #[arg(long)]
    list: bool,

    /// Flash each monitor's overlay at startup to identify ordinals.
    #[arg(long)]
    identify: bool,

    /// Start with dimming disabled until toggled back on.
    #[arg(long)]
    awake: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level)?;

    info!("monitor-napd v{} starting", env!("CARGO_PKG_VERSION"));

    if env::var("DISPLAY").is_err() {
        error!("DISPLAY is not set; an X11 session is required.");
        error!("If running as a systemd user service, import the session environment:");
        error!("  dbus-update-activation-environment --systemd DISPLAY");
        anyhow::bail!("X11 environment not available");
    }

    let config =
        Config::load_or_default(args.config.as_deref()).context("Failed to load configuration")?;

    let backend = Arc::new(X11Backend::connect().context("Failed to connect to X11")?);
    let channel = channel::shared(DdcChannel::probe());

    if args.list {
        list_displays(&*backend, &channel);
        return Ok(());
    }

    let set = build_set(&config, &backend, &channel);
    run_daemon(set, &args).await
}

/// Initialize logging with the specified level.
fn init_logging(level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(level)?)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    Ok(())
}

/// Filter scoped to this crate at `level`; a mistyped level is an error,
/// not a silent downgrade.
fn log_filter(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(format!("monitor_napd={level}"))
        .with_context(|| format!("Invalid log level: {level}"))
}

/// Print the display and DDC/CI enumerations side by side so the user can
/// work out index remappings for the config file.
fn list_displays(geometry: &dyn GeometryProvider, channel: &SharedChannel) {
    let displays = geometry.list_displays();
    println!("Displays ({}):", displays.len());
    for (index, rect) in displays.iter().enumerate() {
        println!(
            "  display {index}: {}x{} at ({}, {})",
            rect.width, rect.height, rect.x, rect.y
        );
    }

    let mut channel = channel::lock(channel);
    println!("DDC/CI endpoints ({}):", channel.len());
    for index in 0..channel.len() {
        match channel.read_luminance(index) {
            Ok(value) => println!("  hardware {index}: luminance {value}"),
            Err(e) => println!("  hardware {index}: {e}"),
        }
    }
}

/// Build one controller per configured monitor; with no monitors
/// configured, auto-populate one per detected display.
fn build_set(config: &Config, backend: &Arc<X11Backend>, channel: &SharedChannel) -> ControllerSet {
    let now = Instant::now();
    let monitors: Vec<MonitorConfig> = if config.monitors.is_empty() {
        let count = backend.list_displays().len();
        info!("No monitors configured, auto-populating {} display(s)", count);
        (0..count).map(MonitorConfig::for_display).collect()
    } else {
        config.monitors.clone()
    };

    let controllers = monitors
        .into_iter()
        .map(|cfg| {
            MonitorController::new(
                cfg,
                channel.clone(),
                Box::new(NullOverlay::default()),
                backend.clone() as Arc<dyn GeometryProvider + Send + Sync>,
                backend.clone() as Arc<dyn ActivitySource + Send + Sync>,
                now,
            )
        })
        .collect();
    ControllerSet::new(controllers, config.global.clone())
}

/// Run the daemon loop: 1 Hz activity polls, periodic geometry refresh, and
/// fade steps scheduled at their exact deadlines.
async fn run_daemon(mut set: ControllerSet, args: &Args) -> Result<()> {
    let now = Instant::now();
    if args.awake {
        set.set_awake_mode(true, now);
    }
    if args.identify {
        set.identify_all(IDENTIFY_DURATION, IDENTIFY_OPACITY, now);
    }

    let mut poll_timer = tokio::time::interval(POLL_INTERVAL);
    poll_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut geometry_timer = tokio::time::interval(GEOMETRY_INTERVAL);
    geometry_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    info!("Daemon started, watching {} monitor(s)", set.len());

    loop {
        let deadline = set.next_deadline();
        tokio::select! {
            _ = poll_timer.tick() => {
                set.tick_all(Instant::now());
            }
            _ = geometry_timer.tick() => {
                set.refresh_geometries();
            }
            () = fade_step(deadline) => {
                set.advance_all(Instant::now());
            }
            result = &mut shutdown => {
                result?;
                break;
            }
        }
    }

    set.shutdown(Instant::now());
    Ok(())
}

/// Sleep until the next fade deadline, or forever when no fade is pending.
async fn fade_step(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(tokio::time::Instant::from_std(at)).await,
        None => std::future::pending().await,
    }
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for ctrl-c")?;
            debug!("Received SIGINT");
        }
        _ = sigterm.recv() => {
            debug!("Received SIGTERM");
        }
    }
    Ok(())
}
