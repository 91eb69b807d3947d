mod demo;

use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use sk_core::config::{load_config, DEFAULT_CONFIG_FILE};
use sk_core::lifecycle::Lifecycle;
use sk_core::log::tracing_level;
use sk_core::sequence::{MachineSetting, StateMachine};
use sk_core::{FrameDriver, Scheduler};
use sk_protocol::LogLevel;
use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use tokio::sync::mpsc;

/// Run the demo stage sequence on a fixed-rate frame driver.
#[derive(Parser, Debug)]
#[command(name = "stagekit", version, about)]
struct Cli {
    /// Configuration file.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level for every object, overriding the configuration.
    #[arg(long)]
    log_level: Option<LogLevel>,

    /// Frame period in milliseconds, overriding the configuration.
    #[arg(long)]
    frame_ms: Option<u64>,

    /// Give up after this many frames.
    #[arg(long)]
    max_frames: Option<u64>,

    /// Print lifecycle events as JSON lines.
    #[arg(long)]
    events: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut config = load_config(&cli.config)
        .wrap_err_with(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(level) = cli.log_level {
        config.defaults.filter_level = level;
        for settings in config.objects.values_mut() {
            settings.filter_level = level;
        }
    }
    if let Some(frame_ms) = cli.frame_ms {
        config.driver.frame_ms = frame_ms;
    }
    if cli.max_frames.is_some() {
        config.driver.max_frames = cli.max_frames;
    }

    // Objects filter their own messages; the subscriber lets through the
    // most verbose of them.
    let level = config
        .objects
        .values()
        .map(|settings| settings.filter_level)
        .chain([config.defaults.filter_level, LogLevel::Info])
        .min()
        .unwrap_or_default();
    tracing_subscriber::fmt()
        .with_max_level(tracing_level(level))
        .with_target(false)
        .init();

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler::new().with_events(events_tx);

    let outcome = Rc::new(Cell::new(None));
    let o = Rc::clone(&outcome);
    let first = demo::build(&scheduler, &config);
    let setting = MachineSetting::new(first)
        .with_settings(config.settings_for("machine").with_self_tick(true))
        .with_on_finish(move |success| o.set(Some(success)));
    let machine = StateMachine::instantiate(&scheduler, setting);
    if !machine.open() {
        return Err(eyre!("Failed to open the state machine"));
    }

    let driver = FrameDriver::from_config(&config.driver);
    let frames = driver
        .run_until(&scheduler, || {
            while let Ok(event) = events_rx.try_recv() {
                if cli.events {
                    match serde_json::to_string(&event) {
                        Ok(line) => println!("{line}"),
                        Err(e) => tracing::warn!("Failed to encode event: {e}"),
                    }
                }
            }
            machine.is_closed()
        })
        .await?;

    match outcome.get() {
        Some(true) => {
            tracing::info!("Sequence finished after {frames} frames");
            Ok(())
        }
        _ => Err(eyre!("Sequence finished unsuccessfully after {frames} frames")),
    }
}
