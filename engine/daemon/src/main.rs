//! CodePet Daemon - Runs the behavior engine against live input
//!
//! Loads configuration and the character's animation tree, then wires the
//! activity sampler, the keystroke gate and the pet runtime onto one event
//! bus. Input comes from a line console on stdin (`help` lists commands);
//! with the `desktop` feature the foreground window is read from the OS.
//!
//! # Usage
//!
//! ```bash
//! # Start with defaults
//! codepet-daemon
//!
//! # Custom config and assets
//! codepet-daemon --config ~/.config/codepet/codepet.toml --assets ./assets
//!
//! # Verbose logging
//! RUST_LOG=debug codepet-daemon
//! ```
//!
//! # Signals
//!
//! - `SIGTERM` / `SIGINT`: Graceful shutdown

mod console;
#[cfg(feature = "desktop")]
mod desktop;
mod surface;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use codepet_core::{
    load_config_from_path, ActivitySampler, AnimationCatalog, AnimationSettings,
    BehaviorController, ConfigOverrides, EventBus, EventPublisher, HandlerRegistry, KeyActivityGate,
    MessageContext, PetConfig, PetRuntime, SamplerHandle, WindowSource,
};

use console::{Console, ConsoleExit, ConsoleWindow, InputClock};
use surface::{LogSink, StatusBoard};

/// CodePet Daemon - a desktop pet that reacts to how you program
#[derive(Parser, Debug)]
#[command(name = "codepet-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "CODEPET_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Root of the animation asset tree
    #[arg(short = 'a', long, value_name = "DIR")]
    assets: Option<PathBuf>,

    /// Character (species) to play
    #[arg(long, value_name = "NAME")]
    character: Option<String>,

    /// Pet name
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Foreground-window poll interval
    #[arg(long, value_name = "MS")]
    sample_interval_ms: Option<u64>,

    /// Behavior tick interval
    #[arg(long, value_name = "MS")]
    tick_interval_ms: Option<u64>,

    /// Seed for the behavior dice, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "CODEPET_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Shorthand for `--log-level debug`
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(dir) = &self.assets {
            overrides = overrides.with_assets_dir(dir.clone());
        }
        if let Some(character) = &self.character {
            overrides = overrides.with_species(character.clone());
        }
        if let Some(name) = &self.name {
            overrides = overrides.with_name(name.clone());
        }
        if let Some(ms) = self.sample_interval_ms {
            overrides = overrides.with_sample_interval_ms(ms);
        }
        if let Some(ms) = self.tick_interval_ms {
            overrides = overrides.with_tick_interval_ms(ms);
        }
        overrides
    }
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("codepet_daemon={level},codepet_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn load(args: &Args) -> Result<PetConfig> {
    let mut config =
        load_config_from_path(args.config.clone()).context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;
    info!(
        source = %config.source(),
        path = ?config.config_file_path,
        "Configuration loaded"
    );
    Ok(config)
}

/// Load the character's frames; an empty catalog keeps the pet running headless
fn load_catalog(settings: &AnimationSettings, character: &str) -> AnimationCatalog {
    let Some(dir) = settings.character_dir(character) else {
        warn!("No assets directory configured; running without frames");
        return AnimationCatalog::new(settings.default_interval);
    };
    match AnimationCatalog::load_dir(&dir, settings.default_interval) {
        Ok(catalog) => {
            info!(dir = ?dir, sequences = catalog.len(), "Animation catalog loaded");
            catalog
        }
        Err(e) => {
            warn!(error = %e, dir = ?dir, "Failed to load animations; running without frames");
            AnimationCatalog::new(settings.default_interval)
        }
    }
}

fn spawn_sampler<W>(
    window: W,
    clock: InputClock,
    config: &PetConfig,
    registry: &HandlerRegistry,
    publisher: EventPublisher,
    shutdown: watch::Receiver<bool>,
) -> (SamplerHandle, JoinHandle<()>)
where
    W: WindowSource + 'static,
{
    let sampler = ActivitySampler::new(window, clock, &config.activity, publisher);
    let handle = sampler.handle();
    handle.attach(registry);
    (handle, tokio::spawn(sampler.run(shutdown)))
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT"),
        () = terminate => info!("Received SIGTERM"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(if args.verbose { "debug" } else { &args.log_level });

    info!("CodePet Daemon starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = load(&args)?;

    let bus = EventBus::new();
    let mut controller = BehaviorController::new(
        config.pet.build_model(),
        config.behavior.clone(),
        bus.publisher(),
        Instant::now(),
    );
    if let Some(seed) = args.seed {
        controller = controller.with_seed(seed);
    }

    let catalog = load_catalog(&config.animation, &config.pet.species);
    let runtime = PetRuntime::new(bus, controller, Arc::new(catalog), LogSink::default());
    let registry = runtime.registry();
    let publisher = runtime.publisher();
    let character = runtime.character().to_string();

    let board = StatusBoard::new(config.pet.personality.clone());
    board.attach(&registry);

    let keys = KeyActivityGate::new(publisher.clone());
    keys.attach(&registry);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let window = ConsoleWindow::default();
    let clock = InputClock::default();

    #[cfg(feature = "desktop")]
    let (sampler, sampler_task) = spawn_sampler(
        desktop::DesktopWindow,
        clock.clone(),
        &config,
        &registry,
        publisher.clone(),
        shutdown_rx.clone(),
    );
    #[cfg(not(feature = "desktop"))]
    let (sampler, sampler_task) = spawn_sampler(
        window.clone(),
        clock.clone(),
        &config,
        &registry,
        publisher.clone(),
        shutdown_rx.clone(),
    );

    let runtime_task = tokio::spawn(runtime.run(shutdown_rx));

    let greeting: String = config
        .settings()
        .get_or("daemon.greeting_context", "greeting".to_string());
    println!("{}", board.say(MessageContext::from_key(&greeting)));

    let console = Console {
        window,
        clock,
        publisher,
        keys,
        sampler,
        board,
        character,
    };

    tokio::select! {
        exit = console.run() => match exit {
            ConsoleExit::Quit => info!("Quit requested"),
            ConsoleExit::Eof if cfg!(feature = "desktop") => {
                info!("Console closed; waiting for a signal");
                shutdown_signal().await;
            }
            ConsoleExit::Eof => info!("Console closed"),
        },
        () = shutdown_signal() => {}
    }

    info!("Shutting down...");
    shutdown_tx.send_replace(true);

    sampler_task.await.context("Activity sampler task failed")?;
    let last = runtime_task.await.context("Pet runtime task failed")?;
    info!(
        name = %last.name,
        state = %last.state,
        mood = %last.mood,
        energy = last.energy,
        happiness = last.happiness,
        "Final pet state"
    );

    info!("CodePet Daemon stopped cleanly");
    Ok(())
}
