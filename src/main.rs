// src/main.rs - Simulated smoker device process
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use meatgeek_sim::config::{self, Config};
use meatgeek_sim::console::{self, DeviceCommand, SessionEnd};
use meatgeek_sim::telemetry;
use meatgeek_sim::{PeriodicDriver, TelemetrySimulator};
use tokio::io::BufReader;
use tokio::sync::broadcast;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Registry, fmt, reload};

/// Simulated MeatGeek smoker
#[derive(Parser, Debug)]
#[command(
    name = "meatgeek-device",
    about = "Simulated BBQ smoker that emits telemetry as JSON lines."
)]
struct Cli {
    /// Path to a TOML config file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the smoker id
    #[arg(long)]
    smoker_id: Option<String>,

    /// Fixed RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Start this scenario immediately
    #[arg(long)]
    scenario: Option<String>,

    /// Disable periodic telemetry output
    #[arg(long)]
    quiet: bool,
}

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
type LevelHandle = reload::Handle<LevelFilter, Registry>;

/// Stderr logger starting at INFO; the handle applies the configured level
/// once the config has loaded. Stdout carries telemetry.
fn log_subscriber<W>(writer: W) -> (impl tracing::Subscriber + Send + Sync + 'static, LevelHandle)
where
    W: for<'a> fmt::MakeWriter<'a> + Send + Sync + 'static,
{
    let (level, handle) = reload::Layer::new(LevelFilter::INFO);
    let subscriber = tracing_subscriber::registry()
        .with(level)
        .with(fmt::layer().with_writer(writer));
    (subscriber, handle)
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();
    let (subscriber, log_level) = log_subscriber(std::io::stderr);
    subscriber.init();

    let mut config = match &cli.config {
        Some(path) => {
            let path = path.to_str().ok_or("config path is not valid UTF-8")?;
            config::load_config(path)?
        }
        None => Config::default(),
    };
    if let Some(id) = cli.smoker_id {
        config.device.smoker_id = id;
    }
    if cli.seed.is_some() {
        config.simulation.seed = cli.seed;
    }
    if cli.scenario.is_some() {
        config.simulation.autostart_scenario = cli.scenario;
    }
    if cli.quiet {
        config.telemetry.enabled = false;
    }
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }
    let max_level = LevelFilter::from_level(config.logging.max_level());
    log_level.modify(|level| *level = max_level)?;

    tracing::info!("Starting MeatGeek simulated smoker '{}'", config.device.smoker_id);
    tracing::info!(
        "Tick every {}s, telemetry {}",
        config.simulation.tick_interval_secs,
        if config.telemetry.enabled {
            format!("every {}s", config.telemetry.telemetry_interval_secs)
        } else {
            "disabled".to_string()
        }
    );

    let simulator = Arc::new(TelemetrySimulator::from_config(
        config.device.smoker_id.clone(),
        &config.simulation,
    ));
    if let Some(name) = &config.simulation.autostart_scenario {
        console::execute(&simulator, DeviceCommand::StartCooking { scenario: Some(name.clone()) });
    }

    let driver = PeriodicDriver::spawn(simulator.clone(), config.simulation.tick_interval());

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let emitter = config.telemetry.enabled.then(|| {
        tokio::spawn(telemetry::run_emitter(
            simulator.clone(),
            config.telemetry.interval(),
            tokio::io::stdout(),
            shutdown_tx.subscribe(),
        ))
    });

    let stdin = BufReader::new(tokio::io::stdin());
    let session = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Interrupt received");
            None
        }
        end = console::run_session(&simulator, stdin, tokio::io::stdout()) => Some(end),
    };
    if session == Some(SessionEnd::InputClosed) {
        // Detached runs (stdin at /dev/null) end up here straight away.
        tracing::info!("Console input closed; running until interrupted");
        tokio::signal::ctrl_c().await?;
        tracing::info!("Interrupt received");
    }

    tracing::info!("Shutting down simulated smoker");
    let _ = shutdown_tx.send(());
    if let Some(emitter) = emitter {
        match emitter.await {
            Ok(sent) => tracing::info!("Emitted {} telemetry messages", sent),
            Err(e) => tracing::error!("Telemetry task failed: {}", e),
        }
    }
    let ticks = driver.ticks();
    driver.shutdown().await;
    tracing::info!("Simulation stopped after {} ticks", ticks);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_level_applies_after_startup() {
        let (subscriber, handle) = log_subscriber(std::io::sink);
        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(tracing::Level::ERROR));
            assert!(tracing::enabled!(tracing::Level::INFO));
            assert!(!tracing::enabled!(tracing::Level::DEBUG));

            handle.modify(|level| *level = LevelFilter::DEBUG).unwrap();
            assert!(tracing::enabled!(tracing::Level::DEBUG));

            handle.modify(|level| *level = LevelFilter::WARN).unwrap();
            assert!(!tracing::enabled!(tracing::Level::INFO));
        });
    }
}
