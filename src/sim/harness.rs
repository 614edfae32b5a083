//! CLI entry point for the offline simulation harness: runs a cook on a
//! manual clock and prints the status trajectory as JSON lines.

use std::io::Write;
use std::sync::Arc;

use chrono::Duration;
use clap::{Parser, Subcommand};
use meatgeek_sim::scenario;
use meatgeek_sim::scheduler::time_interface::ManualTime;
use meatgeek_sim::TelemetrySimulator;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Longest phase the harness will simulate: one year.
const MAX_MINUTES: i64 = 365 * 24 * 60;

/// Number of ticks that fit in `minutes` at `tick_secs` per tick.
fn tick_count(minutes: i64, tick_secs: i64) -> u64 {
    if tick_secs <= 0 {
        return 0;
    }
    u64::try_from(minutes.saturating_mul(60) / tick_secs).unwrap_or(0)
}

/// Simulation Harness CLI
#[derive(Parser, Debug)]
#[command(name = "sim-harness", about = "Offline smoker simulation runs on a simulated clock.")]
pub struct Cli {
    /// RNG seed, for reproducible trajectories
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List available built-in scenarios
    ListScenarios,
    /// Run a single scenario (default)
    Run {
        /// Scenario to cook
        #[arg(long, default_value = "default")]
        scenario: String,
        /// Simulated minutes to cook for
        #[arg(
            long,
            default_value_t = 120,
            value_parser = clap::value_parser!(i64).range(0..=MAX_MINUTES)
        )]
        minutes: i64,
        /// Seconds between ticks
        #[arg(long, default_value_t = 5)]
        tick_secs: i64,
        /// Emit a snapshot every N ticks
        #[arg(long, default_value_t = 12)]
        every: u64,
        /// Override the scenario's grill target
        #[arg(long)]
        target: Option<i32>,
        /// Simulated minutes of passive cooling after the cook stops
        #[arg(
            long,
            default_value_t = 0,
            value_parser = clap::value_parser!(i64).range(0..=MAX_MINUTES)
        )]
        cooldown_minutes: i64,
    },
}

fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_writer(std::io::stderr)
        .init();

    let command = cli.command.unwrap_or(Commands::Run {
        scenario: "default".to_string(),
        minutes: 120,
        tick_secs: 5,
        every: 12,
        target: None,
        cooldown_minutes: 0,
    });

    match command {
        Commands::ListScenarios => {
            for s in scenario::all() {
                println!(
                    "{:<14} grill={:.0} probe={:.0} heat={:.1}/min cool={:.1}/min \
                     meat={:.1}/min tol=±{:.0} est={}min",
                    s.name,
                    s.target_grill_temp,
                    s.target_probe_temp,
                    s.grill_heating_rate,
                    s.grill_cooling_rate,
                    s.meat_heating_rate,
                    s.temp_tolerance,
                    s.estimated_duration.as_secs() / 60
                );
            }
        }
        Commands::Run { scenario, minutes, tick_secs, every, target, cooldown_minutes } => {
            if tick_secs <= 0 || every == 0 {
                eprintln!("tick-secs and every must be positive");
                std::process::exit(2);
            }
            let clock = Arc::new(ManualTime::starting_now());
            let rng = StdRng::seed_from_u64(cli.seed);
            let sim = TelemetrySimulator::new("sim-harness", clock.clone(), rng);
            sim.start_cooking(&scenario);
            if let Some(target) = target {
                sim.set_target_temperature(target);
            }

            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let mut emit = |sim: &TelemetrySimulator| {
                let snapshot = sim.get_current_status();
                match serde_json::to_string(&snapshot) {
                    Ok(line) => {
                        if let Err(e) = writeln!(out, "{line}") {
                            tracing::error!("Failed to write snapshot: {}", e);
                        }
                    }
                    Err(e) => tracing::error!("Failed to serialize snapshot: {}", e),
                }
            };

            let run_phase = |sim: &TelemetrySimulator,
                             total_minutes: i64,
                             emit: &mut dyn FnMut(&TelemetrySimulator)| {
                for tick in 1..=tick_count(total_minutes, tick_secs) {
                    clock.advance(Duration::seconds(tick_secs));
                    if let Err(e) = sim.update_simulation() {
                        tracing::error!("Tick {} failed: {}", tick, e);
                    }
                    if tick % every == 0 {
                        emit(sim);
                    }
                }
            };

            emit(&sim);
            run_phase(&sim, minutes, &mut emit);
            if cooldown_minutes > 0 {
                sim.stop_cooking();
                run_phase(&sim, cooldown_minutes, &mut emit);
            }
        }
    }
}
