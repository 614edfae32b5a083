// src/scheduler/mod.rs - Background tick loop for the simulator
pub mod time_interface;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Duration, MissedTickBehavior};

use crate::simulator::TelemetrySimulator;

/// Reference cadence of the physical device.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Drives [`TelemetrySimulator::update_simulation`] on a fixed interval.
pub struct PeriodicDriver;

impl PeriodicDriver {
    /// Spawn the tick loop on the current tokio runtime. The first tick fires
    /// immediately.
    pub fn spawn(simulator: Arc<TelemetrySimulator>, interval: Duration) -> DriverHandle {
        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
        let ticks = Arc::new(AtomicU64::new(0));
        let failures = Arc::new(AtomicU64::new(0));
        let counters = (ticks.clone(), failures.clone());

        let join = tokio::spawn(async move {
            let (ticks, failures) = counters;
            let mut interval = tokio::time::interval(interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            tracing::info!("Simulation driver started for '{}'", simulator.smoker_id());
            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Simulation driver shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        if !run_tick(&simulator) {
                            failures.fetch_add(1, Ordering::Relaxed);
                        }
                        ticks.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        });

        DriverHandle {
            shutdown_tx,
            join,
            ticks,
            failures,
        }
    }
}

/// One isolated tick: errors and panics are logged and swallowed so the
/// next tick still runs. Returns whether the tick succeeded.
fn run_tick(simulator: &TelemetrySimulator) -> bool {
    match std::panic::catch_unwind(AssertUnwindSafe(|| simulator.update_simulation())) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            tracing::error!("Simulation update error: {}", e);
            false
        }
        Err(panic) => {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::error!("Simulation update panicked: {}", message);
            false
        }
    }
}

/// Owner's handle on a running driver.
#[derive(Debug)]
pub struct DriverHandle {
    shutdown_tx: broadcast::Sender<()>,
    join: JoinHandle<()>,
    ticks: Arc<AtomicU64>,
    failures: Arc<AtomicU64>,
}

impl DriverHandle {
    /// Ticks attempted so far, failed ones included.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signal the loop and wait for it to exit. Does not wait out a pending
    /// sleep.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.join.await {
            tracing::error!("Simulation driver task failed: {}", e);
        }
    }
}
