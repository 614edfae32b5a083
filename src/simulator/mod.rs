// src/simulator/mod.rs - Thread-safe smoker telemetry simulator
pub mod state;
pub mod thermal;

use std::sync::{Arc, Mutex, MutexGuard};

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;
use uuid::Uuid;

use crate::config::SimulationConfig;
use crate::scenario::{self, CookingScenario};
use crate::scheduler::time_interface::{SystemTime, TimeInterface};
use crate::status::StatusSnapshot;
use state::{Components, CookingMode, SimulationState};

/// Built-in presets always produce finite temperatures; a caller-supplied
/// scenario with non-finite rates is what trips this.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Non-finite {field} temperature after tick; state left unchanged")]
    NonFiniteTemperature { field: &'static str },
}

/// State plus the random source that perturbs it. Both live behind the same
/// lock so a tick draws its noise atomically with the update.
struct Core {
    state: SimulationState,
    rng: StdRng,
}

/// Simulated smoker. Every public operation takes the single internal lock,
/// does O(1) in-memory work and releases it; nothing awaits or performs I/O
/// while the lock is held.
pub struct TelemetrySimulator {
    smoker_id: String,
    clock: Arc<dyn TimeInterface>,
    core: Mutex<Core>,
}

impl std::fmt::Debug for TelemetrySimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetrySimulator")
            .field("smoker_id", &self.smoker_id)
            .finish_non_exhaustive()
    }
}

impl TelemetrySimulator {
    pub fn new(smoker_id: impl Into<String>, clock: Arc<dyn TimeInterface>, rng: StdRng) -> Self {
        let state = SimulationState::new(clock.now_wallclock());
        let smoker_id = smoker_id.into();
        tracing::info!(
            "Simulator for '{}' initialized idle at {:.1}°",
            smoker_id,
            state.grill_temp
        );
        Self {
            smoker_id,
            clock,
            core: Mutex::new(Core { state, rng }),
        }
    }

    /// Host clock, RNG seeded from `config.seed` or the OS.
    pub fn from_config(smoker_id: impl Into<String>, config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(smoker_id, Arc::new(SystemTime), rng)
    }

    pub fn smoker_id(&self) -> &str {
        &self.smoker_id
    }

    /// State is only ever replaced whole, so a guard poisoned by a panicking
    /// holder still points at a consistent state.
    fn lock(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Simulator lock was poisoned; recovering last committed state");
            poisoned.into_inner()
        })
    }

    pub fn get_current_status(&self) -> StatusSnapshot {
        let core = self.lock();
        StatusSnapshot::from_state(&core.state, &self.smoker_id, self.clock.now_wallclock())
    }

    /// Begin (or restart) a cook with the named preset. Unknown names use the
    /// default preset.
    pub fn start_cooking(&self, scenario_name: &str) {
        self.start_cooking_with(scenario::lookup(scenario_name));
    }

    pub fn start_cooking_with(&self, scenario: &'static CookingScenario) {
        let mut core = self.lock();
        let now = self.clock.now_wallclock();
        let state = &mut core.state;
        state.scenario = scenario;
        state.target_temp = scenario.target_grill_temp;
        state.cooking_started = now;
        state.last_update = now;
        state.cooking_active = true;
        state.session_id = Some(Uuid::new_v4());
        state.mode = CookingMode::Startup;
        state.components = Components {
            igniter: true,
            auger: true,
            blower: false,
        };
        tracing::info!(
            "Started cooking {} (target {:.0}°, probe {:.0}°)",
            scenario.name,
            scenario.target_grill_temp,
            scenario.target_probe_temp
        );
    }

    /// Temperatures and setpoint are kept; the smoker cools passively.
    pub fn stop_cooking(&self) {
        let mut core = self.lock();
        let state = &mut core.state;
        if state.cooking_active {
            tracing::info!("Stopped cooking {} at {:.1}°", state.scenario.name, state.grill_temp);
        }
        state.cooking_active = false;
        state.session_id = None;
        state.mode = CookingMode::Idle;
        state.components = Components::OFF;
    }

    /// Not range-checked here; callers validate.
    pub fn set_target_temperature(&self, degrees: i32) {
        let mut core = self.lock();
        core.state.target_temp = f64::from(degrees);
        tracing::info!("Target temperature set to {}°", degrees);
    }

    /// One simulation step. The next state is computed on a copy and only
    /// committed when every temperature is finite.
    pub fn update_simulation(&self) -> Result<(), SimulatorError> {
        let mut core = self.lock();
        let now = self.clock.now_wallclock();
        let Core { state, rng } = &mut *core;

        let mut next = state.clone();
        thermal::advance(&mut next, rng, now);

        if !next.is_finite() {
            let field = if !next.grill_temp.is_finite() {
                "grill"
            } else if !next.probe_temp.is_finite() {
                "probe"
            } else {
                "target"
            };
            return Err(SimulatorError::NonFiniteTemperature { field });
        }

        tracing::debug!(
            "Tick: mode={} grill={:.1} probe={:.1} igniter={} auger={} blower={}",
            next.mode,
            next.grill_temp,
            next.probe_temp,
            next.components.igniter,
            next.components.auger,
            next.components.blower
        );
        *state = next;
        Ok(())
    }

    /// Copy of the raw state, for diagnostics and tests.
    pub fn state(&self) -> SimulationState {
        self.lock().state.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::time_interface::ManualTime;
    use chrono::{Duration, Utc};

    fn simulator(seed: u64) -> (TelemetrySimulator, Arc<ManualTime>) {
        let clock = Arc::new(ManualTime::starting_now());
        let sim = TelemetrySimulator::new("meatgeek3", clock.clone(), StdRng::seed_from_u64(seed));
        (sim, clock)
    }

    #[test]
    fn test_fresh_simulator_status() {
        let (sim, _) = simulator(1);
        let status = sim.get_current_status();
        assert_eq!(status.mode, CookingMode::Idle);
        assert!(!status.auger_on);
        assert_eq!(status.temps.grill_temp, 70.0);
        assert_eq!(status.temps.probe1_temp, 70.0);
        assert!(status.session_id.is_none());
        assert_eq!(status.ttl, 259_200);
        assert_eq!(status.smoker_id, "meatgeek3");
    }

    #[test]
    fn test_start_cooking_brisket() {
        let (sim, _) = simulator(2);
        sim.start_cooking("Brisket");
        let status = sim.get_current_status();
        assert_eq!(status.mode, CookingMode::Startup);
        assert!(status.igniter_on);
        assert!(status.auger_on);
        assert!(!status.blower_on);
        assert_eq!(status.set_point, 225.0);
        assert!(status.session_id.is_some());
        assert_eq!(status.ttl, -1);
        assert_eq!(status.kind, "status");
    }

    #[test]
    fn test_restart_issues_new_session() {
        let (sim, clock) = simulator(3);
        sim.start_cooking("ribs");
        let first = sim.get_current_status().session_id;
        clock.advance(Duration::minutes(1));
        sim.start_cooking("chicken");
        let second = sim.get_current_status();
        assert_ne!(first, second.session_id);
        assert_eq!(second.set_point, 350.0);
        assert_eq!(second.mode_time, clock.now_wallclock());
    }

    #[test]
    fn test_stop_keeps_temperatures_and_setpoint() {
        let (sim, clock) = simulator(4);
        sim.start_cooking("chicken");
        clock.advance(Duration::minutes(3));
        sim.update_simulation().unwrap();
        let before = sim.state();
        sim.stop_cooking();
        let after = sim.state();
        assert_eq!(after.grill_temp, before.grill_temp);
        assert_eq!(after.probe_temp, before.probe_temp);
        assert_eq!(after.target_temp, before.target_temp);
        assert_eq!(after.mode, CookingMode::Idle);
        assert_eq!(after.components, Components::OFF);
        assert!(after.session_id.is_none());
    }

    #[test]
    fn test_set_target_does_not_touch_mode() {
        let (sim, _) = simulator(5);
        sim.start_cooking("brisket");
        sim.set_target_temperature(260);
        let state = sim.state();
        assert_eq!(state.target_temp, 260.0);
        assert_eq!(state.mode, CookingMode::Startup);
        assert_eq!(state.scenario.name, "Brisket");
        assert!(state.components.auger);
    }

    #[test]
    fn test_backwards_clock_is_harmless() {
        let (sim, clock) = simulator(6);
        sim.start_cooking("brisket");
        let before = sim.state();
        clock.advance(Duration::minutes(-10));
        sim.update_simulation().unwrap();
        let after = sim.state();
        assert!(after.grill_temp >= 70.0);
        assert!((after.grill_temp - before.grill_temp).abs() < 1e-9);
    }

    #[test]
    fn test_shared_across_threads() {
        let (sim, clock) = simulator(7);
        let sim = Arc::new(sim);
        sim.start_cooking("porkshoulder");
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let sim = sim.clone();
                let clock = clock.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        clock.advance(Duration::seconds(5));
                        if i == 0 {
                            sim.update_simulation().unwrap();
                        } else {
                            let status = sim.get_current_status();
                            assert!(status.temps.grill_temp >= 70.0);
                            assert!(status.temps.grill_temp <= 500.0);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert!(sim.state().cooking_active);
    }

    #[test]
    fn test_non_finite_tick_is_rejected_and_state_kept() {
        let (sim, clock) = simulator(9);
        let broken: &'static CookingScenario = Box::leak(Box::new(CookingScenario {
            grill_heating_rate: f64::NAN,
            ..scenario::BRISKET.clone()
        }));
        sim.start_cooking_with(broken);
        let before = sim.state();

        clock.advance(Duration::seconds(5));
        let err = sim.update_simulation().unwrap_err();
        assert!(matches!(err, SimulatorError::NonFiniteTemperature { field: "grill" }));

        let after = sim.state();
        assert_eq!(after.grill_temp, before.grill_temp);
        assert_eq!(after.last_update, before.last_update);
        assert_eq!(after.mode, CookingMode::Startup);

        // A built-in preset recovers on the next tick.
        sim.start_cooking("brisket");
        clock.advance(Duration::seconds(5));
        assert!(sim.update_simulation().is_ok());
    }
}
