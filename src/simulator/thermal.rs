// src/simulator/thermal.rs - Grill/probe thermal model and mode logic
use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use super::state::{CookingMode, MAX_GRILL_TEMP, SimulationState};

/// Probe can never get closer than this to the grill temperature.
pub const PROBE_GRILL_GAP: f64 = 20.0;
/// Upper bound of the random relief applied when the probe hits its ceiling.
const PROBE_RELIEF: f64 = 10.0;
/// Passive cooling runs at this fraction of the scenario cooling rate.
const PASSIVE_COOLING_FACTOR: f64 = 0.5;
/// Probe cools at this fraction of the grill's passive rate.
const PROBE_COOLING_FACTOR: f64 = 0.3;
/// Auger hysteresis: on above +band, off below -band.
const AUGER_BAND: f64 = 10.0;
const BLOWER_THRESHOLD: f64 = 15.0;

const STARTUP_PHASE: Duration = Duration::minutes(5);
const BLOWER_STARTUP: Duration = Duration::minutes(10);
const IGNITER_STARTUP: Duration = Duration::minutes(15);

/// Advance `state` to `now`. Mirrors one tick of the physical smoker.
pub fn advance<R: Rng>(state: &mut SimulationState, rng: &mut R, now: DateTime<Utc>) {
    let minutes = elapsed_minutes(state.last_update, now);

    if !state.cooking_active {
        cool_passively(state, minutes);
    } else {
        update_grill(state, rng, minutes);
        update_probe(state, rng, minutes);
        let cooking_elapsed = now - state.cooking_started;
        update_components(state, cooking_elapsed);
        update_mode(state, cooking_elapsed);
    }

    state.last_update = now;
}

/// Minutes between two readings. A clock that steps backwards counts as zero.
pub fn elapsed_minutes(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    if delta < Duration::zero() {
        tracing::warn!(
            "Clock moved backwards by {}ms; treating tick as instantaneous",
            -delta.num_milliseconds()
        );
        return 0.0;
    }
    delta.num_milliseconds() as f64 / 60_000.0
}

fn cool_passively(state: &mut SimulationState, minutes: f64) {
    let ambient = state.scenario.ambient_temp;
    let rate = state.scenario.grill_cooling_rate * PASSIVE_COOLING_FACTOR;

    if state.grill_temp > ambient {
        state.grill_temp = (state.grill_temp - rate * minutes).max(ambient);
    }
    if state.probe_temp > ambient {
        state.probe_temp = (state.probe_temp - rate * PROBE_COOLING_FACTOR * minutes).max(ambient);
    }
}

fn update_grill<R: Rng>(state: &mut SimulationState, rng: &mut R, minutes: f64) {
    let scenario = state.scenario;
    let target = state.target_temp;
    let tol = scenario.temp_tolerance;
    let diff = target - state.grill_temp;

    let next = if diff.abs() <= tol {
        // Holding temperature: small steady-state wobble
        state.grill_temp + rng.random_range(-tol / 4.0..=tol / 4.0)
    } else if diff > 0.0 {
        let step = scenario.grill_heating_rate * minutes * rng.random_range(0.8..=1.2);
        let heated = state.grill_temp + step;
        if heated > target + tol {
            target + rng.random_range(0.0..=tol)
        } else {
            heated
        }
    } else {
        let step = scenario.grill_cooling_rate * minutes * rng.random_range(0.8..=1.2);
        let cooled = state.grill_temp - step;
        if cooled < target - tol {
            target - rng.random_range(0.0..=tol)
        } else {
            cooled
        }
    };

    state.grill_temp = next.clamp(scenario.ambient_temp, MAX_GRILL_TEMP);
}

fn update_probe<R: Rng>(state: &mut SimulationState, rng: &mut R, minutes: f64) {
    let scenario = state.scenario;
    let candidate =
        (state.probe_temp + scenario.meat_heating_rate * minutes).min(scenario.target_probe_temp);
    let ceiling = state.grill_temp - PROBE_GRILL_GAP;

    let next = if candidate > ceiling {
        (ceiling - rng.random_range(0.0..=PROBE_RELIEF)).max(state.probe_temp)
    } else {
        candidate
    };

    state.probe_temp = next.max(scenario.ambient_temp);
}

/// Uses the mode from before this tick's mode update.
fn update_components(state: &mut SimulationState, cooking_elapsed: Duration) {
    let diff = state.target_temp - state.grill_temp;
    let in_startup = state.mode == CookingMode::Startup;

    state.components.igniter = in_startup && cooking_elapsed < IGNITER_STARTUP;

    if diff > AUGER_BAND {
        state.components.auger = true;
    } else if diff < -AUGER_BAND {
        state.components.auger = false;
    }

    state.components.blower =
        diff > BLOWER_THRESHOLD || (in_startup && cooking_elapsed < BLOWER_STARTUP);
}

fn update_mode(state: &mut SimulationState, cooking_elapsed: Duration) {
    let target = state.target_temp;
    let tol = state.scenario.temp_tolerance;

    state.mode = if cooking_elapsed < STARTUP_PHASE {
        CookingMode::Startup
    } else if (target - state.grill_temp).abs() <= tol {
        CookingMode::Cooking
    } else if state.grill_temp < target - tol {
        CookingMode::Heating
    } else {
        CookingMode::Cooling
    };
}
