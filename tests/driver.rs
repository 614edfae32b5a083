//! Periodic driver behaviour: cadence, shutdown and per-tick failure isolation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use meatgeek_sim::scenario::{self, CookingScenario};
use meatgeek_sim::scheduler::time_interface::{ManualTime, TimeInterface};
use meatgeek_sim::{CookingMode, PeriodicDriver, TelemetrySimulator};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::time::Duration;

/// Clock that panics on one chosen reading, then behaves.
struct FlakyClock {
    inner: ManualTime,
    calls: AtomicU64,
    fail_on: u64,
}

impl TimeInterface for FlakyClock {
    fn now_wallclock(&self) -> DateTime<Utc> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == self.fail_on {
            panic!("sensor clock glitch");
        }
        self.inner.now_wallclock()
    }
}

#[tokio::test(start_paused = true)]
async fn test_driver_advances_simulation() {
    let clock = Arc::new(ManualTime::starting_now());
    let sim = Arc::new(TelemetrySimulator::new("driver", clock.clone(), StdRng::seed_from_u64(1)));
    sim.start_cooking("chicken");

    let handle = PeriodicDriver::spawn(sim.clone(), Duration::from_secs(5));
    // Each real 5s tick covers 30s of simulated time.
    for _ in 0..24 {
        clock.advance(chrono::Duration::seconds(30));
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    assert!(handle.ticks() >= 24);
    assert_eq!(handle.failures(), 0);
    handle.shutdown().await;

    let state = sim.state();
    assert!(state.grill_temp > 70.0);
    assert_eq!(state.mode, CookingMode::Heating);
}

#[tokio::test(start_paused = true)]
async fn test_panicking_tick_does_not_stop_driver() {
    // Reading 0 is taken by the constructor, 1 by the first tick.
    let clock = Arc::new(FlakyClock {
        inner: ManualTime::starting_now(),
        calls: AtomicU64::new(0),
        fail_on: 1,
    });
    let sim = Arc::new(TelemetrySimulator::new("flaky", clock, StdRng::seed_from_u64(2)));

    let handle = PeriodicDriver::spawn(sim.clone(), Duration::from_secs(5));
    tokio::time::sleep(Duration::from_millis(20_001)).await;
    assert_eq!(handle.ticks(), 5);
    assert_eq!(handle.failures(), 1);
    assert!(!handle.is_finished());
    handle.shutdown().await;

    // The poisoned lock is recovered and the state is still the idle smoker.
    let status = sim.get_current_status();
    assert_eq!(status.mode, CookingMode::Idle);
    assert_eq!(status.temps.grill_temp, 70.0);
    sim.start_cooking("ribs");
    assert_eq!(sim.get_current_status().set_point, 275.0);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_updates_are_counted_and_leave_state_alone() {
    let clock = Arc::new(ManualTime::starting_now());
    let sim = Arc::new(TelemetrySimulator::new("nan", clock.clone(), StdRng::seed_from_u64(4)));
    let broken: &'static CookingScenario = Box::leak(Box::new(CookingScenario {
        grill_heating_rate: f64::NAN,
        ..scenario::BRISKET.clone()
    }));
    sim.start_cooking_with(broken);
    let started = sim.state();

    let handle = PeriodicDriver::spawn(sim.clone(), Duration::from_secs(5));
    tokio::time::sleep(Duration::from_millis(1)).await;
    for _ in 0..4 {
        clock.advance(chrono::Duration::seconds(5));
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    assert_eq!(handle.ticks(), 5);
    assert_eq!(handle.failures(), 5);
    assert!(!handle.is_finished());
    let held = sim.state();
    assert_eq!(held.grill_temp, 70.0);
    assert_eq!(held.last_update, started.last_update);

    // Switching to a built-in preset lets the next ticks commit.
    sim.start_cooking("brisket");
    clock.advance(chrono::Duration::seconds(5));
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(handle.failures(), 5);
    assert_eq!(handle.ticks(), 6);
    handle.shutdown().await;
    assert!(sim.state().grill_temp > 70.0);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_is_prompt() {
    let sim = Arc::new(TelemetrySimulator::new(
        "slow",
        Arc::new(ManualTime::starting_now()),
        StdRng::seed_from_u64(3),
    ));
    let handle = PeriodicDriver::spawn(sim, Duration::from_secs(60));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.ticks(), 1);
    let before = tokio::time::Instant::now();
    handle.shutdown().await;
    assert!(before.elapsed() < Duration::from_secs(60));
}
