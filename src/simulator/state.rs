// src/simulator/state.rs - Mutable core of the smoker simulation
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scenario::{self, CookingScenario};

/// Upper bound for the simulated grill.
pub const MAX_GRILL_TEMP: f64 = 500.0;

/// Coarse cooking phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookingMode {
    #[default]
    Idle,
    Startup,
    Heating,
    Cooking,
    Cooling,
}

impl CookingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CookingMode::Idle => "idle",
            CookingMode::Startup => "startup",
            CookingMode::Heating => "heating",
            CookingMode::Cooking => "cooking",
            CookingMode::Cooling => "cooling",
        }
    }
}

impl std::fmt::Display for CookingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On/off state of the three actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Components {
    pub igniter: bool,
    pub auger: bool,
    pub blower: bool,
}

impl Components {
    pub const OFF: Components = Components {
        igniter: false,
        auger: false,
        blower: false,
    };

    pub fn any_on(&self) -> bool {
        self.igniter || self.auger || self.blower
    }
}

/// Everything the simulator knows about the smoker.
///
/// Invariants held between operations:
/// - `ambient <= grill_temp <= MAX_GRILL_TEMP`
/// - `mode == Idle` iff `!cooking_active`
/// - idle implies every component is off
/// - `session_id.is_some()` iff `cooking_active`
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub grill_temp: f64,
    pub probe_temp: f64,
    pub target_temp: f64,
    pub mode: CookingMode,
    pub components: Components,
    pub cooking_active: bool,
    pub session_id: Option<Uuid>,
    pub cooking_started: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub scenario: &'static CookingScenario,
}

impl SimulationState {
    /// Cold, idle smoker at the default scenario's ambient temperature.
    pub fn new(now: DateTime<Utc>) -> Self {
        let scenario = &scenario::DEFAULT;
        Self {
            grill_temp: scenario.ambient_temp,
            probe_temp: scenario.ambient_temp,
            target_temp: scenario.target_grill_temp,
            mode: CookingMode::Idle,
            components: Components::OFF,
            cooking_active: false,
            session_id: None,
            cooking_started: now,
            last_update: now,
            scenario,
        }
    }

    /// Derived, never stored: the fire is considered healthy once the grill is
    /// well above ambient and, while cooking, fuel is still being fed or the
    /// smoker is holding temperature.
    pub fn fire_healthy(&self) -> bool {
        let hot_enough = self.grill_temp >= self.scenario.ambient_temp + 50.0;
        let fed = if self.cooking_active {
            self.components.auger || self.mode == CookingMode::Cooking
        } else {
            true
        };
        hot_enough && fed
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.grill_temp.is_finite() && self.probe_temp.is_finite() && self.target_temp.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_cold_and_idle() {
        let state = SimulationState::new(Utc::now());
        assert_eq!(state.mode, CookingMode::Idle);
        assert!(!state.cooking_active);
        assert!(!state.components.any_on());
        assert_eq!(state.grill_temp, 70.0);
        assert_eq!(state.probe_temp, 70.0);
        assert!(state.session_id.is_none());
    }

    #[test]
    fn test_fire_health_requires_heat() {
        let mut state = SimulationState::new(Utc::now());
        assert!(!state.fire_healthy());
        state.grill_temp = 120.0;
        assert!(state.fire_healthy());
    }

    #[test]
    fn test_fire_health_while_cooking_requires_fuel_or_hold() {
        let mut state = SimulationState::new(Utc::now());
        state.cooking_active = true;
        state.mode = CookingMode::Heating;
        state.grill_temp = 200.0;
        assert!(!state.fire_healthy());
        state.components.auger = true;
        assert!(state.fire_healthy());
        state.components.auger = false;
        state.mode = CookingMode::Cooking;
        assert!(state.fire_healthy());
    }

    #[test]
    fn test_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CookingMode::Startup).unwrap(), "\"startup\"");
        assert_eq!(CookingMode::Cooling.to_string(), "cooling");
    }
}
