// src/scenario.rs - Built-in cooking presets
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use serde::Serialize;

/// Immutable preset describing how a cook behaves: setpoints, heating and
/// cooling rates and the band around the setpoint that counts as "at temp".
///
/// Rates are degrees per minute. All rates and the tolerance are positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CookingScenario {
    pub name: &'static str,
    pub target_grill_temp: f64,
    pub target_probe_temp: f64,
    #[serde(skip)]
    pub estimated_duration: Duration,
    pub grill_heating_rate: f64,
    pub grill_cooling_rate: f64,
    pub meat_heating_rate: f64,
    pub temp_tolerance: f64,
    pub ambient_temp: f64,
}

pub static BRISKET: CookingScenario = CookingScenario {
    name: "Brisket",
    target_grill_temp: 225.0,
    target_probe_temp: 203.0,
    estimated_duration: Duration::from_secs(12 * 3600),
    grill_heating_rate: 3.0,
    grill_cooling_rate: 2.0,
    meat_heating_rate: 0.5,
    temp_tolerance: 15.0,
    ambient_temp: 70.0,
};

pub static PORK_SHOULDER: CookingScenario = CookingScenario {
    name: "Pork Shoulder",
    target_grill_temp: 250.0,
    target_probe_temp: 195.0,
    estimated_duration: Duration::from_secs(10 * 3600),
    grill_heating_rate: 3.5,
    grill_cooling_rate: 2.5,
    meat_heating_rate: 0.7,
    temp_tolerance: 20.0,
    ambient_temp: 70.0,
};

pub static RIBS: CookingScenario = CookingScenario {
    name: "Ribs",
    target_grill_temp: 275.0,
    target_probe_temp: 190.0,
    estimated_duration: Duration::from_secs(6 * 3600),
    grill_heating_rate: 4.0,
    grill_cooling_rate: 3.0,
    meat_heating_rate: 1.0,
    temp_tolerance: 25.0,
    ambient_temp: 70.0,
};

pub static CHICKEN: CookingScenario = CookingScenario {
    name: "Chicken",
    target_grill_temp: 350.0,
    target_probe_temp: 165.0,
    estimated_duration: Duration::from_secs(90 * 60),
    grill_heating_rate: 5.0,
    grill_cooling_rate: 4.0,
    meat_heating_rate: 2.5,
    temp_tolerance: 15.0,
    ambient_temp: 70.0,
};

pub static DEFAULT: CookingScenario = CookingScenario {
    name: "Default",
    target_grill_temp: 225.0,
    target_probe_temp: 165.0,
    estimated_duration: Duration::from_secs(8 * 3600),
    grill_heating_rate: 3.0,
    grill_cooling_rate: 2.0,
    meat_heating_rate: 0.8,
    temp_tolerance: 15.0,
    ambient_temp: 70.0,
};

static CATALOG: LazyLock<HashMap<&'static str, &'static CookingScenario>> = LazyLock::new(|| {
    HashMap::from([
        ("brisket", &BRISKET),
        ("porkshoulder", &PORK_SHOULDER),
        ("ribs", &RIBS),
        ("chicken", &CHICKEN),
        ("default", &DEFAULT),
    ])
});

/// Lowercases and strips whitespace, `-` and `_` so "Pork Shoulder",
/// "pork_shoulder" and "PORKSHOULDER" share a key.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolve a scenario by name. Unknown names fall back to [`DEFAULT`].
pub fn lookup(name: &str) -> &'static CookingScenario {
    CATALOG.get(normalize(name).as_str()).copied().unwrap_or(&DEFAULT)
}

/// True when `name` names a preset rather than falling back.
pub fn is_known(name: &str) -> bool {
    CATALOG.contains_key(normalize(name).as_str())
}

/// All presets in a stable display order.
pub fn all() -> [&'static CookingScenario; 5] {
    [&BRISKET, &PORK_SHOULDER, &RIBS, &CHICKEN, &DEFAULT]
}
