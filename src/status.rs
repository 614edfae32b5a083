//! Read-side projection of the simulation state, shaped for JSON transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::simulator::state::{CookingMode, SimulationState};

/// `ttl` for active-session documents: keep forever.
pub const TTL_PERMANENT: i64 = -1;
/// `ttl` for passive telemetry: three days, in seconds.
pub const TTL_TELEMETRY: i64 = 259_200;

/// Retention class of a snapshot, consumed by downstream storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionClass {
    Session,
    Telemetry,
}

impl RetentionClass {
    pub fn ttl(&self) -> i64 {
        match self {
            RetentionClass::Session => TTL_PERMANENT,
            RetentionClass::Telemetry => TTL_TELEMETRY,
        }
    }

    pub fn type_tag(&self) -> &'static str {
        match self {
            RetentionClass::Session => "status",
            RetentionClass::Telemetry => "telemetry",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Temps {
    pub grill_temp: f64,
    pub probe1_temp: f64,
    pub probe2_temp: f64,
    pub probe3_temp: f64,
    pub probe4_temp: f64,
}

/// One status reading as emitted by the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub id: Uuid,
    pub ttl: i64,
    pub smoker_id: String,
    pub session_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: String,
    pub auger_on: bool,
    pub blower_on: bool,
    pub igniter_on: bool,
    pub temps: Temps,
    pub fire_healthy: bool,
    pub mode: CookingMode,
    pub set_point: f64,
    pub mode_time: DateTime<Utc>,
    pub current_time: DateTime<Utc>,
}

impl StatusSnapshot {
    pub fn from_state(state: &SimulationState, smoker_id: &str, now: DateTime<Utc>) -> Self {
        let retention = if state.cooking_active {
            RetentionClass::Session
        } else {
            RetentionClass::Telemetry
        };
        Self {
            id: Uuid::new_v4(),
            ttl: retention.ttl(),
            smoker_id: smoker_id.to_string(),
            session_id: if state.cooking_active { state.session_id } else { None },
            kind: retention.type_tag().to_string(),
            auger_on: state.components.auger,
            blower_on: state.components.blower,
            igniter_on: state.components.igniter,
            temps: Temps {
                grill_temp: round_tenth(state.grill_temp),
                probe1_temp: round_tenth(state.probe_temp),
                probe2_temp: 0.0,
                probe3_temp: 0.0,
                probe4_temp: 0.0,
            },
            fire_healthy: state.fire_healthy(),
            mode: state.mode,
            set_point: state.target_temp,
            mode_time: state.cooking_started,
            current_time: now,
        }
    }

    pub fn retention(&self) -> RetentionClass {
        if self.ttl == TTL_PERMANENT {
            RetentionClass::Session
        } else {
            RetentionClass::Telemetry
        }
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
