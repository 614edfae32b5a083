//! Simulated MeatGeek smoker: a thread-safe thermal model of a pellet BBQ
//! smoker, a periodic driver that advances it, and the status snapshots it
//! reports.

pub mod config;
pub mod console;
pub mod scenario;
pub mod scheduler;
pub mod simulator;
pub mod status;
pub mod telemetry;

pub use config::{Config, ConfigError};
pub use scenario::CookingScenario;
pub use scheduler::{DriverHandle, PeriodicDriver};
pub use simulator::state::{CookingMode, SimulationState};
pub use simulator::{SimulatorError, TelemetrySimulator};
pub use status::StatusSnapshot;
