//! Operator console for the simulated device.
//!
//! One command per line: `start [scenario]`, `stop`, `temp <degrees>`,
//! `status`, `scenarios`, `help`, `quit`. Input validation lives here; the
//! simulator itself accepts any setpoint.

use std::ops::RangeInclusive;
use std::str::FromStr;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite};

use crate::scenario;
use crate::simulator::TelemetrySimulator;
use crate::status::StatusSnapshot;

/// Setpoints the console accepts, in °F.
pub const SETPOINT_RANGE: RangeInclusive<i32> = 1..=3600;

#[derive(Debug, Error, PartialEq)]
pub enum ConsoleError {
    #[error("Unknown command '{0}' (try 'help')")]
    UnknownCommand(String),
    #[error("'{0}' requires an argument")]
    MissingArgument(&'static str),
    #[error("Invalid temperature '{0}'")]
    InvalidTemperature(String),
    #[error(
        "Temperature {0} outside {min}..={max}",
        min = SETPOINT_RANGE.start(),
        max = SETPOINT_RANGE.end()
    )]
    TemperatureOutOfRange(i32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    StartCooking { scenario: Option<String> },
    StopCooking,
    SetTargetTemperature(i32),
    Status,
    ListScenarios,
    Help,
    Quit,
}

impl FromStr for DeviceCommand {
    type Err = ConsoleError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb.to_ascii_lowercase().as_str() {
            "start" => Ok(DeviceCommand::StartCooking {
                scenario: (!rest.is_empty()).then(|| rest.to_string()),
            }),
            "stop" => Ok(DeviceCommand::StopCooking),
            "temp" | "setpoint" => {
                if rest.is_empty() {
                    return Err(ConsoleError::MissingArgument("temp"));
                }
                let degrees: i32 = rest
                    .parse()
                    .map_err(|_| ConsoleError::InvalidTemperature(rest.to_string()))?;
                if !SETPOINT_RANGE.contains(&degrees) {
                    return Err(ConsoleError::TemperatureOutOfRange(degrees));
                }
                Ok(DeviceCommand::SetTargetTemperature(degrees))
            }
            "status" => Ok(DeviceCommand::Status),
            "scenarios" => Ok(DeviceCommand::ListScenarios),
            "help" | "?" => Ok(DeviceCommand::Help),
            "quit" | "exit" => Ok(DeviceCommand::Quit),
            other => Err(ConsoleError::UnknownCommand(other.to_string())),
        }
    }
}

/// What the caller should do after a command ran.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    Done,
    Snapshot(StatusSnapshot),
    Text(String),
    Quit,
}

pub const HELP_TEXT: &str = "\
start [scenario]  begin a cook (brisket, porkshoulder, ribs, chicken, default)
stop              stop cooking; the smoker cools passively
temp <degrees>    change the setpoint (1-3600)
status            print the current status as JSON
scenarios         list cooking presets
quit              shut the device down";

/// Apply a parsed command to the simulator.
pub fn execute(simulator: &TelemetrySimulator, command: DeviceCommand) -> CommandOutcome {
    match command {
        DeviceCommand::StartCooking { scenario: name } => {
            let name = name.unwrap_or_else(|| "default".to_string());
            if !scenario::is_known(&name) {
                tracing::warn!("Unknown scenario '{}', using default preset", name);
            }
            simulator.start_cooking(&name);
            CommandOutcome::Done
        }
        DeviceCommand::StopCooking => {
            simulator.stop_cooking();
            CommandOutcome::Done
        }
        DeviceCommand::SetTargetTemperature(degrees) => {
            simulator.set_target_temperature(degrees);
            CommandOutcome::Done
        }
        DeviceCommand::Status => CommandOutcome::Snapshot(simulator.get_current_status()),
        DeviceCommand::ListScenarios => CommandOutcome::Text(
            scenario::all()
                .iter()
                .map(|s| {
                    format!(
                        "{:<14} grill {:>3.0}  probe {:>3.0}  tolerance ±{:.0}",
                        s.name, s.target_grill_temp, s.target_probe_temp, s.temp_tolerance
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        DeviceCommand::Help => CommandOutcome::Text(HELP_TEXT.to_string()),
        DeviceCommand::Quit => CommandOutcome::Quit,
    }
}

/// Why a console session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The operator asked to shut the device down.
    Quit,
    /// Input hit end-of-file or failed. The device keeps running.
    InputClosed,
}

/// Reads commands line by line from `input` and applies them. Status
/// snapshots go to `output` as JSON lines; errors and text replies go to
/// stderr.
pub async fn run_session<R, W>(
    simulator: &TelemetrySimulator,
    input: R,
    mut output: W,
) -> SessionEnd
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return SessionEnd::InputClosed,
            Err(e) => {
                tracing::error!("Console read error: {}", e);
                return SessionEnd::InputClosed;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match line.parse::<DeviceCommand>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        match execute(simulator, command) {
            CommandOutcome::Done => {}
            CommandOutcome::Snapshot(snapshot) => {
                if let Err(e) = crate::telemetry::write_snapshot(&mut output, &snapshot).await {
                    tracing::error!("Failed to write status: {}", e);
                }
            }
            CommandOutcome::Text(text) => eprintln!("{text}"),
            CommandOutcome::Quit => return SessionEnd::Quit,
        }
    }
}
