// src/telemetry.rs - Periodic status output as JSON lines
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tokio::time::{Duration, MissedTickBehavior};

use crate::simulator::TelemetrySimulator;
use crate::status::StatusSnapshot;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize one snapshot and write it followed by a newline.
pub async fn write_snapshot<W>(
    sink: &mut W,
    snapshot: &StatusSnapshot,
) -> Result<(), TelemetryError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(snapshot)?;
    line.push(b'\n');
    sink.write_all(&line).await?;
    sink.flush().await?;
    Ok(())
}

/// Samples the simulator on an interval and writes each reading to `sink`
/// until shutdown is signalled. A failed write is logged and the loop
/// continues. Returns the number of snapshots written.
pub async fn run_emitter<W>(
    simulator: Arc<TelemetrySimulator>,
    interval: Duration,
    mut sink: W,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> u64
where
    W: AsyncWrite + Unpin,
{
    let mut interval = tokio::time::interval(interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut sent = 0;
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                tracing::info!("Telemetry emitter shutting down after {} messages", sent);
                break;
            }
            _ = interval.tick() => {
                let snapshot = simulator.get_current_status();
                match write_snapshot(&mut sink, &snapshot).await {
                    Ok(()) => sent += 1,
                    Err(e) => tracing::error!("Telemetry write error: {}", e),
                }
            }
        }
    }
    sent
}
