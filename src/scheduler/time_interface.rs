use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Wall-clock source for the simulator. Elapsed time between ticks is derived
/// from successive `now_wallclock` readings, so a test clock can stand in for
/// minutes or hours of real time.
pub trait TimeInterface: Send + Sync {
    fn now_wallclock(&self) -> DateTime<Utc>;
}

/// Reads the host clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTime;

impl TimeInterface for SystemTime {
    fn now_wallclock(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualTime {
    current: Mutex<DateTime<Utc>>,
}

impl ManualTime {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Starts at the current host time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    pub fn advance(&self, dt: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        *current += dt;
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = instant;
    }
}

impl TimeInterface for ManualTime {
    fn now_wallclock(&self) -> DateTime<Utc> {
        *self.current.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_time_advances_only_on_request() {
        let start = Utc::now();
        let clock = ManualTime::new(start);
        assert_eq!(clock.now_wallclock(), start);
        clock.advance(Duration::minutes(3));
        assert_eq!(clock.now_wallclock() - start, Duration::minutes(3));
        clock.set(start);
        assert_eq!(clock.now_wallclock(), start);
    }

    #[test]
    fn test_system_time_is_monotonic_enough() {
        let clock = SystemTime;
        let a = clock.now_wallclock();
        let b = clock.now_wallclock();
        assert!(b >= a);
    }
}
