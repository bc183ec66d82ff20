//! Monotonic millisecond clock and a sleep that does not overshoot.

use std::{
    sync::OnceLock,
    thread,
    time::{Duration, Instant},
};

/// Step used by [`precise_sleep`] between two elapsed-time checks.
pub const SLEEP_STEP: Duration = Duration::from_micros(100);

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Milliseconds since a process-wide epoch. Only meaningful as a difference.
#[inline]
pub fn now_ms() -> u64 {
    EPOCH.get_or_init(Instant::now).elapsed().as_millis() as u64
}

/// Milliseconds elapsed since `since`, a value previously returned by [`now_ms`].
#[inline]
pub fn elapsed_ms(since: u64) -> u64 {
    now_ms().saturating_sub(since)
}

/// Block for at least `duration`.
///
/// Sleeps in [`SLEEP_STEP`] increments and re-reads the clock after each one,
/// so the overshoot stays within one step plus one scheduler wakeup.
///
/// The running flag is not consulted: a phase in progress always completes.
pub fn precise_sleep(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        thread::sleep(SLEEP_STEP);
    }
}
