use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{Error, ForkSet, Reporter, Result, SimulationConfig, Status, clock};

/// Meal bookkeeping for one philosopher.
///
/// Written only by the philosopher's own thread, read by the monitor, and
/// always under the table's data lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Seat {
    /// [`clock::now_ms`] at the start of the latest meal, or the table start.
    pub last_meal: u64,
    pub meals_eaten: u32,
}

struct TableState {
    running: bool,
    seats: Vec<Seat>,
}

/// Process-wide simulation state.
///
/// - the immutable [`SimulationConfig`] and start timestamp
/// - the data lock guarding the running flag and every [`Seat`]
/// - the [`ForkSet`]
/// - the [`Reporter`], which owns the separate print lock
///
/// The running flag starts `true` and goes `false` exactly once.
pub struct Table {
    config: SimulationConfig,
    start: u64,
    state: Mutex<TableState>,
    forks: ForkSet,
    reporter: Reporter,
}

impl Table {
    /// Lay the table. The start timestamp is taken now and every seat's
    /// `last_meal` starts there.
    pub fn new(config: SimulationConfig, reporter: Reporter) -> Result<Self> {
        Self::lay(config, &mut Some(reporter))
    }

    /// Like [`new`](Table::new), but the reporter is only moved out of
    /// `reporter` once every allocation has succeeded. On an allocation
    /// error it is left in place for a later attempt.
    pub(crate) fn lay(config: SimulationConfig, reporter: &mut Option<Reporter>) -> Result<Self> {
        let forks = ForkSet::new(config.philosophers)?;
        let mut seats = Vec::new();
        seats.try_reserve_exact(config.philosophers)?;
        let reporter = reporter.take().ok_or(Error::AlreadyStarted)?;
        let start = clock::now_ms();
        seats.resize(
            config.philosophers,
            Seat {
                last_meal: start,
                meals_eaten: 0,
            },
        );
        Ok(Self {
            config,
            start,
            state: Mutex::new(TableState {
                running: true,
                seats,
            }),
            forks,
            reporter,
        })
    }

    #[inline]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    pub fn start(&self) -> u64 {
        self.start
    }

    #[inline]
    pub fn forks(&self) -> &ForkSet {
        &self.forks
    }

    #[inline]
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    #[inline]
    pub fn philosophers(&self) -> usize {
        self.config.philosophers
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// Clear the running flag. Returns `true` only for the call that
    /// actually flipped it.
    pub fn stop(&self) -> bool {
        let mut state = self.lock();
        let was_running = state.running;
        state.running = false;
        was_running
    }

    /// Start a meal for the philosopher at `seat`: stamp `last_meal` and bump
    /// the counter in one critical section. Returns the new count.
    pub fn record_meal(&self, seat: usize) -> u32 {
        let mut state = self.lock();
        let entry = &mut state.seats[seat];
        entry.last_meal = clock::now_ms();
        entry.meals_eaten += 1;
        entry.meals_eaten
    }

    /// Milliseconds between the latest meal at `seat` and `now`.
    pub fn since_last_meal(&self, seat: usize, now: u64) -> u64 {
        now.saturating_sub(self.lock().seats[seat].last_meal)
    }

    /// Whether every philosopher has eaten at least `required` times.
    pub fn all_ate(&self, required: u32) -> bool {
        self.lock().seats.iter().all(|s| s.meals_eaten >= required)
    }

    /// Stop the table if every philosopher has eaten `required` times.
    ///
    /// Check and transition share one critical section. Returns `true` if this
    /// call stopped the table.
    pub fn finish_if_all_ate(&self, required: u32) -> bool {
        let mut state = self.lock();
        if !state.running || state.seats.iter().any(|s| s.meals_eaten < required) {
            return false;
        }
        state.running = false;
        true
    }

    pub fn meals(&self, seat: usize) -> u32 {
        self.lock().seats[seat].meals_eaten
    }

    /// Copy of every seat, taken under one lock.
    pub fn seats(&self) -> Vec<Seat> {
        self.lock().seats.clone()
    }

    /// Report a status line for philosopher `id` (1-based).
    #[inline]
    pub fn report(&self, id: usize, status: Status) {
        self.reporter.status(self, id, status);
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Transcript;

    fn table(n: usize) -> Table {
        let config = SimulationConfig::from_millis(n, 800, 200, 200);
        Table::new(config, Reporter::new(Box::new(Transcript::new()))).unwrap()
    }

    #[test]
    fn test_new_table() {
        let table = table(4);
        assert!(table.is_running());
        assert_eq!(table.forks().len(), 4);
        let seats = table.seats();
        assert_eq!(seats.len(), 4);
        assert!(seats.iter().all(|s| s.last_meal == table.start()));
        assert!(seats.iter().all(|s| s.meals_eaten == 0));
    }

    #[test]
    fn test_stop_is_terminal() {
        let table = table(2);
        assert!(table.stop());
        assert!(!table.is_running());
        assert!(!table.stop());
        assert!(!table.is_running());
    }

    #[test]
    fn test_record_meal() {
        let table = table(3);
        assert_eq!(table.record_meal(1), 1);
        assert_eq!(table.record_meal(1), 2);
        assert_eq!(table.meals(1), 2);
        assert_eq!(table.meals(0), 0);
        assert!(table.seats()[1].last_meal >= table.start());
    }

    #[test]
    fn test_since_last_meal() {
        let table = table(1);
        let start = table.start();
        assert_eq!(table.since_last_meal(0, start + 150), 150);
        assert_eq!(table.since_last_meal(0, start.saturating_sub(1)), 0);
    }

    #[test]
    fn test_finish_if_all_ate() {
        let table = table(2);
        table.record_meal(0);
        assert!(!table.all_ate(1));
        assert!(!table.finish_if_all_ate(1));
        assert!(table.is_running());

        table.record_meal(1);
        assert!(table.all_ate(1));
        assert!(table.finish_if_all_ate(1));
        assert!(!table.is_running());
        assert!(!table.finish_if_all_ate(1));
    }
}
