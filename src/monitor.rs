use std::{sync::Arc, thread};

use crate::{Table, clock};

/// How a simulation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Philosopher `philosopher` (1-based) went longer than `time_to_die`
    /// without starting a meal. `at_ms` is relative to the table start.
    Died { philosopher: usize, at_ms: u64 },
    /// Every philosopher ate at least `meals` times.
    AllAte { meals: u32 },
    /// The table was stopped from outside the death-watch.
    Stopped,
}

/// The death-watch.
///
/// Sweeps the table every `poll_interval`: first for a philosopher that has
/// starved, then, if a meal count is configured, for completion. A death is
/// therefore reported at most one poll interval (plus scheduling jitter and
/// the length of one sweep) after `time_to_die` is exceeded.
///
/// Exactly one terminal line is printed per run, because both terminal
/// paths test and clear the running flag in one critical section and the
/// loop exits right after either.
pub struct Monitor {
    table: Arc<Table>,
}

impl Monitor {
    pub fn new(table: Arc<Table>) -> Self {
        Self { table }
    }

    pub fn run(&self) -> Outcome {
        let poll_interval = self.table.config().poll_interval;
        tracing::debug!(?poll_interval, "Death-watch started");
        let outcome = loop {
            if !self.table.is_running() {
                break Outcome::Stopped;
            }
            if let Some(outcome) = self.check_death() {
                break outcome;
            }
            if let Some(outcome) = self.check_all_ate() {
                break outcome;
            }
            thread::sleep(poll_interval);
        };
        tracing::info!(?outcome, "Simulation ended");
        outcome
    }

    /// Look for a philosopher past `time_to_die`, in seat order, sampling the
    /// clock separately for each one.
    ///
    /// Returns `Some` only if this call stopped the table.
    pub fn check_death(&self) -> Option<Outcome> {
        let time_to_die = self.table.config().die_ms();
        for seat in 0..self.table.philosophers() {
            let now = clock::now_ms();
            let elapsed = self.table.since_last_meal(seat, now);
            if elapsed > time_to_die {
                let id = seat + 1;
                tracing::debug!(philosopher = id, elapsed, time_to_die, "Starved");
                if !self.table.reporter().death(&self.table, id) {
                    return None;
                }
                return Some(Outcome::Died {
                    philosopher: id,
                    at_ms: now.saturating_sub(self.table.start()),
                });
            }
        }
        None
    }

    /// Stop the table if every philosopher has eaten the required number of
    /// meals. Always `None` when no meal count is configured.
    pub fn check_all_ate(&self) -> Option<Outcome> {
        let meals = self.table.config().meals_required?;
        if !self.table.finish_if_all_ate(meals) {
            return None;
        }
        self.table.reporter().all_ate(&self.table, meals);
        Some(Outcome::AllAte { meals })
    }
}
