use std::{sync::Arc, thread, time::Duration};

use crate::{ForkGuard, Status, Table, clock};

/// Idle step of a lone philosopher waiting, fork in hand, for the end.
const LONE_WAIT_STEP: Duration = Duration::from_millis(1);

/// One diner. Runs on its own thread until the table stops.
///
/// Cycle: think, take both forks, eat, put the forks down, sleep. On an odd
/// ring thinking lasts [`think_time`](crate::SimulationConfig::think_time).
/// The running flag is only checked at the top of the cycle, so a phase in
/// progress always runs to completion after a stop.
pub struct Philosopher {
    id: usize,
    table: Arc<Table>,
}

impl Philosopher {
    /// `id` is 1-based; the philosopher sits at ring position `id - 1`.
    /// Only the supervisor seats philosophers, always with `1..=N`.
    pub(crate) fn new(id: usize, table: Arc<Table>) -> Self {
        debug_assert!(id >= 1 && id <= table.philosophers());
        Self { id, table }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    fn seat(&self) -> usize {
        self.id - 1
    }

    #[inline]
    fn is_even(&self) -> bool {
        self.id % 2 == 0
    }

    pub fn run(&self) {
        tracing::debug!(philosopher = self.id, "Seated");
        if self.is_even() {
            thread::sleep(self.table.config().stagger);
        }
        while self.table.is_running() {
            self.think();
            let Some((left, right)) = self.take_forks() else {
                break;
            };
            self.eat();
            drop(left);
            drop(right);
            self.sleep();
        }
        tracing::debug!(
            philosopher = self.id,
            meals = self.table.meals(self.seat()),
            "Left the table"
        );
    }

    fn think(&self) {
        tracing::trace!(philosopher = self.id, "thinking");
        self.table.report(self.id, Status::Thinking);
        let think_time = self.table.config().think_time();
        if !think_time.is_zero() {
            clock::precise_sleep(think_time);
        }
    }

    /// Pick up both forks, returned as `(left, right)`.
    ///
    /// Even ids reach right first, odd ids left first. Neighbours on the
    /// ring have ids of opposite parity (except across the wrap of an odd
    /// ring, where two odd ids meet and both start with their own left
    /// fork), so no cycle of philosophers each holding one fork and
    /// waiting for the next can close.
    ///
    /// With a single philosopher both indices name the same fork: it is
    /// taken once, held until the table stops, and `None` is returned.
    fn take_forks(&self) -> Option<(ForkGuard<'_>, ForkGuard<'_>)> {
        let forks = self.table.forks();
        let left = forks.left(self.seat());
        let right = forks.right(self.seat());

        if left == right {
            let _only = self.take(left);
            while self.table.is_running() {
                thread::sleep(LONE_WAIT_STEP);
            }
            return None;
        }

        if self.is_even() {
            let right = self.take(right);
            let left = self.take(left);
            Some((left, right))
        } else {
            let left = self.take(left);
            let right = self.take(right);
            Some((left, right))
        }
    }

    fn take(&self, index: usize) -> ForkGuard<'_> {
        let fork = self.table.forks().take(index);
        tracing::trace!(philosopher = self.id, fork = index, "took fork");
        self.table.report(self.id, Status::TakenFork);
        fork
    }

    /// Called with both forks held. The data lock is taken, briefly, only
    /// after both fork locks have been acquired.
    fn eat(&self) {
        let meals = self.table.record_meal(self.seat());
        tracing::trace!(philosopher = self.id, meals, "eating");
        self.table.report(self.id, Status::Eating);
        clock::precise_sleep(self.table.config().time_to_eat);
    }

    fn sleep(&self) {
        tracing::trace!(philosopher = self.id, "sleeping");
        self.table.report(self.id, Status::Sleeping);
        clock::precise_sleep(self.table.config().time_to_sleep);
    }
}
