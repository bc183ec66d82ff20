use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::Result;

/// One fork. The mutex is the exclusive resource; the payload only counts
/// how many times it has been picked up.
#[derive(Debug, Default)]
struct Fork {
    pickups: u64,
}

/// Proof that the holder owns a fork. Dropping it puts the fork down.
#[must_use = "dropping the guard puts the fork down immediately"]
pub struct ForkGuard<'a> {
    index: usize,
    _guard: MutexGuard<'a, Fork>,
}

impl ForkGuard<'_> {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

/// The ring of forks. Fork `i` sits between philosopher `i` and `i + 1`
/// (zero-based), so philosopher `i` reaches for forks `i` and `(i + 1) % n`.
///
/// The set is sized once and never resized; every philosopher borrows it
/// through the shared table.
#[derive(Debug)]
pub struct ForkSet {
    forks: Vec<Mutex<Fork>>,
}

impl ForkSet {
    pub fn new(count: usize) -> Result<Self> {
        let mut forks = Vec::new();
        forks.try_reserve_exact(count)?;
        forks.extend((0..count).map(|_| Mutex::new(Fork::default())));
        Ok(Self { forks })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.forks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.forks.is_empty()
    }

    /// Index of the left fork of the philosopher at ring position `seat`.
    #[inline]
    pub fn left(&self, seat: usize) -> usize {
        seat % self.forks.len()
    }

    /// Index of the right fork of the philosopher at ring position `seat`.
    #[inline]
    pub fn right(&self, seat: usize) -> usize {
        (seat + 1) % self.forks.len()
    }

    /// Pick up fork `index`, blocking for as long as a neighbour holds it.
    ///
    /// There is no timeout. Progress relies on the acquisition order alone.
    pub fn take(&self, index: usize) -> ForkGuard<'_> {
        let mut guard = self.forks[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        guard.pickups += 1;
        ForkGuard {
            index,
            _guard: guard,
        }
    }

    /// How many times fork `index` has been picked up. Blocks while it is held.
    pub fn pickups(&self, index: usize) -> u64 {
        self.forks[index]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pickups
    }
}
