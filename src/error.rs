use std::collections::TryReserveError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("number_of_philosophers must be at least 1")]
    NoPhilosophers,

    #[error("{0} must be a positive number of milliseconds")]
    ZeroDuration(&'static str),

    #[error("number_of_times_each_philosopher_must_eat must be positive")]
    ZeroMeals,

    #[error(
        "time_to_die ({die} ms) must be > time_to_eat + time_to_sleep ({eat} + {sleep} ms) \
         (recommended: time_to_die >= {recommended} ms, at least 100ms margin)",
        recommended = .eat + .sleep + 100
    )]
    InsufficientMargin { die: u64, eat: u64, sleep: u64 },

    #[error("Couldn't allocate the table: {0}")]
    Allocation(#[from] TryReserveError),

    #[error("Couldn't spawn a thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    #[error("Thread '{0}' panicked")]
    ThreadPanicked(String),

    #[error("The simulation has already started.")]
    AlreadyStarted,
}
