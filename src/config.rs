use std::time::Duration;

use crate::{Error, Result};

/// Parameters of one simulation run.
///
/// Built once by the supervisor and never changed afterwards. The core assumes
/// [`validate`](SimulationConfig::validate) has passed; [`check_margin`] is
/// advisory and only consulted by the command line front-end.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use philosophers::SimulationConfig;
///
/// let config = SimulationConfig::new(
///     5,
///     Duration::from_millis(800),
///     Duration::from_millis(200),
///     Duration::from_millis(200),
/// )
/// .with_meals_required(7)
/// .with_poll_interval(Duration::from_micros(500));
///
/// assert!(config.validate().is_ok());
/// ```
///
/// [`check_margin`]: SimulationConfig::check_margin
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// Number of philosophers, and of forks.
    pub philosophers: usize,

    /// A philosopher that has not started a meal for longer than this dies.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub time_to_die: Duration,

    /// How long a philosopher holds both forks.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub time_to_eat: Duration,

    /// How long a philosopher sleeps after putting the forks down.
    #[cfg_attr(feature = "serde", serde(with = "millis"))]
    pub time_to_sleep: Duration,

    /// When set, the run ends once every philosopher has eaten this many times.
    /// When absent the run only ends with a death.
    pub meals_required: Option<u32>,

    /// Delay between two death-watch sweeps.
    /// Bounds the detection latency together with scheduling jitter.
    /// Default: 1 ms
    #[cfg_attr(feature = "serde", serde(with = "millis", default = "default_poll"))]
    pub poll_interval: Duration,

    /// Head start given to odd philosophers: even ids wait this long before
    /// their first cycle.
    /// Default: 1 ms
    #[cfg_attr(feature = "serde", serde(with = "millis", default = "default_stagger"))]
    pub stagger: Duration,
}

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);
const DEFAULT_STAGGER: Duration = Duration::from_millis(1);

impl SimulationConfig {
    pub fn new(
        philosophers: usize,
        time_to_die: Duration,
        time_to_eat: Duration,
        time_to_sleep: Duration,
    ) -> Self {
        Self {
            philosophers,
            time_to_die,
            time_to_eat,
            time_to_sleep,
            meals_required: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            stagger: DEFAULT_STAGGER,
        }
    }

    /// Shorthand for [`new`](SimulationConfig::new) with every duration in milliseconds.
    pub fn from_millis(philosophers: usize, die: u64, eat: u64, sleep: u64) -> Self {
        Self::new(
            philosophers,
            Duration::from_millis(die),
            Duration::from_millis(eat),
            Duration::from_millis(sleep),
        )
    }

    /// End the run once every philosopher has eaten `meals` times.
    pub fn with_meals_required(mut self, meals: u32) -> Self {
        self.meals_required = Some(meals);
        self
    }

    /// Set the death-watch poll interval.
    ///
    /// Tests compress it to make detection assertions tight; the default
    /// matches the usual 1 ms scheduler tick.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the startup offset applied to even-numbered philosophers.
    pub fn with_stagger(mut self, stagger: Duration) -> Self {
        self.stagger = stagger;
        self
    }

    /// Reject configurations the core cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.philosophers == 0 {
            return Err(Error::NoPhilosophers);
        }
        let durations = [
            ("time_to_die", self.time_to_die),
            ("time_to_eat", self.time_to_eat),
            ("time_to_sleep", self.time_to_sleep),
        ];
        for (name, duration) in durations {
            if duration.as_millis() == 0 {
                return Err(Error::ZeroDuration(name));
            }
        }
        if self.poll_interval.is_zero() {
            return Err(Error::ZeroDuration("poll_interval"));
        }
        if self.meals_required == Some(0) {
            return Err(Error::ZeroMeals);
        }
        Ok(())
    }

    /// Check that a well-behaved philosopher can eat again before dying.
    ///
    /// Requires `time_to_die > time_to_eat + time_to_sleep`.
    pub fn check_margin(&self) -> Result<()> {
        let die = self.die_ms();
        let eat = self.eat_ms();
        let sleep = self.sleep_ms();
        if die <= eat + sleep {
            return Err(Error::InsufficientMargin { die, eat, sleep });
        }
        Ok(())
    }

    /// How long a philosopher thinks before reaching for its forks.
    ///
    /// Zero on an even ring or a single seat. On an odd ring it is
    /// `2 * time_to_eat - time_to_sleep` (saturating), which spaces each
    /// philosopher's cycles by three meal slots so the two odd-numbered
    /// neighbours across the wrap take turns with the shared fork.
    pub fn think_time(&self) -> Duration {
        if self.philosophers < 2 || self.philosophers % 2 == 0 {
            return Duration::ZERO;
        }
        (self.time_to_eat * 2).saturating_sub(self.time_to_sleep)
    }

    #[inline]
    pub fn die_ms(&self) -> u64 {
        self.time_to_die.as_millis() as u64
    }

    #[inline]
    pub fn eat_ms(&self) -> u64 {
        self.time_to_eat.as_millis() as u64
    }

    #[inline]
    pub fn sleep_ms(&self) -> u64 {
        self.time_to_sleep.as_millis() as u64
    }
}

#[cfg(feature = "serde")]
fn default_poll() -> Duration {
    DEFAULT_POLL_INTERVAL
}

#[cfg(feature = "serde")]
fn default_stagger() -> Duration {
    DEFAULT_STAGGER
}

#[cfg(feature = "serde")]
mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
