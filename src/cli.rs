//! Command line arguments of the `philo` binary.

use clap::Parser;

use crate::{Result, SimulationConfig};

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "philo")]
#[command(version, about = "Dining philosophers simulation", long_about = None)]
pub struct Args {
    /// Number of philosophers, and of forks
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub number_of_philosophers: u32,

    /// Milliseconds a philosopher survives without starting a meal
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub time_to_die: u64,

    /// Milliseconds spent eating
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub time_to_eat: u64,

    /// Milliseconds spent sleeping
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub time_to_sleep: u64,

    /// Stop once every philosopher has eaten this many times
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub number_of_times_each_philosopher_must_eat: Option<u32>,
}

impl Args {
    /// Build a validated config, including the eat + sleep < die margin.
    pub fn into_config(self) -> Result<SimulationConfig> {
        let mut config = SimulationConfig::from_millis(
            self.number_of_philosophers as usize,
            self.time_to_die,
            self.time_to_eat,
            self.time_to_sleep,
        );
        if let Some(meals) = self.number_of_times_each_philosopher_must_eat {
            config = config.with_meals_required(meals);
        }
        config.validate()?;
        config.check_margin()?;
        Ok(config)
    }
}
