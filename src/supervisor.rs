use std::{
    io::Write,
    sync::Arc,
    thread::{self, JoinHandle},
};

use crate::{Error, Monitor, Outcome, Philosopher, Reporter, Result, SimulationConfig, Table};

/// Lays the table, seats the philosophers, and owns every thread of a run.
///
/// - `start()` spawns one thread per philosopher, then the death-watch, and
///   returns immediately.
/// - `join()` waits for the death-watch, then for every philosopher.
/// - `run()` combines `start()` and `join()`.
/// - `stop()` ends the run from outside, then joins.
///
/// The table, and the fork locks in it, stay alive until the last thread
/// has been joined.
///
/// # Examples
///
/// ```rust,no_run
/// use philosophers::{Outcome, SimulationConfig, Supervisor};
///
/// let config = SimulationConfig::from_millis(4, 410, 200, 200).with_meals_required(7);
/// let outcome = Supervisor::new(config)?.run()?;
/// assert_eq!(outcome, Outcome::AllAte { meals: 7 });
/// # Ok::<(), philosophers::Error>(())
/// ```
pub struct Supervisor {
    config: SimulationConfig,
    reporter: Option<Reporter>,
    table: Option<Arc<Table>>,
    monitor: Option<JoinHandle<Outcome>>,
    philosophers: Vec<JoinHandle<()>>,
}

impl Supervisor {
    /// Create a supervisor printing to stdout. Fails on an invalid config.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            reporter: Some(Reporter::stdout()),
            table: None,
            monitor: None,
            philosophers: Vec::new(),
        })
    }

    /// Print status lines to `out` instead of stdout.
    pub fn with_output<W: Write + Send + 'static>(mut self, out: W) -> Self {
        self.reporter = Some(Reporter::new(Box::new(out)));
        self
    }

    /// Lay the table and spawn every thread. Returns immediately.
    ///
    /// If the table cannot be allocated nothing is spawned and the
    /// supervisor can be started again. If a thread cannot be spawned, the
    /// ones already running are stopped and joined before the error is
    /// returned.
    pub fn start(&mut self) -> Result<()> {
        if self.table.is_some() {
            return Err(Error::AlreadyStarted);
        }
        self.philosophers.try_reserve_exact(self.config.philosophers)?;
        let table = Arc::new(Table::lay(self.config.clone(), &mut self.reporter)?);
        self.table = Some(table.clone());

        tracing::debug!(philosophers = self.config.philosophers, "Starting simulation");
        for id in 1..=self.config.philosophers {
            let philosopher = Philosopher::new(id, table.clone());
            let spawned = thread::Builder::new()
                .name(format!("philosopher-{id}"))
                .spawn(move || philosopher.run());
            match spawned {
                Ok(handle) => self.philosophers.push(handle),
                Err(e) => return Err(self.abort(e)),
            }
        }

        let monitor = Monitor::new(table);
        let spawned = thread::Builder::new()
            .name("monitor".into())
            .spawn(move || monitor.run());
        match spawned {
            Ok(handle) => self.monitor = Some(handle),
            Err(e) => return Err(self.abort(e)),
        }
        Ok(())
    }

    /// Wait for the death-watch to finish, then for every philosopher.
    ///
    /// Philosophers leave at their next cycle boundary, so this returns at
    /// most `max(time_to_eat, time_to_sleep, think_time)` plus a pending fork
    /// wait after the terminal line.
    pub fn join(&mut self) -> Result<Outcome> {
        let outcome = match self.monitor.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| Error::ThreadPanicked("monitor".into())),
            None => Ok(Outcome::Stopped),
        };
        if outcome.is_err() {
            if let Some(table) = &self.table {
                table.stop();
            }
        }
        self.join_philosophers()?;
        outcome
    }

    /// Start, then block until the run is over.
    pub fn run(&mut self) -> Result<Outcome> {
        self.start()?;
        self.join()
    }

    /// End the run now and wait for every thread.
    pub fn stop(&mut self) -> Result<Outcome> {
        if let Some(table) = &self.table {
            table.stop();
        }
        self.join()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The shared table, once started. Meal counts stay readable after `join`.
    pub fn table(&self) -> Option<&Arc<Table>> {
        self.table.as_ref()
    }

    fn join_philosophers(&mut self) -> Result<()> {
        let mut panicked = None;
        for (i, handle) in self.philosophers.drain(..).enumerate() {
            if handle.join().is_err() {
                panicked.get_or_insert_with(|| format!("philosopher-{}", i + 1));
            }
        }
        match panicked {
            Some(name) => Err(Error::ThreadPanicked(name)),
            None => Ok(()),
        }
    }

    fn abort(&mut self, cause: std::io::Error) -> Error {
        tracing::error!(error = %cause, "Couldn't spawn thread, aborting startup");
        if let Some(table) = &self.table {
            table.stop();
        }
        // The spawn error takes precedence over a panic found while cleaning up.
        let _ = self.join_philosophers();
        Error::ThreadSpawn(cause)
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        if self.monitor.is_some() || !self.philosophers.is_empty() {
            let _ = self.stop();
        }
    }
}
