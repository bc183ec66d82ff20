use std::{
    fmt,
    io::{self, Write},
    sync::{Mutex, PoisonError},
};

use crate::{Table, clock};

/// A per-philosopher status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    Thinking,
    TakenFork,
    Eating,
    Sleeping,
    Died,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Thinking,
        Status::TakenFork,
        Status::Eating,
        Status::Sleeping,
        Status::Died,
    ];

    /// The label printed after the timestamp and the philosopher id.
    pub fn label(&self) -> &'static str {
        match self {
            Status::Thinking => "is thinking",
            Status::TakenFork => "has taken a fork",
            Status::Eating => "is eating",
            Status::Sleeping => "is sleeping",
            Status::Died => "died",
        }
    }

    pub fn from_label(label: &str) -> Option<Status> {
        Status::ALL.into_iter().find(|s| s.label() == label)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct Console {
    out: Box<dyn Write + Send>,
    closed: bool,
}

impl Console {
    fn write_line(&mut self, args: fmt::Arguments<'_>) {
        let result = self
            .out
            .write_fmt(args)
            .and_then(|_| self.out.write_all(b"\n"))
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            tracing::warn!(error = %e, "Couldn't write status line");
        }
    }
}

/// Serializes status lines onto one output stream.
///
/// The print lock is the mutex around the console. It is never taken while
/// the table's data lock is held, and the data lock is never taken under it.
///
/// Once a terminal line ("died" or the completion line) has been written the
/// console is closed: a status line whose running check passed before the
/// terminal transition but that reaches the print lock after it is dropped.
pub struct Reporter {
    console: Mutex<Console>,
}

impl Reporter {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            console: Mutex::new(Console { out, closed: false }),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Print `<timestamp> <id> <status>` unless the simulation has stopped.
    pub fn status(&self, table: &Table, id: usize, status: Status) {
        if !table.is_running() {
            return;
        }
        let mut console = self.lock();
        if console.closed {
            return;
        }
        let timestamp = clock::elapsed_ms(table.start());
        console.write_line(format_args!("{timestamp} {id} {status}"));
    }

    /// Stop the simulation and print the death of philosopher `id`.
    ///
    /// Flipping the running flag and reading its previous value happen in one
    /// data-lock critical section, so only the first caller prints. Returns
    /// whether this call was that caller.
    pub fn death(&self, table: &Table, id: usize) -> bool {
        if !table.stop() {
            return false;
        }
        let mut console = self.lock();
        let timestamp = clock::elapsed_ms(table.start());
        console.write_line(format_args!("{timestamp} {id} {}", Status::Died));
        console.closed = true;
        true
    }

    /// Print the completion line. The caller has already stopped the table.
    pub fn all_ate(&self, table: &Table, meals: u32) {
        let mut console = self.lock();
        if console.closed {
            return;
        }
        let timestamp = clock::elapsed_ms(table.start());
        console.write_line(format_args!(
            "{timestamp} All philosophers have eaten {meals} times"
        ));
        console.closed = true;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Console> {
        self.console.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
