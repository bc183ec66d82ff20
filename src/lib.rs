//! Philosophers - the dining philosophers on OS threads
//!
//! N philosophers sit around a ring of N forks and cycle through thinking,
//! eating and sleeping. A death-watch thread polls the table and ends the run
//! when one of them starves or, optionally, when all of them have eaten
//! enough.
//!
//! Locking discipline:
//! - one mutex per fork, picked up in parity order (even ids right first,
//!   odd ids left first), never while holding the data lock
//! - one data lock for the running flag and the meal counters
//! - one print lock for the console, never nested with the data lock
//!
//! See `src/main.rs` for the command line front-end.

pub mod clock;
mod config;
mod error;
mod fork;
mod monitor;
mod philosopher;
mod reporter;
mod supervisor;
mod table;

pub mod cli;
pub mod testing;

pub use config::SimulationConfig;
pub use error::Error;
pub use fork::{ForkGuard, ForkSet};
pub use monitor::{Monitor, Outcome};
pub use philosopher::Philosopher;
pub use reporter::{Reporter, Status};
pub use supervisor::Supervisor;
pub use table::{Seat, Table};

pub type Result<T = ()> = std::result::Result<T, Error>;
