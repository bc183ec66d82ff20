//! Helpers for asserting on simulation output.
//!
//! A [`Transcript`] is an in-memory console. Hand a clone to
//! [`Supervisor::with_output`](crate::Supervisor::with_output), run the
//! simulation, then query the parsed [`Line`]s.
//!
//! ```rust,no_run
//! use philosophers::{SimulationConfig, Status, Supervisor, testing::Transcript};
//!
//! let transcript = Transcript::new();
//! let config = SimulationConfig::from_millis(1, 200, 100, 100);
//! let mut sup = Supervisor::new(config)?.with_output(transcript.clone());
//! sup.run()?;
//!
//! assert_eq!(transcript.count(Status::Eating), 0);
//! assert_eq!(transcript.terminal().unwrap().status, Some(Status::Died));
//! # Ok::<(), philosophers::Error>(())
//! ```

use std::{
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

use crate::Status;

/// One parsed output line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub timestamp: u64,
    /// `None` for the completion line.
    pub philosopher: Option<usize>,
    /// `None` for the completion line.
    pub status: Option<Status>,
    pub raw: String,
}

impl Line {
    /// Parse `<ts> <id> <label>` or `<ts> All philosophers have eaten <n> times`.
    pub fn parse(raw: &str) -> Option<Line> {
        let (timestamp, rest) = raw.split_once(' ')?;
        let timestamp = timestamp.parse().ok()?;
        let line = |philosopher, status| Line {
            timestamp,
            philosopher,
            status,
            raw: raw.to_string(),
        };
        if rest.starts_with("All philosophers have eaten ") {
            return Some(line(None, None));
        }
        let (id, label) = rest.split_once(' ')?;
        let status = Status::from_label(label)?;
        Some(line(Some(id.parse().ok()?), Some(status)))
    }

    /// Meal count announced by a completion line.
    pub fn completed_meals(&self) -> Option<u32> {
        self.raw
            .strip_suffix(" times")?
            .rsplit_once(' ')?
            .1
            .parse()
            .ok()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_none() || self.status == Some(Status::Died)
    }
}

/// Cloneable in-memory writer. All clones share one buffer.
#[derive(Clone, Default)]
pub struct Transcript {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Every line, parsed. Panics on a line that does not follow the format.
    pub fn lines(&self) -> Vec<Line> {
        self.text()
            .lines()
            .map(|l| Line::parse(l).unwrap_or_else(|| panic!("malformed line: {l:?}")))
            .collect()
    }

    /// `(timestamp, status)` of every line printed for philosopher `id`.
    pub fn statuses_of(&self, id: usize) -> Vec<(u64, Status)> {
        self.lines()
            .into_iter()
            .filter(|l| l.philosopher == Some(id))
            .filter_map(|l| l.status.map(|s| (l.timestamp, s)))
            .collect()
    }

    pub fn count(&self, status: Status) -> usize {
        self.lines()
            .iter()
            .filter(|l| l.status == Some(status))
            .count()
    }

    pub fn count_for(&self, id: usize, status: Status) -> usize {
        self.statuses_of(id)
            .iter()
            .filter(|(_, s)| *s == status)
            .count()
    }

    /// The first death or completion line.
    pub fn terminal(&self) -> Option<Line> {
        self.lines().into_iter().find(Line::is_terminal)
    }

    /// Lines printed after the first terminal line.
    pub fn lines_after_terminal(&self) -> Vec<Line> {
        self.lines()
            .into_iter()
            .skip_while(|l| !l.is_terminal())
            .skip(1)
            .collect()
    }
}

impl Write for Transcript {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_line() {
        let line = Line::parse("205 3 has taken a fork").unwrap();
        assert_eq!(line.timestamp, 205);
        assert_eq!(line.philosopher, Some(3));
        assert_eq!(line.status, Some(Status::TakenFork));
        assert!(!line.is_terminal());
    }

    #[test]
    fn test_parse_completion_line() {
        let line = Line::parse("3210 All philosophers have eaten 7 times").unwrap();
        assert_eq!(line.timestamp, 3210);
        assert_eq!(line.philosopher, None);
        assert_eq!(line.completed_meals(), Some(7));
        assert!(line.is_terminal());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Line::parse("").is_none());
        assert!(Line::parse("abc 1 died").is_none());
        assert!(Line::parse("10 1 is dancing").is_none());
    }

    #[test]
    fn test_queries() {
        let mut transcript = Transcript::new();
        write!(
            transcript,
            "0 1 is thinking\n0 1 has taken a fork\n200 1 died\n201 2 is eating\n"
        )
        .unwrap();

        assert_eq!(transcript.count(Status::TakenFork), 1);
        assert_eq!(transcript.count_for(1, Status::Thinking), 1);
        assert_eq!(
            transcript.statuses_of(1),
            vec![
                (0, Status::Thinking),
                (0, Status::TakenFork),
                (200, Status::Died)
            ]
        );
        assert_eq!(transcript.terminal().unwrap().timestamp, 200);
        assert_eq!(transcript.lines_after_terminal().len(), 1);
    }
}
