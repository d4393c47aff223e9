//! Migration status and batch reporting

use std::fmt;

/// Direction of a migration batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply `-up.sql` scripts, oldest first
    Up,
    /// Revert with `-down.sql` scripts, newest first
    Down,
}

impl Direction {
    /// Verb used in progress reports ("applied" / "undone")
    pub fn past_tense(&self) -> &'static str {
        match self {
            Direction::Up => "applied",
            Direction::Down => "undone",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => f.write_str("up"),
            Direction::Down => f.write_str("down"),
        }
    }
}

/// Outcome of a batch that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub direction: Direction,

    /// Number of migrations applied or undone
    pub completed: usize,

    /// Number of migrations the batch planned to run
    pub total: usize,

    /// Identities processed, in execution order
    pub migrations: Vec<String>,
}

impl BatchReport {
    pub(crate) fn new(direction: Direction, migrations: Vec<String>) -> Self {
        Self {
            direction,
            completed: migrations.len(),
            total: migrations.len(),
            migrations,
        }
    }

    /// True when there was nothing to do
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Snapshot of local files versus the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Identities recorded in the ledger (ascending)
    pub applied: Vec<String>,

    /// Local identities absent from the ledger (ascending)
    pub untracked: Vec<String>,

    /// Ledger identities with no local `-up.sql` file (ascending)
    pub missing: Vec<String>,
}

impl MigrationStatus {
    /// Check if all local migrations are applied
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        self.untracked.is_empty()
    }

    /// The most recently applied identity
    #[must_use]
    pub fn latest_applied(&self) -> Option<&str> {
        self.applied.last().map(String::as_str)
    }

    /// The next identity `up` would apply
    #[must_use]
    pub fn next_untracked(&self) -> Option<&str> {
        self.untracked.first().map(String::as_str)
    }
}

/// Plural suffix for a count: `""` for exactly one, `"s"` otherwise
pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(1), "");
        assert_eq!(plural(0), "s");
        assert_eq!(plural(2), "s");
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Up.to_string(), "up");
        assert_eq!(Direction::Down.to_string(), "down");
        assert_eq!(Direction::Down.past_tense(), "undone");
    }

    #[test]
    fn test_status_helpers() {
        let status = MigrationStatus {
            applied: vec!["20240101000000-a".into(), "20240102000000-b".into()],
            untracked: vec!["20240103000000-c".into()],
            missing: vec![],
        };
        assert!(!status.is_up_to_date());
        assert_eq!(status.latest_applied(), Some("20240102000000-b"));
        assert_eq!(status.next_untracked(), Some("20240103000000-c"));
    }
}
