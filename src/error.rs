//! Error types for the migrator
//!
//! Every failure maps onto one of three categories (see [`ErrorKind`]):
//! configuration problems, filesystem problems and backend (database) problems.
//! Batch failures wrap the error of the migration that stopped the batch and
//! carry the progress made before it.

use crate::connection::ConnectionError;
use crate::migration::status::Direction;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = MigrationError> = std::result::Result<T, E>;

/// Error category, used by the command surface to pick an exit strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid or missing configuration; reported immediately, never retried
    Config,
    /// Missing migrations directory or migration file
    Filesystem,
    /// Any failure raised by a driver operation
    Backend,
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("no database driver configured (use --driver or set \"driver\" in the config file)")]
    MissingDriver,

    #[error("unsupported driver \"{0}\"")]
    UnsupportedDriver(String),

    #[error("invalid identifier \"{name}\": {reason}")]
    InvalidIdentifier { name: String, reason: String },

    #[error("invalid migration name \"{0}\": must be non-empty and must not contain path separators")]
    InvalidName(String),

    #[error("migrations directory \"{}\" could not be found", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("failed to read migration file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write migration file {}: {source}", path.display())]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] may_postgres::Error),

    #[error("driver error: {0}")]
    Driver(String),

    #[error("driver connection is already closed")]
    Disconnected,

    #[error(transparent)]
    Batch(#[from] BatchFailure),
}

impl MigrationError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MigrationError::Config(_)
            | MigrationError::ConfigLoad(_)
            | MigrationError::MissingDriver
            | MigrationError::UnsupportedDriver(_)
            | MigrationError::InvalidIdentifier { .. }
            | MigrationError::InvalidName(_) => ErrorKind::Config,
            MigrationError::DirectoryNotFound(_)
            | MigrationError::ReadFile { .. }
            | MigrationError::WriteFile { .. } => ErrorKind::Filesystem,
            MigrationError::Connection(_)
            | MigrationError::Postgres(_)
            | MigrationError::Driver(_)
            | MigrationError::Disconnected => ErrorKind::Backend,
            MigrationError::Batch(failure) => failure.source.kind(),
        }
    }
}

/// A batch apply/undo that stopped at a failing migration
///
/// `completed` migrations were applied (or undone) and committed before
/// `migration` failed; nothing after it was attempted.
#[derive(Debug)]
pub struct BatchFailure {
    pub direction: Direction,
    pub completed: usize,
    pub total: usize,
    pub migration: String,
    pub source: Box<MigrationError>,
}

impl BatchFailure {
    /// File name of the script that failed, e.g. `20240101000000-init-up.sql`
    pub fn file_name(&self) -> String {
        format!("{}-{}.sql", self.migration, self.direction)
    }
}

impl std::fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} migration{} {} before \"{}\" failed: {}",
            self.completed,
            self.total,
            crate::migration::plural(self.total),
            self.direction.past_tense(),
            self.file_name(),
            self.source
        )
    }
}

impl std::error::Error for BatchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}
