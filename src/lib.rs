//! # sql-migrator
//!
//! Plain-SQL database migrations tracked in a ledger table.
//!
//! Migrations are pairs of timestamped `-up.sql` / `-down.sql` files. The
//! [`Migrator`] compares them with the ledger kept by a [`Driver`] and
//! applies or reverts them one at a time, each inside its own transaction.
//!
//! - [`driver`]: the backend contract, the PostgreSQL and template drivers,
//!   and the name → driver [`DriverRegistry`]
//! - [`migration`]: file discovery and generation, and the reconciliation engine
//! - [`config`]: layered configuration (file, environment, overrides)

pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod identifier;
pub mod migration;
pub mod transaction;

#[cfg(feature = "tracing")]
pub mod tracing_helpers;

pub use config::{ConfigLoader, ConfigOverrides, MigratorConfig};
pub use connection::{ConnectionError, ConnectionOptions};
pub use driver::{Driver, DriverRegistry, DriverSession};
pub use error::{BatchFailure, ErrorKind, MigrationError, Result};
pub use migration::{BatchReport, Direction, MigrationStatus, Migrator};
