//! Migrator - reconciles local migration files with the ledger
//!
//! The ledger (one row per applied identity) is the only record of what has
//! run. Local identities missing from it are "untracked" and get applied by
//! [`Migrator::up`], oldest first. [`Migrator::down`] walks the ledger newest
//! first and reverts the requested number of entries.
//!
//! Batches run strictly one migration at a time and stop at the first
//! failure. Everything committed before the failure stays committed; the
//! returned [`BatchFailure`] says how far the batch got.

use crate::driver::Driver;
use crate::error::{BatchFailure, MigrationError, Result};
use crate::migration::file::{ensure_directory, list_local_identities, read_script};
use crate::migration::status::{BatchReport, Direction, MigrationStatus};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Default ledger table name
pub const DEFAULT_TABLE: &str = "migrations";

/// Local identities that have no ledger row, ascending
///
/// Identities are compared by exact string equality.
pub fn untracked_migrations(
    driver: &dyn Driver,
    table: &str,
    migrations_dir: &Path,
) -> Result<Vec<String>> {
    let applied: BTreeSet<String> = driver.get_migrations(table, false)?.into_iter().collect();
    Ok(list_local_identities(migrations_dir)
        .into_iter()
        .filter(|identity| !applied.contains(identity))
        .collect())
}

/// Core migration execution engine
#[derive(Debug, Clone)]
pub struct Migrator {
    table: String,
    migrations_dir: PathBuf,
}

impl Migrator {
    /// Create a migrator for `table`, reading scripts from `migrations_dir`
    pub fn new(table: impl Into<String>, migrations_dir: impl AsRef<Path>) -> Self {
        Self {
            table: table.into(),
            migrations_dir: migrations_dir.as_ref().to_path_buf(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// All local identities, ascending
    pub fn local_migrations(&self) -> Vec<String> {
        list_local_identities(&self.migrations_dir)
    }

    /// Local identities not yet recorded in the ledger, ascending
    pub fn untracked(&self, driver: &dyn Driver) -> Result<Vec<String>> {
        untracked_migrations(driver, &self.table, &self.migrations_dir)
    }

    /// Compare local files with the ledger
    ///
    /// Ledger entries without a local `-up.sql` file are listed in
    /// [`MigrationStatus::missing`]; they are reported, not rejected.
    pub fn status(&self, driver: &dyn Driver) -> Result<MigrationStatus> {
        ensure_directory(&self.migrations_dir)?;

        let applied = self.ledger(driver, false)?;
        let local = self.local_migrations();

        let applied_set: BTreeSet<&str> = applied.iter().map(String::as_str).collect();
        let local_set: BTreeSet<&str> = local.iter().map(String::as_str).collect();

        let untracked = local
            .iter()
            .filter(|identity| !applied_set.contains(identity.as_str()))
            .cloned()
            .collect();
        let missing = applied
            .iter()
            .filter(|identity| !local_set.contains(identity.as_str()))
            .cloned()
            .collect();

        Ok(MigrationStatus {
            applied,
            untracked,
            missing,
        })
    }

    /// Apply every untracked migration, oldest first
    ///
    /// Stops at the first failure and returns [`MigrationError::Batch`] with
    /// the number of migrations applied before it.
    pub fn up(&self, driver: &dyn Driver) -> Result<BatchReport> {
        ensure_directory(&self.migrations_dir)?;

        let pending = self.untracked(driver)?;
        if pending.is_empty() {
            log::info!("no untracked migrations in {}", self.migrations_dir.display());
            return Ok(BatchReport::new(Direction::Up, pending));
        }

        log::info!(
            "applying {} migration{}",
            pending.len(),
            crate::migration::plural(pending.len())
        );
        self.run_batch(driver, Direction::Up, pending)
    }

    /// Identities `down(count)` would revert, newest first
    ///
    /// `count` larger than the ledger is clamped to the ledger length.
    pub fn plan_down(&self, driver: &dyn Driver, count: usize) -> Result<Vec<String>> {
        let mut ledger = self.ledger(driver, true)?;
        if count > ledger.len() {
            log::warn!(
                "requested {count} migration{} to undo but only {} {} recorded; undoing all",
                crate::migration::plural(count),
                ledger.len(),
                if ledger.len() == 1 { "is" } else { "are" }
            );
        }
        ledger.truncate(count);
        Ok(ledger)
    }

    /// Revert the `count` most recently applied migrations, newest first
    pub fn down(&self, driver: &dyn Driver, count: usize) -> Result<BatchReport> {
        ensure_directory(&self.migrations_dir)?;

        let planned = self.plan_down(driver, count)?;
        if planned.is_empty() {
            log::info!("no applied migrations to undo");
            return Ok(BatchReport::new(Direction::Down, planned));
        }

        log::info!(
            "undoing {} migration{}",
            planned.len(),
            crate::migration::plural(planned.len())
        );
        self.run_batch(driver, Direction::Down, planned)
    }

    fn ledger(&self, driver: &dyn Driver, reverse: bool) -> Result<Vec<String>> {
        #[cfg(feature = "tracing")]
        let _span =
            crate::tracing_helpers::ledger_query_span(driver.name(), &self.table, reverse).entered();

        driver.get_migrations(&self.table, reverse)
    }

    fn run_batch(
        &self,
        driver: &dyn Driver,
        direction: Direction,
        migrations: Vec<String>,
    ) -> Result<BatchReport> {
        let total = migrations.len();

        for (completed, migration) in migrations.iter().enumerate() {
            if let Err(source) = self.run_one(driver, direction, migration) {
                log::error!("migration {migration} ({direction}) failed: {source}");
                return Err(MigrationError::Batch(BatchFailure {
                    direction,
                    completed,
                    total,
                    migration: migration.clone(),
                    source: Box::new(source),
                }));
            }
        }

        Ok(BatchReport::new(direction, migrations))
    }

    fn run_one(&self, driver: &dyn Driver, direction: Direction, migration: &str) -> Result<()> {
        let sql = read_script(&self.migrations_dir, migration, direction)?;
        let start = Instant::now();

        match direction {
            Direction::Up => {
                #[cfg(feature = "tracing")]
                let _span = crate::tracing_helpers::apply_migration_span(
                    driver.name(),
                    &self.table,
                    migration,
                )
                .entered();
                driver.apply_migration(&self.table, migration, &sql)?;
            }
            Direction::Down => {
                #[cfg(feature = "tracing")]
                let _span = crate::tracing_helpers::undo_migration_span(
                    driver.name(),
                    &self.table,
                    migration,
                )
                .entered();
                driver.undo_migration(&self.table, migration, &sql)?;
            }
        }

        log::info!(
            "{} {migration} in {:?}",
            direction.past_tense(),
            start.elapsed()
        );
        Ok(())
    }
}

impl Default for Migrator {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE, "./migrations")
    }
}
