//! Shared helpers for integration tests

#![allow(dead_code)]

use sql_migrator::{Driver, MigrationError, Result};
use std::cell::RefCell;
use std::fs;
use std::path::Path;

/// A driver call, as seen by [`RecordingDriver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateDatabase(String),
    CreateTable(String),
    GetMigrations { table: String, reverse: bool },
    Apply { migration: String, sql: String },
    Undo { migration: String, sql: String },
    Disconnect,
}

/// In-memory driver that records every call
///
/// Apply and undo are all-or-nothing: a migration listed in `fail_on` leaves
/// the ledger untouched.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    ledger: RefCell<Vec<String>>,
    calls: RefCell<Vec<Call>>,
    fail_on: Vec<String>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver whose ledger already holds `applied`
    pub fn with_ledger(applied: &[&str]) -> Self {
        let driver = Self::new();
        driver
            .ledger
            .borrow_mut()
            .extend(applied.iter().map(|m| m.to_string()));
        driver
    }

    /// Fail apply/undo of `migration` with a backend error
    pub fn failing_on(mut self, migration: &str) -> Self {
        self.fail_on.push(migration.to_string());
        self
    }

    /// Current ledger, ascending
    pub fn ledger(&self) -> Vec<String> {
        let mut ledger = self.ledger.borrow().clone();
        ledger.sort();
        ledger
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Identities passed to apply/undo, in call order
    pub fn touched(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                Call::Apply { migration, .. } | Call::Undo { migration, .. } => {
                    Some(migration.clone())
                }
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn check_failure(&self, migration: &str) -> Result<()> {
        if self.fail_on.iter().any(|m| m == migration) {
            return Err(MigrationError::Driver(format!(
                "syntax error at or near \"{migration}\""
            )));
        }
        Ok(())
    }
}

impl Driver for RecordingDriver {
    fn name(&self) -> &str {
        "recording"
    }

    fn disconnect(&mut self) -> Result<()> {
        self.record(Call::Disconnect);
        Ok(())
    }

    fn create_database(&self, name: &str) -> Result<()> {
        self.record(Call::CreateDatabase(name.to_string()));
        Ok(())
    }

    fn create_table(&self, table: &str) -> Result<()> {
        self.record(Call::CreateTable(table.to_string()));
        Ok(())
    }

    fn get_migrations(&self, table: &str, reverse: bool) -> Result<Vec<String>> {
        self.record(Call::GetMigrations {
            table: table.to_string(),
            reverse,
        });
        let mut ledger = self.ledger();
        if reverse {
            ledger.reverse();
        }
        Ok(ledger)
    }

    fn apply_migration(&self, _table: &str, migration: &str, sql: &str) -> Result<()> {
        self.record(Call::Apply {
            migration: migration.to_string(),
            sql: sql.to_string(),
        });
        self.check_failure(migration)?;
        self.ledger.borrow_mut().push(migration.to_string());
        Ok(())
    }

    fn undo_migration(&self, _table: &str, migration: &str, sql: &str) -> Result<()> {
        self.record(Call::Undo {
            migration: migration.to_string(),
            sql: sql.to_string(),
        });
        self.check_failure(migration)?;
        self.ledger.borrow_mut().retain(|m| m != migration);
        Ok(())
    }
}

/// Write `<identity>-up.sql` and `<identity>-down.sql` into `dir`
pub fn write_migration(dir: &Path, identity: &str) {
    fs::write(
        dir.join(format!("{identity}-up.sql")),
        format!("-- {identity} up"),
    )
    .unwrap();
    fs::write(
        dir.join(format!("{identity}-down.sql")),
        format!("-- {identity} down"),
    )
    .unwrap();
}
