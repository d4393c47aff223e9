//! Span constructors used when the `tracing` feature is enabled
//!
//! With no subscriber installed, the `tracing` crate's `log` feature forwards
//! span enter/exit events to the `log` facade (target `tracing::span`).

use tracing::{info_span, Span};

pub fn begin_transaction_span() -> Span {
    info_span!("sql_migrator.transaction.begin")
}

pub fn commit_transaction_span() -> Span {
    info_span!("sql_migrator.transaction.commit")
}

pub fn rollback_transaction_span() -> Span {
    info_span!("sql_migrator.transaction.rollback")
}

/// Span around one `apply_migration` driver call
pub fn apply_migration_span(driver: &str, table: &str, migration: &str) -> Span {
    info_span!("sql_migrator.apply", driver = driver, table = table, migration = migration)
}

/// Span around one `undo_migration` driver call
pub fn undo_migration_span(driver: &str, table: &str, migration: &str) -> Span {
    info_span!("sql_migrator.undo", driver = driver, table = table, migration = migration)
}

/// Span around a ledger read
pub fn ledger_query_span(driver: &str, table: &str, reverse: bool) -> Span {
    info_span!("sql_migrator.ledger", driver = driver, table = table, reverse = reverse)
}
