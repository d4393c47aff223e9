//! No-op driver
//!
//! Accepts every call and touches nothing. The ledger always reads as empty, so
//! `up` walks every local migration and `down` has nothing to undo. Useful for
//! checking configuration and migration files without a database.

use crate::connection::ConnectionOptions;
use crate::driver::Driver;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct TemplateDriver {
    connected: bool,
}

impl TemplateDriver {
    pub const NAME: &'static str = "template";

    pub fn connect(_options: &ConnectionOptions) -> Self {
        Self { connected: true }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }
}

impl Driver for TemplateDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    fn create_database(&self, name: &str) -> Result<()> {
        log::debug!("template driver: create database {name}");
        Ok(())
    }

    fn create_table(&self, table: &str) -> Result<()> {
        log::debug!("template driver: create table {table}");
        Ok(())
    }

    fn get_migrations(&self, _table: &str, _reverse: bool) -> Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn apply_migration(&self, _table: &str, migration: &str, _sql: &str) -> Result<()> {
        log::debug!("template driver: apply {migration}");
        Ok(())
    }

    fn undo_migration(&self, _table: &str, migration: &str, _sql: &str) -> Result<()> {
        log::debug!("template driver: undo {migration}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_driver_is_inert() {
        let mut driver = TemplateDriver::connect(&ConnectionOptions::default());
        assert!(driver.is_connected());
        driver.create_table("migrations").unwrap();
        driver
            .apply_migration("migrations", "20240101000000-a", "CREATE TABLE a ()")
            .unwrap();
        assert!(driver.get_migrations("migrations", false).unwrap().is_empty());
        driver.disconnect().unwrap();
        driver.disconnect().unwrap();
        assert!(!driver.is_connected());
    }
}
