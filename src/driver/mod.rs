//! Driver contract
//!
//! A [`Driver`] is the minimal capability set a database backend provides so
//! the migrator stays backend-agnostic. Apply and undo each run in a single
//! transaction together with the ledger mutation, so a failure leaves both the
//! ledger row and the schema change exactly as they were before the call.
//!
//! Drivers are created by name through a [`DriverRegistry`] and owned by a
//! [`DriverSession`], which guarantees the connection is released on every
//! exit path.

pub mod postgres;
pub mod registry;
pub mod template;

pub use postgres::PostgresDriver;
pub use registry::{DriverFactory, DriverRegistry};
pub use template::TemplateDriver;

use crate::connection::ConnectionOptions;
use crate::error::Result;
use std::ops::Deref;

/// Operations every database backend must support
pub trait Driver {
    /// Registry name of this driver (e.g. `pg`)
    fn name(&self) -> &str;

    /// Release the connection
    ///
    /// Calling this more than once is allowed; later calls do nothing.
    fn disconnect(&mut self) -> Result<()>;

    /// Create a new database
    ///
    /// Fails if the database already exists or permissions are insufficient.
    fn create_database(&self, name: &str) -> Result<()>;

    /// Create the ledger table if it does not exist
    ///
    /// The table has a single primary-key column `name`. Safe to call repeatedly.
    fn create_table(&self, table: &str) -> Result<()>;

    /// All ledger identities, ascending, or descending when `reverse` is set
    fn get_migrations(&self, table: &str, reverse: bool) -> Result<Vec<String>>;

    /// Insert the ledger row for `migration` and run `sql`, atomically
    fn apply_migration(&self, table: &str, migration: &str, sql: &str) -> Result<()>;

    /// Delete the ledger row for `migration` and run `sql`, atomically
    fn undo_migration(&self, table: &str, migration: &str, sql: &str) -> Result<()>;
}

/// Scoped ownership of a live driver connection
///
/// Call [`DriverSession::close`] to disconnect and observe errors. If the
/// session is dropped first (early return, `?`, panic unwinding) the driver is
/// disconnected in `Drop` and any error is logged.
pub struct DriverSession {
    driver: Option<Box<dyn Driver>>,
}

impl DriverSession {
    /// Wrap an already connected driver
    pub fn new(driver: Box<dyn Driver>) -> Self {
        Self {
            driver: Some(driver),
        }
    }

    /// Look up `driver_name` in `registry` and connect with `options`
    pub fn open(
        registry: &DriverRegistry,
        driver_name: &str,
        options: &ConnectionOptions,
    ) -> Result<Self> {
        let driver = registry.connect(driver_name, options)?;
        log::debug!("opened {} driver session", driver.name());
        Ok(Self::new(driver))
    }

    /// Disconnect the driver and report the result
    pub fn close(mut self) -> Result<()> {
        match self.driver.take() {
            Some(mut driver) => {
                log::debug!("closing {} driver session", driver.name());
                driver.disconnect()
            }
            None => Ok(()),
        }
    }
}

impl Deref for DriverSession {
    type Target = dyn Driver;

    fn deref(&self) -> &Self::Target {
        // `driver` is only taken by `close(self)` and `drop`, neither of which
        // leaves a live session behind.
        match self.driver.as_deref() {
            Some(driver) => driver,
            None => unreachable!("driver session used after close"),
        }
    }
}

impl Drop for DriverSession {
    fn drop(&mut self) {
        if let Some(mut driver) = self.driver.take() {
            if let Err(e) = driver.disconnect() {
                log::warn!("failed to disconnect {} driver: {e}", driver.name());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingDriver {
        disconnects: Rc<Cell<usize>>,
    }

    impl Driver for CountingDriver {
        fn name(&self) -> &str {
            "counting"
        }
        fn disconnect(&mut self) -> Result<()> {
            self.disconnects.set(self.disconnects.get() + 1);
            Ok(())
        }
        fn create_database(&self, _name: &str) -> Result<()> {
            Ok(())
        }
        fn create_table(&self, _table: &str) -> Result<()> {
            Ok(())
        }
        fn get_migrations(&self, _table: &str, _reverse: bool) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        fn apply_migration(&self, _table: &str, _migration: &str, _sql: &str) -> Result<()> {
            Ok(())
        }
        fn undo_migration(&self, _table: &str, _migration: &str, _sql: &str) -> Result<()> {
            Ok(())
        }
    }

    fn session(counter: &Rc<Cell<usize>>) -> DriverSession {
        DriverSession::new(Box::new(CountingDriver {
            disconnects: Rc::clone(counter),
        }))
    }

    #[test]
    fn test_close_disconnects_once() {
        let counter = Rc::new(Cell::new(0));
        let session = session(&counter);
        assert_eq!(session.name(), "counting");
        session.close().unwrap();
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_drop_disconnects() {
        let counter = Rc::new(Cell::new(0));
        {
            let session = session(&counter);
            assert!(session.get_migrations("migrations", false).unwrap().is_empty());
        }
        assert_eq!(counter.get(), 1);
    }

    #[test]
    fn test_drop_on_error_path_disconnects() {
        fn failing(session: DriverSession) -> Result<()> {
            let _session = session;
            Err(crate::error::MigrationError::Driver("boom".into()))
        }

        let counter = Rc::new(Cell::new(0));
        assert!(failing(session(&counter)).is_err());
        assert_eq!(counter.get(), 1);
    }
}
