//! Driver registry: maps a driver name to the function that connects it

use crate::connection::ConnectionOptions;
use crate::driver::{Driver, PostgresDriver, TemplateDriver};
use crate::error::{MigrationError, Result};
use std::collections::BTreeMap;

/// Connects a driver from resolved connection options
pub type DriverFactory = fn(&ConnectionOptions) -> Result<Box<dyn Driver>>;

/// Name → factory lookup table, populated at startup
#[derive(Clone, Default)]
pub struct DriverRegistry {
    factories: BTreeMap<String, DriverFactory>,
}

impl DriverRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in driver
    ///
    /// - `pg`, `postgres`, `postgresql`: [`PostgresDriver`]
    /// - `template`: [`TemplateDriver`]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for name in ["pg", "postgres", "postgresql"] {
            registry.register(name, connect_postgres);
        }
        registry.register(TemplateDriver::NAME, connect_template);
        registry
    }

    /// Register (or replace) the factory for `name`
    pub fn register(&mut self, name: impl Into<String>, factory: DriverFactory) -> &mut Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Whether `name` has a registered factory
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Look up the factory for `name`
    pub fn factory(&self, name: &str) -> Result<DriverFactory> {
        self.factories
            .get(name)
            .copied()
            .ok_or_else(|| MigrationError::UnsupportedDriver(name.to_string()))
    }

    /// Look up `name` and connect it
    pub fn connect(&self, name: &str, options: &ConnectionOptions) -> Result<Box<dyn Driver>> {
        let factory = self.factory(name)?;
        factory(options)
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("drivers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn connect_postgres(options: &ConnectionOptions) -> Result<Box<dyn Driver>> {
    Ok(Box::new(PostgresDriver::connect(options)?))
}

fn connect_template(options: &ConnectionOptions) -> Result<Box<dyn Driver>> {
    Ok(Box::new(TemplateDriver::connect(options)))
}
