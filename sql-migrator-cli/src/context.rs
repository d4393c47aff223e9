//! Per-invocation state shared by command handlers

use sql_migrator::{
    ConnectionOptions, DriverRegistry, DriverSession, MigratorConfig, Result,
};

/// Resolved configuration plus the drivers available to this invocation
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: MigratorConfig,
    pub registry: DriverRegistry,
}

impl CommandContext {
    /// Context with the built-in drivers
    pub fn new(config: MigratorConfig) -> Self {
        Self::with_registry(config, DriverRegistry::with_defaults())
    }

    pub fn with_registry(config: MigratorConfig, registry: DriverRegistry) -> Self {
        Self { config, registry }
    }

    /// Connect the configured driver using the configured connection options
    pub fn connect(&self) -> Result<DriverSession> {
        self.connect_with(&self.config.connection)
    }

    /// Connect the configured driver using `options`
    pub fn connect_with(&self, options: &ConnectionOptions) -> Result<DriverSession> {
        let driver = self.config.require_driver()?;
        DriverSession::open(&self.registry, driver, options)
    }
}
