//! PostgreSQL driver built on `may_postgres`

use crate::connection::{connect, ConnectionOptions};
use crate::driver::Driver;
use crate::error::{MigrationError, Result};
use crate::identifier::{validate_database_name, validate_table_name};
use crate::transaction::in_transaction;
use may_postgres::Client;

/// Ledger and migration operations against a single PostgreSQL connection
pub struct PostgresDriver {
    client: Option<Client>,
}

impl PostgresDriver {
    pub const NAME: &'static str = "pg";

    /// Connect using `options` (URL first, then discrete parameters)
    pub fn connect(options: &ConnectionOptions) -> Result<Self> {
        let connection_string = options.to_connection_string()?;
        let client = connect(&connection_string)?;
        Ok(Self::from_client(client))
    }

    /// Wrap an existing client
    pub fn from_client(client: Client) -> Self {
        Self {
            client: Some(client),
        }
    }

    fn client(&self) -> Result<&Client> {
        self.client.as_ref().ok_or(MigrationError::Disconnected)
    }
}

/// `CREATE TABLE IF NOT EXISTS` statement for the ledger
pub fn create_ledger_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\n    \
            name varchar(255) NOT NULL PRIMARY KEY\n\
        )"
    )
}

/// Ledger scan ordered by identity
pub fn select_migrations_sql(table: &str, reverse: bool) -> String {
    let order = if reverse { "DESC" } else { "ASC" };
    format!("SELECT name FROM {table} ORDER BY name {order}")
}

pub fn insert_migration_sql(table: &str) -> String {
    format!("INSERT INTO {table} (name) VALUES ($1)")
}

pub fn delete_migration_sql(table: &str) -> String {
    format!("DELETE FROM {table} WHERE name = $1")
}

impl Driver for PostgresDriver {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn disconnect(&mut self) -> Result<()> {
        // Dropping the client closes the connection.
        if self.client.take().is_some() {
            log::debug!("disconnected from PostgreSQL");
        }
        Ok(())
    }

    fn create_database(&self, name: &str) -> Result<()> {
        validate_database_name(name)?;
        // CREATE DATABASE cannot run inside a transaction block.
        self.client()?
            .batch_execute(&format!("CREATE DATABASE {name}"))?;
        log::info!("created database {name}");
        Ok(())
    }

    fn create_table(&self, table: &str) -> Result<()> {
        validate_table_name(table)?;
        self.client()?.batch_execute(&create_ledger_table_sql(table))?;
        Ok(())
    }

    fn get_migrations(&self, table: &str, reverse: bool) -> Result<Vec<String>> {
        validate_table_name(table)?;
        let rows = self
            .client()?
            .query(select_migrations_sql(table, reverse).as_str(), &[])?;

        let mut migrations = Vec::with_capacity(rows.len());
        for row in rows {
            migrations.push(row.try_get::<_, String>(0)?);
        }
        Ok(migrations)
    }

    fn apply_migration(&self, table: &str, migration: &str, sql: &str) -> Result<()> {
        validate_table_name(table)?;
        let insert = insert_migration_sql(table);
        in_transaction(self.client()?, |transaction| {
            transaction.execute(&insert, &[&migration])?;
            transaction.batch_execute(sql)
        })?;
        Ok(())
    }

    fn undo_migration(&self, table: &str, migration: &str, sql: &str) -> Result<()> {
        validate_table_name(table)?;
        let delete = delete_migration_sql(table);
        in_transaction(self.client()?, |transaction| {
            transaction.execute(&delete, &[&migration])?;
            transaction.batch_execute(sql)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_sql() {
        assert_eq!(
            create_ledger_table_sql("migrations"),
            "CREATE TABLE IF NOT EXISTS migrations (\n    name varchar(255) NOT NULL PRIMARY KEY\n)"
        );
        assert_eq!(
            select_migrations_sql("migrations", false),
            "SELECT name FROM migrations ORDER BY name ASC"
        );
        assert_eq!(
            select_migrations_sql("public.migrations", true),
            "SELECT name FROM public.migrations ORDER BY name DESC"
        );
        assert_eq!(
            insert_migration_sql("migrations"),
            "INSERT INTO migrations (name) VALUES ($1)"
        );
        assert_eq!(
            delete_migration_sql("migrations"),
            "DELETE FROM migrations WHERE name = $1"
        );
    }

    #[test]
    fn test_connect_rejects_empty_options() {
        let err = PostgresDriver::connect(&ConnectionOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, MigrationError::Connection(_)));
    }
}
