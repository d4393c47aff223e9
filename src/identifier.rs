//! SQL identifier validation
//!
//! Ledger table and database names are interpolated into DDL/DML text, so
//! they are restricted to plain (optionally schema-qualified) identifiers.

use crate::error::{MigrationError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// PostgreSQL truncates identifiers longer than this (NAMEDATALEN - 1)
pub const MAX_IDENTIFIER_LEN: usize = 63;

static IDENTIFIER_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_$]*$").expect("identifier regex is valid"));

/// Validate a table name, allowing one `schema.` qualifier
pub fn validate_table_name(name: &str) -> Result<()> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(invalid(name, "at most one schema qualifier is allowed"));
    }
    for part in parts {
        validate_part(name, part)?;
    }
    Ok(())
}

/// Validate a database name (no qualifier)
pub fn validate_database_name(name: &str) -> Result<()> {
    validate_part(name, name)
}

fn validate_part(full: &str, part: &str) -> Result<()> {
    if part.is_empty() {
        return Err(invalid(full, "identifier cannot be empty"));
    }
    if part.len() > MAX_IDENTIFIER_LEN {
        return Err(invalid(
            full,
            &format!("identifier exceeds {MAX_IDENTIFIER_LEN} bytes"),
        ));
    }
    if !IDENTIFIER_PART.is_match(part) {
        return Err(invalid(
            full,
            "only letters, digits, '_' and '$' are allowed, and it must not start with a digit",
        ));
    }
    Ok(())
}

fn invalid(name: &str, reason: &str) -> MigrationError {
    MigrationError::InvalidIdentifier {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
