//! Migration file discovery, reading and generation
//!
//! Each migration is a pair of plain SQL files sharing one identity:
//!
//! ```text
//! 20240120120000-create_users-up.sql
//! 20240120120000-create_users-down.sql
//! ```
//!
//! The identity (`20240120120000-create_users`) starts with a 14-digit
//! `YYYYMMDDHHMMSS` timestamp, so sorting identities as strings sorts them
//! chronologically.

use crate::error::{MigrationError, Result};
use crate::migration::status::Direction;
use chrono::{Datelike, Timelike};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};

/// List the identities of all local migrations, ascending
///
/// Only the "up" half of each pair is considered: a file name is kept when the
/// part after its last `-` contains `up`, and that part is stripped to recover
/// the identity. Names without any `-` are ignored.
///
/// Returns an empty list when `migrations_dir` does not exist or cannot be
/// read; callers check the directory up front and report that separately.
pub fn list_local_identities(migrations_dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(migrations_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!(
                "cannot read migrations directory {}: {e}",
                migrations_dir.display()
            );
            return Vec::new();
        }
    };

    let mut identities: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter_map(|file_name| identity_from_up_file(&file_name))
        .collect();

    identities.sort();
    identities
}

/// Recover the identity from an "up" file name
///
/// `20240101000000-init-up.sql` → `Some("20240101000000-init")`;
/// down files and names without `-` → `None`.
pub fn identity_from_up_file(file_name: &str) -> Option<String> {
    let split = file_name.rfind('-')?;
    let (identity, suffix) = file_name.split_at(split);
    if identity.is_empty() || !suffix.contains("up") {
        return None;
    }
    Some(identity.to_string())
}

/// Path of a migration script
pub fn script_path(migrations_dir: &Path, migration: &str, direction: Direction) -> PathBuf {
    migrations_dir.join(format!("{migration}-{direction}.sql"))
}

/// Path of the forward script, `<dir>/<identity>-up.sql`
pub fn up_path(migrations_dir: &Path, migration: &str) -> PathBuf {
    script_path(migrations_dir, migration, Direction::Up)
}

/// Path of the reverse script, `<dir>/<identity>-down.sql`
pub fn down_path(migrations_dir: &Path, migration: &str) -> PathBuf {
    script_path(migrations_dir, migration, Direction::Down)
}

/// Read a migration script verbatim
pub fn read_script(migrations_dir: &Path, migration: &str, direction: Direction) -> Result<String> {
    let path = script_path(migrations_dir, migration, direction);
    fs::read_to_string(&path).map_err(|source| MigrationError::ReadFile { path, source })
}

pub fn read_up_sql(migrations_dir: &Path, migration: &str) -> Result<String> {
    read_script(migrations_dir, migration, Direction::Up)
}

pub fn read_down_sql(migrations_dir: &Path, migration: &str) -> Result<String> {
    read_script(migrations_dir, migration, Direction::Down)
}

/// Fail with [`MigrationError::DirectoryNotFound`] unless `migrations_dir` is a directory
pub fn ensure_directory(migrations_dir: &Path) -> Result<()> {
    if migrations_dir.is_dir() {
        Ok(())
    } else {
        Err(MigrationError::DirectoryNotFound(migrations_dir.to_path_buf()))
    }
}

/// 14-digit `YYYYMMDDHHMMSS` prefix for a new migration
pub fn migration_timestamp<T>(at: &T) -> String
where
    T: Datelike + Timelike,
{
    format!(
        "{:04}{:02}{:02}{:02}{:02}{:02}",
        at.year(),
        at.month(),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Files written by [`generate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedMigration {
    pub identity: String,
    pub up_path: PathBuf,
    pub down_path: PathBuf,
}

/// Create an empty migration pair in `migrations_dir`
///
/// Writes `<timestamp>-<name>-up.sql` containing `-- <name>-up` and
/// `<timestamp>-<name>-down.sql` containing `-- <name>-down`. The directory
/// must already exist and existing files are never overwritten.
pub fn generate(migrations_dir: &Path, name: &str, timestamp: &str) -> Result<GeneratedMigration> {
    validate_migration_name(name)?;
    ensure_directory(migrations_dir)?;

    let identity = format!("{timestamp}-{name}");
    let up_path = up_path(migrations_dir, &identity);
    let down_path = down_path(migrations_dir, &identity);

    write_new_file(&up_path, &format!("-- {name}-up"))?;
    if let Err(e) = write_new_file(&down_path, &format!("-- {name}-down")) {
        // Leave no half pair behind.
        let _ = fs::remove_file(&up_path);
        return Err(e);
    }

    log::info!("generated migration {identity}");
    Ok(GeneratedMigration {
        identity,
        up_path,
        down_path,
    })
}

fn validate_migration_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name.contains(['/', '\\'])
        || name == "."
        || name == "..";
    if invalid {
        return Err(MigrationError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn write_new_file(path: &Path, contents: &str) -> Result<()> {
    let write = || -> std::io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        file.write_all(contents.as_bytes())
    };
    write().map_err(|source| MigrationError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

/// True when `err` is a [`MigrationError::WriteFile`] caused by an existing file
pub fn is_already_exists(err: &MigrationError) -> bool {
    matches!(err, MigrationError::WriteFile { source, .. } if source.kind() == IoErrorKind::AlreadyExists)
}
