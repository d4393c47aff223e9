//! Command handlers
//!
//! Each handler writes its report to `out` and returns an error for the
//! binary to print. Driver sessions are closed explicitly on success and by
//! `Drop` on every error path.

use crate::cli::MigrationArgs;
use crate::context::CommandContext;
use anyhow::bail;
use chrono::Local;
use sql_migrator::migration::{file, plural};
use sql_migrator::{BatchFailure, BatchReport, Direction, MigrationError, Migrator};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Message printed after `❌ Error:`
///
/// Library errors already embed their cause in their own message, so only the
/// top level is rendered.
pub fn render_error(err: &anyhow::Error) -> String {
    err.to_string()
}

/// `config`: print the resolved configuration with secrets masked
pub fn show_config(ctx: &CommandContext, out: &mut dyn Write) -> anyhow::Result<()> {
    writeln!(out, "{}", ctx.config)?;
    Ok(())
}

/// `gen <name>`: write an empty migration pair stamped with the local time
pub fn generate(
    ctx: &CommandContext,
    name: &str,
    out_dir: Option<&Path>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let dir = out_dir.unwrap_or(ctx.config.migrations_dir.as_path());
    if !dir.is_dir() {
        bail!("-o, --out \"{}\" could not be found", dir.display());
    }

    let timestamp = file::migration_timestamp(&Local::now());
    let generated = file::generate(dir, name, &timestamp)?;
    writeln!(out, "created {}", generated.up_path.display())?;
    writeln!(out, "created {}", generated.down_path.display())?;
    Ok(())
}

/// `db create`: create the configured database, then its migration table
pub fn create_database(ctx: &CommandContext, out: &mut dyn Write) -> anyhow::Result<()> {
    let options = &ctx.config.connection;
    let Some(database) = options.database.as_deref() else {
        return Err(MigrationError::Config(
            "no database name configured (use --database)".to_string(),
        )
        .into());
    };

    let server = ctx.connect_with(&options.without_database())?;
    server.create_database(database)?;
    server.close()?;
    writeln!(out, "created database \"{database}\"")?;

    let session = ctx.connect_with(options)?;
    session.create_table(&ctx.config.table)?;
    session.close()?;
    writeln!(out, "created table \"{}\"", ctx.config.table)?;
    Ok(())
}

/// `db create:table [name]`
pub fn create_table(
    ctx: &CommandContext,
    name: Option<&str>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let table = name.unwrap_or(&ctx.config.table);
    let session = ctx.connect()?;
    session.create_table(table)?;
    session.close()?;
    writeln!(out, "created table \"{table}\"")?;
    Ok(())
}

/// `db up [table] [-f dir]`: apply every untracked migration
pub fn up(ctx: &CommandContext, args: &MigrationArgs, out: &mut dyn Write) -> anyhow::Result<()> {
    let migrator = migrator(ctx, args)?;
    let session = ctx.connect()?;

    match migrator.up(&*session) {
        Ok(report) if report.is_empty() => {
            writeln!(out, "all migrations are already applied")?;
        }
        Ok(report) => write_report(out, &report)?,
        Err(MigrationError::Batch(failure)) => {
            write_failure(out, &failure)?;
            return Err(MigrationError::Batch(failure).into());
        }
        Err(e) => return Err(e.into()),
    }

    session.close()?;
    Ok(())
}

/// `db down [table] [-f dir] [--count N]`: undo the `count` newest migrations
pub fn down(
    ctx: &CommandContext,
    args: &MigrationArgs,
    count: usize,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let migrator = migrator(ctx, args)?;
    let session = ctx.connect()?;

    match migrator.down(&*session, count) {
        Ok(report) => write_report(out, &report)?,
        Err(MigrationError::Batch(failure)) => {
            write_failure(out, &failure)?;
            return Err(MigrationError::Batch(failure).into());
        }
        Err(e) => return Err(e.into()),
    }

    session.close()?;
    Ok(())
}

/// `db check [table] [-f dir]`: list untracked migrations
pub fn check(
    ctx: &CommandContext,
    args: &MigrationArgs,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let migrator = migrator(ctx, args)?;
    let session = ctx.connect()?;
    let status = migrator.status(&*session)?;
    session.close()?;

    let database = ctx.config.connection.database.as_deref().unwrap_or("");
    writeln!(out, "database: \"{database}\"")?;
    writeln!(out, "migration table: \"{}\"", migrator.table())?;

    for missing in &status.missing {
        writeln!(
            out,
            "warning: applied migration \"{missing}\" has no local file"
        )?;
    }

    if status.is_up_to_date() {
        writeln!(out, "all migrations are already applied")?;
        return Ok(());
    }

    let count = status.untracked.len();
    writeln!(out, "{count} untracked migration{}:", plural(count))?;
    for (i, migration) in status.untracked.iter().enumerate() {
        writeln!(out, " {}. {migration}-up.sql", i + 1)?;
    }
    Ok(())
}

fn migrator(ctx: &CommandContext, args: &MigrationArgs) -> anyhow::Result<Migrator> {
    let table = args.table.as_deref().unwrap_or(&ctx.config.table);
    let dir: PathBuf = args
        .files
        .clone()
        .unwrap_or_else(|| ctx.config.migrations_dir.clone());
    if !dir.is_dir() {
        return Err(MigrationError::DirectoryNotFound(dir).into());
    }
    Ok(Migrator::new(table, dir))
}

fn write_report(out: &mut dyn Write, report: &BatchReport) -> std::io::Result<()> {
    match report.direction {
        Direction::Up => writeln!(
            out,
            "{} migration{} applied successfully",
            report.completed,
            plural(report.total)
        ),
        Direction::Down => writeln!(
            out,
            "{} migration{} undone",
            report.completed,
            plural(report.completed)
        ),
    }
}

fn write_failure(out: &mut dyn Write, failure: &BatchFailure) -> std::io::Result<()> {
    writeln!(
        out,
        "{} migration{} completed (of {} total)",
        failure.completed,
        plural(failure.completed),
        failure.total
    )?;
    writeln!(out, " - failed migration: \"{}\"", failure.file_name())?;
    writeln!(out)
}
