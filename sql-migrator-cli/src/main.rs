//! sql-migrator command-line tool
//!
//! Applies and reverts plain SQL migrations tracked in a ledger table.

use clap::Parser;
use colored::Colorize;
use sql_migrator::ConfigLoader;
use sql_migrator_cli::cli::DbArgs;
use sql_migrator_cli::{commands, Cli, Command, CommandContext, DbCommand};
use std::io::{self, Write};
use std::process;

fn main() {
    let cli = Cli::parse();

    let (mut logger, env_file) = cli.logger();
    logger.init();
    match env_file {
        Ok(path) => log::debug!("loaded environment from {}", path.display()),
        Err(e) => log::debug!("no environment file loaded from {}: {e}", cli.env.display()),
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = run(&cli, &mut out);
    let _ = out.flush();
    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{} {}", "❌ Error:".red().bold(), commands::render_error(&e));
            process::exit(1);
        }
    }
}

fn run(cli: &Cli, out: &mut dyn Write) -> anyhow::Result<()> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::new().with_file(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load(&cli.overrides())?;
    let ctx = CommandContext::new(config);

    match &cli.command {
        Command::Config => commands::show_config(&ctx, out),
        Command::Gen { name, out: dir } => commands::generate(&ctx, name, dir.as_deref(), out),
        Command::Db(DbArgs { command, .. }) => match command {
            DbCommand::Create => commands::create_database(&ctx, out),
            DbCommand::CreateTable { name } => commands::create_table(&ctx, name.as_deref(), out),
            DbCommand::Up(args) => commands::up(&ctx, args, out),
            DbCommand::Down { migrations, count } => commands::down(&ctx, migrations, *count, out),
            DbCommand::Check(args) => commands::check(&ctx, args, out),
        },
    }
}
