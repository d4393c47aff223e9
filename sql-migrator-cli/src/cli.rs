//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use sql_migrator::ConfigOverrides;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sql-migrator")]
#[command(about = "Apply and revert plain SQL migrations")]
#[command(version)]
pub struct Cli {
    /// Path of the .env file to load
    #[arg(short, long, global = true, default_value = ".env")]
    pub env: PathBuf,

    /// Path of the config file [default: migrations.json]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show all configuration values being used
    Config,

    /// Generate an empty pair of migration files
    Gen {
        /// Name of the migration (e.g. "create_users")
        name: String,

        /// Output directory [default: configured migrations directory]
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Run a command against a database connection
    Db(DbArgs),
}

#[derive(Args, Debug)]
pub struct DbArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: DbCommand,
}

/// Connection settings; each one falls back to the configuration
#[derive(Args, Debug, Default, Clone)]
pub struct ConnectionArgs {
    /// Database driver (pg, template)
    #[arg(short, long)]
    pub driver: Option<String>,

    /// Database connection URL
    #[arg(long)]
    pub url: Option<String>,

    /// Database host
    #[arg(long)]
    pub host: Option<String>,

    /// Database port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Database name
    #[arg(long)]
    pub database: Option<String>,

    /// Database user
    #[arg(short, long)]
    pub user: Option<String>,

    /// Password of the database user
    #[arg(long)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum DbCommand {
    /// Create the database, then its migration table
    Create,

    /// Create the migration table
    #[command(name = "create:table")]
    CreateTable {
        /// Table name [default: configured table]
        name: Option<String>,
    },

    /// Apply all untracked migrations
    Up(MigrationArgs),

    /// Undo the most recent migrations
    Down {
        #[command(flatten)]
        migrations: MigrationArgs,

        /// How many migrations to undo
        #[arg(long, default_value_t = 1, value_parser = parse_count)]
        count: usize,
    },

    /// Show which migrations are not applied yet
    Check(MigrationArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct MigrationArgs {
    /// Migration table [default: configured table]
    pub table: Option<String>,

    /// Directory of migration files [default: configured migrations directory]
    #[arg(short, long = "files")]
    pub files: Option<PathBuf>,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset
    pub fn default_log_filter(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    /// Load the `.env` file, then build the logger from the resulting environment
    ///
    /// The file is read first so that a `RUST_LOG` it sets takes effect.
    pub fn logger(&self) -> (env_logger::Builder, Result<PathBuf, dotenv::Error>) {
        let env_file = dotenv::from_path(&self.env).map(|()| self.env.clone());
        let env = env_logger::Env::default().default_filter_or(self.default_log_filter());
        (env_logger::Builder::from_env(env), env_file)
    }

    /// Command-line values that override the configuration file and environment
    pub fn overrides(&self) -> ConfigOverrides {
        match &self.command {
            Command::Db(db) => db.connection.overrides(),
            Command::Config | Command::Gen { .. } => ConfigOverrides::default(),
        }
    }
}

impl ConnectionArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            driver: self.driver.clone(),
            url: self.url.clone(),
            host: self.host.clone(),
            port: self.port,
            database: self.database.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            ..Default::default()
        }
    }
}

/// Lenient `--count`: leading digits are used, anything unparseable means 1
fn parse_count(value: &str) -> Result<usize, std::convert::Infallible> {
    let value = value.trim();
    let digits = value
        .find(|c: char| !c.is_ascii_digit())
        .map_or(value, |end| &value[..end]);
    Ok(digits.parse().unwrap_or(1))
}
