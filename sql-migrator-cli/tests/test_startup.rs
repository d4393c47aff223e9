//! Startup order: the `.env` file is loaded before the logger reads `RUST_LOG`

use clap::Parser;
use sql_migrator_cli::Cli;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_rust_log_from_env_file_sets_log_level() {
    let temp_dir = TempDir::new().unwrap();
    let env_path = temp_dir.path().join(".env");
    fs::write(&env_path, "RUST_LOG=warn\n").unwrap();
    std::env::remove_var("RUST_LOG");

    let cli = Cli::try_parse_from(["sql-migrator", "-e", env_path.to_str().unwrap(), "config"])
        .unwrap();
    let (mut logger, env_file) = cli.logger();

    assert_eq!(env_file.unwrap(), env_path);
    assert_eq!(logger.build().filter(), log::LevelFilter::Warn);
}
