mod config;
mod db;
mod error;
mod pm;
mod privilege;
mod service;
mod setup;
mod ui;

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_CONFIG_PATH, SetupOptions};

/// Universal database setup: installs MariaDB, provisions a multi-tenant
/// web schema and a scoped service account.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Insert tenant-scoped sample data after provisioning
    #[arg(short, long)]
    sample_data: bool,

    /// Only verify connectivity for the configured service account
    #[arg(short, long)]
    test_only: bool,

    /// Show detailed progress output
    #[arg(short, long)]
    verbose: bool,

    /// Path to a JSON configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    let options = SetupOptions {
        sample_data: cli.sample_data,
        test_only: cli.test_only,
        verbose: cli.verbose,
        config_path: cli.config,
    };

    if let Err(err) = setup::run(&options) {
        ui::error(&err.to_string());
        if let Some(hint) = err.remediation() {
            ui::info(&hint);
        }
        std::process::exit(1);
    }
}
