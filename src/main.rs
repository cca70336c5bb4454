//! Project Import CLI
//!
//! Imports projects, then media and tags referencing them, from CSV exports
//! into the platform database.

use anyhow::Result;
use clap::Parser;
use project_import::cli::clear::ClearArgs;
use project_import::cli::import::ImportArgs;
use project_import::cli::{Cli, Command};
use project_import::config::{Config, ConfigLoader};
use project_import::db::Database;
use project_import::error::ImportError;
use project_import::input::read_input;
use project_import::logging::{LogTarget, init_logging};
use project_import::pipeline::{Pipeline, preview};
use std::process::ExitCode;
use tracing::info;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;

    let mut loader = ConfigLoader::load(cli.config.as_deref())?;
    if let Some(url) = &cli.database {
        loader.config_mut().database.url = Some(url.clone());
    }
    let config = loader.into_config();

    match cli.command() {
        Command::Import(args) => run_import(&config, &args),
        Command::Clear(args) => run_clear(&config, &args),
    }
}

fn database_url(config: &Config) -> Result<&str, ImportError> {
    config
        .database
        .url
        .as_deref()
        .ok_or_else(|| ImportError::connection("no database configured; set DATABASE_URL or --database"))
}

/// Run the import command
fn run_import(config: &Config, args: &ImportArgs) -> Result<ExitCode> {
    let files = args.resolve(&config.input);
    info!(
        mode = args.import_mode(),
        projects = %files.projects.display(),
        media = %files.media.display(),
        tags = ?files.tags,
        "Starting import"
    );

    // All input is read before the database is touched.
    let input = read_input(&files)?;

    if args.dry_run {
        let report = preview(&input, &config.import);
        print!("{}", report);
        return Ok(if report.would_succeed {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let db = Database::connect(database_url(config)?)?;
    let report = Pipeline::new(config.import.clone())
        .with_caller(args.creator_id)
        .run(db, &input);

    println!("{}", report);
    for skipped in &report.skipped_rows {
        println!(
            "  skipped {} row {} ({}): project {} not found",
            skipped.stage,
            skipped.row,
            skipped.record,
            skipped.reference.as_deref().unwrap_or("<none>")
        );
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Run the clear command
fn run_clear(config: &Config, args: &ClearArgs) -> Result<ExitCode> {
    if !args.force {
        anyhow::bail!("Refusing to delete imported data without --force");
    }

    let mut db = Database::connect(database_url(config)?)?;
    let deleted = db.clear_imported_data()?;
    db.close();

    println!("Cleared imported data:");
    if deleted.is_empty() {
        println!("  (nothing to delete)");
    }
    for (table, count) in &deleted {
        println!("  {}: {}", table, count);
    }
    Ok(ExitCode::SUCCESS)
}
