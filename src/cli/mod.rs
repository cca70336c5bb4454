//! CLI command definitions for project-import
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod clear;
pub mod import;

use clap::{Parser, Subcommand};
use clear::ClearArgs;
use import::ImportArgs;
use std::path::PathBuf;

/// Import projects, media and tags from CSV exports into the platform database
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database connection string (overrides DATABASE_URL and config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import the CSV files (default if no subcommand given)
    Import(ImportArgs),

    /// Delete all imported projects, media and tags
    Clear(ClearArgs),
}

impl Cli {
    /// The command to run, defaulting to an import with default arguments.
    pub fn command(&self) -> Command {
        match &self.command {
            Some(Command::Import(args)) => Command::Import(args.clone()),
            Some(Command::Clear(args)) => Command::Clear(args.clone()),
            None => Command::Import(ImportArgs::default()),
        }
    }
}
