//! Import subcommand
//!
//! Reads the projects, media and tags CSV exports and writes them into the
//! target database, remapping project identifiers on the way.

use crate::config::InputConfig;
use crate::input::InputFiles;
use clap::Args;
use std::path::PathBuf;

/// Arguments for the import subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ImportArgs {
    /// Directory containing the CSV files (overrides config)
    #[arg(long, value_name = "DIR")]
    pub csv_dir: Option<PathBuf>,

    /// Projects CSV file (overrides the file in the CSV directory)
    #[arg(long, value_name = "FILE")]
    pub projects: Option<PathBuf>,

    /// Media CSV file
    #[arg(long, value_name = "FILE")]
    pub media: Option<PathBuf>,

    /// Tags CSV file
    #[arg(long, value_name = "FILE")]
    pub tags: Option<PathBuf>,

    /// Skip the tag stage
    #[arg(long)]
    pub no_tags: bool,

    /// Attribute imported projects to this user id
    ///
    /// Without it, the configured default creator is used.
    #[arg(long, value_name = "ID")]
    pub creator_id: Option<i64>,

    /// Validate the input without modifying the database
    ///
    /// Parses the files, validates projects, checks dependent rows for
    /// required values, and reports how many would be imported or skipped.
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportArgs {
    /// Apply the command-line overrides to the configured input locations.
    pub fn resolve(&self, input: &InputConfig) -> InputFiles {
        let mut input = input.clone();
        if let Some(dir) = &self.csv_dir {
            input.csv_dir = dir.clone();
        }
        let import_tags = input.import_tags && !self.no_tags;

        InputFiles {
            projects: self.projects.clone().unwrap_or_else(|| input.projects_path()),
            media: self.media.clone().unwrap_or_else(|| input.media_path()),
            tags: import_tags.then(|| self.tags.clone().unwrap_or_else(|| input.tags_path())),
        }
    }

    /// Describe the import mode for logging
    pub fn import_mode(&self) -> &'static str {
        if self.dry_run { "dry-run" } else { "import" }
    }
}
