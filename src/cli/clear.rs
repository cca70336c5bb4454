//! Clear subcommand

use clap::Args;

/// Arguments for the clear subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ClearArgs {
    /// Confirm deletion of all imported data
    #[arg(long)]
    pub force: bool,
}
