//! Configuration system.
//!
//! Consolidates configuration from four tiers with field-by-field YAML merging:
//! 1. **Defaults** - built into the binary
//! 2. **Project** - `./project-import.yaml`
//! 3. **User** - `~/.project-import/config.yaml`
//! 4. **Environment** - variables listed below
//!
//! An explicit file (`--config` or `PROJECT_IMPORT_CONFIG_PATH`) replaces
//! tiers 2 and 3.
//!
//! ## Environment Variables
//! - `DATABASE_URL` - Connection string for the target store
//! - `PROJECT_IMPORT_CSV_DIR` - Directory holding the CSV exports
//! - `PROJECT_IMPORT_DEFAULT_CREATOR_ID` - Owner of imported projects
//! - `PROJECT_IMPORT_DEFAULT_STATUS` - Status of imported projects

mod loader;
mod merge;
mod types;

pub use loader::{ConfigLoader, ConfigPaths, ConfigTier};
pub use merge::deep_merge;
pub use types::*;
