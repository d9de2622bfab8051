pub mod configure;
pub mod setting;

use std::path::PathBuf;

/// Flags shared by every command
pub struct Options {
    pub json: bool,
    pub config: Option<PathBuf>,
}
