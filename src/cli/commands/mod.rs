//! Command implementations.

pub mod clean;
pub mod completions;
pub mod pull;
pub mod push;
pub mod stats;

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Resolve the project directory argument, defaulting to the current
/// working directory.
pub(crate) fn resolve_project_root(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}
