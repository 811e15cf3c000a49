// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Determine relevent path information for external files that sprout needs
//! to read or write: its configuration, its ledger, and the work tree of the
//! repository being updated.

use std::path::PathBuf;

/// Default path to configuration file, relative to current directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Default path to action ledger, relative to current directory.
pub const DEFAULT_LEDGER_PATH: &str = ".repo_tracker.json";

/// Default work tree of repository to update.
pub const DEFAULT_REPOSITORY_PATH: &str = ".";

/// Default document to edit, relative to repository work tree.
pub const DEFAULT_DOCUMENT_PATH: &str = "README.md";

/// Perform shell expansion on target path.
///
/// Expands a leading tilde and any `$VAR` or `${VAR}` references. Does not
/// check if the path returned actually exists.
///
/// # Errors
///
/// - Return [`shellexpand::LookupError`] if a referenced variable is unset
///   or not valid unicode.
pub fn expand(path: impl AsRef<str>) -> Result<PathBuf> {
    Ok(PathBuf::from(shellexpand::full(path.as_ref())?.into_owned()))
}

/// Friendly result alias :3
pub type Result<T, E = shellexpand::LookupError<std::env::VarError>> = std::result::Result<T, E>;
