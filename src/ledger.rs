// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Persistent action ledger.
//!
//! The __ledger__ remembers the last day sprout committed to each repository.
//! It is the only thing standing between sprout and a second commit to the
//! same repository on the same day, so it is read before a repository is
//! selected and written only after a commit has actually landed.
//!
//! # Ledger File Layout
//!
//! The ledger is a single JSON object keyed by repository identifier:
//!
//! ```json
//! {
//!   "octocat/hello-world": {
//!     "last_action_date": "2024-01-01",
//!     "last_action_message": "📝 docs: update documentation"
//!   }
//! }
//! ```
//!
//! Tracker files written by the earlier tool use `last_commit_date` and
//! `last_commit_message` instead. Both spellings are accepted on read, only
//! the new one is written.
//!
//! # Limitations
//!
//! Every access reads or writes the whole file. A crash between the load and
//! the save of [`Ledger::record_action`] loses that one update. Two sprout
//! processes sharing one ledger file will race; runs are expected to be
//! serialized by whatever schedules them.

use crate::commit::CommitReceipt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    fs::read_to_string,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Record of the last action taken on a repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LedgerEntry {
    /// Day of last successful action.
    #[serde(alias = "last_commit_date")]
    pub last_action_date: NaiveDate,

    /// What was done, i.e., the commit message.
    #[serde(rename = "last_action_message", alias = "last_commit_message")]
    pub last_action_label: String,
}

/// Full contents of a ledger, keyed by repository identifier.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LedgerEntries(BTreeMap<String, LedgerEntry>);

impl LedgerEntries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, repo: impl AsRef<str>) -> Option<&LedgerEntry> {
        self.0.get(repo.as_ref())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if target repository was acted on at target date.
    pub fn was_acted_on(&self, repo: impl AsRef<str>, date: NaiveDate) -> bool {
        self.get(repo)
            .is_some_and(|entry| entry.last_action_date == date)
    }

    /// Insert or update entry of target repository.
    ///
    /// # Errors
    ///
    /// - Return [`LedgerError::DateRegression`] if the existing entry is
    ///   dated later than `date`. The entry is left untouched.
    pub fn upsert(
        &mut self,
        repo: impl Into<String>,
        date: NaiveDate,
        label: impl Into<String>,
    ) -> Result<()> {
        let repo = repo.into();
        if let Some(entry) = self.0.get(&repo) {
            // INVARIANT: Last action date never moves backwards.
            if entry.last_action_date > date {
                return Err(LedgerError::DateRegression {
                    repo,
                    recorded: entry.last_action_date,
                    attempted: date,
                });
            }
        }

        self.0.insert(
            repo,
            LedgerEntry {
                last_action_date: date,
                last_action_label: label.into(),
            },
        );

        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(S, LedgerEntry)> for LedgerEntries {
    fn from_iter<I: IntoIterator<Item = (S, LedgerEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(repo, entry)| (repo.into(), entry)).collect())
    }
}

/// Handle to ledger file on disk.
#[derive(Debug, Clone)]
pub struct Ledger {
    path: PathBuf,
}

impl Ledger {
    /// Construct new ledger handle.
    ///
    /// Does not touch the file system. A missing file is an empty ledger.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Read every entry from ledger file.
    ///
    /// # Errors
    ///
    /// - Return [`LedgerError::Read`] if the ledger file exists but cannot be
    ///   read.
    /// - Return [`LedgerError::Corrupt`] if the ledger file cannot be parsed.
    ///   The file is never reset or repaired.
    #[instrument(skip(self), level = "debug")]
    pub fn load(&self) -> Result<LedgerEntries> {
        let data = match read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no ledger at {}, starting empty", self.path.display());
                return Ok(LedgerEntries::new());
            }
            Err(err) => {
                return Err(LedgerError::Read {
                    source: err,
                    path: self.path.clone(),
                })
            }
        };

        serde_json::from_str(&data).map_err(|err| LedgerError::Corrupt {
            source: err,
            path: self.path.clone(),
        })
    }

    /// Replace ledger file contents with target entries.
    ///
    /// Writes to a temporary file next to the ledger and renames it into
    /// place, so readers see either the old or the new ledger in full.
    ///
    /// # Errors
    ///
    /// - Return [`LedgerError::Serialize`] if entries cannot be encoded.
    /// - Return [`LedgerError::Write`] if the file cannot be written.
    #[instrument(skip(self, entries), level = "debug")]
    pub fn save(&self, entries: &LedgerEntries) -> Result<()> {
        let mut data = serde_json::to_string_pretty(entries)?;
        data.push('\n');

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let write_err = |err: std::io::Error| LedgerError::Write {
            source: err,
            path: self.path.clone(),
        };

        mkdirp::mkdirp(dir).map_err(write_err)?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(data.as_bytes()).map_err(write_err)?;
        tmp.persist(&self.path).map_err(|err| write_err(err.error))?;
        debug!("saved {} ledger entries to {}", entries.len(), self.path.display());

        Ok(())
    }

    /// Check if target repository was acted on at target date.
    ///
    /// # Errors
    ///
    /// - Return any error of [`Ledger::load`].
    pub fn was_acted_on(&self, repo: impl AsRef<str>, date: NaiveDate) -> Result<bool> {
        Ok(self.load()?.was_acted_on(repo, date))
    }

    /// Record action on target repository at target date.
    ///
    /// Loads the ledger, upserts the entry, and saves it back.
    ///
    /// # Errors
    ///
    /// - Return any error of [`Ledger::load`] or [`Ledger::save`].
    /// - Return [`LedgerError::DateRegression`] if the repository already has
    ///   a later entry.
    #[instrument(skip(self, label), level = "debug")]
    pub fn record_action(
        &self,
        repo: impl AsRef<str> + std::fmt::Debug,
        date: NaiveDate,
        label: impl Into<String>,
    ) -> Result<()> {
        let mut entries = self.load()?;
        entries.upsert(repo.as_ref(), date, label)?;
        self.save(&entries)
    }
}

/// Record confirmed commits into the ledger.
///
/// Only accepts a [`CommitReceipt`], which can only be obtained from a commit
/// that actually landed. Failed or empty commits therefore never mark a
/// repository as done for the day.
#[derive(Debug, Clone)]
pub struct ActionRecorder {
    ledger: Ledger,
}

impl ActionRecorder {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Record commit described by `receipt` for target repository.
    ///
    /// # Errors
    ///
    /// - Return any error of [`Ledger::record_action`].
    pub fn record(
        &self,
        repo: impl AsRef<str>,
        date: NaiveDate,
        receipt: &CommitReceipt,
    ) -> Result<()> {
        let repo = repo.as_ref();
        self.ledger.record_action(repo, date, receipt.message())?;
        info!(
            "recorded {repo} as updated on {date} in {}",
            self.ledger.path().display()
        );

        Ok(())
    }
}

/// All possible error types for ledger interaction.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Ledger file exists but cannot be parsed.
    #[error("ledger {path:?} is corrupt, refusing to overwrite it")]
    Corrupt {
        #[source]
        source: serde_json::Error,
        path: PathBuf,
    },

    /// Ledger file exists but cannot be read.
    #[error("failed to read ledger {path:?}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Ledger file cannot be written.
    #[error("failed to write ledger {path:?}")]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Ledger entries cannot be encoded.
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),

    /// Update would move last action date of a repository backwards.
    #[error("ledger has {repo} at {recorded}, refusing to rewind it to {attempted}")]
    DateRegression {
        repo: String,
        recorded: NaiveDate,
        attempted: NaiveDate,
    },
}

/// Friendly result alias :3
type Result<T, E = LedgerError> = std::result::Result<T, E>;
