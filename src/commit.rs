// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Commit logic.
//!
//! Sprout only ever asks three things of version control: are there pending
//! changes, stage this one file, and commit with this message. Those three
//! requests make up the [`Committer`] trait. The default implementation,
//! [`Git2Committer`], answers them through libgit2 against a work tree on
//! disk.

use git2::{Repository, StatusOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Proof that a commit landed.
///
/// Only a [`Committer`] can hand one of these out, which keeps the ledger
/// from being updated for commits that never happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    message: String,
    id: String,
}

impl CommitReceipt {
    /// Construct new receipt for a commit that landed.
    pub(crate) fn landed(message: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: id.into(),
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Commit identifier, e.g., hex object id.
    pub fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Result of trying to commit a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Commit landed.
    Committed(CommitReceipt),

    /// Work tree had no pending changes.
    NothingToCommit,
}

/// Layer of indirection for version control.
pub trait Committer {
    /// Check if work tree has any pending changes, untracked files included.
    fn has_pending_changes(&self) -> Result<bool>;

    /// Stage target file, relative to the work tree.
    fn stage(&self, path: &Path) -> Result<()>;

    /// Commit staged changes with target message.
    fn commit(&self, message: &str) -> Result<CommitReceipt>;

    /// Stage and commit target file if the work tree has pending changes.
    ///
    /// # Errors
    ///
    /// - Return [`CommitError`] if any version control request fails.
    fn commit_file(&self, path: &Path, message: &str) -> Result<CommitOutcome> {
        if !self.has_pending_changes()? {
            info!("no changes to commit");
            return Ok(CommitOutcome::NothingToCommit);
        }

        self.stage(path)?;
        let receipt = self.commit(message)?;
        info!("changes committed ({}): {}", receipt.id(), receipt.message());

        Ok(CommitOutcome::Committed(receipt))
    }
}

/// Commit through libgit2.
///
/// Opens the repository fresh for each request, so a work tree that is not a
/// repository surfaces as a commit failure rather than a startup failure.
#[derive(Debug, Clone)]
pub struct Git2Committer {
    work_tree: PathBuf,
}

impl Git2Committer {
    /// Construct new committer for target work tree.
    pub fn new(work_tree: impl Into<PathBuf>) -> Self {
        Self {
            work_tree: work_tree.into(),
        }
    }

    fn open(&self) -> Result<Repository> {
        Ok(Repository::open(&self.work_tree)?)
    }
}

impl Committer for Git2Committer {
    #[instrument(skip(self), level = "debug")]
    fn has_pending_changes(&self) -> Result<bool> {
        let repository = self.open()?;
        let mut opts = StatusOptions::new();
        opts.include_untracked(true).include_ignored(false);
        let statuses = repository.statuses(Some(&mut opts))?;
        debug!("{} pending change(s) in {}", statuses.len(), self.work_tree.display());

        Ok(!statuses.is_empty())
    }

    #[instrument(skip(self), level = "debug")]
    fn stage(&self, path: &Path) -> Result<()> {
        let repository = self.open()?;
        let mut index = repository.index()?;
        index.add_path(path)?;
        index.write()?;

        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    fn commit(&self, message: &str) -> Result<CommitReceipt> {
        let repository = self.open()?;

        // INVARIANT: Always use new tree produced by index after staging.
        let mut index = repository.index()?;
        let tree_oid = index.write_tree()?;
        let tree = repository.find_tree(tree_oid)?;

        // INVARIANT: Append to current head commit unless HEAD is unborn.
        let signature = repository.signature()?;
        let mut parents = Vec::new();
        if let Some(parent) = repository.head().ok().and_then(|head| head.target()) {
            parents.push(repository.find_commit(parent)?);
        }
        let parents = parents.iter().collect::<Vec<_>>();

        let oid = repository.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        Ok(CommitReceipt::landed(message, oid.to_string()))
    }
}

/// All possible error types for commit requests.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// Operations from libgit2 fail.
    #[error(transparent)]
    Git2(#[from] git2::Error),

    /// Any other version control backend fails.
    #[error("{0}")]
    Backend(String),
}

/// Friendly result alias :3
type Result<T, E = CommitError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recording {
        pending: bool,
        calls: RefCell<Vec<String>>,
    }

    impl Committer for Recording {
        fn has_pending_changes(&self) -> Result<bool> {
            self.calls.borrow_mut().push("status".into());
            Ok(self.pending)
        }

        fn stage(&self, path: &Path) -> Result<()> {
            self.calls.borrow_mut().push(format!("add {}", path.display()));
            Ok(())
        }

        fn commit(&self, message: &str) -> Result<CommitReceipt> {
            self.calls.borrow_mut().push(format!("commit {message}"));
            Ok(CommitReceipt::landed(message, "abc123"))
        }
    }

    #[test]
    fn commit_file_stages_then_commits() -> anyhow::Result<()> {
        let committer = Recording {
            pending: true,
            ..Default::default()
        };

        let outcome = committer.commit_file(Path::new("README.md"), "docs: touch")?;
        assert_eq!(
            outcome,
            CommitOutcome::Committed(CommitReceipt::landed("docs: touch", "abc123"))
        );
        assert_eq!(
            committer.calls.into_inner(),
            vec!["status", "add README.md", "commit docs: touch"]
        );

        Ok(())
    }

    #[test]
    fn commit_file_without_changes_does_nothing() -> anyhow::Result<()> {
        let committer = Recording::default();

        let outcome = committer.commit_file(Path::new("README.md"), "docs: touch")?;
        assert_eq!(outcome, CommitOutcome::NothingToCommit);
        assert_eq!(committer.calls.into_inner(), vec!["status"]);

        Ok(())
    }

    #[test]
    fn git2_committer_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let committer = Git2Committer::new(dir.path());
        assert!(matches!(committer.has_pending_changes(), Err(CommitError::Git2(_))));
    }
}
