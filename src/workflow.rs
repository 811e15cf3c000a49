// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Daily update workflow.
//!
//! One run of sprout is a straight line: select a repository, check its
//! owner, wait, edit the document, commit, record. Each way a run can stop
//! early is a distinct [`RunOutcome`]. Only ledger and document I/O failures
//! are treated as errors. A failed commit is an outcome, and the ledger is
//! left alone when one happens.

use crate::{
    commit::{CommitOutcome, Committer},
    config::Config,
    document::{mutate, DatedEntry},
    ledger::{ActionRecorder, Ledger},
    pacing::Pacing,
    select::{select_candidate, Owner},
    today::Today,
};

use rand::{seq::IndexedRandom, Rng};
use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{read_to_string, write},
    path::PathBuf,
};
use tracing::{info, instrument, warn};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No repository is eligible today.
    NoCandidate,

    /// Selected repository does not carry the configured owner prefix.
    OwnershipMismatch { repo: String, owner: String },

    /// Document to edit does not exist.
    NoDocument { repo: String, path: PathBuf },

    /// Document already has an entry for today.
    NoUpdateNeeded { repo: String },

    /// Work tree had nothing to commit.
    NothingToCommit { repo: String },

    /// Commit request failed, ledger left untouched.
    CommitFailed { repo: String, reason: String },

    /// Commit landed and was recorded.
    Committed { repo: String, message: String },
}

impl Display for RunOutcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::NoCandidate => write!(fmt, "no action needed"),
            Self::OwnershipMismatch { repo, owner } => {
                write!(fmt, "aborted, {repo} does not belong to {owner}")
            }
            Self::NoDocument { repo, path } => {
                write!(fmt, "skipped {repo}, {} not found", path.display())
            }
            Self::NoUpdateNeeded { repo } => write!(fmt, "no updates needed for {repo}"),
            Self::NothingToCommit { repo } => write!(fmt, "nothing to commit for {repo}"),
            Self::CommitFailed { repo, reason } => {
                write!(fmt, "failed to commit changes for {repo}: {reason}")
            }
            Self::Committed { repo, message } => {
                write!(fmt, "successfully updated {repo}: {message}")
            }
        }
    }
}

/// Daily update workflow.
///
/// Generic over the version control backend and the random source so both
/// can be swapped out in tests.
#[derive(Debug)]
pub struct Workflow<C, R>
where
    C: Committer,
    R: Rng,
{
    config: Config,
    ledger: Ledger,
    committer: C,
    pacing: Pacing,
    rng: R,
}

impl<C, R> Workflow<C, R>
where
    C: Committer,
    R: Rng,
{
    /// Construct new workflow.
    ///
    /// Ledger location is taken from configuration.
    pub fn new(config: Config, committer: C, pacing: Pacing, rng: R) -> Self {
        let ledger = Ledger::new(&config.paths.ledger);
        Self {
            config,
            ledger,
            committer,
            pacing,
            rng,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Run workflow once for target day.
    ///
    /// # Errors
    ///
    /// - Return [`WorkflowError::Ledger`] if the ledger cannot be read or
    ///   written. A corrupt ledger is never reset.
    /// - Return [`WorkflowError::Document`] if the document exists but cannot
    ///   be read or written.
    /// - Return [`WorkflowError::Pacing`] if the delay cannot be displayed.
    #[instrument(skip(self), level = "debug")]
    pub async fn run(&mut self, today: Today) -> Result<RunOutcome> {
        info!("date: {}", today.date_stamp());

        let Some(repo) = select_candidate(
            &self.config.repositories,
            &self.ledger,
            today.date(),
            &mut self.rng,
        )?
        else {
            return Ok(RunOutcome::NoCandidate);
        };

        if let Err(mismatch) = Owner::new(self.config.owner.clone()).verify(&repo) {
            warn!("{mismatch}, ownership check is not a security boundary");
            return Ok(RunOutcome::OwnershipMismatch {
                repo: mismatch.repo,
                owner: mismatch.owner,
            });
        }

        self.pacing.wait(&mut self.rng).await?;

        let path = self.config.paths.document_path();
        if !path.exists() {
            warn!("{} not found", path.display());
            return Ok(RunOutcome::NoDocument { repo, path });
        }

        let text = read_to_string(&path).map_err(|err| WorkflowError::Document {
            source: err,
            path: path.clone(),
        })?;
        let entry = self.draft_entry(&today);
        let mutation = mutate(&text, &entry, &self.config.disclosure);

        if mutation.disclosed {
            info!("disclosure added to {}", path.display());
        }

        if mutation.is_changed() {
            write(&path, &mutation.content).map_err(|err| WorkflowError::Document {
                source: err,
                path: path.clone(),
            })?;
        }

        if !mutation.dated {
            info!(
                "{} already contains today's date ({})",
                path.display(),
                entry.date_stamp()
            );
            return Ok(RunOutcome::NoUpdateNeeded { repo });
        }
        info!("{} updated under {:?}", path.display(), entry.heading());

        let message = self.draft_commit_message(&today);
        match self
            .committer
            .commit_file(&self.config.paths.document, &message)
        {
            Ok(CommitOutcome::Committed(receipt)) => {
                ActionRecorder::new(self.ledger.clone()).record(&repo, today.date(), &receipt)?;
                Ok(RunOutcome::Committed {
                    repo,
                    message: receipt.message().into(),
                })
            }
            Ok(CommitOutcome::NothingToCommit) => Ok(RunOutcome::NothingToCommit { repo }),
            Err(error) => {
                warn!("commit failed for {repo}: {error}");
                Ok(RunOutcome::CommitFailed {
                    repo,
                    reason: error.to_string(),
                })
            }
        }
    }

    fn draft_entry(&mut self, today: &Today) -> DatedEntry {
        let section = pick(&self.config.sections, &mut self.rng, "Daily Activity Log");
        let phrase = pick(&self.config.phrases, &mut self.rng, "Documentation reviewed and updated");

        DatedEntry::new(today, section, phrase)
    }

    fn draft_commit_message(&mut self, today: &Today) -> String {
        let template = pick(
            &self.config.commit_messages,
            &mut self.rng,
            "📝 docs: update documentation",
        );

        today.render(template)
    }
}

// Configuration validation rejects empty choice lists, the fallback only
// covers configs built by hand.
fn pick<R: Rng + ?Sized>(choices: &[String], rng: &mut R, fallback: &str) -> String {
    choices
        .choose(rng)
        .map_or_else(|| fallback.to_string(), Clone::clone)
}

/// All possible error types for a workflow run.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// Ledger cannot be read or written.
    #[error(transparent)]
    Ledger(#[from] crate::ledger::LedgerError),

    /// Delay cannot be displayed.
    #[error(transparent)]
    Pacing(#[from] crate::pacing::PacingError),

    /// Document exists but cannot be read or written.
    #[error("failed to access document {path:?}")]
    Document {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
type Result<T, E = WorkflowError> = std::result::Result<T, E>;
