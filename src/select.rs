// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Candidate selection.
//!
//! Pick which repository gets today's update. Only repositories the ledger
//! has not seen today are eligible, and one of those is drawn uniformly at
//! random. Finding nothing eligible is the normal state of affairs for most
//! invocations after the first one of the day, so it is reported as `None`
//! rather than an error.

use crate::ledger::{Ledger, LedgerError};

use chrono::NaiveDate;
use rand::{seq::IndexedRandom, Rng};
use tracing::{info, instrument, warn};

/// Select random repository that has not been acted on at target date.
///
/// Returns `None` if no repositories are configured, or if every configured
/// repository was already acted on at `today`.
///
/// # Errors
///
/// - Return [`LedgerError`] if the ledger cannot be loaded.
#[instrument(skip(repos, ledger, rng), level = "debug")]
pub fn select_candidate<R>(
    repos: &[String],
    ledger: &Ledger,
    today: NaiveDate,
    rng: &mut R,
) -> Result<Option<String>, LedgerError>
where
    R: Rng + ?Sized,
{
    if repos.is_empty() {
        warn!("no repositories configured");
        return Ok(None);
    }

    let entries = ledger.load()?;
    let eligible = repos
        .iter()
        .filter(|repo| !entries.was_acted_on(repo, today))
        .collect::<Vec<_>>();

    match eligible.choose(rng) {
        Some(repo) => {
            info!("selected repository: {repo}");
            Ok(Some(repo.to_string()))
        }
        None => {
            info!("all repositories already updated today");
            Ok(None)
        }
    }
}

/// Expected owner of selected repositories.
///
/// Verification is a plain prefix comparison against the repository
/// identifier. It guards against typos in the repository list. It is __not__
/// a security boundary: nothing about the remote repository or the
/// credentials used to reach it is checked.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Owner(Option<String>);

impl Owner {
    /// Construct new owner, `None` or an empty name disables verification.
    pub fn new(owner: Option<impl Into<String>>) -> Self {
        Self(owner.map(Into::into).filter(|owner: &String| !owner.is_empty()))
    }

    /// Verify target repository identifier starts with `<owner>/`.
    ///
    /// Passes with a warning if no owner is configured.
    ///
    /// # Errors
    ///
    /// - Return [`OwnershipMismatch`] if the prefix does not match.
    pub fn verify(&self, repo: impl AsRef<str>) -> Result<(), OwnershipMismatch> {
        let repo = repo.as_ref();
        let Some(owner) = &self.0 else {
            warn!("no owner configured, skipping ownership check for {repo}");
            return Ok(());
        };

        let belongs = repo
            .strip_prefix(owner.as_str())
            .is_some_and(|rest| rest.starts_with('/'));
        if !belongs {
            return Err(OwnershipMismatch {
                repo: repo.into(),
                owner: owner.clone(),
            });
        }

        Ok(())
    }
}

/// Repository identifier does not carry the configured owner prefix.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("repository {repo} does not belong to {owner}")]
pub struct OwnershipMismatch {
    pub repo: String,
    pub owner: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use sealed_test::prelude::*;
    use simple_test_case::test_case;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn repos() -> Vec<String> {
        vec!["octocat/alpha".into(), "octocat/beta".into(), "octocat/gamma".into()]
    }

    #[sealed_test]
    fn select_nothing_when_unconfigured() -> anyhow::Result<()> {
        let mut rng = StdRng::seed_from_u64(7);
        let result = select_candidate(&[], &Ledger::new(".repo_tracker.json"), day(1), &mut rng)?;
        pretty_assertions::assert_eq!(result, None);
        Ok(())
    }

    #[sealed_test]
    fn select_nothing_when_all_done_today() -> anyhow::Result<()> {
        let ledger = Ledger::new(".repo_tracker.json");
        for repo in repos() {
            ledger.record_action(repo, day(1), "docs: touch")?;
        }

        let mut rng = StdRng::seed_from_u64(7);
        let result = select_candidate(&repos(), &ledger, day(1), &mut rng)?;
        pretty_assertions::assert_eq!(result, None);

        Ok(())
    }

    #[sealed_test]
    fn select_only_from_eligible() -> anyhow::Result<()> {
        let ledger = Ledger::new(".repo_tracker.json");
        ledger.record_action("octocat/alpha", day(1), "docs: touch")?;
        ledger.record_action("octocat/gamma", day(1), "docs: touch")?;

        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let result = select_candidate(&repos(), &ledger, day(1), &mut rng)?;
            pretty_assertions::assert_eq!(result.as_deref(), Some("octocat/beta"));
        }

        Ok(())
    }

    #[sealed_test]
    fn select_ignores_yesterday() -> anyhow::Result<()> {
        let ledger = Ledger::new(".repo_tracker.json");
        for repo in repos() {
            ledger.record_action(repo, day(1), "docs: touch")?;
        }

        let mut rng = StdRng::seed_from_u64(3);
        let result = select_candidate(&repos(), &ledger, day(2), &mut rng)?;
        assert!(result.is_some_and(|repo| repos().contains(&repo)));

        Ok(())
    }

    #[sealed_test]
    fn select_is_reproducible_with_same_seed() -> anyhow::Result<()> {
        let ledger = Ledger::new(".repo_tracker.json");
        let first = select_candidate(&repos(), &ledger, day(1), &mut StdRng::seed_from_u64(11))?;
        let second = select_candidate(&repos(), &ledger, day(1), &mut StdRng::seed_from_u64(11))?;
        pretty_assertions::assert_eq!(first, second);
        Ok(())
    }

    #[sealed_test]
    fn select_propagates_corrupt_ledger() {
        std::fs::write(".repo_tracker.json", "[1, 2").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let result = select_candidate(&repos(), &Ledger::new(".repo_tracker.json"), day(1), &mut rng);
        assert!(matches!(result, Err(LedgerError::Corrupt { .. })));
    }

    #[test_case(Some("octocat"), "octocat/alpha", true; "matching owner")]
    #[test_case(Some("octocat"), "someone/alpha", false; "different owner")]
    #[test_case(Some("octo"), "octocat/alpha", false; "owner is only a prefix of the name")]
    #[test_case(Some("octocat"), "octocat", false; "no slash")]
    #[test_case(None, "anyone/alpha", true; "no owner configured")]
    #[test_case(Some(""), "anyone/alpha", true; "empty owner counts as unconfigured")]
    #[test]
    fn owner_verification(owner: Option<&str>, repo: &str, expect: bool) {
        pretty_assertions::assert_eq!(Owner::new(owner).verify(repo).is_ok(), expect);
    }

    #[test]
    fn owner_mismatch_names_both_sides() {
        let result = Owner::new(Some("octocat")).verify("someone/alpha");
        pretty_assertions::assert_eq!(
            result,
            Err(OwnershipMismatch {
                repo: "someone/alpha".into(),
                owner: "octocat".into(),
            })
        );
    }
}
