// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Delay before editing.
//!
//! When run by hand or from a local scheduler, sprout waits a random number
//! of minutes before touching the document so that commits do not land at
//! the same minute every day. Under CI the wait is skipped to keep jobs short.

use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{env, time::Duration};
use tracing::{info, instrument};

/// Environment variables that mark a recognized CI environment.
pub const CI_ENV_VARS: [&str; 2] = ["GITHUB_ACTIONS", "CI"];

/// Inclusive bounds of the random delay, in minutes.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct DelayBounds {
    pub min_minutes: u64,
    pub max_minutes: u64,
}

impl DelayBounds {
    /// Draw delay uniformly from bounds, in whole minutes.
    ///
    /// Inverted bounds are treated as a fixed delay of `min_minutes`.
    pub fn pick<R>(&self, rng: &mut R) -> Duration
    where
        R: Rng + ?Sized,
    {
        let minutes = if self.min_minutes < self.max_minutes {
            rng.random_range(self.min_minutes..=self.max_minutes)
        } else {
            self.min_minutes
        };

        Duration::from_secs(minutes.saturating_mul(60))
    }
}

impl Default for DelayBounds {
    fn default() -> Self {
        Self {
            min_minutes: 5,
            max_minutes: 40,
        }
    }
}

/// Check if current process runs under a recognized CI environment.
///
/// A marker variable that is set but empty does not count.
pub fn running_in_ci() -> bool {
    CI_ENV_VARS
        .iter()
        .any(|var| env::var_os(var).is_some_and(|value| !value.is_empty()))
}

/// Policy for waiting before editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep a random delay drawn from bounds.
    Sleep(DelayBounds),

    /// Do not wait at all.
    Skip,
}

impl Pacing {
    /// Determine policy from environment.
    ///
    /// Skips the delay under CI, sleeps otherwise.
    pub fn from_env(bounds: DelayBounds) -> Self {
        if running_in_ci() {
            info!("running under CI, delay disabled");
            Self::Skip
        } else {
            Self::Sleep(bounds)
        }
    }

    /// Wait according to policy.
    ///
    /// Shows elapsed time through a progress bar while sleeping. Returns the
    /// delay that was actually waited.
    ///
    /// # Errors
    ///
    /// - Return [`PacingError::IndicatifStyleTemplate`] if the progress bar
    ///   style cannot be set.
    #[instrument(skip(self, rng), level = "debug")]
    pub async fn wait<R>(&self, rng: &mut R) -> Result<Duration>
    where
        R: Rng + ?Sized,
    {
        let bounds = match self {
            Self::Sleep(bounds) => bounds,
            Self::Skip => return Ok(Duration::ZERO),
        };

        let delay = bounds.pick(rng);
        info!("waiting {} minutes before commit", delay.as_secs() / 60);
        if delay.is_zero() {
            return Ok(delay);
        }

        let style = ProgressStyle::with_template(
            "{elapsed_precise:.green}  {msg:<20}  [{wide_bar:.yellow/blue}]",
        )?
        .progress_chars("-Cco.");
        let bar = ProgressBar::new(delay.as_secs());
        bar.set_style(style);
        bar.set_message("waiting");

        // INVARIANT: First tick of an interval completes immediately.
        let mut ticker = tokio::time::interval(Duration::from_secs(1));
        ticker.tick().await;
        for _ in 0..delay.as_secs() {
            ticker.tick().await;
            bar.inc(1);
        }
        bar.finish_and_clear();

        Ok(delay)
    }
}

/// All possible error types for pacing.
#[derive(Debug, thiserror::Error)]
pub enum PacingError {
    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),
}

/// Friendly result alias :3
type Result<T, E = PacingError> = std::result::Result<T, E>;
