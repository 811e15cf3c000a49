// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Daily documentation touch-ups across a set of repositories.
//!
//! Each run picks one configured repository that has not been updated
//! today, adds a dated bullet to its README, commits the change, and
//! records the day in a ledger so the same repository is not touched twice
//! on one day.
//!
//! # See Also
//!
//! 1. [`workflow`] for the order of operations.
//! 2. [`ledger`] for the one-commit-per-day guard.
//! 3. [`document`] for the exact shape of each edit.

pub mod commit;
pub mod config;
pub mod document;
pub mod ledger;
pub mod pacing;
pub mod path;
pub mod select;
pub mod today;
pub mod workflow;
