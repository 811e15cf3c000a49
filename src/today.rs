// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Run timestamp.
//!
//! Sprout captures the current date and time exactly once at startup. That
//! snapshot is then handed to every component that needs to know what "today"
//! is, so nothing below the entry point ever reads the system clock itself.

use chrono::{Local, NaiveDate, NaiveTime};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Calendar format used for date stamps in documents and the ledger.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Clock format used for time stamps in rendered phrases.
pub const TIME_FORMAT: &str = "%I:%M %p";

/// Snapshot of the moment a run started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Today {
    date: NaiveDate,
    time: NaiveTime,
}

impl Today {
    /// Construct snapshot from explicit date and time.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self { date, time }
    }

    /// Capture snapshot from local system clock.
    pub fn now() -> Self {
        let now = Local::now().naive_local();
        Self::new(now.date(), now.time())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Date formatted as `YYYY-MM-DD`.
    pub fn date_stamp(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Time of day formatted as `HH:MM AM`.
    pub fn time_stamp(&self) -> String {
        self.time.format(TIME_FORMAT).to_string()
    }

    /// Replace `{date}` and `{time}` placeholders in target template.
    pub fn render(&self, template: impl AsRef<str>) -> String {
        template
            .as_ref()
            .replace("{date}", &self.date_stamp())
            .replace("{time}", &self.time_stamp())
    }
}

impl Display for Today {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{} {}", self.date_stamp(), self.time_stamp())
    }
}
