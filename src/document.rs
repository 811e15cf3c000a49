// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Document mutation.
//!
//! Decide what today's edit to a document looks like. Everything here is a
//! pure function of its inputs: the caller reads the document, picks the
//! section and phrase, and decides what to do with the new text.
//!
//! # Dated Entries
//!
//! Each update is one bullet line stamped with the date, filed under a
//! `## <section>` heading. If the heading already exists, the bullet goes
//! directly under its __first__ occurrence. The heading is matched
//! verbatim, so `## Log` also matches the start of `## Logbook`, or a line
//! inside a fenced code block. Otherwise the heading and bullet are
//! appended to the end of the document.
//!
//! If the date stamp appears anywhere in the document, today's update is
//! considered done and no entry is added. That check does not care what put
//! the date there.
//!
//! # Disclosure
//!
//! Separately, a fixed disclosure sentence is appended below a horizontal
//! rule unless the document already contains it. This happens at most once
//! over the lifetime of the document.

use crate::today::Today;

/// Inputs for today's dated entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedEntry {
    date_stamp: String,
    section: String,
    phrase: String,
}

impl DatedEntry {
    /// Construct new dated entry.
    ///
    /// The phrase template is rendered against `today`, so `{date}` and
    /// `{time}` placeholders are filled in here.
    pub fn new(today: &Today, section: impl Into<String>, phrase_template: impl AsRef<str>) -> Self {
        Self {
            date_stamp: today.date_stamp(),
            section: section.into(),
            phrase: today.render(phrase_template),
        }
    }

    pub fn date_stamp(&self) -> &str {
        self.date_stamp.as_str()
    }

    /// Heading line that entries are filed under.
    pub fn heading(&self) -> String {
        format!("## {}", self.section)
    }

    /// Bullet line of the entry.
    pub fn bullet(&self) -> String {
        format!("- [{}] {}", self.date_stamp, self.phrase)
    }
}

/// Outcome of mutating a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// Full document text after mutation.
    pub content: String,

    /// Dated entry was added.
    pub dated: bool,

    /// Disclosure sentence was appended.
    pub disclosed: bool,
}

impl Mutation {
    /// Check if any change was made at all.
    pub fn is_changed(&self) -> bool {
        self.dated || self.disclosed
    }
}

/// Add dated entry to target text unless today already has one.
///
/// Returns `None` if the date stamp already appears in `text`.
pub fn insert_dated_entry(text: &str, entry: &DatedEntry) -> Option<String> {
    if text.contains(entry.date_stamp()) {
        return None;
    }

    let heading = entry.heading();
    let bullet = entry.bullet();
    let updated = match text.split_once(heading.as_str()) {
        Some((before, after)) => format!("{before}{heading}\n\n{bullet}{after}"),
        None => format!("{text}\n\n{heading}\n\n{bullet}\n"),
    };

    Some(updated)
}

/// Append disclosure sentence to target text unless already present.
///
/// Returns `None` if `disclosure` already appears in `text`.
pub fn append_disclosure(text: &str, disclosure: &str) -> Option<String> {
    if text.contains(disclosure) {
        return None;
    }

    Some(format!("{text}\n\n---\n\n{disclosure}\n"))
}

/// Apply dated entry and disclosure to target text.
///
/// The dated entry is applied first so that a freshly added disclosure ends
/// up last in the document.
pub fn mutate(text: &str, entry: &DatedEntry, disclosure: &str) -> Mutation {
    let (content, dated) = match insert_dated_entry(text, entry) {
        Some(updated) => (updated, true),
        None => (text.to_string(), false),
    };

    match append_disclosure(&content, disclosure) {
        Some(updated) => Mutation {
            content: updated,
            dated,
            disclosed: true,
        },
        None => Mutation {
            content,
            dated,
            disclosed: false,
        },
    }
}
