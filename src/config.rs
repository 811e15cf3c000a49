// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of the configuration file that sprout reads once at
//! startup. Everything sprout chooses from at random (repositories, section
//! labels, phrases, commit messages, delay) comes from here.
//!
//! # General Layout
//!
//! ```toml
//! owner = "octocat"
//! repositories = ["octocat/hello-world"]
//! sections = ["Daily Activity Log"]
//! commit_messages = ["📝 docs: update documentation"]
//! phrases = ["Project status verified", "Maintenance check completed at {time}"]
//!
//! [delay]
//! min_minutes = 5
//! max_minutes = 40
//!
//! [paths]
//! ledger = ".repo_tracker.json"
//! repository = "."
//! document = "README.md"
//! ```
//!
//! Every field is optional. A missing `repositories` list loads as empty,
//! which makes every run end without selecting anything. Phrases and commit
//! messages may use the `{date}` and `{time}` placeholders.

use crate::{
    pacing::DelayBounds,
    path::{self, DEFAULT_DOCUMENT_PATH, DEFAULT_LEDGER_PATH, DEFAULT_REPOSITORY_PATH},
};

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::{info, instrument};

/// One-time sentence appended to every managed document.
pub const DEFAULT_DISCLOSURE: &str =
    "🤖 This repository is maintained with the help of an automated documentation bot.";

/// Sprout configuration.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Owner prefix that selected repositories must carry.
    pub owner: Option<String>,

    /// Repository identifiers to choose from, e.g., "owner/name".
    #[serde(default)]
    pub repositories: Vec<String>,

    /// Section labels to file new entries under.
    #[serde(default = "default_sections")]
    pub sections: Vec<String>,

    /// Commit message templates.
    #[serde(default = "default_commit_messages")]
    pub commit_messages: Vec<String>,

    /// Phrase templates for the dated bullet line.
    #[serde(default = "default_phrases")]
    pub phrases: Vec<String>,

    /// Sentence appended once to the end of the document.
    #[serde(default = "default_disclosure")]
    pub disclosure: String,

    /// Bounds of random delay before editing.
    #[serde(default)]
    pub delay: DelayBounds,

    /// Locations of external files.
    #[serde(default)]
    pub paths: PathSettings,
}

impl Config {
    /// Load configuration from target file.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if the file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if the file is not valid TOML.
    /// - Return [`ConfigError::ShellExpansion`] if a path cannot be expanded.
    /// - Return [`ConfigError::Invalid`] if a setting is unusable.
    #[instrument(skip(path), level = "debug")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = read_to_string(path).map_err(|err| ConfigError::Read {
            source: err,
            path: path.to_path_buf(),
        })?;
        let config: Config = data.parse()?;
        info!("configuration loaded from {}", path.display());

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let choices = [
            ("sections", self.sections.is_empty()),
            ("commit_messages", self.commit_messages.is_empty()),
            ("phrases", self.phrases.is_empty()),
        ];
        if let Some((field, _)) = choices.iter().find(|(_, empty)| *empty) {
            return Err(ConfigError::Invalid(format!("{field} must not be empty")));
        }

        if self.delay.min_minutes > self.delay.max_minutes {
            return Err(ConfigError::Invalid(format!(
                "delay.min_minutes ({}) exceeds delay.max_minutes ({})",
                self.delay.min_minutes, self.delay.max_minutes
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: None,
            repositories: Vec::new(),
            sections: default_sections(),
            commit_messages: default_commit_messages(),
            phrases: default_phrases(),
            disclosure: default_disclosure(),
            delay: DelayBounds::default(),
            paths: PathSettings::default(),
        }
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: Config = toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on every path field.
        config.paths.ledger = expand(&config.paths.ledger)?;
        config.paths.repository = expand(&config.paths.repository)?;
        config.paths.document = expand(&config.paths.document)?;

        config.validate()?;

        Ok(config)
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Locations of files sprout reads and writes.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathSettings {
    /// Action ledger file.
    pub ledger: PathBuf,

    /// Work tree of repository to edit and commit in.
    pub repository: PathBuf,

    /// Document to edit, relative to the repository work tree.
    pub document: PathBuf,
}

impl PathSettings {
    /// Full path to document inside repository work tree.
    pub fn document_path(&self) -> PathBuf {
        self.repository.join(&self.document)
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            ledger: DEFAULT_LEDGER_PATH.into(),
            repository: DEFAULT_REPOSITORY_PATH.into(),
            document: DEFAULT_DOCUMENT_PATH.into(),
        }
    }
}

fn expand(raw: &Path) -> Result<PathBuf> {
    Ok(path::expand(raw.to_string_lossy())?)
}

fn default_sections() -> Vec<String> {
    vec!["Daily Activity Log".into()]
}

fn default_commit_messages() -> Vec<String> {
    vec!["📝 docs: update documentation".into()]
}

fn default_phrases() -> Vec<String> {
    vec![
        "Documentation reviewed and updated".into(),
        "Maintenance check completed at {time}".into(),
        "Project status verified".into(),
        "Added notes on recent progress".into(),
        "Documentation improvements implemented".into(),
        "Routine quality check performed".into(),
    ]
}

fn default_disclosure() -> String {
    DEFAULT_DISCLOSURE.into()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration file {path:?}")]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),

    /// Configuration parsed, but a setting cannot be used.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("SPROUT_DATA", "/var/lib/sprout")])]
    fn deserialize_config() -> anyhow::Result<()> {
        let result: Config = r#"
            owner = "octocat"
            repositories = ["octocat/alpha", "octocat/beta"]
            sections = ["Log"]
            commit_messages = ["docs: touch {date}"]
            phrases = ["checked at {time}"]
            disclosure = "automated"

            [delay]
            min_minutes = 1
            max_minutes = 2

            [paths]
            ledger = "$SPROUT_DATA/tracker.json"
            repository = "/work/alpha"
            document = "docs/NOTES.md"
        "#
        .parse()?;

        let expect = Config {
            owner: Some("octocat".into()),
            repositories: vec!["octocat/alpha".into(), "octocat/beta".into()],
            sections: vec!["Log".into()],
            commit_messages: vec!["docs: touch {date}".into()],
            phrases: vec!["checked at {time}".into()],
            disclosure: "automated".into(),
            delay: DelayBounds {
                min_minutes: 1,
                max_minutes: 2,
            },
            paths: PathSettings {
                ledger: "/var/lib/sprout/tracker.json".into(),
                repository: "/work/alpha".into(),
                document: "docs/NOTES.md".into(),
            },
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_minimal_config_uses_defaults() -> anyhow::Result<()> {
        let result: Config = r#"repositories = ["octocat/alpha"]"#.parse()?;
        let expect = Config {
            repositories: vec!["octocat/alpha".into()],
            ..Config::default()
        };

        assert_eq!(result, expect);
        assert_eq!(result.paths.document_path(), PathBuf::from("./README.md"));

        Ok(())
    }

    #[test]
    fn deserialize_empty_config_has_no_repositories() -> anyhow::Result<()> {
        let result: Config = "".parse()?;
        assert!(result.repositories.is_empty());
        assert_eq!(result, Config::default());

        Ok(())
    }

    #[test]
    fn serialize_config() -> anyhow::Result<()> {
        let config = Config {
            owner: Some("octocat".into()),
            repositories: vec!["octocat/alpha".into()],
            sections: vec!["Log".into()],
            commit_messages: vec!["docs: touch".into()],
            phrases: vec!["checked".into()],
            disclosure: "automated".into(),
            delay: DelayBounds {
                min_minutes: 5,
                max_minutes: 40,
            },
            paths: PathSettings::default(),
        };
        let result = config.to_string();

        assert!(result.starts_with("owner = \"octocat\"\n"));
        assert!(result.contains("[delay]\nmin_minutes = 5\nmax_minutes = 40\n"));
        assert!(result.contains("ledger = \".repo_tracker.json\""));
        assert_eq!(result.parse::<Config>()?, config);

        Ok(())
    }

    #[test]
    fn reject_empty_choice_list() {
        let result = r#"
            repositories = ["octocat/alpha"]
            phrases = []
        "#
        .parse::<Config>();

        assert!(matches!(result, Err(ConfigError::Invalid(msg)) if msg.contains("phrases")));
    }

    #[test]
    fn reject_inverted_delay_bounds() {
        let result = r#"
            repositories = ["octocat/alpha"]

            [delay]
            min_minutes = 30
            max_minutes = 10
        "#
        .parse::<Config>();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn reject_malformed_toml() {
        let result = "repositories = [".parse::<Config>();
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));
    }

    #[sealed_test]
    fn load_missing_file_fails() {
        let result = Config::load("config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[sealed_test]
    fn load_from_file() -> anyhow::Result<()> {
        std::fs::write("config.toml", "owner = \"octocat\"\nrepositories = [\"octocat/alpha\"]\n")?;
        let config = Config::load("config.toml")?;
        assert_eq!(config.owner.as_deref(), Some("octocat"));
        assert_eq!(config.repositories, vec!["octocat/alpha".to_string()]);
        Ok(())
    }
}
