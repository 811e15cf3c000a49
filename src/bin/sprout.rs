// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use sprout::{
    commit::Git2Committer,
    config::Config,
    pacing::Pacing,
    path::DEFAULT_CONFIG_PATH,
    today::Today,
    workflow::Workflow,
};

use anyhow::Result;
use clap::Parser;
use std::{path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Make one dated documentation update to a configured repository.
#[derive(Debug, Clone, Parser)]
#[command(about, override_usage = "sprout [options]", version)]
struct Cli {
    /// Path to configuration file.
    #[arg(short, long, value_name = "path", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Skip random delay before editing.
    #[arg(long)]
    pub no_delay: bool,
}

impl Cli {
    async fn run(self) -> Result<()> {
        // INVARIANT: Capture current date exactly once per run.
        let today = Today::now();
        let config = Config::load(&self.config)?;

        let pacing = if self.no_delay {
            Pacing::Skip
        } else {
            Pacing::from_env(config.delay)
        };
        let committer = Git2Committer::new(&config.paths.repository);

        let mut workflow = Workflow::new(config, committer, pacing, rand::rng());
        let outcome = workflow.run(today).await?;
        info!("{outcome}");

        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = run().await {
        error!("{error:?}");
        exit(1);
    }

    exit(0)
}

async fn run() -> Result<()> {
    Cli::parse().run().await
}
