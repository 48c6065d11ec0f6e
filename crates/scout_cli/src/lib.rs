//! `scout-report`: drive one Scout session from the command line.
//!
//! Every `--action` is reported in order through the same Scout, so the
//! reports share a trace id and carry consecutive indices.

use anyhow::{Context, Result};
use clap::Parser;
use scout_core::{LogReporter, MetritonReporter, Reporter, ReporterConfig, Scout, ScoutMeta};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "scout-report",
    about = "Send ordered lifecycle reports for an installation",
    after_help = "Reports skipped because reporting is disabled (SCOUT_DISABLE or \
                  `disabled = true` in the config file) are counted as sent."
)]
pub struct Cli {
    /// Operation class of this run (install, update, delete, ...)
    #[arg(long)]
    pub mode: String,

    /// Stable identity of the installation (e.g. a cluster UID)
    #[arg(long, env = "SCOUT_INSTALL_ID")]
    pub install_id: String,

    /// Action to report; repeat to report several actions in order
    #[arg(long = "action", required = true)]
    pub actions: Vec<String>,

    /// Metadata attached to every report, as key=value (value may be JSON)
    #[arg(long = "meta", value_parser = ScoutMeta::parse_pair)]
    pub meta: Vec<ScoutMeta>,

    /// TOML file with reporter settings
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Collector URL (overrides config and SCOUT_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Print composed reports to stdout instead of sending them
    #[arg(long)]
    pub dry_run: bool,

    /// Keep reporting later actions after a failed one
    #[arg(long)]
    pub keep_going: bool,

    /// Also write logs to a daily-rolling file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve reporter settings: file (or defaults), then environment, then flags.
    pub fn reporter_config(&self) -> Result<ReporterConfig> {
        let config = match &self.config {
            Some(path) => ReporterConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?,
            None => ReporterConfig::default(),
        };
        let mut config = config.apply_env();
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        Ok(config)
    }
}

/// Outcome of a `scout-report` run.
///
/// A report the reporter skipped because reporting is disabled is counted
/// in `sent`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub sent: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.skipped == 0
    }
}

/// Report every action of `cli` through one Scout session.
pub async fn run(cli: &Cli) -> Result<RunSummary> {
    let config = cli.reporter_config()?;
    run_with_config(cli, &config).await
}

/// Like [`run`], with reporter settings already resolved.
///
/// The environment is not consulted again; `config.disabled` alone decides
/// whether reports are sent.
pub async fn run_with_config(cli: &Cli, config: &ReporterConfig) -> Result<RunSummary> {
    let reporter: Arc<dyn Reporter> = if cli.dry_run {
        Arc::new(LogReporter)
    } else {
        Arc::new(MetritonReporter::from_config(config).context("Failed to build reporter")?)
    };

    let mut scout = Scout::with_identity(
        cli.mode.as_str(),
        cli.install_id.as_str(),
        config.application.as_str(),
        config.version.as_str(),
        reporter,
    );
    info!(
        mode = %cli.mode,
        trace_id = %scout.trace_id(),
        actions = cli.actions.len(),
        "Starting scout session"
    );

    let mut summary = RunSummary::default();
    for (pos, action) in cli.actions.iter().enumerate() {
        match scout.report(action, cli.meta.iter().cloned()).await {
            Ok(()) => summary.sent += 1,
            Err(err) => {
                let index = err.index();
                eprintln!(
                    "Error: action '{}' (index {}): {:#}",
                    action,
                    index,
                    anyhow::Error::new(err)
                );
                summary.failed += 1;
                if !cli.keep_going {
                    summary.skipped = cli.actions.len() - pos - 1;
                    break;
                }
            }
        }
    }

    info!(
        sent = summary.sent,
        failed = summary.failed,
        skipped = summary.skipped,
        "Scout session finished"
    );
    Ok(summary)
}
