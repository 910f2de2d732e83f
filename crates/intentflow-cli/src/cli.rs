//! CLI argument definitions for intentflow.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// intentflow -- natural-language automations as executable flow graphs.
#[derive(Parser)]
#[command(
    name = "intentflow",
    version,
    about = "Turn automation requests into validated flow graphs and run them",
    long_about = "Synthesizes trigger/condition/action flow graphs from free-text intents \
                  using an LLM (or a built-in demo flow when no API key is configured), \
                  validates them, and executes them against runtime metadata."
)]
pub struct Cli {
    /// Configuration file (TOML, or JSON when the extension is `.json`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Synthesize a flow graph from a free-text intent.
    Synthesize {
        /// What the automation should do, in plain language.
        intent: String,

        /// A device capability to advertise (repeatable).
        #[arg(long = "capability", short = 'c')]
        capabilities: Vec<String>,

        /// A saved location alias to advertise (repeatable).
        #[arg(long = "location", short = 'l')]
        locations: Vec<String>,

        /// Caller time zone (IANA name).  Requires `--now`.
        #[arg(long, requires = "now")]
        tz: Option<String>,

        /// Caller local time (ISO-8601).  Requires `--tz`.
        #[arg(long, requires = "tz")]
        now: Option<String>,

        /// User id recorded in the request.
        #[arg(long, default_value = "cli")]
        user_id: String,

        /// Also write the response JSON to this file.
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Validate a flow file (synthesis response or bare graph JSON).
    Validate {
        /// Path to the flow JSON.
        file: PathBuf,
    },

    /// Execute a flow file with the dry-run device.
    Run {
        /// Path to the flow JSON.
        file: PathBuf,

        /// Execution metadata as `key=value` (repeatable).
        #[arg(long = "meta", short = 'm', value_name = "KEY=VALUE")]
        meta: Vec<String>,

        /// Stop traversal below condition blocks that did not succeed.
        #[arg(long)]
        gate_conditions: bool,
    },

    /// List the block catalog with parameter conventions.
    Catalog,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_with_meta() {
        let cli = Cli::try_parse_from([
            "intentflow",
            "--config",
            "cfg.toml",
            "run",
            "flow.json",
            "-m",
            "battery_percent=20",
            "--meta",
            "context=driving",
            "--gate-conditions",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("cfg.toml")));
        match cli.command {
            Commands::Run { file, meta, gate_conditions } => {
                assert_eq!(file, PathBuf::from("flow.json"));
                assert_eq!(meta, ["battery_percent=20", "context=driving"]);
                assert!(gate_conditions);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn tz_requires_now() {
        assert!(Cli::try_parse_from(["intentflow", "synthesize", "x", "--tz", "UTC"]).is_err());
        assert!(
            Cli::try_parse_from([
                "intentflow", "synthesize", "x", "--tz", "UTC", "--now", "2026-10-16T08:00:00Z"
            ])
            .is_ok()
        );
    }
}
