//! intentflow CLI entry point.
//!
//! Loads configuration, initialises tracing, and dispatches to the
//! `synthesize`, `validate`, `run` and `catalog` subcommands.

mod cli;
mod config;
mod helpers;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use intentflow_graph::FlowValidator;
use intentflow_runtime::{EngineConfig, FlowEngine, HandlerRegistry, LoggingDevice, StepStatus};
use intentflow_synthesis::{IntentContext, IntentRequest, SynthesisService, TimeWindow};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::helpers::{init_tracing, load_flow_file, parse_meta, render_catalog, render_result};

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing("info");

    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Synthesize {
            intent,
            capabilities,
            locations,
            tz,
            now,
            user_id,
            out,
        } => {
            let time_window = tz.zip(now).map(|(tz, now)| TimeWindow { tz, now });
            let request = IntentRequest {
                user_id,
                intent_text: intent,
                context: IntentContext {
                    location_aliases: locations,
                    capabilities,
                    time_window,
                    ..IntentContext::default()
                },
                session_token: String::new(),
            };
            cmd_synthesize(&config, request, out).await
        }
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Run {
            file,
            meta,
            gate_conditions,
        } => cmd_run(&config, &file, &meta, gate_conditions).await,
        Commands::Catalog => {
            print!("{}", render_catalog());
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Subcommand: synthesize
// ---------------------------------------------------------------------------

async fn cmd_synthesize(config: &AppConfig, request: IntentRequest, out: Option<PathBuf>) -> Result<()> {
    let service = SynthesisService::new(config.build_gateway()?);
    if service.is_demo() {
        info!("demo mode: set OPENAI_API_KEY or ANTHROPIC_API_KEY for real synthesis");
    }

    let response = service
        .synthesize(&request)
        .await
        .context("synthesis failed")?;
    let json = serde_json::to_string_pretty(&response)?;

    if let Some(path) = out {
        std::fs::write(&path, format!("{json}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "response written");
    }
    println!("{json}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: validate
// ---------------------------------------------------------------------------

fn cmd_validate(file: &std::path::Path) -> Result<()> {
    let graph = load_flow_file(file, &FlowValidator::new())?;
    println!(
        "valid: \"{}\" ({} blocks, {} edges, {} trigger(s))",
        graph.title,
        graph.blocks.len(),
        graph.edges.len(),
        graph.triggers().count()
    );
    for flag in &graph.risk_flags {
        println!("  risk: {flag}");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Subcommand: run
// ---------------------------------------------------------------------------

async fn cmd_run(
    config: &AppConfig,
    file: &std::path::Path,
    meta: &[String],
    gate_conditions: bool,
) -> Result<()> {
    let graph = load_flow_file(file, &FlowValidator::new())?;
    let input = parse_meta(meta)?;

    let engine_config = EngineConfig {
        gate_conditions: gate_conditions || config.engine_config().gate_conditions,
    };
    let registry = HandlerRegistry::standard(Arc::new(LoggingDevice::new()));
    let engine = FlowEngine::with_config(registry, engine_config);

    let result = engine
        .execute(&graph, &input)
        .await
        .with_context(|| format!("execution of \"{}\" aborted", graph.title))?;

    print!("{}", render_result(&result));
    println!(
        "{} step(s): {} succeeded, {} skipped, {} failed",
        result.steps.len(),
        result.count(StepStatus::Success),
        result.count(StepStatus::Skipped),
        result.count(StepStatus::Failed)
    );
    Ok(())
}
