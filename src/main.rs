//! CLI entry point for fahrplan-dl.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use fahrplan_core::config::{self, ConfigError, Settings};
use fahrplan_core::download::{
    DownloadOrchestrator, RunSummary, append_failures, failure_log_path,
};
use fahrplan_core::event::EventRegistry;
use fahrplan_core::fetch::HttpFetcher;
use fahrplan_core::talk_ids;
use tracing::{debug, error, info, warn};

mod cli;
mod exit_handler;
mod progress;

use cli::Args;
use exit_handler::{ProcessExit, determine_exit_outcome};

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs).
    // Exit code 2 means a partial run, so usage errors exit with 1.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if err.use_stderr() => return usage_error(&err),
        Err(err) => err.exit(),
    };
    if args.ids.is_empty() && args.input_file.is_none() && !args.has_mode_flag() {
        return usage_error(&Args::command().error(
            clap::error::ErrorKind::MissingRequiredArgument,
            "no talk ids given\n  Suggestion: pass IDS or --input-file <PATH>",
        ));
    }

    init_tracing(&args);
    debug!(?args, "CLI arguments parsed");

    match run(&args).await {
        Ok(exit) => exit.into(),
        Err(err) => {
            error!("{err:#}");
            ProcessExit::Failure.into()
        }
    }
}

fn usage_error(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    ProcessExit::Failure.into()
}

/// Priority: `RUST_LOG` env var > quiet flag > verbose flag > default (info).
fn init_tracing(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_env_filter(filter)
        .try_init();
}

async fn run(args: &Args) -> Result<ProcessExit> {
    if args.dump_config {
        let path = match &args.config {
            Some(path) => path.clone(),
            None => config::resolve_default_config_path().ok_or(ConfigError::NoConfigPath)?,
        };
        config::dump_default_config(&path)?;
        println!("{}", path.display());
        return Ok(ProcessExit::Success);
    }

    let loaded = config::load_config(args.config.as_deref())?;
    let settings = Settings::resolve(loaded.config.as_ref(), &args.overrides())?;
    let registry = EventRegistry::builtin()
        .with_overrides(settings.events.clone())
        .context("invalid [[events]] entry in config")?;

    if args.list_events {
        print_events(&registry);
        return Ok(ProcessExit::Success);
    }

    let event = registry.select(settings.event.as_deref())?;
    let file_ids = match &args.input_file {
        Some(path) => talk_ids::from_file(path).context("cannot read talk ids")?,
        None => Vec::new(),
    };
    let ids = talk_ids::merge(talk_ids::from_args(&args.ids), file_ids);
    if ids.is_empty() {
        info!("no talk ids found, nothing to do");
        return Ok(ProcessExit::Success);
    }

    info!(
        event = %event.name,
        schema = %event.schema,
        talks = ids.len(),
        output_root = %settings.output_root.display(),
        "starting downloads"
    );

    let fetcher = HttpFetcher::new(settings.timeouts).context("cannot set up HTTP client")?;
    let orchestrator = DownloadOrchestrator::new(event, &fetcher, settings.orchestrator_options());
    let bar = progress::talk_progress_bar(
        ids.len(),
        progress::should_show_progress(io::stderr().is_terminal(), args.quiet),
    );
    let results = orchestrator
        .run_with(&ids, |result| {
            bar.set_message(result.talk_id.clone());
            bar.inc(1);
        })
        .await;
    bar.finish_and_clear();

    for result in results.iter().filter(|result| result.is_failed()) {
        warn!(
            talk = %result.talk_id,
            reason = result.reason().unwrap_or_default(),
            "talk failed"
        );
    }

    let log_path = failure_log_path(args.input_file.as_deref());
    match append_failures(&log_path, &results) {
        Ok(0) => {}
        Ok(count) => info!(path = %log_path.display(), count, "failed talk ids written"),
        Err(err) => warn!(path = %log_path.display(), error = %err, "could not write failure log"),
    }

    let summary = RunSummary::from_results(&results);
    info!(%summary, total = summary.total(), "run complete");
    Ok(determine_exit_outcome(summary.succeeded(), summary.failed))
}

fn print_events(registry: &EventRegistry) {
    let default = registry.default_event().ok().map(|event| event.name.as_str());
    for event in registry.list_events() {
        let marker = if Some(event.name.as_str()) == default { '*' } else { ' ' };
        let starts = event
            .starts
            .map_or_else(|| "-".to_string(), |date| date.to_string());
        println!(
            "{marker} {:<12} {:<6} {:<10} {}",
            event.name,
            event.schema.as_str(),
            starts,
            event.base_url
        );
    }
}
