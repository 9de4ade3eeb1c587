//! `meeting` CLI: schedule a meeting request against attendee calendars.
//!
//! ## Usage
//!
//! ```sh
//! # Schedule a request (stdin → stdout)
//! cat request.json | meeting schedule
//!
//! # Schedule from file to file with a custom engine configuration
//! meeting schedule -i request.json -o response.json --config engine.toml
//!
//! # List conflicts of the requested window without resolving them
//! meeting conflicts -i request.json
//!
//! # Classify a list of events into priority tiers
//! meeting classify -i events.json
//! ```
//!
//! Exit codes: 0 on success, 1 on invalid input, 2 when the request could not
//! be scheduled (the response still describes the last candidate).

mod request;

use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use meeting_engine::{apply_result, EngineConfig, EngineError, SchedulingOrchestrator};
use request::ScheduleRequest;

/// Exit code for a well-formed request that could not be scheduled.
const EXIT_UNRESOLVED: i32 = 2;

#[derive(Parser)]
#[command(
    name = "meeting",
    version,
    about = "Priority-aware meeting scheduling and conflict resolution"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Engine configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log resolution decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Schedule the requested meeting, relocating events where allowed
    Schedule {
        /// Input request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// List conflicts of the requested window without resolving them
    Conflicts {
        /// Input request file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Classify events into priority tiers
    Classify {
        /// Input JSON array of events (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
        /// IANA timezone for naive datetimes
        #[arg(long)]
        timezone: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Schedule { input, output } => {
            let code = schedule(&config, input.as_deref(), output.as_deref())?;
            if code != 0 {
                process::exit(code);
            }
        }
        Commands::Conflicts { input, output } => {
            let json = read_input(input.as_deref())?;
            let parsed = ScheduleRequest::from_json(&json)?.parse(&config)?;
            let orchestrator = orchestrator_for(&config, parsed.utc_offset_minutes)?;
            let conflicts = orchestrator
                .detector()
                .detect(&parsed.requested, &parsed.calendars);
            let response = json!({
                "requested": parsed.requested,
                "conflicts": conflicts,
            });
            write_output(output.as_deref(), &serde_json::to_string_pretty(&response)?)?;
        }
        Commands::Classify {
            input,
            output,
            timezone,
        } => {
            let json = read_input(input.as_deref())?;
            let events = request::parse_event_list(&json, timezone.as_deref(), &config)?;
            let orchestrator = orchestrator_for(&config, None)?;
            let classifier = orchestrator.detector().classifier();
            let tiers: Vec<serde_json::Value> = events
                .iter()
                .map(|event| {
                    json!({
                        "title": event.title,
                        "interval": event.interval,
                        "all_day": event.is_all_day,
                        "tier": classifier.classify(event),
                    })
                })
                .collect();
            write_output(output.as_deref(), &serde_json::to_string_pretty(&tiers)?)?;
        }
    }

    Ok(())
}

/// Run the `schedule` subcommand and return the process exit code.
fn schedule(config: &EngineConfig, input: Option<&str>, output: Option<&str>) -> Result<i32> {
    let json = read_input(input)?;
    let parsed = ScheduleRequest::from_json(&json)?.parse(config)?;
    let orchestrator = orchestrator_for(config, parsed.utc_offset_minutes)?;

    match orchestrator.schedule(parsed.requested, parsed.context.as_ref(), &parsed.calendars) {
        Ok(result) => {
            let schedules = apply_result(&result, &parsed.calendars, &parsed.title);
            let response = json!({
                "status": "scheduled",
                "result": result,
                "schedules": schedules,
            });
            write_output(output, &serde_json::to_string_pretty(&response)?)?;
            Ok(0)
        }
        Err(EngineError::UnresolvableConflict {
            last_candidate,
            unresolved,
            restarts,
        }) => {
            let response = json!({
                "status": "unresolved",
                "last_candidate": last_candidate,
                "restarts": restarts,
                "unresolved": unresolved,
            });
            write_output(output, &serde_json::to_string_pretty(&response)?)?;
            eprintln!(
                "Error: could not schedule the meeting; {} conflict(s) remain",
                unresolved.len()
            );
            Ok(EXIT_UNRESOLVED)
        }
        Err(e) => Err(e).context("Failed to schedule meeting"),
    }
}

fn load_config(path: Option<&str>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let config = EngineConfig::from_file(path)?;
            debug!(path, "loaded engine configuration");
            Ok(config)
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Build an orchestrator, letting a request timezone override the configured offset.
fn orchestrator_for(config: &EngineConfig, utc_offset_minutes: Option<i32>) -> Result<SchedulingOrchestrator> {
    let config = match utc_offset_minutes {
        Some(minutes) => config.clone().with_utc_offset_minutes(minutes),
        None => config.clone(),
    };
    SchedulingOrchestrator::from_config(&config).context("Invalid engine configuration")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
