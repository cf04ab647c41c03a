use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use ruleflow_engine::{Event, Pipeline, Tracer, registry};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "ruleflow")]
#[command(about = "Validate rule sets and run JSON events through them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a rule set and report its stages without processing anything
    Validate {
        /// Path to a JSON rule set
        path: PathBuf,
    },

    /// Run events through a rule set
    ///
    /// Events can be provided as a single JSON string (--event) or as
    /// NDJSON (newline-delimited JSON) from stdin. Forwarded events are
    /// written to stdout; dropped events produce no output.
    Run {
        /// Path to a JSON rule set
        #[arg(short, long)]
        rules: PathBuf,

        /// A single event as a JSON string (if omitted, reads NDJSON from stdin)
        #[arg(short, long)]
        event: Option<String>,

        /// Pretty-print JSON output
        #[arg(short, long)]
        pretty: bool,

        /// Print operator trace messages to stderr
        #[arg(short, long)]
        trace: bool,
    },

    /// List every registered stage and helper builder
    Builders,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { path } => cmd_validate(path),
        Commands::Run {
            rules,
            event,
            pretty,
            trace,
        } => cmd_run(rules, event, pretty, trace),
        Commands::Builders => cmd_builders(),
    }
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_validate(path: PathBuf) {
    let pipeline = load_pipeline(&path, Tracer::noop());
    println!(
        "Valid rule set: {} stage(s) [{}]",
        pipeline.stage_count(),
        pipeline.stage_names().join(", ")
    );
}

fn cmd_run(rules_path: PathBuf, event_json: Option<String>, pretty: bool, trace: bool) {
    let tracer = if trace {
        Tracer::new(|msg| eprintln!("trace: {msg}"))
    } else {
        Tracer::log()
    };
    let pipeline = load_pipeline(&rules_path, tracer);

    eprintln!(
        "Loaded {} stage(s) from {}",
        pipeline.stage_count(),
        rules_path.display()
    );

    if let Some(json_str) = event_json {
        let event = match Event::from_json(&json_str) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("Invalid JSON event: {e}");
                process::exit(1);
            }
        };

        match pipeline.process(event) {
            Some(out) => print_json(out.as_value(), pretty),
            None => eprintln!("Event dropped."),
        }
        return;
    }

    let stdin = io::stdin();
    let mut line_num = 0u64;
    let events = stdin.lock().lines().filter_map(|line| {
        line_num += 1;
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading line {line_num}: {e}");
                return None;
            }
        };
        if line.trim().is_empty() {
            return None;
        }
        match Event::from_json(&line) {
            Ok(event) => Some(event),
            Err(e) => {
                eprintln!("Invalid JSON on line {line_num}: {e}");
                None
            }
        }
    });

    let mut run = pipeline.run(events);
    for out in run.by_ref() {
        print_json(out.as_value(), pretty);
    }

    let stats = run.stats();
    eprintln!(
        "Processed {} events, {} forwarded, {} dropped.",
        stats.received, stats.forwarded, stats.dropped
    );
}

fn cmd_builders() {
    for name in registry::global().names() {
        println!("{name}");
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_pipeline(path: &Path, tracer: Tracer) -> Pipeline {
    let raw = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(1);
        }
    };

    match Pipeline::from_json_str(&raw, registry::global(), tracer) {
        Ok(p) => {
            log::debug!("built {} from {}", p.stage_names().join(", "), path.display());
            p
        }
        Err(e) => {
            eprintln!("Error building rule set {}: {e}", path.display());
            process::exit(1);
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("JSON serialization error: {e}");
            process::exit(1);
        }
    }
}
