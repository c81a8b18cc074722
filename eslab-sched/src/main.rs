/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use eslab_sched::config::load_workload;
use eslab_sched::platform::Platform;
use eslab_sched::scheduler::{Algorithm, Engine};

// ── CLI argument definition ───────────────────────────────────────────────────

/// Offline real-time scheduler for precedence-constrained jobs.
///
/// Example:
///   eslab-sched --workload demos/workload.yaml -a edf_single_node -a ll_multinode_no_delay
#[derive(Debug, Parser)]
#[command(
    name = "eslab-sched",
    about = "Schedule a job graph with LDF, EDF, LL and RMS",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML (or JSON) workload file.
    #[arg(short = 'w', long = "workload")]
    workload: PathBuf,

    /// Algorithm to run; repeat for several.  Overrides the workload file.
    #[arg(short = 'a', long = "algorithm")]
    algorithms: Vec<Algorithm>,

    /// Number of identical nodes.  Overrides the workload file.
    #[arg(short = 'n', long = "nodes")]
    nodes: Option<usize>,

    /// Print one line per algorithm instead of the full schedules.
    #[arg(short = 's', long = "summary", default_value_t = false)]
    summary: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    // Logs go to stderr; stdout carries the schedules.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(
        workload   = %cli.workload.display(),
        algorithms = ?cli.algorithms,
        nodes      = ?cli.nodes,
        summary    = cli.summary,
        "Configuration"
    );

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut workload = load_workload(&cli.workload)?;

    if let Some(m) = cli.nodes {
        workload.platform = Platform::homogeneous(m)?;
    }
    if !cli.algorithms.is_empty() {
        workload.engine.algorithms = cli.algorithms;
    }

    let engine = Engine::new(workload.engine);
    let set = engine
        .schedule_all(&workload.jobs, &workload.platform)
        .context("Scheduling failed")?;

    if cli.summary {
        for (name, s) in &set {
            println!(
                "{name:<24} makespan={:<6} preemptions={:<4} misses={:<4} max_lateness={}",
                s.stats.makespan, s.stats.preemptions, s.stats.deadline_misses, s.stats.max_lateness,
            );
        }
    } else {
        let yaml = serde_yaml::to_string(&set).context("Failed to serialize schedules")?;
        print!("{yaml}");
    }

    Ok(())
}
