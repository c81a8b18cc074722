/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Workload file loading and engine configuration.
//!
//! The expected YAML structure is:
//! ```yaml
//! application:
//!   jobs:
//!     - { id: 1, wcet: 2, deadline: 5 }
//!     - { id: 2, wcet: 1, deadline: 8, release: 1, predecessors: [1] }
//!   messages:                # optional extra dependency edges
//!     - { sender: 1, receiver: 2 }
//! platform:                  # optional, defaults to one node
//!   node_count: 2            # or `nodes: [{ name: cpu0 }, { name: cpu1 }]`
//! engine:                    # optional
//!   algorithms: [edf_single_node, ll_multinode_no_delay]
//!   hyperperiod_limit: 1000000
//!   max_instances: 100000
//! ```
//!
//! JSON is accepted too, being a subset of YAML.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::hyperperiod::{HyperperiodLimits, DEFAULT_HYPERPERIOD_LIMIT, DEFAULT_MAX_INSTANCES};
use crate::job::{Job, JobId, JobSet};
use crate::platform::Platform;
use crate::scheduler::Algorithm;

// ── Private YAML deserialization types ────────────────────────────────────────

/// Top-level wrapper that maps directly onto the file layout.
///
/// Kept private; callers work with [`Workload`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkloadFile {
    application: ApplicationEntry,
    #[serde(default)]
    platform: Option<PlatformEntry>,
    #[serde(default)]
    engine: Option<EngineEntry>,
}

#[derive(Debug, Deserialize)]
struct ApplicationEntry {
    #[serde(alias = "tasks")]
    jobs: Vec<JobEntry>,
    #[serde(default)]
    messages: Vec<MessageEntry>,
}

#[derive(Debug, Deserialize)]
struct JobEntry {
    id: JobId,
    #[serde(alias = "execution_time")]
    wcet: u64,
    deadline: u64,
    #[serde(default, alias = "arrival")]
    release: u64,
    #[serde(default)]
    period: Option<u64>,
    #[serde(default, alias = "dependencies")]
    predecessors: Vec<JobId>,
}

/// An inter-job message: `receiver` may not start before `sender` finishes.
#[derive(Debug, Deserialize)]
struct MessageEntry {
    sender: JobId,
    receiver: JobId,
}

#[derive(Debug, Deserialize)]
struct PlatformEntry {
    #[serde(default)]
    node_count: Option<usize>,
    #[serde(default)]
    nodes: Vec<NodeEntry>,
}

#[derive(Debug, Deserialize)]
struct NodeEntry {
    name: String,
}

#[derive(Debug, Deserialize)]
struct EngineEntry {
    #[serde(default)]
    algorithms: Vec<String>,
    #[serde(default = "default_hyperperiod_limit")]
    hyperperiod_limit: u64,
    #[serde(default = "default_max_instances")]
    max_instances: usize,
}

fn default_hyperperiod_limit() -> u64 {
    DEFAULT_HYPERPERIOD_LIMIT
}

fn default_max_instances() -> usize {
    DEFAULT_MAX_INSTANCES
}

// ── Public data structures ────────────────────────────────────────────────────

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Algorithms run by [`Engine::schedule_all`](crate::scheduler::Engine::schedule_all).
    pub algorithms: Vec<Algorithm>,
    pub limits: HyperperiodLimits,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            algorithms: Algorithm::DEFAULT_SET.to_vec(),
            limits: HyperperiodLimits::default(),
        }
    }
}

/// A validated workload: what to schedule, where, and how.
#[derive(Debug, Clone)]
pub struct Workload {
    pub jobs: JobSet,
    pub platform: Platform,
    pub engine: EngineConfig,
}

/// Read and validate the workload file at `path`.
///
/// # Errors
/// Returns an error if the file cannot be read, is not valid YAML, or
/// describes an invalid job graph, platform or algorithm name.
pub fn load_workload(path: &Path) -> Result<Workload> {
    info!("Loading workload from: {}", path.display());

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot open workload file: {}", path.display()))?;

    parse_workload(&content).with_context(|| format!("Invalid workload file: {}", path.display()))
}

/// Parse and validate a workload from YAML text.
pub fn parse_workload(content: &str) -> Result<Workload> {
    let file: WorkloadFile = serde_yaml::from_str(content).context("Failed to parse YAML")?;

    let jobs = build_jobs(file.application)?;
    let platform = build_platform(file.platform)?;
    let engine = build_engine(file.engine)?;

    info!(
        jobs = jobs.len(),
        periodic = jobs.has_periodic_jobs(),
        nodes = platform.node_count(),
        algorithms = engine.algorithms.len(),
        "Workload loaded"
    );

    Ok(Workload {
        jobs,
        platform,
        engine,
    })
}

fn build_jobs(app: ApplicationEntry) -> Result<JobSet> {
    let mut builder = JobSet::builder();
    for entry in app.jobs {
        debug!(
            "  Job: {} | wcet: {} | deadline: {} | release: {} | period: {:?}",
            entry.id, entry.wcet, entry.deadline, entry.release, entry.period
        );
        let mut job = Job::new(entry.id, entry.wcet, entry.deadline).with_release(entry.release);
        if let Some(period) = entry.period {
            job = job.with_period(period);
        }
        for p in entry.predecessors {
            job = job.after(p);
        }
        builder = builder.job(job);
    }
    for m in app.messages {
        debug!("  Message: {} -> {}", m.sender, m.receiver);
        builder = builder.dependency(m.sender, m.receiver);
    }
    Ok(builder.build()?)
}

fn build_platform(entry: Option<PlatformEntry>) -> Result<Platform> {
    let Some(entry) = entry else {
        warn!("No platform section, using a single node");
        return Ok(Platform::single());
    };

    if entry.nodes.is_empty() {
        return Ok(Platform::homogeneous(entry.node_count.unwrap_or(1))?);
    }
    if let Some(count) = entry.node_count {
        if count != entry.nodes.len() {
            bail!(
                "platform.node_count is {count} but {} node(s) are listed",
                entry.nodes.len()
            );
        }
    }
    Ok(Platform::named(entry.nodes.into_iter().map(|n| n.name))?)
}

fn build_engine(entry: Option<EngineEntry>) -> Result<EngineConfig> {
    let Some(entry) = entry else {
        return Ok(EngineConfig::default());
    };

    let algorithms = if entry.algorithms.is_empty() {
        Algorithm::DEFAULT_SET.to_vec()
    } else {
        entry
            .algorithms
            .iter()
            .map(|name| name.parse::<Algorithm>())
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(EngineConfig {
        algorithms,
        limits: HyperperiodLimits {
            hyperperiod: entry.hyperperiod_limit,
            instances: entry.max_instances,
        },
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::ModelError;
    use crate::scheduler::SchedulerError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper: write a YAML string to a temp file and return it.
    fn yaml_tempfile(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    const FULL: &str = r#"
application:
  jobs:
    - { id: 1, wcet: 2, deadline: 5 }
    - { id: 2, wcet: 1, deadline: 8, release: 1, predecessors: [1] }
    - { id: 3, wcet: 1, deadline: 10, period: 10 }
    - { id: 4, wcet: 1, deadline: 20 }
  messages:
    - { sender: 2, receiver: 4 }
    - { sender: 1, receiver: 4 }
platform:
  nodes: [{ name: cpu0 }, { name: cpu1 }]
engine:
  algorithms: [edf_single_node, ll_multinode_no_delay]
  hyperperiod_limit: 500
"#;

    #[test]
    fn minimal_workload_uses_defaults() {
        let w = parse_workload("application:\n  jobs:\n    - { id: 1, wcet: 1, deadline: 2 }\n")
            .unwrap();
        assert_eq!(w.jobs.len(), 1);
        assert_eq!(w.platform.node_count(), 1);
        assert_eq!(w.engine, EngineConfig::default());
    }

    #[test]
    fn full_workload_is_mapped() {
        let w = parse_workload(FULL).unwrap();

        assert_eq!(w.jobs.len(), 4);
        let j2 = w.jobs.get(2).unwrap();
        assert_eq!(j2.release, 1);
        assert!(j2.predecessors.contains(&1));
        let j4 = w.jobs.get(4).unwrap();
        assert_eq!(j4.predecessors.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(w.jobs.get(3).unwrap().period, Some(10));

        let names: Vec<&str> = w.platform.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["cpu0", "cpu1"]);

        assert_eq!(
            w.engine.algorithms,
            vec![Algorithm::EDF_SINGLE_NODE, Algorithm::LL_MULTINODE_NO_DELAY]
        );
        assert_eq!(w.engine.limits.hyperperiod, 500);
        assert_eq!(w.engine.limits.instances, DEFAULT_MAX_INSTANCES);
    }

    #[test]
    fn legacy_field_names_are_accepted() {
        let yaml = r#"
application:
  tasks:
    - { id: 1, execution_time: 2, deadline: 9, arrival: 3 }
    - { id: 2, execution_time: 1, deadline: 9, dependencies: [1] }
"#;
        let w = parse_workload(yaml).unwrap();
        assert_eq!(w.jobs.get(1).unwrap().wcet, 2);
        assert_eq!(w.jobs.get(1).unwrap().release, 3);
        assert!(w.jobs.get(2).unwrap().predecessors.contains(&1));
    }

    #[test]
    fn json_is_accepted() {
        let json = r#"{"application": {"jobs": [{"id": 7, "wcet": 1, "deadline": 3}]},
                       "platform": {"node_count": 3}}"#;
        let w = parse_workload(json).unwrap();
        assert!(w.jobs.get(7).is_some());
        assert_eq!(w.platform.node_count(), 3);
    }

    #[test]
    fn cyclic_workload_is_rejected() {
        let yaml = r#"
application:
  jobs:
    - { id: 1, wcet: 1, deadline: 9, predecessors: [2] }
    - { id: 2, wcet: 1, deadline: 9, predecessors: [1] }
"#;
        let err = parse_workload(yaml).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn message_to_unknown_job_is_rejected() {
        let yaml = r#"
application:
  jobs:
    - { id: 1, wcet: 1, deadline: 9 }
  messages:
    - { sender: 1, receiver: 5 }
"#;
        let err = parse_workload(yaml).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ModelError>(),
            Some(&ModelError::UnknownReference { job: 1, missing: 5 })
        );
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let yaml = r#"
application:
  jobs:
    - { id: 1, wcet: 1, deadline: 9 }
engine:
  algorithms: [round_robin]
"#;
        let err = parse_workload(yaml).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SchedulerError>(),
            Some(SchedulerError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn zero_nodes_is_rejected() {
        let yaml = "application:\n  jobs: [{ id: 1, wcet: 1, deadline: 2 }]\nplatform:\n  node_count: 0\n";
        let err = parse_workload(yaml).unwrap_err();
        assert_eq!(err.downcast_ref::<ModelError>(), Some(&ModelError::NoNodes));
    }

    #[test]
    fn node_count_must_match_named_nodes() {
        let yaml = r#"
application:
  jobs: [{ id: 1, wcet: 1, deadline: 2 }]
platform:
  node_count: 3
  nodes: [{ name: a }, { name: b }]
"#;
        assert!(parse_workload(yaml).is_err());
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(parse_workload("application: [unclosed").is_err());
        assert!(parse_workload("application:\n  jobs:\n    - { id: 1 }\n").is_err());
    }

    #[test]
    fn load_workload_from_file() {
        let f = yaml_tempfile(
            "application:\n  jobs:\n    - { id: 1, wcet: 1, deadline: 2 }\nplatform:\n  node_count: 2\n",
        );
        let w = load_workload(f.path()).unwrap();
        assert_eq!(w.platform.node_count(), 2);
    }

    #[test]
    fn load_workload_missing_file_reports_path() {
        let err = load_workload(Path::new("/nonexistent/workload.yaml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/workload.yaml"));
    }
}
