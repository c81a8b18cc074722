/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Job model and job-graph validation.
//!
//! A [`JobSet`] is the validated, immutable description of one application:
//!
//! ```text
//! workload file / caller  ──(Job specs + edges)──►  JobSetBuilder::build()  ──►  JobSet
//!                                                        │
//!                                                        └── ModelError (fatal, nothing scheduled)
//! ```
//!
//! # Timing model
//! All times are integer ticks.  `deadline` is **absolute** for the first
//! (or only) instance of a job.  A periodic job repeats every `period` ticks;
//! its k-th instance is released at `release + k·period` with deadline
//! `deadline + k·period` (see [`crate::instance`]).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use thiserror::Error;
use tracing::debug;

/// Identifier of a job, unique within a [`JobSet`].
pub type JobId = u32;

// ── Job ───────────────────────────────────────────────────────────────────────

/// One schedulable unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,

    /// Execution time (C) needed to complete once running.
    pub wcet: u64,

    /// Absolute deadline of the first instance.
    pub deadline: u64,

    /// Earliest start time of the first instance.
    pub release: u64,

    /// Period (T) for periodic jobs; `None` for one-shot jobs.
    pub period: Option<u64>,

    /// Jobs that must complete before this one may start.
    pub predecessors: BTreeSet<JobId>,
}

impl Job {
    /// A one-shot job released at time 0 with no predecessors.
    pub fn new(id: JobId, wcet: u64, deadline: u64) -> Self {
        Self {
            id,
            wcet,
            deadline,
            release: 0,
            period: None,
            predecessors: BTreeSet::new(),
        }
    }

    pub fn with_release(mut self, release: u64) -> Self {
        self.release = release;
        self
    }

    pub fn with_period(mut self, period: u64) -> Self {
        self.period = Some(period);
        self
    }

    /// Add `predecessor` to the set of jobs that must finish first.
    pub fn after(mut self, predecessor: JobId) -> Self {
        self.predecessors.insert(predecessor);
        self
    }

    /// Utilisation `wcet / period`, or `None` for one-shot jobs.
    pub fn utilization(&self) -> Option<f64> {
        match self.period {
            Some(p) if p > 0 => Some(self.wcet as f64 / p as f64),
            _ => None,
        }
    }

    pub fn is_periodic(&self) -> bool {
        self.period.is_some()
    }

    fn check_timing(&self) -> Result<(), TimingReason> {
        if self.wcet == 0 {
            return Err(TimingReason::ZeroExecutionTime);
        }
        if self.period == Some(0) {
            return Err(TimingReason::ZeroPeriod);
        }
        if self.deadline < self.release {
            return Err(TimingReason::DeadlineBeforeRelease {
                release: self.release,
                deadline: self.deadline,
            });
        }
        if self.deadline < self.release.saturating_add(self.wcet) {
            return Err(TimingReason::UnreachableDeadline {
                release: self.release,
                wcet: self.wcet,
                deadline: self.deadline,
            });
        }
        Ok(())
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a job's timing attributes were rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimingReason {
    ZeroExecutionTime,
    ZeroPeriod,
    DeadlineBeforeRelease { release: u64, deadline: u64 },
    /// `deadline < release + wcet`: the deadline is missed even when the job
    /// runs alone.
    UnreachableDeadline { release: u64, wcet: u64, deadline: u64 },
}

impl fmt::Display for TimingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimingReason::ZeroExecutionTime => write!(f, "execution time must be positive"),
            TimingReason::ZeroPeriod => write!(f, "period must be positive when present"),
            TimingReason::DeadlineBeforeRelease { release, deadline } => {
                write!(f, "deadline {deadline} is before release {release}")
            }
            TimingReason::UnreachableDeadline {
                release,
                wcet,
                deadline,
            } => write!(
                f,
                "deadline {deadline} is unreachable: release {release} + execution time {wcet} = {}",
                release.saturating_add(*wcet)
            ),
        }
    }
}

/// Structural defects found while building a [`JobSet`].
///
/// All variants are fatal: no algorithm runs on an invalid model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("job set is empty")]
    NoJobs,

    #[error("job id {id} is defined more than once")]
    DuplicateJob { id: JobId },

    #[error("job {job} references unknown job {missing}")]
    UnknownReference { job: JobId, missing: JobId },

    /// Listed in dependency order: each job precedes the next, and the last
    /// precedes the first.
    #[error("cyclic dependency: {}", format_cycle(cycle))]
    CyclicDependency { cycle: Vec<JobId> },

    #[error("job {job} has invalid timing: {reason}")]
    InvalidTiming { job: JobId, reason: TimingReason },

    /// Instance-wise precedence needs both ends of an edge to repeat at the
    /// same rate.
    #[error("job {job} and its predecessor {predecessor} have different periods")]
    PeriodMismatch { job: JobId, predecessor: JobId },

    #[error("platform must have at least one node")]
    NoNodes,
}

fn format_cycle(cycle: &[JobId]) -> String {
    let mut s: Vec<String> = cycle.iter().map(|id| id.to_string()).collect();
    if let Some(first) = cycle.first() {
        s.push(first.to_string());
    }
    s.join(" -> ")
}

// ── JobSet ────────────────────────────────────────────────────────────────────

/// A validated, immutable job graph.
///
/// Jobs are kept sorted by id, so every iteration over a `JobSet` is
/// deterministic.
#[derive(Debug, Clone)]
pub struct JobSet {
    jobs: Vec<Job>,
    index: BTreeMap<JobId, usize>,
    successors: Vec<Vec<usize>>,
}

impl JobSet {
    pub fn builder() -> JobSetBuilder {
        JobSetBuilder::default()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn get(&self, id: JobId) -> Option<&Job> {
        self.index.get(&id).map(|&i| &self.jobs[i])
    }

    /// Position of job `id` in [`jobs()`](Self::jobs).
    pub fn position(&self, id: JobId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    /// Positions of the direct successors of the job at `pos`.
    pub fn successors(&self, pos: usize) -> &[usize] {
        &self.successors[pos]
    }

    pub fn has_periodic_jobs(&self) -> bool {
        self.jobs.iter().any(Job::is_periodic)
    }

    /// Total utilisation of the periodic jobs.
    pub fn periodic_utilization(&self) -> f64 {
        self.jobs.iter().filter_map(Job::utilization).sum()
    }
}

// ── JobSetBuilder ─────────────────────────────────────────────────────────────

/// Collects jobs and precedence edges, then validates them in one step.
///
/// ```rust
/// use eslab_sched::job::{Job, JobSet};
///
/// let jobs = JobSet::builder()
///     .job(Job::new(1, 2, 10))
///     .job(Job::new(2, 3, 10).after(1))
///     .build()
///     .unwrap();
/// assert_eq!(jobs.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct JobSetBuilder {
    jobs: Vec<Job>,
    edges: Vec<(JobId, JobId)>,
}

impl JobSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn job(mut self, job: Job) -> Self {
        self.jobs.push(job);
        self
    }

    pub fn jobs(mut self, jobs: impl IntoIterator<Item = Job>) -> Self {
        self.jobs.extend(jobs);
        self
    }

    /// Add a precedence edge: `from` must finish before `to` starts.
    pub fn dependency(mut self, from: JobId, to: JobId) -> Self {
        self.edges.push((from, to));
        self
    }

    /// Validate and freeze the job graph.
    ///
    /// Checks, in order: non-empty set, unique ids, timing of every job,
    /// edge references, equal periods across edges, acyclicity.
    pub fn build(self) -> Result<JobSet, ModelError> {
        let JobSetBuilder { jobs, edges } = self;

        if jobs.is_empty() {
            return Err(ModelError::NoJobs);
        }

        let mut by_id: BTreeMap<JobId, Job> = BTreeMap::new();
        for job in jobs {
            if by_id.contains_key(&job.id) {
                return Err(ModelError::DuplicateJob { id: job.id });
            }
            by_id.insert(job.id, job);
        }

        for (from, to) in edges {
            let job = by_id
                .get_mut(&to)
                .ok_or(ModelError::UnknownReference { job: from, missing: to })?;
            job.predecessors.insert(from);
        }

        for job in by_id.values() {
            job.check_timing().map_err(|reason| ModelError::InvalidTiming {
                job: job.id,
                reason,
            })?;
            for pred in &job.predecessors {
                let Some(p) = by_id.get(pred) else {
                    return Err(ModelError::UnknownReference {
                        job: job.id,
                        missing: *pred,
                    });
                };
                if p.period != job.period {
                    return Err(ModelError::PeriodMismatch {
                        job: job.id,
                        predecessor: *pred,
                    });
                }
            }
        }

        let jobs: Vec<Job> = by_id.into_values().collect();
        let index: BTreeMap<JobId, usize> =
            jobs.iter().enumerate().map(|(i, j)| (j.id, i)).collect();

        let mut successors = vec![Vec::new(); jobs.len()];
        for (i, job) in jobs.iter().enumerate() {
            for pred in &job.predecessors {
                successors[index[pred]].push(i);
            }
        }

        check_acyclic(&jobs, &index, &successors)?;

        debug!(
            job_count = jobs.len(),
            edge_count = successors.iter().map(Vec::len).sum::<usize>(),
            "job set validated"
        );

        Ok(JobSet {
            jobs,
            index,
            successors,
        })
    }
}

/// Kahn's algorithm; on failure, walk predecessors among the jobs left over to
/// recover one concrete cycle for the error message.
fn check_acyclic(
    jobs: &[Job],
    index: &BTreeMap<JobId, usize>,
    successors: &[Vec<usize>],
) -> Result<(), ModelError> {
    let mut indegree: Vec<usize> = jobs.iter().map(|j| j.predecessors.len()).collect();

    let mut queue: Vec<usize> = (0..jobs.len()).filter(|&i| indegree[i] == 0).collect();
    let mut visited = 0usize;
    while let Some(i) = queue.pop() {
        visited += 1;
        for &s in &successors[i] {
            indegree[s] -= 1;
            if indegree[s] == 0 {
                queue.push(s);
            }
        }
    }

    if visited == jobs.len() {
        return Ok(());
    }

    // Every leftover job has at least one leftover predecessor, so following
    // predecessors must revisit a job.
    let leftover: BTreeSet<usize> = (0..jobs.len()).filter(|&i| indegree[i] > 0).collect();
    let mut path: Vec<usize> = Vec::new();
    let mut seen: BTreeMap<usize, usize> = BTreeMap::new();
    let mut current = leftover.iter().copied().next().unwrap_or(0);
    loop {
        if let Some(&at) = seen.get(&current) {
            let mut cycle: Vec<JobId> = path[at..].iter().map(|&i| jobs[i].id).collect();
            cycle.reverse();
            return Err(ModelError::CyclicDependency { cycle });
        }
        seen.insert(current, path.len());
        path.push(current);
        current = jobs[current]
            .predecessors
            .iter()
            .map(|p| index[p])
            .find(|p| leftover.contains(p))
            .unwrap_or(current);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
