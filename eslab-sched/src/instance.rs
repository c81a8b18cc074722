/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Concrete job instances: what the schedulers actually simulate.
//!
//! One-shot jobs map to exactly one instance.  A periodic job with period `T`
//! maps to `H / T` instances over the hyperperiod `H`; instance `k` is released
//! at `release + k·T` and due at `deadline + k·T`.  An edge `A → B` links
//! instance `k` of `A` to instance `k` of `B` (the validator guarantees both
//! have the same period, hence the same instance count).

use serde::Serialize;

use crate::hyperperiod::HyperperiodError;
use crate::job::{JobId, JobSet};

/// One release of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobInstance {
    pub job: JobId,
    /// Zero-based release number within the hyperperiod.
    pub index: u32,
    pub release: u64,
    pub deadline: u64,
    pub wcet: u64,
    pub period: Option<u64>,
}

impl JobInstance {
    /// Deterministic tie-break key: lowest job id, then earliest release.
    pub fn key(&self) -> (JobId, u32) {
        (self.job, self.index)
    }
}

/// Instances plus their precedence edges, indexed by position.
///
/// Instances are ordered by `(job id, index)`.
#[derive(Debug, Clone)]
pub struct InstanceGraph {
    instances: Vec<JobInstance>,
    predecessors: Vec<Vec<usize>>,
    successors: Vec<Vec<usize>>,
    hyperperiod: Option<u64>,
    total_work: u64,
    horizon: u64,
}

impl InstanceGraph {
    /// Expand `jobs` over `hyperperiod`.
    ///
    /// With `hyperperiod == None` every job, periodic or not, yields a single
    /// instance.
    ///
    /// # Errors
    /// * [`HyperperiodError::TooManyInstances`] – one job repeats more than
    ///   `u32::MAX` times.
    /// * [`HyperperiodError::TimeOverflow`] – a shifted release or deadline,
    ///   or `last release + total work`, exceeds `u64`.
    pub fn expand(jobs: &JobSet, hyperperiod: Option<u64>) -> Result<Self, HyperperiodError> {
        let counts: Vec<u32> = jobs
            .jobs()
            .iter()
            .map(|j| match (j.period, hyperperiod) {
                (Some(p), Some(h)) => {
                    let count = (h / p).max(1);
                    u32::try_from(count).map_err(|_| HyperperiodError::TooManyInstances {
                        count,
                        limit: u32::MAX as usize,
                    })
                }
                _ => Ok(1),
            })
            .collect::<Result<_, _>>()?;

        let mut first = Vec::with_capacity(counts.len());
        let mut offset = 0usize;
        for &c in &counts {
            first.push(offset);
            offset += c as usize;
        }

        let mut instances = Vec::with_capacity(offset);
        for (job, &count) in jobs.jobs().iter().zip(&counts) {
            let period = job.period.unwrap_or(0);
            let overflow = HyperperiodError::TimeOverflow { job: job.id };
            for k in 0..count {
                let shift = period.checked_mul(u64::from(k)).ok_or(overflow.clone())?;
                instances.push(JobInstance {
                    job: job.id,
                    index: k,
                    release: job.release.checked_add(shift).ok_or(overflow.clone())?,
                    deadline: job.deadline.checked_add(shift).ok_or(overflow.clone())?,
                    wcet: job.wcet,
                    period: job.period,
                });
            }
        }

        let mut predecessors = vec![Vec::new(); instances.len()];
        let mut successors = vec![Vec::new(); instances.len()];
        for (pos, job) in jobs.jobs().iter().enumerate() {
            for pred_id in &job.predecessors {
                let Some(pred_pos) = jobs.position(*pred_id) else {
                    continue;
                };
                for k in 0..counts[pos].min(counts[pred_pos]) as usize {
                    let from = first[pred_pos] + k;
                    let to = first[pos] + k;
                    predecessors[to].push(from);
                    successors[from].push(to);
                }
            }
        }

        let mut total_work = 0u64;
        let mut last_release = 0u64;
        for inst in &instances {
            total_work = total_work
                .checked_add(inst.wcet)
                .ok_or(HyperperiodError::TimeOverflow { job: inst.job })?;
            last_release = last_release.max(inst.release);
        }
        let horizon = last_release.checked_add(total_work).ok_or_else(|| {
            let job = instances
                .iter()
                .max_by_key(|i| i.release)
                .map_or(0, |i| i.job);
            HyperperiodError::TimeOverflow { job }
        })?;

        Ok(Self {
            instances,
            predecessors,
            successors,
            hyperperiod,
            total_work,
            horizon,
        })
    }

    pub fn instances(&self) -> &[JobInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn predecessors(&self, i: usize) -> &[usize] {
        &self.predecessors[i]
    }

    pub fn successors(&self, i: usize) -> &[usize] {
        &self.successors[i]
    }

    pub fn hyperperiod(&self) -> Option<u64> {
        self.hyperperiod
    }

    /// Sum of all instance execution times.
    pub fn total_work(&self) -> u64 {
        self.total_work
    }

    /// Upper bound on the completion time of any schedule that never idles
    /// while released work remains: the last release plus all the work.
    pub fn horizon(&self) -> u64 {
        self.horizon
    }
}
