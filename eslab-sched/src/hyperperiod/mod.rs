/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Hyperperiod of the periodic jobs in a [`JobSet`].
//!
//! The hyperperiod is the LCM of all periods: the window after which the
//! periodic part of the application repeats.  Periodic jobs are expanded into
//! one instance per period inside this window (see [`crate::instance`]).
//!
//! A job set without periodic jobs has no hyperperiod; `calculate` returns
//! `Ok(None)` and every job is scheduled exactly once.

pub mod math;

use tracing::{debug, info, warn};

use crate::job::{JobId, JobSet};
use math::lcm_all;

// ── Constants ─────────────────────────────────────────────────────────────────

/// Default upper limit on the hyperperiod, in ticks.
pub const DEFAULT_HYPERPERIOD_LIMIT: u64 = 1_000_000;

/// Default upper limit on the number of expanded job instances.
pub const DEFAULT_MAX_INSTANCES: usize = 100_000;

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors raised while sizing the periodic expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HyperperiodError {
    /// LCM calculation overflowed `u64`.
    Overflow { a: u64, b: u64 },

    /// The hyperperiod exceeds the configured limit.
    TooLarge { value: u64, limit: u64 },

    /// Expanding every periodic job over the hyperperiod would create more
    /// instances than allowed.
    TooManyInstances { count: u64, limit: usize },

    /// A shifted release or deadline, or the simulation horizon, does not
    /// fit in `u64`.
    TimeOverflow { job: JobId },
}

impl std::fmt::Display for HyperperiodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HyperperiodError::Overflow { a, b } => {
                write!(f, "LCM overflow computing lcm({a}, {b})")
            }
            HyperperiodError::TooLarge { value, limit } => {
                write!(f, "hyperperiod {value} exceeds limit {limit}")
            }
            HyperperiodError::TooManyInstances { count, limit } => write!(
                f,
                "periodic expansion yields {count} job instances (limit {limit})"
            ),
            HyperperiodError::TimeOverflow { job } => write!(
                f,
                "job {job}: expanded release, deadline or horizon overflows the time range"
            ),
        }
    }
}

impl std::error::Error for HyperperiodError {}

// ── HyperperiodInfo ───────────────────────────────────────────────────────────

/// Hyperperiod of a job set and the data it was derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperperiodInfo {
    /// LCM of all unique periods.
    pub hyperperiod: u64,

    /// Unique periods (sorted, deduplicated).
    pub unique_periods: Vec<u64>,

    /// Number of instances the full expansion produces, one-shot jobs
    /// included.
    pub instance_count: u64,
}

/// Limits applied while computing the hyperperiod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HyperperiodLimits {
    pub hyperperiod: u64,
    pub instances: usize,
}

impl Default for HyperperiodLimits {
    fn default() -> Self {
        Self {
            hyperperiod: DEFAULT_HYPERPERIOD_LIMIT,
            instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

/// Compute the hyperperiod of `jobs`.
///
/// Returns `Ok(None)` when no job is periodic.
///
/// # Errors
/// * [`HyperperiodError::Overflow`] – LCM exceeded `u64`.
/// * [`HyperperiodError::TooLarge`] – the hyperperiod exceeds `limits.hyperperiod`.
/// * [`HyperperiodError::TooManyInstances`] – the expansion exceeds
///   `limits.instances`.
pub fn calculate(
    jobs: &JobSet,
    limits: HyperperiodLimits,
) -> Result<Option<HyperperiodInfo>, HyperperiodError> {
    let unique_periods: Vec<u64> = {
        let mut v: Vec<u64> = jobs.jobs().iter().filter_map(|j| j.period).collect();
        v.sort_unstable();
        v.dedup();
        v
    };

    let Some(hyperperiod) = lcm_all(unique_periods.iter().copied())? else {
        debug!("no periodic jobs, hyperperiod not applicable");
        return Ok(None);
    };

    if hyperperiod > limits.hyperperiod {
        warn!(
            hyperperiod,
            limit = limits.hyperperiod,
            "Hyperperiod exceeds configured limit"
        );
        return Err(HyperperiodError::TooLarge {
            value: hyperperiod,
            limit: limits.hyperperiod,
        });
    }

    let instance_count: u64 = jobs
        .jobs()
        .iter()
        .map(|j| j.period.map_or(1, |p| hyperperiod / p))
        .sum();

    if instance_count > limits.instances as u64 {
        warn!(
            instance_count,
            limit = limits.instances,
            "Periodic expansion exceeds instance limit"
        );
        return Err(HyperperiodError::TooManyInstances {
            count: instance_count,
            limit: limits.instances,
        });
    }

    info!(
        hyperperiod,
        unique_count = unique_periods.len(),
        instance_count,
        "Calculated hyperperiod"
    );

    Ok(Some(HyperperiodInfo {
        hyperperiod,
        unique_periods,
        instance_count,
    }))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
