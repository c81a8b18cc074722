/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Utilisation-based schedulability bounds for the periodic part of a job set.
//!
//! These are **warnings only**.  The engine always returns its best-effort
//! schedule; the bounds merely tell the caller whether a miss-free schedule
//! is guaranteed.
//!
//! # Theory
//! **Liu & Layland (1973)**: `n` independent periodic tasks with implicit
//! deadlines are schedulable under Rate Monotonic priorities on one processor
//! if
//!
//! $$U = \sum_{i=1}^{n} \frac{C_i}{T_i} \leq n \left(2^{1/n} - 1\right)$$
//!
//! The bound tightens as `n` grows, converging to `ln(2) ≈ 0.693`.
//!
//! | n | Bound |
//! |---|---|
//! | 1 | 1.000 |
//! | 2 | 0.828 |
//! | 3 | 0.780 |
//! | ∞ | ln(2) ≈ 0.693 |
//!
//! **EDF** is optimal on one processor: `U ≤ 1` suffices.  For global EDF on
//! `m` identical processors the Goossens–Funk–Baruah bound
//! `U ≤ m − (m − 1)·u_max` is sufficient.

use crate::job::Job;

/// Liu & Layland utilisation bound `n × (2^(1/n) − 1)`; `0.0` for `n = 0`.
pub fn liu_layland_bound(n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let nf = n as f64;
    nf * (2.0_f64.powf(1.0 / nf) - 1.0)
}

/// Global EDF bound for `m` processors with largest single-job utilisation
/// `u_max`.
pub fn global_edf_bound(m: usize, u_max: f64) -> f64 {
    let mf = m as f64;
    mf - (mf - 1.0) * u_max
}

/// Outcome of a bound check that failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundExceeded {
    pub utilization: f64,
    pub bound: f64,
    pub periodic_jobs: usize,
}

/// Rate Monotonic check on one node.
///
/// Returns `None` when the periodic jobs are provably schedulable (or there
/// are none), `Some` when the Liu & Layland bound is exceeded.  One-shot jobs
/// are ignored.
pub fn check_liu_layland(jobs: &[Job]) -> Option<BoundExceeded> {
    let utils: Vec<f64> = jobs.iter().filter_map(Job::utilization).collect();
    if utils.is_empty() {
        return None;
    }
    let utilization: f64 = utils.iter().sum();
    let bound = liu_layland_bound(utils.len());
    (utilization > bound).then_some(BoundExceeded {
        utilization,
        bound,
        periodic_jobs: utils.len(),
    })
}

/// EDF check on `nodes` processors (exact for one node, sufficient for more).
pub fn check_edf(jobs: &[Job], nodes: usize) -> Option<BoundExceeded> {
    let utils: Vec<f64> = jobs.iter().filter_map(Job::utilization).collect();
    if utils.is_empty() {
        return None;
    }
    let utilization: f64 = utils.iter().sum();
    let u_max = utils.iter().copied().fold(0.0, f64::max);
    let bound = if nodes <= 1 {
        1.0
    } else {
        global_edf_bound(nodes, u_max)
    };
    (utilization > bound).then_some(BoundExceeded {
        utilization,
        bound,
        periodic_jobs: utils.len(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
