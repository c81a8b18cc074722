/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Priority assigners.
//!
//! * **LDF** (static): [`ldf_order`] builds one precedence-respecting execution
//!   order from the reverse graph.
//! * **EDF**, **LL**, **RMS**: [`dynamic_key`] ranks a ready instance at a given
//!   instant.  Lower keys run first.  EDF and RMS keys never change while an
//!   instance waits; a waiting instance's laxity falls by one per tick while a
//!   running instance's laxity stays constant.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::instance::{InstanceGraph, JobInstance};
use crate::job::JobId;

use super::Policy;

// ── LDF ───────────────────────────────────────────────────────────────────────

/// Latest-Deadline-First execution order over `graph`.
///
/// Works backwards: among instances whose successors are all placed
/// (initially the sinks), the one with the **latest** deadline is placed
/// last (tie: lowest job id, then lowest instance index).  Placing it may
/// release its predecessors.  The reversed placement sequence is a
/// topological order in which, among competing final-stage jobs, those with
/// later deadlines run later.
///
/// Returns positions into `graph.instances()`.
pub fn ldf_order(graph: &InstanceGraph) -> Vec<usize> {
    let insts = graph.instances();
    let mut unplaced_successors: Vec<usize> =
        (0..graph.len()).map(|i| graph.successors(i).len()).collect();

    // max-heap: latest deadline first, then smallest (job, index)
    let mut ready: BinaryHeap<(u64, Reverse<(JobId, u32)>, usize)> = (0..graph.len())
        .filter(|&i| unplaced_successors[i] == 0)
        .map(|i| (insts[i].deadline, Reverse(insts[i].key()), i))
        .collect();

    let mut placed = Vec::with_capacity(graph.len());
    while let Some((_, _, i)) = ready.pop() {
        placed.push(i);
        for &p in graph.predecessors(i) {
            unplaced_successors[p] -= 1;
            if unplaced_successors[p] == 0 {
                ready.push((insts[p].deadline, Reverse(insts[p].key()), p));
            }
        }
    }

    debug_assert_eq!(placed.len(), graph.len(), "instance graph must be acyclic");
    placed.reverse();
    placed
}

// ── Dynamic keys ──────────────────────────────────────────────────────────────

/// Ordering key of a ready instance.  Compared field by field; the smallest
/// key has the highest priority.
///
/// `primary` is wide enough to hold any `u64` time or laxity without wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PriorityKey {
    pub primary: i128,
    pub secondary: u64,
    pub job: JobId,
    pub instance: u32,
}

/// Laxity of `inst` at `now` with `remaining` ticks of work left:
/// `deadline - now - remaining`.  Negative once the deadline can no longer
/// be met.
pub fn laxity(inst: &JobInstance, now: u64, remaining: u64) -> i128 {
    i128::from(inst.deadline) - i128::from(now) - i128::from(remaining)
}

/// Rank `inst` under `policy` at `now`.
///
/// | Policy | primary | secondary |
/// |---|---|---|
/// | EDF | absolute deadline | – |
/// | LL  | laxity at `now` | – |
/// | RMS | period (one-shot jobs rank last) | absolute deadline |
///
/// LDF is static and never asks for a dynamic key; it falls back to EDF.
pub fn dynamic_key(policy: Policy, inst: &JobInstance, now: u64, remaining: u64) -> PriorityKey {
    let (primary, secondary) = match policy {
        Policy::Edf | Policy::Ldf => (i128::from(inst.deadline), 0),
        Policy::LeastLaxity => (laxity(inst, now, remaining), 0),
        Policy::Rms => (inst.period.map_or(i128::MAX, i128::from), inst.deadline),
    };
    PriorityKey {
        primary,
        secondary,
        job: inst.job,
        instance: inst.index,
    }
}

/// Ticks until a waiting instance with key `waiting` outranks a running one
/// with key `running` under Least-Laxity, given that only the waiting
/// instance's laxity decreases.  Always at least 1.
pub fn ticks_until_overtake(waiting: &PriorityKey, running: &PriorityKey) -> u64 {
    let gap = (waiting.primary - running.primary).max(0);
    let ticks = if (waiting.job, waiting.instance) < (running.job, running.instance) {
        gap
    } else {
        gap + 1
    };
    u64::try_from(ticks.max(1)).unwrap_or(u64::MAX)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
