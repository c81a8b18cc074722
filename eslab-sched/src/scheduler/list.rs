/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Non-preemptive schedulers driven by a fixed priority list (LDF).

use tracing::debug;

use crate::instance::InstanceGraph;
use crate::schedule::TimelineBuilder;

use super::{Algorithm, SchedulerError};

/// Run `order` back to back on a single node.
///
/// Each instance starts at `max(release, predecessor finishes, previous
/// finish)`.  `order` must be topological (as produced by
/// [`ldf_order`](super::priority::ldf_order)).
pub(super) fn run_sequential(
    algorithm: Algorithm,
    graph: &InstanceGraph,
    order: &[usize],
) -> Result<TimelineBuilder, SchedulerError> {
    let insts = graph.instances();
    let horizon = graph.horizon();
    let mut timeline = TimelineBuilder::new(1);
    let mut finish: Vec<u64> = vec![0; graph.len()];
    let mut clock = 0u64;

    for &i in order {
        let inst = &insts[i];
        let deps_done = graph
            .predecessors(i)
            .iter()
            .map(|&p| finish[p])
            .max()
            .unwrap_or(0);
        let start = clock.max(inst.release).max(deps_done);
        let end = start.saturating_add(inst.wcet);
        if end > horizon {
            return Err(SchedulerError::HorizonExceeded {
                algorithm,
                at: end,
                horizon,
            });
        }

        timeline.record(0, inst, start, end);
        finish[i] = end;
        clock = end;
        debug!(job = inst.job, instance = inst.index, start, end, "dispatched");
    }

    Ok(timeline)
}

/// List scheduling of `order` on `node_count` nodes.
///
/// At every event (a release or a node becoming free) the highest-ranked
/// ready instances go to idle nodes, the node idle longest first (tie:
/// lowest index).  Once started an instance runs to completion.
pub(super) fn run_list(
    algorithm: Algorithm,
    graph: &InstanceGraph,
    order: &[usize],
    node_count: usize,
) -> Result<TimelineBuilder, SchedulerError> {
    let insts = graph.instances();
    let horizon = graph.horizon();
    let mut timeline = TimelineBuilder::new(node_count);
    let mut finish: Vec<Option<u64>> = vec![None; graph.len()];
    let mut free_at: Vec<u64> = vec![0; node_count];
    let mut waiting: Vec<usize> = order.to_vec();
    let mut t = 0u64;

    while !waiting.is_empty() {
        let mut idle: Vec<usize> = (0..node_count).filter(|&k| free_at[k] <= t).collect();
        idle.sort_by_key(|&k| (free_at[k], k));
        let mut idle = idle.into_iter();

        let mut still_waiting = Vec::with_capacity(waiting.len());
        for i in waiting.drain(..) {
            let inst = &insts[i];
            let ready = inst.release <= t
                && graph
                    .predecessors(i)
                    .iter()
                    .all(|&p| finish[p].is_some_and(|f| f <= t));
            let node = if ready { idle.next() } else { None };
            match node {
                Some(node) => {
                    let end = t.saturating_add(inst.wcet);
                    timeline.record(node, inst, t, end);
                    finish[i] = Some(end);
                    free_at[node] = end;
                    debug!(
                        job = inst.job,
                        instance = inst.index,
                        node,
                        start = t,
                        end,
                        "dispatched"
                    );
                }
                None => still_waiting.push(i),
            }
        }
        waiting = still_waiting;
        if waiting.is_empty() {
            break;
        }

        let next_free = free_at.iter().copied().filter(|&f| f > t).min();
        let next_release = waiting
            .iter()
            .map(|&i| insts[i].release)
            .filter(|&r| r > t)
            .min();
        let next = match (next_free, next_release) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) | (None, Some(a)) => a,
            (None, None) => {
                return Err(SchedulerError::Stalled {
                    algorithm,
                    at: t,
                    unfinished: waiting.len(),
                })
            }
        };
        if next > horizon {
            return Err(SchedulerError::HorizonExceeded {
                algorithm,
                at: next,
                horizon,
            });
        }
        t = next;
    }

    Ok(timeline)
}
