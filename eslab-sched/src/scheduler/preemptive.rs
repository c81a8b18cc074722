/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Event-driven preemptive simulation shared by EDF, Least-Laxity and RMS.
//!
//! Time jumps from event to event.  Events are:
//!
//! * a release,
//! * a completion (which is also when successors become unblocked), and
//! * for Least-Laxity only, the instant a waiting instance's falling laxity
//!   overtakes the least urgent running instance.
//!
//! At each event the `m` best ready instances (by
//! [`dynamic_key`](super::priority::dynamic_key)) are selected.  A selected
//! instance that is already running stays on its node; the rest take idle
//! nodes, longest-idle first (tie: lowest index).  Running instances that are
//! no longer selected are preempted and keep their remaining work.

use tracing::debug;

use crate::instance::InstanceGraph;
use crate::schedule::TimelineBuilder;

use super::priority::{dynamic_key, ticks_until_overtake, PriorityKey};
use super::{Algorithm, Policy, SchedulerError};

pub(super) fn simulate(
    algorithm: Algorithm,
    graph: &InstanceGraph,
    node_count: usize,
) -> Result<TimelineBuilder, SchedulerError> {
    let policy = algorithm.policy;
    let insts = graph.instances();
    let n = graph.len();
    let horizon = graph.horizon();

    let mut remaining: Vec<u64> = insts.iter().map(|i| i.wcet).collect();
    let mut blocked_by: Vec<usize> = (0..n).map(|i| graph.predecessors(i).len()).collect();
    let mut running: Vec<Option<usize>> = vec![None; node_count];
    let mut idle_since: Vec<u64> = vec![0; node_count];
    let mut timeline = TimelineBuilder::new(node_count);

    let mut releases: Vec<u64> = insts.iter().map(|i| i.release).collect();
    releases.sort_unstable();
    releases.dedup();

    let mut done = 0usize;
    let mut t = 0u64;

    while done < n {
        let next_release = releases.get(releases.partition_point(|&r| r <= t)).copied();

        let mut ready: Vec<(PriorityKey, usize)> = (0..n)
            .filter(|&i| remaining[i] > 0 && blocked_by[i] == 0 && insts[i].release <= t)
            .map(|i| (dynamic_key(policy, &insts[i], t, remaining[i]), i))
            .collect();
        ready.sort_unstable();

        if ready.is_empty() {
            match next_release {
                Some(r) => {
                    t = r;
                    continue;
                }
                None => {
                    return Err(SchedulerError::Stalled {
                        algorithm,
                        at: t,
                        unfinished: n - done,
                    })
                }
            }
        }

        let selected: Vec<usize> = ready.iter().take(node_count).map(|&(_, i)| i).collect();

        for node in 0..node_count {
            if let Some(i) = running[node] {
                if !selected.contains(&i) {
                    debug!(
                        job = insts[i].job,
                        instance = insts[i].index,
                        node,
                        at = t,
                        remaining = remaining[i],
                        "preempted"
                    );
                    running[node] = None;
                    idle_since[node] = t;
                }
            }
        }

        for &i in &selected {
            if running.contains(&Some(i)) {
                continue;
            }
            let node = (0..node_count)
                .filter(|&k| running[k].is_none())
                .min_by_key(|&k| (idle_since[k], k))
                .ok_or(SchedulerError::Stalled {
                    algorithm,
                    at: t,
                    unfinished: n - done,
                })?;
            running[node] = Some(i);
            debug!(
                job = insts[i].job,
                instance = insts[i].index,
                node,
                at = t,
                "dispatched"
            );
        }

        let mut next = running
            .iter()
            .flatten()
            .map(|&i| t.saturating_add(remaining[i]))
            .chain(next_release)
            .min()
            .unwrap_or(t.saturating_add(1));

        if policy == Policy::LeastLaxity && ready.len() > node_count {
            let worst_running = &ready[node_count - 1].0;
            let best_waiting = &ready[node_count].0;
            next = next.min(t.saturating_add(ticks_until_overtake(best_waiting, worst_running)));
        }

        if next > horizon {
            return Err(SchedulerError::HorizonExceeded {
                algorithm,
                at: next,
                horizon,
            });
        }

        let elapsed = next - t;
        for node in 0..node_count {
            let Some(i) = running[node] else {
                continue;
            };
            timeline.record(node, &insts[i], t, next);
            remaining[i] -= elapsed;
            if remaining[i] == 0 {
                done += 1;
                running[node] = None;
                idle_since[node] = next;
                for &s in graph.successors(i) {
                    blocked_by[s] -= 1;
                }
                debug!(
                    job = insts[i].job,
                    instance = insts[i].index,
                    node,
                    at = next,
                    "completed"
                );
            }
        }

        t = next;
    }

    Ok(timeline)
}
