/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Schedule results returned by the engine.
//!
//! ```text
//! scheduler ──(TimelineBuilder::record)──► per-node slots ──(finish)──► Schedule
//!                                                                        ├── nodes: Vec<NodeTimeline>
//!                                                                        ├── jobs:  Vec<JobOutcome>
//!                                                                        └── stats: ScheduleStats
//! ```
//!
//! Preemptive policies may split one job instance into several [`Slot`]s,
//! possibly on different nodes.  The summed slot length of an instance always
//! equals its execution time.
//!
//! Deadline misses are not errors: they are flagged per instance in
//! [`JobOutcome::missed`] and counted in [`ScheduleStats::deadline_misses`].

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::instance::{InstanceGraph, JobInstance};
use crate::job::JobId;
use crate::platform::Platform;
use crate::scheduler::Algorithm;

// ── Output types ──────────────────────────────────────────────────────────────

/// A contiguous stretch of execution of one job instance on one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub job: JobId,
    pub instance: u32,
    pub start: u64,
    pub finish: u64,
}

impl Slot {
    pub fn len(&self) -> u64 {
        self.finish - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.finish == self.start
    }
}

/// Ordered, non-overlapping slots executed by one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeTimeline {
    pub node: String,
    pub index: usize,
    pub slots: Vec<Slot>,
}

impl NodeTimeline {
    pub fn busy_time(&self) -> u64 {
        self.slots.iter().map(Slot::len).sum()
    }
}

/// Timing outcome of one job instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobOutcome {
    pub job: JobId,
    pub instance: u32,
    pub release: u64,
    pub deadline: u64,
    /// Start of the first slot.
    pub start: u64,
    /// End of the last slot.
    pub finish: u64,
    pub missed: bool,
}

impl JobOutcome {
    /// `finish - deadline`; negative when the instance completed early.
    /// Saturates at the `i64` range.
    pub fn lateness(&self) -> i64 {
        let diff = i128::from(self.finish) - i128::from(self.deadline);
        i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
    }
}

/// Aggregate figures for a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct ScheduleStats {
    pub makespan: u64,
    /// Execution time summed over all nodes.
    pub busy_time: u64,
    /// Times an instance stopped running before it completed (including
    /// migrations to another node).
    pub preemptions: usize,
    pub deadline_misses: usize,
    pub max_lateness: i64,
}

/// The result of one algorithm run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub algorithm: Algorithm,
    pub hyperperiod: Option<u64>,
    pub nodes: Vec<NodeTimeline>,
    pub jobs: Vec<JobOutcome>,
    pub stats: ScheduleStats,
}

/// Results keyed by algorithm name, in name order.
pub type ScheduleSet = BTreeMap<String, Schedule>;

impl Schedule {
    pub fn is_feasible(&self) -> bool {
        self.stats.deadline_misses == 0
    }

    pub fn deadline_misses(&self) -> impl Iterator<Item = &JobOutcome> {
        self.jobs.iter().filter(|o| o.missed)
    }

    pub fn outcome(&self, job: JobId, instance: u32) -> Option<&JobOutcome> {
        self.jobs
            .iter()
            .find(|o| o.job == job && o.instance == instance)
    }

    /// All slots of one instance, in start order, paired with their node.
    pub fn slots_of(&self, job: JobId, instance: u32) -> Vec<(usize, &Slot)> {
        let mut out: Vec<(usize, &Slot)> = self
            .nodes
            .iter()
            .flat_map(|n| n.slots.iter().map(move |s| (n.index, s)))
            .filter(|(_, s)| s.job == job && s.instance == instance)
            .collect();
        out.sort_by_key(|(_, s)| s.start);
        out
    }

    /// Check the structural invariants of this schedule against `graph`.
    ///
    /// An empty vector means the schedule is well-formed: every node's slots
    /// are sorted and disjoint, no instance starts before its release, each
    /// instance receives exactly its execution time, and every predecessor
    /// finishes before its successor starts.
    pub fn violations(&self, graph: &InstanceGraph) -> Vec<ScheduleViolation> {
        let mut found = Vec::new();

        for node in &self.nodes {
            for pair in node.slots.windows(2) {
                if pair[1].start < pair[0].finish {
                    found.push(ScheduleViolation::Overlap {
                        node: node.index,
                        at: pair[1].start,
                    });
                }
            }
        }

        let mut executed: BTreeMap<(JobId, u32), u64> = BTreeMap::new();
        for slot in self.nodes.iter().flat_map(|n| &n.slots) {
            *executed.entry((slot.job, slot.instance)).or_default() += slot.len();
        }

        let outcomes: BTreeMap<(JobId, u32), &JobOutcome> = self
            .jobs
            .iter()
            .map(|o| ((o.job, o.instance), o))
            .collect();

        for (i, inst) in graph.instances().iter().enumerate() {
            let got = executed.get(&inst.key()).copied().unwrap_or(0);
            if got != inst.wcet {
                found.push(ScheduleViolation::WrongExecutionTime {
                    job: inst.job,
                    instance: inst.index,
                    expected: inst.wcet,
                    executed: got,
                });
            }
            let Some(outcome) = outcomes.get(&inst.key()) else {
                continue;
            };
            if outcome.start < inst.release {
                found.push(ScheduleViolation::EarlyStart {
                    job: inst.job,
                    instance: inst.index,
                    release: inst.release,
                    start: outcome.start,
                });
            }
            for &p in graph.predecessors(i) {
                let pred = &graph.instances()[p];
                if let Some(pred_outcome) = outcomes.get(&pred.key()) {
                    if pred_outcome.finish > outcome.start {
                        found.push(ScheduleViolation::Precedence {
                            predecessor: pred.job,
                            successor: inst.job,
                            instance: inst.index,
                        });
                    }
                }
            }
        }

        found
    }
}

/// A broken schedule invariant, reported by [`Schedule::violations`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleViolation {
    #[error("node {node}: slots overlap at t={at}")]
    Overlap { node: usize, at: u64 },

    #[error("job {job}#{instance} executed {executed} ticks, expected {expected}")]
    WrongExecutionTime {
        job: JobId,
        instance: u32,
        expected: u64,
        executed: u64,
    },

    #[error("job {job}#{instance} starts at {start} before its release {release}")]
    EarlyStart {
        job: JobId,
        instance: u32,
        release: u64,
        start: u64,
    },

    #[error("job {successor}#{instance} starts before predecessor {predecessor} finishes")]
    Precedence {
        predecessor: JobId,
        successor: JobId,
        instance: u32,
    },
}

// ── TimelineBuilder ───────────────────────────────────────────────────────────

/// Accumulates per-node slots during a simulation.
#[derive(Debug)]
pub(crate) struct TimelineBuilder {
    nodes: Vec<Vec<Slot>>,
}

impl TimelineBuilder {
    pub(crate) fn new(node_count: usize) -> Self {
        Self {
            nodes: vec![Vec::new(); node_count],
        }
    }

    /// Record `inst` running on `node` during `[start, finish)`.
    ///
    /// A slot that continues the node's previous slot for the same instance
    /// is merged into it.
    pub(crate) fn record(&mut self, node: usize, inst: &JobInstance, start: u64, finish: u64) {
        if finish <= start {
            return;
        }
        let slots = &mut self.nodes[node];
        if let Some(last) = slots.last_mut() {
            if last.job == inst.job && last.instance == inst.index && last.finish == start {
                last.finish = finish;
                return;
            }
        }
        slots.push(Slot {
            job: inst.job,
            instance: inst.index,
            start,
            finish,
        });
    }

    /// Freeze the timeline into a [`Schedule`].
    pub(crate) fn finish(
        self,
        algorithm: Algorithm,
        platform: &Platform,
        graph: &InstanceGraph,
    ) -> Schedule {
        let nodes: Vec<NodeTimeline> = self
            .nodes
            .into_iter()
            .zip(platform.nodes())
            .map(|(slots, node)| NodeTimeline {
                node: node.name.clone(),
                index: node.index,
                slots,
            })
            .collect();

        // (first start, last finish, slot count) per instance
        let mut spans: BTreeMap<(JobId, u32), (u64, u64, usize)> = BTreeMap::new();
        for slot in nodes.iter().flat_map(|n| &n.slots) {
            let e = spans
                .entry((slot.job, slot.instance))
                .or_insert((slot.start, slot.finish, 0));
            e.0 = e.0.min(slot.start);
            e.1 = e.1.max(slot.finish);
            e.2 += 1;
        }

        let jobs: Vec<JobOutcome> = graph
            .instances()
            .iter()
            .filter_map(|inst| {
                let &(start, finish, _) = spans.get(&inst.key())?;
                Some(JobOutcome {
                    job: inst.job,
                    instance: inst.index,
                    release: inst.release,
                    deadline: inst.deadline,
                    start,
                    finish,
                    missed: finish > inst.deadline,
                })
            })
            .collect();

        let stats = ScheduleStats {
            makespan: jobs.iter().map(|o| o.finish).max().unwrap_or(0),
            busy_time: nodes.iter().map(NodeTimeline::busy_time).sum(),
            preemptions: spans.values().map(|&(_, _, n)| n.saturating_sub(1)).sum(),
            deadline_misses: jobs.iter().filter(|o| o.missed).count(),
            max_lateness: jobs.iter().map(JobOutcome::lateness).max().unwrap_or(0),
        };

        Schedule {
            algorithm,
            hyperperiod: graph.hyperperiod(),
            nodes,
            jobs,
            stats,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
