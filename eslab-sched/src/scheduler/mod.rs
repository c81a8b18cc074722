/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Scheduling engine.
//!
//! [`Engine`] turns a validated [`JobSet`] and a [`Platform`] into one
//! [`Schedule`] per requested [`Algorithm`].  An algorithm is a [`Policy`]
//! paired with a [`Mode`]:
//!
//! | Policy | Priority | Preemptive | Implementation |
//! |---|---|---|---|
//! | LDF | static, reverse-graph latest deadline | no | [`list`] |
//! | EDF | dynamic, absolute deadline | yes | [`preemptive`] |
//! | LL | dynamic, laxity | yes | [`preemptive`] |
//! | RMS | static, period | yes | [`preemptive`] |
//!
//! Single-node modes use the platform's first node; multi-node modes use all
//! of them, assuming zero communication delay between nodes.
//!
//! The engine holds only its [`EngineConfig`]; all per-run state lives inside
//! the call, so one `Engine` can serve concurrent callers.
//!
//! # Example
//! ```rust
//! use eslab_sched::config::EngineConfig;
//! use eslab_sched::job::{Job, JobSet};
//! use eslab_sched::platform::Platform;
//! use eslab_sched::scheduler::{Algorithm, Engine};
//!
//! let jobs = JobSet::builder()
//!     .job(Job::new(1, 2, 5))
//!     .job(Job::new(2, 1, 2))
//!     .build()
//!     .unwrap();
//! let engine = Engine::new(EngineConfig::default());
//! let schedule = engine
//!     .schedule(&jobs, &Platform::single(), Algorithm::EDF_SINGLE_NODE)
//!     .unwrap();
//! assert_eq!(schedule.nodes[0].slots[0].job, 2);
//! ```

pub mod error;
pub mod feasibility;
mod list;
mod preemptive;
pub mod priority;

pub use error::SchedulerError;

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::hyperperiod;
use crate::instance::InstanceGraph;
use crate::job::JobSet;
use crate::platform::Platform;
use crate::schedule::{Schedule, ScheduleSet};

use feasibility::{check_edf, check_liu_layland};

// ── Algorithm selection ───────────────────────────────────────────────────────

/// Priority policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Policy {
    /// Latest Deadline First (static, precedence-aware, non-preemptive).
    Ldf,
    /// Earliest Deadline First.
    Edf,
    /// Least Laxity First.
    LeastLaxity,
    /// Rate Monotonic.
    Rms,
}

/// Platform usage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    SingleNode,
    /// All platform nodes, zero inter-node communication cost.
    MultiNodeNoDelay,
}

/// A policy run in a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Algorithm {
    pub policy: Policy,
    pub mode: Mode,
}

impl Algorithm {
    pub const LDF_SINGLE_NODE: Self = Self::new(Policy::Ldf, Mode::SingleNode);
    pub const EDF_SINGLE_NODE: Self = Self::new(Policy::Edf, Mode::SingleNode);
    pub const LL_SINGLE_NODE: Self = Self::new(Policy::LeastLaxity, Mode::SingleNode);
    pub const RMS_SINGLE_NODE: Self = Self::new(Policy::Rms, Mode::SingleNode);
    pub const LDF_MULTINODE_NO_DELAY: Self = Self::new(Policy::Ldf, Mode::MultiNodeNoDelay);
    pub const EDF_MULTINODE_NO_DELAY: Self = Self::new(Policy::Edf, Mode::MultiNodeNoDelay);
    pub const LL_MULTINODE_NO_DELAY: Self = Self::new(Policy::LeastLaxity, Mode::MultiNodeNoDelay);
    pub const RMS_MULTINODE_NO_DELAY: Self = Self::new(Policy::Rms, Mode::MultiNodeNoDelay);

    /// The set produced when the caller does not choose.
    pub const DEFAULT_SET: [Self; 5] = [
        Self::LDF_SINGLE_NODE,
        Self::EDF_SINGLE_NODE,
        Self::EDF_MULTINODE_NO_DELAY,
        Self::LDF_MULTINODE_NO_DELAY,
        Self::LL_MULTINODE_NO_DELAY,
    ];

    pub const ALL: [Self; 8] = [
        Self::LDF_SINGLE_NODE,
        Self::EDF_SINGLE_NODE,
        Self::LL_SINGLE_NODE,
        Self::RMS_SINGLE_NODE,
        Self::LDF_MULTINODE_NO_DELAY,
        Self::EDF_MULTINODE_NO_DELAY,
        Self::LL_MULTINODE_NO_DELAY,
        Self::RMS_MULTINODE_NO_DELAY,
    ];

    pub const fn new(policy: Policy, mode: Mode) -> Self {
        Self { policy, mode }
    }

    /// Stable external name, e.g. `edf_multinode_no_delay`.
    pub fn name(&self) -> &'static str {
        match (self.policy, self.mode) {
            (Policy::Ldf, Mode::SingleNode) => "ldf_single_node",
            (Policy::Edf, Mode::SingleNode) => "edf_single_node",
            (Policy::LeastLaxity, Mode::SingleNode) => "ll_single_node",
            (Policy::Rms, Mode::SingleNode) => "rms_single_node",
            (Policy::Ldf, Mode::MultiNodeNoDelay) => "ldf_multinode_no_delay",
            (Policy::Edf, Mode::MultiNodeNoDelay) => "edf_multinode_no_delay",
            (Policy::LeastLaxity, Mode::MultiNodeNoDelay) => "ll_multinode_no_delay",
            (Policy::Rms, Mode::MultiNodeNoDelay) => "rms_multinode_no_delay",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.name() == wanted)
            .ok_or_else(|| SchedulerError::UnknownAlgorithm(s.to_string()))
    }
}

impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

// ── Engine ────────────────────────────────────────────────────────────────────

/// The scheduling engine.  Stateless apart from its configuration.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Expand `jobs` into the instance graph the schedulers run on, using the
    /// configured hyperperiod limits.
    pub fn expand(&self, jobs: &JobSet) -> Result<InstanceGraph, SchedulerError> {
        let info = hyperperiod::calculate(jobs, self.config.limits)?;
        Ok(InstanceGraph::expand(jobs, info.map(|i| i.hyperperiod))?)
    }

    /// Run one algorithm.
    pub fn schedule(
        &self,
        jobs: &JobSet,
        platform: &Platform,
        algorithm: Algorithm,
    ) -> Result<Schedule, SchedulerError> {
        let graph = self.expand(jobs)?;
        self.run(algorithm, jobs, &graph, platform)
    }

    /// Run every algorithm in `algorithms` over the same expansion.
    ///
    /// Fails on the first algorithm that fails; no partial set is returned.
    pub fn schedule_set(
        &self,
        jobs: &JobSet,
        platform: &Platform,
        algorithms: &[Algorithm],
    ) -> Result<ScheduleSet, SchedulerError> {
        let graph = self.expand(jobs)?;
        let mut set = ScheduleSet::new();
        for &algorithm in algorithms {
            let schedule = self.run(algorithm, jobs, &graph, platform)?;
            set.insert(algorithm.name().to_string(), schedule);
        }
        Ok(set)
    }

    /// Run the configured algorithm set.
    pub fn schedule_all(
        &self,
        jobs: &JobSet,
        platform: &Platform,
    ) -> Result<ScheduleSet, SchedulerError> {
        self.schedule_set(jobs, platform, &self.config.algorithms)
    }

    fn run(
        &self,
        algorithm: Algorithm,
        jobs: &JobSet,
        graph: &InstanceGraph,
        platform: &Platform,
    ) -> Result<Schedule, SchedulerError> {
        let platform = match algorithm.mode {
            Mode::SingleNode => platform.first_node(),
            Mode::MultiNodeNoDelay => platform.clone(),
        };
        let nodes = platform.node_count();

        info!(
            algorithm = %algorithm,
            job_count = jobs.len(),
            instance_count = graph.len(),
            node_count = nodes,
            "=== Engine::schedule() ==="
        );

        let timeline = match (algorithm.policy, algorithm.mode) {
            (Policy::Ldf, Mode::SingleNode) => {
                list::run_sequential(algorithm, graph, &priority::ldf_order(graph))?
            }
            (Policy::Ldf, Mode::MultiNodeNoDelay) => {
                list::run_list(algorithm, graph, &priority::ldf_order(graph), nodes)?
            }
            (Policy::Edf | Policy::LeastLaxity | Policy::Rms, _) => {
                preemptive::simulate(algorithm, graph, nodes)?
            }
        };

        let schedule = timeline.finish(algorithm, &platform, graph);
        debug_assert!(
            schedule.violations(graph).is_empty(),
            "{algorithm} produced an invalid schedule: {:?}",
            schedule.violations(graph)
        );

        for miss in schedule.deadline_misses() {
            warn!(
                algorithm = %algorithm,
                job = miss.job,
                instance = miss.instance,
                finish = miss.finish,
                deadline = miss.deadline,
                "deadline missed"
            );
        }
        Self::run_feasibility_check(algorithm, jobs, nodes);

        info!(
            algorithm = %algorithm,
            makespan = schedule.stats.makespan,
            preemptions = schedule.stats.preemptions,
            deadline_misses = schedule.stats.deadline_misses,
            "=== Scheduling complete ==="
        );

        Ok(schedule)
    }

    /// Warn when the periodic jobs exceed the policy's utilisation bound.
    fn run_feasibility_check(algorithm: Algorithm, jobs: &JobSet, nodes: usize) {
        let exceeded = match (algorithm.policy, algorithm.mode) {
            (Policy::Rms, Mode::SingleNode) => check_liu_layland(jobs.jobs()),
            (Policy::Edf, _) => check_edf(jobs.jobs(), nodes),
            _ => None,
        };
        if let Some(e) = exceeded {
            warn!(
                algorithm = %algorithm,
                utilization = e.utilization,
                bound = e.bound,
                periodic_jobs = e.periodic_jobs,
                "periodic utilization exceeds the schedulability bound; deadline misses are possible"
            );
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyperperiod::{HyperperiodError, HyperperiodLimits};
    use crate::job::{Job, JobId};
    use crate::schedule::Slot;

    // ── Test helpers ──────────────────────────────────────────────────────────

    fn jobs(list: Vec<Job>) -> JobSet {
        JobSet::builder().jobs(list).build().unwrap()
    }

    fn run(algorithm: Algorithm, set: &JobSet, nodes: usize) -> Schedule {
        Engine::default()
            .schedule(set, &Platform::homogeneous(nodes).unwrap(), algorithm)
            .unwrap()
    }

    /// `(job, start, finish)` for each slot on `node`.
    fn slots(s: &Schedule, node: usize) -> Vec<(JobId, u64, u64)> {
        s.nodes[node]
            .slots
            .iter()
            .map(|sl: &Slot| (sl.job, sl.start, sl.finish))
            .collect()
    }

    /// A DAG with releases, fan-in and fan-out, plus one independent job.
    fn mixed_dag() -> JobSet {
        jobs(vec![
            Job::new(1, 3, 20),
            Job::new(2, 2, 12).after(1),
            Job::new(3, 4, 25).after(1),
            Job::new(4, 1, 9).with_release(2),
            Job::new(5, 2, 30).after(2).after(3),
            Job::new(6, 3, 15).with_release(5).after(4),
            Job::new(7, 2, 40).after(5).after(6),
            Job::new(8, 5, 35),
        ])
    }

    /// Periodic chain (2 -> 3) plus an independent periodic and a one-shot job.
    fn periodic_mix() -> JobSet {
        jobs(vec![
            Job::new(1, 1, 5).with_period(5),
            Job::new(2, 3, 10).with_period(10),
            Job::new(3, 2, 10).with_period(10).after(2),
            Job::new(4, 4, 30),
        ])
    }

    // ── Algorithm names ───────────────────────────────────────────────────────

    #[test]
    fn algorithm_names_parse_back() {
        for a in Algorithm::ALL {
            assert_eq!(a.name().parse::<Algorithm>().unwrap(), a);
        }
    }

    #[test]
    fn unknown_algorithm_name_is_rejected() {
        let err = "fifo".parse::<Algorithm>().unwrap_err();
        assert!(matches!(err, SchedulerError::UnknownAlgorithm(ref s) if s == "fifo"));
    }

    // ── EDF ───────────────────────────────────────────────────────────────────

    #[test]
    fn edf_single_node_runs_earlier_deadline_first() {
        let set = jobs(vec![Job::new(1, 2, 5), Job::new(2, 1, 2)]);
        let s = run(Algorithm::EDF_SINGLE_NODE, &set, 1);
        assert_eq!(slots(&s, 0), vec![(2, 0, 1), (1, 1, 3)]);
        assert!(s.is_feasible());
    }

    #[test]
    fn edf_single_node_preempts_on_earlier_deadline_arrival() {
        let set = jobs(vec![Job::new(1, 4, 10), Job::new(2, 1, 3).with_release(1)]);
        let s = run(Algorithm::EDF_SINGLE_NODE, &set, 1);
        assert_eq!(slots(&s, 0), vec![(1, 0, 1), (2, 1, 2), (1, 2, 5)]);
        assert_eq!(s.stats.preemptions, 1);
    }

    #[test]
    fn edf_multinode_preempts_latest_deadline() {
        let set = jobs(vec![
            Job::new(1, 4, 10),
            Job::new(2, 4, 9),
            Job::new(3, 2, 4).with_release(1),
        ]);
        let s = run(Algorithm::EDF_MULTINODE_NO_DELAY, &set, 2);
        assert_eq!(slots(&s, 0), vec![(2, 0, 4)]);
        assert_eq!(slots(&s, 1), vec![(1, 0, 1), (3, 1, 3), (1, 3, 6)]);
        assert!(s.is_feasible());
    }

    #[test]
    fn edf_multinode_on_one_node_matches_single_node() {
        for set in [mixed_dag(), periodic_mix()] {
            let single = run(Algorithm::EDF_SINGLE_NODE, &set, 1);
            let multi = run(Algorithm::EDF_MULTINODE_NO_DELAY, &set, 1);
            assert_eq!(single.nodes, multi.nodes);
        }
    }

    #[test]
    fn deadline_miss_is_reported_not_raised() {
        let set = jobs(vec![Job::new(1, 3, 3), Job::new(2, 3, 4)]);
        let s = run(Algorithm::EDF_SINGLE_NODE, &set, 1);
        assert_eq!(slots(&s, 0), vec![(1, 0, 3), (2, 3, 6)]);
        assert!(!s.is_feasible());
        let miss = s.outcome(2, 0).unwrap();
        assert!(miss.missed);
        assert_eq!(miss.lateness(), 2);
    }

    // ── Least Laxity ──────────────────────────────────────────────────────────

    #[test]
    fn ll_single_node_preempts_on_lower_laxity() {
        // A: laxity 1 at t=0.  B arrives at t=1 with laxity 0 and preempts A.
        let set = jobs(vec![Job::new(1, 3, 4), Job::new(2, 1, 2).with_release(1)]);
        let s = run(Algorithm::LL_SINGLE_NODE, &set, 1);
        assert_eq!(slots(&s, 0), vec![(1, 0, 1), (2, 1, 2), (1, 2, 4)]);
        assert!(s.is_feasible());
    }

    #[test]
    fn ll_multinode_swaps_on_laxity_crossing() {
        let set = jobs(vec![
            Job::new(1, 4, 10),
            Job::new(2, 4, 9),
            Job::new(3, 2, 4).with_release(1),
        ]);
        let s = run(Algorithm::LL_MULTINODE_NO_DELAY, &set, 2);
        // t=1: job 3 (laxity 1) takes job 1's node.
        // t=2: waiting job 1's laxity falls to 5 and ties job 2; the lower id wins.
        // t=3: job 3 completes and job 2 resumes on the freed node.
        assert_eq!(slots(&s, 0), vec![(2, 0, 2), (1, 2, 5)]);
        assert_eq!(slots(&s, 1), vec![(1, 0, 1), (3, 1, 3), (2, 3, 5)]);
        assert_eq!(s.stats.preemptions, 2);
        assert_eq!(s.stats.makespan, 5);
    }

    // ── LDF ───────────────────────────────────────────────────────────────────

    fn ldf_set() -> JobSet {
        jobs(vec![
            Job::new(1, 2, 10),
            Job::new(2, 1, 4).with_release(3),
            Job::new(3, 2, 10).after(1),
        ])
    }

    #[test]
    fn ldf_single_node_follows_static_order() {
        // order: 2, 1, 3; job 2 is not released until t=3 and the node waits
        let s = run(Algorithm::LDF_SINGLE_NODE, &ldf_set(), 1);
        assert_eq!(slots(&s, 0), vec![(2, 3, 4), (1, 4, 6), (3, 6, 8)]);
        assert_eq!(s.stats.preemptions, 0);
    }

    #[test]
    fn ldf_multinode_is_list_scheduling() {
        let s = run(Algorithm::LDF_MULTINODE_NO_DELAY, &ldf_set(), 2);
        assert_eq!(slots(&s, 0), vec![(1, 0, 2), (2, 3, 4)]);
        // node 1 has been idle longest at t=2, so it takes job 3
        assert_eq!(slots(&s, 1), vec![(3, 2, 4)]);
        assert_eq!(s.stats.makespan, 4);
    }

    #[test]
    fn ldf_runs_are_deterministic() {
        let set = mixed_dag();
        let first = run(Algorithm::LDF_MULTINODE_NO_DELAY, &set, 3);
        for _ in 0..5 {
            assert_eq!(run(Algorithm::LDF_MULTINODE_NO_DELAY, &set, 3), first);
        }
    }

    // ── RMS ───────────────────────────────────────────────────────────────────

    #[test]
    fn rms_single_node_expands_over_hyperperiod() {
        let set = jobs(vec![
            Job::new(1, 1, 4).with_period(4),
            Job::new(2, 2, 6).with_period(6),
        ]);
        let s = run(Algorithm::RMS_SINGLE_NODE, &set, 1);
        assert_eq!(s.hyperperiod, Some(12));
        assert_eq!(
            slots(&s, 0),
            vec![(1, 0, 1), (2, 1, 3), (1, 4, 5), (2, 6, 8), (1, 8, 9)]
        );
        assert_eq!(s.jobs.len(), 5);
        assert!(s.is_feasible());
    }

    #[test]
    fn rms_shorter_period_preempts() {
        let set = jobs(vec![
            Job::new(1, 2, 5).with_period(5),
            Job::new(2, 5, 10).with_period(10),
        ]);
        let s = run(Algorithm::RMS_SINGLE_NODE, &set, 1);
        assert_eq!(
            slots(&s, 0),
            vec![(1, 0, 2), (2, 2, 5), (1, 5, 7), (2, 7, 9)]
        );
        assert_eq!(s.stats.preemptions, 1);
        assert!(s.is_feasible());
    }

    // ── Properties over every algorithm ───────────────────────────────────────

    #[test]
    fn every_algorithm_respects_precedence_and_conserves_work() {
        let engine = Engine::default();
        let platform = Platform::homogeneous(3).unwrap();
        for set in [mixed_dag(), periodic_mix()] {
            let graph = engine.expand(&set).unwrap();
            let all = engine.schedule_set(&set, &platform, &Algorithm::ALL).unwrap();
            assert_eq!(all.len(), Algorithm::ALL.len());
            for (name, s) in &all {
                let v = s.violations(&graph);
                assert!(v.is_empty(), "{name}: {v:?}");
                assert_eq!(s.stats.busy_time, graph.total_work(), "{name}");
                assert_eq!(s.jobs.len(), graph.len(), "{name}");
                for node in &s.nodes {
                    assert!(
                        node.slots.windows(2).all(|w| w[0].finish <= w[1].start),
                        "{name}: node {} slots unsorted",
                        node.index
                    );
                }
            }
        }
    }

    #[test]
    fn independent_jobs_fill_every_node_at_once() {
        let set = jobs(vec![Job::new(1, 2, 5), Job::new(2, 2, 5), Job::new(3, 2, 5)]);
        for a in [
            Algorithm::EDF_MULTINODE_NO_DELAY,
            Algorithm::LDF_MULTINODE_NO_DELAY,
            Algorithm::LL_MULTINODE_NO_DELAY,
            Algorithm::RMS_MULTINODE_NO_DELAY,
        ] {
            let s = run(a, &set, 3);
            assert!(s.jobs.iter().all(|o| o.start == 0), "{a}: a node idled");
            assert!(s.nodes.iter().all(|n| n.slots.len() == 1), "{a}");
            assert_eq!(s.stats.makespan, 2, "{a}");
        }
    }

    #[test]
    fn single_node_algorithms_use_only_the_first_node() {
        let platform = Platform::named(["ecu_a", "ecu_b"]).unwrap();
        let s = Engine::default()
            .schedule(&mixed_dag(), &platform, Algorithm::EDF_SINGLE_NODE)
            .unwrap();
        assert_eq!(s.nodes.len(), 1);
        assert_eq!(s.nodes[0].node, "ecu_a");
    }

    // ── Engine configuration ──────────────────────────────────────────────────

    #[test]
    fn schedule_all_runs_default_set() {
        let set = mixed_dag();
        let all = Engine::default()
            .schedule_all(&set, &Platform::homogeneous(2).unwrap())
            .unwrap();
        let names: Vec<&str> = all.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "edf_multinode_no_delay",
                "edf_single_node",
                "ldf_multinode_no_delay",
                "ldf_single_node",
                "ll_multinode_no_delay",
            ]
        );
    }

    #[test]
    fn hyperperiod_limit_is_enforced() {
        let engine = Engine::new(EngineConfig {
            limits: HyperperiodLimits {
                hyperperiod: 10,
                ..Default::default()
            },
            ..Default::default()
        });
        let set = jobs(vec![
            Job::new(1, 1, 7).with_period(7),
            Job::new(2, 1, 11).with_period(11),
        ]);
        let err = engine
            .schedule(&set, &Platform::single(), Algorithm::EDF_SINGLE_NODE)
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::Hyperperiod(HyperperiodError::TooLarge { value: 77, .. })
        ));
    }

    // ── Large time values ─────────────────────────────────────────────────────

    #[test]
    fn huge_deadline_ranks_after_tight_one() {
        let set = jobs(vec![
            Job::new(1, 2, u64::MAX / 2 + 10),
            Job::new(2, 1, 2),
        ]);
        for a in [Algorithm::EDF_SINGLE_NODE, Algorithm::LL_SINGLE_NODE] {
            let s = run(a, &set, 1);
            assert_eq!(slots(&s, 0), vec![(2, 0, 1), (1, 1, 3)], "{a}");
            assert!(s.is_feasible(), "{a}");
        }
    }

    #[test]
    fn expansion_past_time_range_is_an_error() {
        let set = jobs(vec![
            Job::new(1, 1, u64::MAX - 1).with_period(10),
            Job::new(2, 1, 20).with_period(20),
        ]);
        let err = Engine::default()
            .schedule(&set, &Platform::single(), Algorithm::EDF_SINGLE_NODE)
            .unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::Hyperperiod(HyperperiodError::TimeOverflow { job: 1 })
        ));
    }
}
