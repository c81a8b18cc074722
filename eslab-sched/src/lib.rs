/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! ESLAB scheduling engine
//!
//! Offline real-time scheduling of precedence-constrained jobs on one or more
//! identical nodes.
//!
//! ```text
//! lib.rs
//! ├── job          – jobs, dependency graph validation (JobSetBuilder)
//! ├── platform     – nodes the schedule runs on
//! ├── hyperperiod/ – LCM / GCD helpers and expansion limits
//! ├── instance     – periodic jobs expanded into per-period instances
//! ├── scheduler/   – Engine, LDF / EDF / LL / RMS, feasibility bounds
//! ├── schedule     – per-node timelines, outcomes and statistics
//! └── config/      – YAML workload files and engine settings
//! ```

pub mod config;
pub mod hyperperiod;
pub mod instance;
pub mod job;
pub mod platform;
pub mod schedule;
pub mod scheduler;
