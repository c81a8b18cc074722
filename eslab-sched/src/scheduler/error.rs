/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error type for the scheduling engine.
//!
//! Failures come in two layers:
//!
//! * [`ModelError`]: the job graph or platform is structurally invalid
//!   (cycle, unknown reference, invalid timing).  Detected once, by
//!   [`JobSetBuilder::build`](crate::job::JobSetBuilder::build), before any
//!   algorithm runs.
//! * [`SchedulerError`]: everything [`Engine`](super::Engine) can return.  It
//!   wraps `ModelError` and [`HyperperiodError`] and adds the engine's own
//!   failures.
//!
//! Deadline misses are **not** errors.  They are reported on the
//! [`Schedule`](crate::schedule::Schedule).
//!
//! | Variant | Caller's view |
//! |---|---|
//! | `Model` | bad input |
//! | `Hyperperiod` | periodic expansion too large for the configured limits |
//! | `UnknownAlgorithm` | bad input |
//! | `HorizonExceeded` / `Stalled` | internal fault; the simulation was stopped |

use thiserror::Error;

use crate::hyperperiod::HyperperiodError;
use crate::job::ModelError;

use super::Algorithm;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("periodic expansion failed: {0}")]
    Hyperperiod(#[from] HyperperiodError),

    /// An algorithm name did not match any known variant.
    #[error(
        "unknown scheduling algorithm: '{0}' (valid: ldf_single_node, edf_single_node, \
         ll_single_node, rms_single_node, ldf_multinode_no_delay, edf_multinode_no_delay, \
         ll_multinode_no_delay, rms_multinode_no_delay)"
    )]
    UnknownAlgorithm(String),

    /// The simulation clock passed `last release + total work`, which no
    /// valid run can reach.
    #[error("{algorithm}: simulation reached t={at}, past its horizon {horizon}")]
    HorizonExceeded {
        algorithm: Algorithm,
        at: u64,
        horizon: u64,
    },

    /// Work remains but nothing can run and nothing more will be released.
    #[error("{algorithm}: no runnable job at t={at} with {unfinished} instance(s) unfinished")]
    Stalled {
        algorithm: Algorithm,
        at: u64,
        unfinished: usize,
    },
}
