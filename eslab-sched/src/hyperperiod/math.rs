/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! GCD and overflow-checked LCM over job periods.

use super::HyperperiodError;

/// Iterative Euclidean GCD.  `gcd(0, x) == x`.
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

/// LCM of two positive periods; `Err(Overflow)` if it does not fit in `u64`.
///
/// Computed as `(a / gcd(a, b)) * b` so the division happens first.
pub fn lcm(a: u64, b: u64) -> Result<u64, HyperperiodError> {
    if a == 0 || b == 0 {
        return Ok(0);
    }
    (a / gcd(a, b))
        .checked_mul(b)
        .ok_or(HyperperiodError::Overflow { a, b })
}

/// LCM of every period yielded by `periods`, or `None` if there are none.
pub fn lcm_all<I>(periods: I) -> Result<Option<u64>, HyperperiodError>
where
    I: IntoIterator<Item = u64>,
{
    periods.into_iter().try_fold(None, |acc, p| match acc {
        None => Ok(Some(p)),
        Some(prev) => lcm(prev, p).map(Some),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
