//! Pattern-to-index planning.
//!
//! A pattern's bound fields are described by a 3-bit mask (subject = bit 0,
//! predicate = bit 1, object = bit 2). For every mask the planner picks the
//! rotation whose leading fields are all bound for the longest run, so the
//! bound values form a contiguous key prefix. Plans for all 8 masks are built
//! at compile time.

use crate::core::{IdPattern, TermId, SEPARATOR};
use crate::indexing::key_codec::Rotation;

/// How to answer one pattern shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub rotation: Rotation,
    /// Number of leading key fields (after the context) fixed by the pattern.
    pub bound_len: usize,
}

/// Length of the run of bound fields starting at canonical position `start`, wrapping modulo 3.
pub const fn run_length(start: usize, mask: usize) -> usize {
    let mut len = 0;
    while len < 3 && mask & (1 << ((start + len) % 3)) != 0 {
        len += 1;
    }
    len
}

/// Ranking of a rotation start for `mask`: `(2^run_length, 2 - start)`, higher wins.
/// On equal runs the second component prefers the lower start.
pub const fn score(start: usize, mask: usize) -> (usize, usize) {
    (1 << run_length(start, mask), 2 - start)
}

const fn build_plan(mask: usize) -> Plan {
    let mut best_start = 0;
    let mut best = score(0, mask);
    let mut start = 1;
    while start < 3 {
        let candidate = score(start, mask);
        if candidate.0 > best.0 || (candidate.0 == best.0 && candidate.1 > best.1) {
            best = candidate;
            best_start = start;
        }
        start += 1;
    }
    Plan { rotation: Rotation::from_start(best_start), bound_len: run_length(best_start, mask) }
}

/// Plan for every bound-field mask, indexed by mask.
pub const PLANS: [Plan; 8] = {
    let mut plans = [Plan { rotation: Rotation::Spo, bound_len: 0 }; 8];
    let mut mask = 0;
    while mask < 8 {
        plans[mask] = build_plan(mask);
        mask += 1;
    }
    plans
};

/// A concrete scan: which physical index to walk and the key prefix bounding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    pub rotation: Rotation,
    pub prefix: String,
}

pub struct PatternPlanner;

impl PatternPlanner {
    pub fn plan_for_mask(mask: usize) -> Plan {
        PLANS[mask & 0b111]
    }

    /// Index and prefix answering `pattern`, restricted to `context`'s rows when
    /// given and to the context-free rows otherwise.
    pub fn plan(pattern: &IdPattern, context: Option<TermId>) -> ScanPlan {
        let plan = Self::plan_for_mask(pattern.mask());
        let fields = pattern.positions();

        let mut prefix = String::with_capacity(32);
        if let Some(context) = context {
            prefix.push_str(&context.to_string());
        }
        prefix.push(SEPARATOR);
        for &position in &plan.rotation.order()[..plan.bound_len] {
            match fields[position] {
                Some(id) => {
                    prefix.push_str(&id.to_string());
                    prefix.push(SEPARATOR);
                }
                None => break,
            }
        }

        ScanPlan { rotation: plan.rotation, prefix }
    }
}
