//! Divide-and-conquer 1D generalized distance transform.
//!
//! For a destination range the midpoint is solved by a linear scan over the
//! admissible sources; its minimizer then splits the source range for the
//! two halves. With `a >= 0` every source contributes a convex parabola, so
//! the minimizer is non-decreasing in the destination index and the split
//! never discards the optimum.

use crate::dt::{check_axis, check_costs_1d, Transform1d};
use crate::util::alloc::try_filled_vec;
use crate::util::{Axis, PartScoreError, PartScoreResult};

/// Computes `values[d] = min_s src[s] + a*(d - s)^2 + b*(d - s)` and the
/// minimizing `s` for every `d`.
///
/// Ties go to the smallest source index. Sources may be `+inf` (never
/// chosen while a finite source exists) but not NaN. Coefficient
/// violations are reported on [`Axis::X`].
pub fn transform_1d(src: &[f64], a: f64, b: f64) -> PartScoreResult<Transform1d> {
    check_axis(Axis::X, a, b)?;
    check_costs_1d(src)?;
    let mut values = try_filled_vec(src.len(), 0.0f64)?;
    let mut argmin = try_filled_vec(src.len(), 0usize)?;
    solve(src, &mut values, &mut argmin, a, b);
    Ok(Transform1d { values, argmin })
}

/// Like [`transform_1d`], writing into caller-provided buffers.
pub fn transform_1d_into(
    src: &[f64],
    dst: &mut [f64],
    arg: &mut [usize],
    a: f64,
    b: f64,
) -> PartScoreResult<()> {
    check_axis(Axis::X, a, b)?;
    for got in [dst.len(), arg.len()] {
        if got != src.len() {
            return Err(PartScoreError::LengthMismatch {
                expected: src.len(),
                got,
            });
        }
    }
    check_costs_1d(src)?;
    solve(src, dst, arg, a, b);
    Ok(())
}

/// Unchecked entry point; buffers must have equal length.
pub(crate) fn solve(src: &[f64], dst: &mut [f64], arg: &mut [usize], a: f64, b: f64) {
    if src.is_empty() {
        return;
    }
    let problem = Problem { src, a, b };
    problem.split(dst, arg, 0, src.len(), 0, src.len() - 1);
}

struct Problem<'a> {
    src: &'a [f64],
    a: f64,
    b: f64,
}

impl Problem<'_> {
    #[inline]
    fn cost(&self, d: usize, s: usize) -> f64 {
        let diff = d as f64 - s as f64;
        self.src[s] + self.a * diff * diff + self.b * diff
    }

    /// Solves destinations `[d_lo, d_hi)` using sources `[s_lo, s_hi]`.
    fn split(
        &self,
        dst: &mut [f64],
        arg: &mut [usize],
        d_lo: usize,
        d_hi: usize,
        s_lo: usize,
        s_hi: usize,
    ) {
        if d_lo >= d_hi {
            return;
        }
        let d = (d_lo + d_hi - 1) / 2;

        let mut best = s_lo;
        let mut best_cost = self.cost(d, s_lo);
        for s in s_lo + 1..=s_hi {
            let cost = self.cost(d, s);
            // Strict comparison keeps the first (smallest) index on ties.
            if best_cost > cost {
                best = s;
                best_cost = cost;
            }
        }
        dst[d] = best_cost;
        arg[d] = best;

        self.split(dst, arg, d_lo, d, s_lo, best);
        self.split(dst, arg, d + 1, d_hi, best, s_hi);
    }
}
