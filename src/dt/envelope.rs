//! Linear-time 1D distance transform by lower-envelope sweep.
//!
//! Each source `q` contributes the parabola `a*(d - q)^2 + b*(d - q) + src[q]`.
//! All parabolas share the leading coefficient `a`, so any two intersect
//! exactly once and the lower envelope can be built left to right in a
//! single pass, then sampled at every destination.

use crate::dt::{check_axis, check_costs_1d, Transform1d};
use crate::util::alloc::try_filled_vec;
use crate::util::{Axis, PartScoreError, PartScoreResult};

/// Computes the same transform as [`transform_1d`](crate::dt::transform_1d)
/// in `O(n)`.
///
/// Requires `a > 0` and finite source costs; NaN is reported as
/// `NanCost` like the divide-and-conquer method. Values agree with the
/// divide-and-conquer method up to rounding; on exact ties the reported
/// source may differ.
pub fn transform_1d_envelope(src: &[f64], a: f64, b: f64) -> PartScoreResult<Transform1d> {
    check_axis(Axis::X, a, b)?;
    check_envelope_quadratic(a)?;
    check_costs_1d(src)?;
    if src.iter().any(|v| v.is_infinite()) {
        return Err(infinite_cost_error());
    }
    let mut values = try_filled_vec(src.len(), 0.0f64)?;
    let mut argmin = try_filled_vec(src.len(), 0usize)?;
    let mut scratch = Scratch::default();
    solve(src, &mut values, &mut argmin, a, b, &mut scratch);
    Ok(Transform1d { values, argmin })
}

pub(crate) fn check_envelope_quadratic(a: f64) -> PartScoreResult<()> {
    if a <= 0.0 {
        return Err(PartScoreError::InvalidInput(
            "lower-envelope transform needs a strictly positive quadratic coefficient",
        ));
    }
    Ok(())
}

pub(crate) fn infinite_cost_error() -> PartScoreError {
    PartScoreError::InvalidInput("lower-envelope transform needs finite source costs")
}

/// Reusable envelope buffers: parabola vertices and breakpoints.
#[derive(Default)]
pub(crate) struct Scratch {
    vertices: Vec<usize>,
    breaks: Vec<f64>,
}

/// Unchecked entry point; buffers must have equal length.
pub(crate) fn solve(
    src: &[f64],
    dst: &mut [f64],
    arg: &mut [usize],
    a: f64,
    b: f64,
    scratch: &mut Scratch,
) {
    let n = src.len();
    if n == 0 {
        return;
    }
    // Source-only part of the parabola: a*q^2 - b*q + src[q].
    let offset = |q: usize| {
        let qf = q as f64;
        src[q] + a * qf * qf - b * qf
    };

    let v = &mut scratch.vertices;
    let z = &mut scratch.breaks;
    v.clear();
    z.clear();
    v.push(0);
    z.push(f64::NEG_INFINITY);
    z.push(f64::INFINITY);

    for q in 1..n {
        let fq = offset(q);
        loop {
            let p = v[v.len() - 1];
            let s = (fq - offset(p)) / (2.0 * a * (q - p) as f64);
            if s <= z[v.len() - 1] {
                // q undercuts the top parabola over its whole span. z[0] is
                // -inf, so the first vertex always survives.
                v.pop();
                z.pop();
                continue;
            }
            let last = z.len() - 1;
            z[last] = s;
            v.push(q);
            z.push(f64::INFINITY);
            break;
        }
    }

    let mut k = 0usize;
    for d in 0..n {
        let df = d as f64;
        while z[k + 1] < df {
            k += 1;
        }
        let s = v[k];
        let diff = df - s as f64;
        dst[d] = src[s] + a * diff * diff + b * diff;
        arg[d] = s;
    }
}

#[cfg(test)]
mod tests {
    use super::transform_1d_envelope;
    use crate::dt::transform_1d;
    use crate::util::PartScoreError;

    #[test]
    fn agrees_with_divide_and_conquer() {
        let src = [4.0, 9.0, 1.0, 1.5, 7.0, 0.0, 3.0, 8.0, 8.0, 2.5, 6.0];
        for (a, b) in [(1.0, 0.0), (0.1, 1.0), (0.3, -2.0), (5.0, 0.5)] {
            let env = transform_1d_envelope(&src, a, b).unwrap();
            let dc = transform_1d(&src, a, b).unwrap();
            for (x, y) in env.values.iter().zip(&dc.values) {
                assert!((x - y).abs() < 1e-9, "{x} vs {y} for a={a} b={b}");
            }
        }
    }

    #[test]
    fn rejects_degenerate_inputs() {
        assert!(matches!(
            transform_1d_envelope(&[1.0, 2.0], 0.0, 1.0),
            Err(PartScoreError::InvalidInput(_))
        ));
        assert!(matches!(
            transform_1d_envelope(&[1.0, f64::INFINITY], 1.0, 0.0),
            Err(PartScoreError::InvalidInput(_))
        ));
        assert_eq!(
            transform_1d_envelope(&[1.0, f64::NAN], 1.0, 0.0)
                .err()
                .unwrap(),
            PartScoreError::NanCost { x: 1, y: 0 }
        );
    }
}
