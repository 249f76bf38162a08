//! Numeric helpers shared by the kernels.

/// Quadratic-plus-linear displacement penalty `a·d² + b·d`.
#[inline]
pub(crate) fn deformation_cost(a: f64, b: f64, d: isize) -> f64 {
    let d = d as f64;
    a * d * d + b * d
}

/// Clamps a signed index into `[0, len]`.
#[inline]
pub(crate) fn clamp_index(index: isize, len: usize) -> usize {
    index.clamp(0, len as isize) as usize
}

/// `ceil(log2(n + 1))`: recursion depth of a midpoint bisection over `n` items.
pub(crate) fn bisection_depth(n: usize) -> u32 {
    usize::BITS - n.leading_zeros()
}
