//! Quadratic 1D fitting around a sampled minimum.

/// Estimates the sub-sample offset of a minimum from three samples.
///
/// Given samples at `x = -1, 0, +1` (`fm`, `f0`, `fp`), this returns the
/// vertex offset `dx` in `[-1, 1]` of the fitted parabola. Returns `None`
/// when the fit is not convex or ill-conditioned.
pub fn quad_min_offset_1d(fm: f64, f0: f64, fp: f64) -> Option<f64> {
    if !fm.is_finite() || !f0.is_finite() || !fp.is_finite() {
        return None;
    }

    let denom = fm - 2.0 * f0 + fp;
    if denom <= 1e-12 {
        return None;
    }

    let dx = 0.5 * (fm - fp) / denom;
    if dx.is_finite() && dx.abs() <= 1.0 {
        Some(dx)
    } else {
        None
    }
}
