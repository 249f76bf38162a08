//! Sub-pixel refinement of score-map minima.

pub(crate) mod quad1d;

use crate::image::Field;
use quad1d::quad_min_offset_1d;

/// Refines an integer minimum at `(x, y)` with separable parabola fits.
///
/// Each axis is fitted only when both neighbours along it satisfy
/// `admissible`; otherwise that coordinate stays at the integer position.
pub(crate) fn refine_minimum(
    map: &Field<f64>,
    x: usize,
    y: usize,
    admissible: impl Fn(usize, usize) -> bool,
) -> (f64, f64) {
    let at = |x: usize, y: usize| map.get(x, y, 0).unwrap_or(f64::NAN);
    let center = at(x, y);

    let dx = if x > 0 && admissible(x - 1, y) && admissible(x + 1, y) {
        quad_min_offset_1d(at(x - 1, y), center, at(x + 1, y)).unwrap_or(0.0)
    } else {
        0.0
    };
    let dy = if y > 0 && admissible(x, y - 1) && admissible(x, y + 1) {
        quad_min_offset_1d(at(x, y - 1), center, at(x, y + 1)).unwrap_or(0.0)
    } else {
        0.0
    };

    (x as f64 + dx, y as f64 + dy)
}
