//! Windowed energy lookups on a summed-area table.

use crate::image::Field;
use crate::util::math::clamp_index;

/// Sum of squared image samples in channel `channel` over the template-sized
/// window anchored at `(x, y)`.
///
/// `sat` is the zero-origin summed-area table of the squared image
/// (`(H + 1) x (W + 1)`). The window spans columns
/// `[x - tpl_width / 2, x - tpl_width / 2 + tpl_width)` and the analogous
/// rows. Corner indices falling outside the table are clamped to its
/// bounds, so near the border this returns the energy of the clipped window
/// rather than a zero-padded one. Callers only trust the valid band, where
/// no clamping occurs.
pub fn window_energy(
    sat: &Field<f64>,
    x: usize,
    y: usize,
    tpl_width: usize,
    tpl_height: usize,
    channel: usize,
) -> f64 {
    let max_x = sat.width() - 1;
    let max_y = sat.height() - 1;
    let left = x as isize - (tpl_width / 2) as isize;
    let top = y as isize - (tpl_height / 2) as isize;
    let x0 = clamp_index(left, max_x);
    let x1 = clamp_index(left + tpl_width as isize, max_x);
    let y0 = clamp_index(top, max_y);
    let y1 = clamp_index(top + tpl_height as isize, max_y);

    let data = sat.data();
    data[sat.index(x1, y1, channel)] - data[sat.index(x0, y1, channel)]
        - data[sat.index(x1, y0, channel)]
        + data[sat.index(x0, y0, channel)]
}
