//! Non-maximum suppression for score-map candidates.

use crate::candidate::topk::{sort_peaks_best_first, Peak};

/// Keeps the best peak in each Chebyshev neighbourhood of `radius`.
///
/// Peaks are visited best first and dropped if they lie within `radius` of
/// an already kept peak.
pub fn nms_2d(peaks: &mut [Peak], radius: usize) -> Vec<Peak> {
    sort_peaks_best_first(peaks);
    if radius == 0 {
        return peaks.to_owned();
    }

    let mut kept: Vec<Peak> = Vec::new();
    'outer: for peak in peaks.iter().copied() {
        for other in kept.iter() {
            let dx = peak.x.abs_diff(other.x);
            let dy = peak.y.abs_diff(other.y);
            if dx.max(dy) <= radius {
                continue 'outer;
            }
        }
        kept.push(peak);
    }
    kept
}
