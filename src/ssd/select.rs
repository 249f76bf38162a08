//! Best-match extraction from SSD score maps.

use crate::candidate::nms::nms_2d;
use crate::candidate::topk::{Peak, TopK};
use crate::image::Field;
use crate::refine::refine_minimum;
use crate::ssd::{Match, ValidBand};

/// Returns up to `k` lowest-scoring cells of `map` inside `band`.
///
/// The `k` best cells are collected first, then thinned with Chebyshev NMS
/// of `nms_radius`, so fewer than `k` matches may be returned. Each
/// survivor is refined with a parabola fit along each axis using only
/// neighbours inside the band.
pub fn best_matches(
    map: &Field<f64>,
    band: &ValidBand,
    k: usize,
    nms_radius: usize,
) -> Vec<Match> {
    if k == 0 {
        return Vec::new();
    }

    let mut topk = TopK::new(k);
    for y in band.y0()..=band.y1() {
        for x in band.x0()..=band.x1() {
            if let Some(score) = map.get(x, y, 0).filter(|v| v.is_finite()) {
                topk.push(Peak { x, y, score });
            }
        }
    }

    let mut peaks = topk.into_sorted();
    nms_2d(&mut peaks, nms_radius)
        .into_iter()
        .map(|peak| {
            let (x, y) = refine_minimum(map, peak.x, peak.y, |x, y| band.contains(x, y));
            Match {
                x,
                y,
                score: peak.score,
            }
        })
        .collect()
}
