//! Lowest-K candidate tracking for SSD minima.

use std::cmp::Ordering;

/// Integer-position candidate on a score map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the peak.
    pub x: usize,
    /// Y coordinate (row) of the peak.
    pub y: usize,
    /// SSD score at the peak; lower is better.
    pub score: f64,
}

/// Orders peaks best first: ascending score, then row, then column.
fn peak_cmp_best_first(a: &Peak, b: &Peak) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
}

/// Sorts peaks best first with deterministic tie-breaking.
pub(crate) fn sort_peaks_best_first(peaks: &mut [Peak]) {
    peaks.sort_by(peak_cmp_best_first);
}

/// Collector keeping the `k` lowest-scoring peaks, O(k) per insertion.
pub struct TopK {
    k: usize,
    items: Vec<Peak>,
}

impl TopK {
    /// Creates a new collector.
    pub fn new(k: usize) -> Self {
        Self {
            k,
            items: Vec::with_capacity(k),
        }
    }

    /// Pushes a peak, evicting the worst one when at capacity.
    pub fn push(&mut self, peak: Peak) {
        if self.k == 0 {
            return;
        }
        if self.items.len() < self.k {
            self.items.push(peak);
            return;
        }

        let mut worst_idx = 0usize;
        for (idx, item) in self.items.iter().enumerate().skip(1) {
            if peak_cmp_best_first(item, &self.items[worst_idx]) == Ordering::Greater {
                worst_idx = idx;
            }
        }

        if peak_cmp_best_first(&peak, &self.items[worst_idx]) == Ordering::Less {
            self.items[worst_idx] = peak;
        }
    }

    /// Returns the retained peaks, best first.
    pub fn into_sorted(mut self) -> Vec<Peak> {
        sort_peaks_best_first(&mut self.items);
        self.items
    }
}
