//! Template plan precomputation for SSD scoring.

use crate::image::{Field, ImageView, Sample};
use crate::util::PartScoreResult;

/// Template samples widened to `f64` together with their per-channel energy.
///
/// The energy term `sum_t template(t, c)^2` is constant across placements,
/// so it is accumulated once here rather than per window.
#[derive(Clone, Debug)]
pub struct SsdTemplatePlan {
    samples: Field<f64>,
    energy: Vec<f64>,
}

impl SsdTemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view<S: Sample>(tpl: ImageView<'_, S>) -> PartScoreResult<Self> {
        let samples = Field::from_view(tpl)?;
        let channels = samples.channels();
        let mut energy = vec![0.0f64; channels];
        for (idx, &v) in samples.data().iter().enumerate() {
            energy[idx % channels] += v * v;
        }
        Ok(Self { samples, energy })
    }

    /// Returns the template width in pixels.
    pub fn width(&self) -> usize {
        self.samples.width()
    }

    /// Returns the template height in pixels.
    pub fn height(&self) -> usize {
        self.samples.height()
    }

    /// Returns the number of channels.
    pub fn channels(&self) -> usize {
        self.samples.channels()
    }

    /// Returns the template samples as an `f64` field.
    pub fn samples(&self) -> &Field<f64> {
        &self.samples
    }

    /// Returns `sum_t template(t, c)^2` for each channel `c`.
    pub fn energy(&self) -> &[f64] {
        &self.energy
    }

    /// Total energy summed over channels.
    pub fn total_energy(&self) -> f64 {
        self.energy.iter().sum()
    }

    /// Offset of the template anchor from its top-left corner, `(w / 2, h / 2)`.
    pub fn anchor(&self) -> (usize, usize) {
        (self.width() / 2, self.height() / 2)
    }
}
