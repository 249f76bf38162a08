//! Template storage and precomputation.

use crate::image::{Field, ImageView};
use crate::util::PartScoreResult;

mod plan;

pub use plan::SsdTemplatePlan;

/// Owned template grid of 8-bit samples.
pub struct Template {
    img: Field<u8>,
}

impl Template {
    /// Creates a single-channel template from a contiguous buffer.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> PartScoreResult<Self> {
        Self::with_channels(data, width, height, 1)
    }

    /// Creates a template with `channels` interleaved samples per pixel.
    pub fn with_channels(
        data: Vec<u8>,
        width: usize,
        height: usize,
        channels: usize,
    ) -> PartScoreResult<Self> {
        let img = Field::from_vec(data, width, height, channels)?;
        Ok(Self { img })
    }

    /// Returns a borrowed view of the template data.
    pub fn view(&self) -> ImageView<'_, u8> {
        self.img.view()
    }

    /// Builds the SSD plan for this template.
    pub fn ssd_plan(&self) -> PartScoreResult<SsdTemplatePlan> {
        SsdTemplatePlan::from_view(self.view())
    }
}

impl From<Field<u8>> for Template {
    fn from(img: Field<u8>) -> Self {
        Self { img }
    }
}
