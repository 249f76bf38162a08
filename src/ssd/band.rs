//! Valid-output region of an SSD score map.

use crate::image::Field;
use crate::util::{PartScoreError, PartScoreResult};

/// Inclusive rectangle of score-map cells whose template window lies fully
/// inside the image.
///
/// For an `H x W` image and an `h x w` template the band spans rows
/// `[h / 2, H - ceil(h / 2) - 1]` and columns `[w / 2, W - ceil(w / 2) - 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidBand {
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl ValidBand {
    /// Computes the band; fails unless the template is strictly smaller than
    /// the image on both axes.
    pub fn new(
        img_width: usize,
        img_height: usize,
        tpl_width: usize,
        tpl_height: usize,
    ) -> PartScoreResult<Self> {
        if tpl_width == 0 || tpl_height == 0 {
            return Err(PartScoreError::InvalidDimensions {
                width: tpl_width,
                height: tpl_height,
            });
        }
        if tpl_width >= img_width || tpl_height >= img_height {
            return Err(PartScoreError::TemplateTooLarge {
                tpl_width,
                tpl_height,
                img_width,
                img_height,
            });
        }
        Ok(Self {
            x0: tpl_width / 2,
            y0: tpl_height / 2,
            x1: img_width - tpl_width.div_ceil(2) - 1,
            y1: img_height - tpl_height.div_ceil(2) - 1,
        })
    }

    /// First valid column.
    pub fn x0(&self) -> usize {
        self.x0
    }

    /// First valid row.
    pub fn y0(&self) -> usize {
        self.y0
    }

    /// Last valid column (inclusive).
    pub fn x1(&self) -> usize {
        self.x1
    }

    /// Last valid row (inclusive).
    pub fn y1(&self) -> usize {
        self.y1
    }

    /// Number of valid columns.
    pub fn width(&self) -> usize {
        self.x1 - self.x0 + 1
    }

    /// Number of valid rows.
    pub fn height(&self) -> usize {
        self.y1 - self.y0 + 1
    }

    /// Returns whether `(x, y)` lies inside the band.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.y0..=self.y1).contains(&y)
    }

    /// Copies the band out of a full-extent score map.
    pub fn crop<T: Copy + Default>(&self, map: &Field<T>) -> PartScoreResult<Field<T>> {
        map.crop(self.x0, self.y0, self.width(), self.height())
    }
}
