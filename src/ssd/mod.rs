//! Windowed sum-of-squared-differences matching.
//!
//! The score at a placement `p` is evaluated through the identity
//!
//! ```text
//! SSD(p) = sum_t image(p + t)^2 - 2 * xcorr(image, template)(p) + sum_t template(t)^2
//! ```
//!
//! where the first term comes from a summed-area table of the squared image,
//! the second from a [`Backend`] cross-correlation and the third from the
//! [`SsdTemplatePlan`]. Only the [`ValidBand`] of the returned map holds
//! exact scores.

mod band;
mod energy;
mod select;

pub use band::ValidBand;
pub use energy::window_energy;
pub use select::best_matches;

use crate::image::{Field, ImageView, Sample};
use crate::kernel::{Backend, DefaultBackend};
use crate::template::{SsdTemplatePlan, Template};
use crate::trace::{trace_event, trace_span};
use crate::util::{PartScoreError, PartScoreResult};

/// Which cells of the score map are evaluated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScoreRegion {
    /// Only the valid band; all other cells are zero.
    #[default]
    Valid,
    /// Every cell. Outside the valid band the image energy comes from a
    /// clamped window and the scores are approximations.
    Full,
}

/// Configuration for [`SsdMatcher`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SsdConfig {
    /// Cells to evaluate.
    pub region: ScoreRegion,
    /// Use the rayon backend when the `rayon` feature is enabled.
    pub parallel: bool,
}

/// Best match position with sub-pixel refinement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Match {
    /// Refined x coordinate of the template anchor in image space.
    pub x: f64,
    /// Refined y coordinate of the template anchor in image space.
    pub y: f64,
    /// SSD score at the integer minimum; lower is better.
    pub score: f64,
}

/// Template matcher producing SSD score maps.
pub struct SsdMatcher {
    plan: SsdTemplatePlan,
    cfg: SsdConfig,
}

impl SsdMatcher {
    /// Creates a matcher with the default configuration.
    pub fn new(plan: SsdTemplatePlan) -> Self {
        Self {
            plan,
            cfg: SsdConfig::default(),
        }
    }

    /// Creates a matcher for an owned template.
    pub fn from_template(template: &Template) -> PartScoreResult<Self> {
        Ok(Self::new(template.ssd_plan()?))
    }

    /// Overrides the configuration.
    pub fn with_config(mut self, cfg: SsdConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &SsdConfig {
        &self.cfg
    }

    /// Returns the template plan.
    pub fn plan(&self) -> &SsdTemplatePlan {
        &self.plan
    }

    /// Validates the image against the template and returns the valid band.
    pub fn band<S>(&self, image: ImageView<'_, S>) -> PartScoreResult<ValidBand> {
        if image.channels() != self.plan.channels() {
            return Err(PartScoreError::ChannelMismatch {
                image: image.channels(),
                template: self.plan.channels(),
            });
        }
        ValidBand::new(
            image.width(),
            image.height(),
            self.plan.width(),
            self.plan.height(),
        )
    }

    /// Computes the `H x W x 1` score map with the configured backend.
    pub fn score_map<S: Sample>(&self, image: ImageView<'_, S>) -> PartScoreResult<Field<f64>> {
        let band = self.band(image)?;
        self.score_configured(image, &band)
    }

    /// Computes the score map with an explicit backend.
    pub fn score_map_with<B: Backend, S: Sample>(
        &self,
        image: ImageView<'_, S>,
    ) -> PartScoreResult<Field<f64>> {
        let band = self.band(image)?;
        self.score_in_band::<B, S>(image, &band)
    }

    fn score_configured<S: Sample>(
        &self,
        image: ImageView<'_, S>,
        band: &ValidBand,
    ) -> PartScoreResult<Field<f64>> {
        #[cfg(feature = "rayon")]
        {
            if self.cfg.parallel {
                return self.score_in_band::<crate::kernel::RayonBackend, S>(image, band);
            }
        }
        self.score_in_band::<DefaultBackend, S>(image, band)
    }

    /// Scores `image` once `band` has been validated against it.
    fn score_in_band<B: Backend, S: Sample>(
        &self,
        image: ImageView<'_, S>,
        band: &ValidBand,
    ) -> PartScoreResult<Field<f64>> {
        let _span = trace_span!(
            "ssd_score_map",
            width = image.width(),
            height = image.height(),
            channels = image.channels()
        )
        .entered();

        let img = Field::from_view(image)?;
        let xcorr = B::cross_correlate(&img, self.plan.samples())?;
        let sat = B::prefix_sum(&img.squared()?)?;

        let mut out = Field::zeros(img.width(), img.height(), 1)?;
        let (x_range, y_range) = match self.cfg.region {
            ScoreRegion::Valid => (band.x0()..=band.x1(), band.y0()..=band.y1()),
            ScoreRegion::Full => (0..=img.width() - 1, 0..=img.height() - 1),
        };
        let (tpl_w, tpl_h) = (self.plan.width(), self.plan.height());
        let energy = self.plan.energy();
        let xc = xcorr.data();
        for y in y_range {
            for x in x_range.clone() {
                let mut score = 0.0f64;
                for (c, &tpl_energy) in energy.iter().enumerate() {
                    let local = window_energy(&sat, x, y, tpl_w, tpl_h, c);
                    score += local - 2.0 * xc[xcorr.index(x, y, c)] + tpl_energy;
                }
                out.set(x, y, 0, score);
            }
        }

        trace_event!(
            "ssd_score_map_done",
            band_width = band.width(),
            band_height = band.height()
        );
        Ok(out)
    }

    /// Returns up to `k` best (lowest-SSD) matches inside the valid band.
    ///
    /// Candidates closer than `nms_radius` (Chebyshev) to a better one are
    /// suppressed; positions are refined to sub-pixel precision.
    pub fn best_matches<S: Sample>(
        &self,
        image: ImageView<'_, S>,
        k: usize,
        nms_radius: usize,
    ) -> PartScoreResult<Vec<Match>> {
        let band = self.band(image)?;
        let map = self.score_configured(image, &band)?;
        Ok(select::best_matches(&map, &band, k, nms_radius))
    }
}

/// Scores `template` against every window of `image`.
///
/// Convenience wrapper around [`SsdMatcher`] with the default configuration.
/// Returns an `H x W x 1` map whose valid band holds the SSD; cells outside
/// it are zero.
pub fn match_ssd<S: Sample, T: Sample>(
    image: ImageView<'_, S>,
    template: ImageView<'_, T>,
) -> PartScoreResult<Field<f64>> {
    let plan = SsdTemplatePlan::from_view(template)?;
    SsdMatcher::new(plan).score_map(image)
}

#[cfg(test)]
mod tests {
    use super::{match_ssd, ScoreRegion, SsdConfig, SsdMatcher};
    use crate::image::ImageView;
    use crate::template::SsdTemplatePlan;
    use crate::util::PartScoreError;

    #[test]
    fn planted_template_scores_zero() {
        let (w, h) = (9, 7);
        let image: Vec<u8> = (0..w * h).map(|v| ((v * 29) % 200) as u8).collect();
        let view = ImageView::from_slice(&image, w, h).unwrap();
        let tpl = view.roi(3, 2, 3, 3).unwrap();
        let map = match_ssd(view, tpl).unwrap();
        // Anchor of a 3x3 template sits one pixel in from its corner.
        assert_eq!(map.get(4, 3, 0), Some(0.0));
        assert!(map.get(5, 3, 0).unwrap() > 0.0);
        // Outside the band nothing is written.
        assert_eq!(map.get(0, 0, 0), Some(0.0));
        assert_eq!(map.get(w - 1, h - 1, 0), Some(0.0));
    }

    #[test]
    fn rejects_template_as_large_as_image() {
        let data = [0u8; 16];
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        let err = match_ssd(view, view).err().unwrap();
        assert_eq!(
            err,
            PartScoreError::TemplateTooLarge {
                tpl_width: 4,
                tpl_height: 4,
                img_width: 4,
                img_height: 4,
            }
        );
    }

    #[test]
    fn rejects_channel_mismatch() {
        let rgb = [0u8; 5 * 5 * 3];
        let gray = [0u8; 4];
        let image = ImageView::with_channels(&rgb, 5, 5, 3).unwrap();
        let tpl = ImageView::from_slice(&gray, 2, 2).unwrap();
        let err = match_ssd(image, tpl).err().unwrap();
        assert_eq!(
            err,
            PartScoreError::ChannelMismatch {
                image: 3,
                template: 1
            }
        );
    }

    #[test]
    fn matcher_entry_points_share_one_validation() {
        let rgb = [0u8; 6 * 6 * 3];
        let image = ImageView::with_channels(&rgb, 6, 6, 3).unwrap();
        let gray = [0u8; 9];
        let plan = SsdTemplatePlan::from_view(ImageView::from_slice(&gray, 3, 3).unwrap()).unwrap();
        let matcher = SsdMatcher::new(plan);
        let mismatch = PartScoreError::ChannelMismatch {
            image: 3,
            template: 1,
        };
        assert_eq!(matcher.best_matches(image, 1, 0).err().unwrap(), mismatch);
        assert_eq!(matcher.score_map(image).err().unwrap(), mismatch);
        assert_eq!(
            matcher
                .score_map_with::<crate::kernel::ScalarBackend, u8>(image)
                .err()
                .unwrap(),
            mismatch
        );

        let big = [0u8; 7 * 7];
        let too_large = ImageView::from_slice(&big, 7, 7).unwrap();
        let small = ImageView::from_slice(&gray, 3, 3).unwrap();
        assert!(matches!(
            match_ssd(small, too_large),
            Err(PartScoreError::TemplateTooLarge { .. })
        ));
    }

    #[test]
    fn full_region_fills_border_and_keeps_band() {
        let (w, h) = (8, 6);
        let image: Vec<u8> = (0..w * h).map(|v| ((v * 13) % 97) as u8).collect();
        let view = ImageView::from_slice(&image, w, h).unwrap();
        let plan = SsdTemplatePlan::from_view(view.roi(1, 1, 3, 3).unwrap()).unwrap();
        let valid = SsdMatcher::new(plan.clone()).score_map(view).unwrap();
        let full = SsdMatcher::new(plan)
            .with_config(SsdConfig {
                region: ScoreRegion::Full,
                ..SsdConfig::default()
            })
            .score_map(view)
            .unwrap();

        for y in 1..=h - 3 {
            for x in 1..=w - 3 {
                assert_eq!(valid.get(x, y, 0), full.get(x, y, 0));
            }
        }
        assert!(full.get(0, 0, 0).unwrap().is_finite());
        assert!(full.get(0, 0, 0).unwrap() != 0.0);
    }
}
