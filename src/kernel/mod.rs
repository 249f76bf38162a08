//! Numeric primitives consumed by the SSD matcher.
//!
//! A [`Backend`] supplies two pure functions over `f64` fields: a
//! zero-padded cross-correlation and a summed-area table. The matcher only
//! talks to this trait, so backends can be swapped without touching the
//! SSD identity.

use crate::image::Field;
use crate::util::{PartScoreError, PartScoreResult};

/// Cross-correlation and prefix-sum provider.
pub trait Backend {
    /// Correlates `image` with `kernel`, channel by channel.
    ///
    /// The kernel is anchored at `(kw / 2, kh / 2)`:
    /// `out(x, y, c) = sum_{tx, ty} image(x + tx - kw/2, y + ty - kh/2, c) * kernel(tx, ty, c)`,
    /// with image samples outside the grid read as zero. The output has the
    /// image's extent and channel count.
    fn cross_correlate(image: &Field<f64>, kernel: &Field<f64>) -> PartScoreResult<Field<f64>>;

    /// Builds a summed-area table with a zero row and column at the origin.
    ///
    /// For an `H x W x C` input the output is `(H + 1) x (W + 1) x C` and
    /// `out(x, y, c) = sum_{x' < x, y' < y} field(x', y', c)`.
    fn prefix_sum(field: &Field<f64>) -> PartScoreResult<Field<f64>>;
}

pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

pub use scalar::ScalarBackend;

#[cfg(feature = "simd")]
pub use simd::SimdBackend;

#[cfg(feature = "rayon")]
pub use self::rayon::RayonBackend;

/// Backend used by the matcher when no parallelism is requested.
#[cfg(feature = "simd")]
pub type DefaultBackend = SimdBackend;

/// Backend used by the matcher when no parallelism is requested.
#[cfg(not(feature = "simd"))]
pub type DefaultBackend = ScalarBackend;

pub(crate) fn check_same_channels(
    image: &Field<f64>,
    kernel: &Field<f64>,
) -> PartScoreResult<()> {
    if image.channels() != kernel.channels() {
        return Err(PartScoreError::ChannelMismatch {
            image: image.channels(),
            template: kernel.channels(),
        });
    }
    Ok(())
}

/// Range of kernel columns `[lo, hi)` that land inside the image for output
/// column `x`.
#[inline]
pub(crate) fn kernel_span(
    x: usize,
    anchor: usize,
    kernel_len: usize,
    image_len: usize,
) -> (usize, usize) {
    let lo = anchor.saturating_sub(x);
    let hi = (image_len + anchor).saturating_sub(x).min(kernel_len);
    (lo, hi.max(lo))
}
