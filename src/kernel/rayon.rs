//! Rayon-parallel backend (feature-gated).
//!
//! Correlation rows are independent and run on the rayon pool. The prefix
//! sum parallelises the horizontal running sums; the vertical accumulation
//! is a single sequential sweep over rows.

use crate::image::Field;
use crate::kernel::scalar::correlate_row;
use crate::kernel::{check_same_channels, Backend};
use crate::util::PartScoreResult;
use rayon::prelude::*;

/// Row-parallel backend.
pub struct RayonBackend;

impl Backend for RayonBackend {
    fn cross_correlate(image: &Field<f64>, kernel: &Field<f64>) -> PartScoreResult<Field<f64>> {
        check_same_channels(image, kernel)?;
        let row_len = image.width() * image.channels();
        let mut out = Field::zeros(image.width(), image.height(), image.channels())?;
        out.data_mut()
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| correlate_row(image, kernel, y, row));
        Ok(out)
    }

    fn prefix_sum(field: &Field<f64>) -> PartScoreResult<Field<f64>> {
        let channels = field.channels();
        let src_len = field.width() * channels;
        let row_len = (field.width() + 1) * channels;
        let mut out = Field::zeros(field.width() + 1, field.height() + 1, channels)?;

        // Horizontal running sums into rows 1..=H; row 0 stays zero.
        out.data_mut()[row_len..]
            .par_chunks_mut(row_len)
            .zip(field.data().par_chunks(src_len))
            .for_each(|(dst, src)| {
                for x in 0..field.width() {
                    for c in 0..channels {
                        dst[(x + 1) * channels + c] = dst[x * channels + c] + src[x * channels + c];
                    }
                }
            });

        let data = out.data_mut();
        for y in 2..=field.height() {
            let (above, rest) = data.split_at_mut(y * row_len);
            let prev = &above[(y - 1) * row_len..];
            for (cur, &p) in rest[..row_len].iter_mut().zip(prev) {
                *cur += p;
            }
        }
        Ok(out)
    }
}
