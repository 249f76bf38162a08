//! Scalar reference implementations of the backend primitives.

use crate::image::Field;
use crate::kernel::{check_same_channels, kernel_span, Backend};
use crate::util::PartScoreResult;

/// Single-threaded scalar backend.
pub struct ScalarBackend;

impl Backend for ScalarBackend {
    fn cross_correlate(image: &Field<f64>, kernel: &Field<f64>) -> PartScoreResult<Field<f64>> {
        check_same_channels(image, kernel)?;
        let mut out = Field::zeros(image.width(), image.height(), image.channels())?;
        for y in 0..image.height() {
            correlate_row(image, kernel, y, out.row_mut(y));
        }
        Ok(out)
    }

    fn prefix_sum(field: &Field<f64>) -> PartScoreResult<Field<f64>> {
        let channels = field.channels();
        let mut out = Field::zeros(field.width() + 1, field.height() + 1, channels)?;
        let mut running = vec![0.0f64; channels];
        for y in 0..field.height() {
            running.fill(0.0);
            let src = field.row(y);
            for x in 0..field.width() {
                for c in 0..channels {
                    running[c] += src[x * channels + c];
                    let above = out.data()[out.index(x + 1, y, c)];
                    let idx = out.index(x + 1, y + 1, c);
                    out.data_mut()[idx] = above + running[c];
                }
            }
        }
        Ok(out)
    }
}

/// Computes one output row of the zero-padded correlation.
///
/// `out` must hold `image.width() * image.channels()` samples and is
/// overwritten.
pub(crate) fn correlate_row(image: &Field<f64>, kernel: &Field<f64>, y: usize, out: &mut [f64]) {
    let channels = image.channels();
    let (ax, ay) = (kernel.width() / 2, kernel.height() / 2);
    let (ty_lo, ty_hi) = kernel_span(y, ay, kernel.height(), image.height());
    out.fill(0.0);

    for x in 0..image.width() {
        let (tx_lo, tx_hi) = kernel_span(x, ax, kernel.width(), image.width());
        if tx_lo >= tx_hi {
            continue;
        }
        let acc = &mut out[x * channels..(x + 1) * channels];
        for ty in ty_lo..ty_hi {
            let iy = y + ty - ay;
            let ix = x + tx_lo - ax;
            let img = &image.row(iy)[ix * channels..(ix + tx_hi - tx_lo) * channels];
            let ker = &kernel.row(ty)[tx_lo * channels..tx_hi * channels];
            for (i, (&a, &b)) in img.iter().zip(ker).enumerate() {
                acc[i % channels] += a * b;
            }
        }
    }
}
