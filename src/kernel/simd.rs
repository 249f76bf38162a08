//! SIMD-accelerated correlation using the `wide` crate.
//!
//! The image and kernel are split into per-channel planes so the inner
//! product over a kernel row runs on contiguous memory, four `f64` lanes at
//! a time. Prefix sums are a sequential dependency chain and reuse the
//! scalar implementation.

use crate::image::Field;
use crate::kernel::scalar::ScalarBackend;
use crate::kernel::{check_same_channels, kernel_span, Backend};
use crate::util::alloc::try_with_capacity;
use crate::util::PartScoreResult;
use wide::f64x4;

const LANES: usize = 4;

/// Horizontal sum of f64x4.
#[inline]
fn hsum(v: f64x4) -> f64 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3]
}

#[inline]
fn load_f64x4(slice: &[f64]) -> f64x4 {
    f64x4::from([slice[0], slice[1], slice[2], slice[3]])
}

/// Dot product of two equal-length slices.
#[inline]
fn dot(a: &[f64], b: &[f64]) -> f64 {
    let simd_end = a.len() / LANES * LANES;
    let mut acc = f64x4::ZERO;
    let mut i = 0;
    while i < simd_end {
        acc += load_f64x4(&a[i..]) * load_f64x4(&b[i..]);
        i += LANES;
    }
    let mut tail = 0.0f64;
    while i < a.len() {
        tail += a[i] * b[i];
        i += 1;
    }
    hsum(acc) + tail
}

/// Splits an interleaved field into contiguous single-channel planes.
fn planes(field: &Field<f64>) -> PartScoreResult<Vec<Vec<f64>>> {
    let channels = field.channels();
    let mut out = Vec::with_capacity(channels);
    for _ in 0..channels {
        out.push(try_with_capacity(field.width() * field.height())?);
    }
    for (idx, &v) in field.data().iter().enumerate() {
        out[idx % channels].push(v);
    }
    Ok(out)
}

/// SIMD backend for the correlation inner loop.
pub struct SimdBackend;

impl Backend for SimdBackend {
    fn cross_correlate(image: &Field<f64>, kernel: &Field<f64>) -> PartScoreResult<Field<f64>> {
        check_same_channels(image, kernel)?;
        let channels = image.channels();
        let (width, height) = (image.width(), image.height());
        let (kw, kh) = (kernel.width(), kernel.height());
        let (ax, ay) = (kw / 2, kh / 2);
        let img_planes = planes(image)?;
        let ker_planes = planes(kernel)?;

        let mut out = Field::zeros(width, height, channels)?;
        let data = out.data_mut();
        for (c, (img, ker)) in img_planes.iter().zip(&ker_planes).enumerate() {
            for y in 0..height {
                let (ty_lo, ty_hi) = kernel_span(y, ay, kh, height);
                for x in 0..width {
                    let (tx_lo, tx_hi) = kernel_span(x, ax, kw, width);
                    if tx_lo >= tx_hi {
                        continue;
                    }
                    let ix = x + tx_lo - ax;
                    let run = tx_hi - tx_lo;
                    let mut acc = 0.0f64;
                    for ty in ty_lo..ty_hi {
                        let row = (y + ty - ay) * width + ix;
                        let krow = ty * kw + tx_lo;
                        acc += dot(&img[row..row + run], &ker[krow..krow + run]);
                    }
                    data[(y * width + x) * channels + c] = acc;
                }
            }
        }
        Ok(out)
    }

    fn prefix_sum(field: &Field<f64>) -> PartScoreResult<Field<f64>> {
        ScalarBackend::prefix_sum(field)
    }
}

#[cfg(test)]
mod tests {
    use super::{dot, SimdBackend};
    use crate::image::Field;
    use crate::kernel::{Backend, ScalarBackend};

    #[test]
    fn dot_handles_remainder_lanes() {
        let a: Vec<f64> = (1..=7).map(f64::from).collect();
        let b = vec![2.0; 7];
        assert_eq!(dot(&a, &b), 56.0);
    }

    #[test]
    fn simd_correlation_matches_scalar() {
        let image = Field::from_vec(
            (0..11 * 7 * 3).map(|v| ((v * 37) % 251) as f64).collect(),
            11,
            7,
            3,
        )
        .unwrap();
        let kernel = Field::from_vec(
            (0..6 * 4 * 3).map(|v| ((v * 13) % 17) as f64).collect(),
            6,
            4,
            3,
        )
        .unwrap();
        let simd = SimdBackend::cross_correlate(&image, &kernel).unwrap();
        let scalar = ScalarBackend::cross_correlate(&image, &kernel).unwrap();
        for (a, b) in simd.data().iter().zip(scalar.data()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
