//! Sample grids: borrowed views and owned fields.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer of interleaved
//! channels with an explicit stride. The stride counts elements between the
//! starts of consecutive rows, so a stride larger than `width * channels`
//! represents padded rows. ROI slices are zero-copy views into the same
//! backing slice and retain the original stride.

use crate::util::{PartScoreError, PartScoreResult};

mod field;
#[cfg(feature = "image-io")]
pub mod io;

pub use field::Field;

/// Numeric sample type that kernels read as `f64`.
pub trait Sample: Copy + Send + Sync {
    /// Widens the sample to `f64` without rounding.
    fn to_f64(self) -> f64;
}

macro_rules! impl_sample {
    ($($ty:ty),*) => {
        $(impl Sample for $ty {
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        })*
    };
}

impl_sample!(u8, u16, u32, i16, i32, f32, f64);

/// Borrowed 2D grid with interleaved channels and an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous single-channel view.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> PartScoreResult<Self> {
        Self::new(data, width, height, 1, width)
    }

    /// Creates a contiguous view with `channels` interleaved samples per pixel.
    pub fn with_channels(
        data: &'a [T],
        width: usize,
        height: usize,
        channels: usize,
    ) -> PartScoreResult<Self> {
        let stride = width
            .checked_mul(channels)
            .ok_or(PartScoreError::InvalidDimensions { width, height })?;
        Self::new(data, width, height, channels, stride)
    }

    /// Creates a view with an explicit stride (in elements).
    pub fn new(
        data: &'a [T],
        width: usize,
        height: usize,
        channels: usize,
        stride: usize,
    ) -> PartScoreResult<Self> {
        let needed = required_len(width, height, channels, stride)?;
        if data.len() < needed {
            return Err(PartScoreError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
            stride,
        })
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the number of interleaved channels.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the sample at `(x, y, channel)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize, channel: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height || channel >= self.channels {
            return None;
        }
        let idx = y
            .checked_mul(self.stride)?
            .checked_add(x.checked_mul(self.channels)?)?
            .checked_add(channel)?;
        self.data.get(idx)
    }

    /// Returns row `y` as `width * channels` interleaved samples.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width * self.channels)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> PartScoreResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(PartScoreError::InvalidDimensions { width, height });
        }
        let out_of_bounds = PartScoreError::RoiOutOfBounds {
            x,
            y,
            width,
            height,
            img_width: self.width,
            img_height: self.height,
        };
        let end_x = x.checked_add(width).ok_or_else(|| out_of_bounds.clone())?;
        let end_y = y.checked_add(height).ok_or_else(|| out_of_bounds.clone())?;
        if end_x > self.width || end_y > self.height {
            return Err(out_of_bounds);
        }

        let start = y * self.stride + x * self.channels;
        let data = self
            .data
            .get(start..)
            .ok_or(PartScoreError::BufferTooSmall {
                needed: start.saturating_add(1),
                got: self.data.len(),
            })?;

        ImageView::new(data, width, height, self.channels, self.stride)
    }
}

impl<T: Sample> ImageView<'_, T> {
    /// Returns the sample at `(x, y, channel)` widened to `f64`, or zero
    /// outside the grid.
    #[inline]
    pub fn sample_or_zero(&self, x: isize, y: isize, channel: usize) -> f64 {
        if x < 0 || y < 0 {
            return 0.0;
        }
        self.get(x as usize, y as usize, channel)
            .map_or(0.0, |v| v.to_f64())
    }
}

fn required_len(
    width: usize,
    height: usize,
    channels: usize,
    stride: usize,
) -> PartScoreResult<usize> {
    if width == 0 || height == 0 || channels == 0 {
        return Err(PartScoreError::InvalidDimensions { width, height });
    }
    let row_len = width
        .checked_mul(channels)
        .ok_or(PartScoreError::InvalidDimensions { width, height })?;
    if stride < row_len {
        return Err(PartScoreError::InvalidStride {
            width: row_len,
            stride,
        });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(row_len))
        .ok_or(PartScoreError::InvalidDimensions { width, height })
}
