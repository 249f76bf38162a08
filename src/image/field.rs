//! Owned contiguous sample grid.

use crate::image::{ImageView, Sample};
use crate::util::alloc::try_filled_vec;
use crate::util::{PartScoreError, PartScoreResult};

/// Owned row-major grid of `width * height * channels` samples.
///
/// Score maps and cost fields are `Field<f64>`; argmin traces are
/// `Field<usize>`. Channels are interleaved per pixel.
#[derive(Clone, Debug, PartialEq)]
pub struct Field<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
    channels: usize,
}

impl<T: Copy + Default> Field<T> {
    /// Allocates a grid filled with `T::default()`.
    ///
    /// Allocation failure is reported as `AllocationFailed` instead of
    /// aborting the process.
    pub fn zeros(width: usize, height: usize, channels: usize) -> PartScoreResult<Self> {
        let len = checked_len(width, height, channels)?;
        let data = try_filled_vec(len, T::default())?;
        Ok(Self {
            data,
            width,
            height,
            channels,
        })
    }

    /// Overwrites every sample with `T::default()`.
    pub fn clear(&mut self) {
        self.fill(T::default());
    }

    /// Transposes a single-channel field.
    pub(crate) fn transposed(&self) -> PartScoreResult<Self> {
        debug_assert_eq!(self.channels, 1);
        let mut out = Self::zeros(self.height, self.width, 1)?;
        for (y, row) in self.data.chunks(self.width).enumerate() {
            for (x, &v) in row.iter().enumerate() {
                out.data[x * self.height + y] = v;
            }
        }
        Ok(out)
    }

    /// Copies a rectangular region into a new field.
    pub fn crop(&self, x: usize, y: usize, width: usize, height: usize) -> PartScoreResult<Self> {
        let view = self.view().roi(x, y, width, height)?;
        let mut out = Self::zeros(width, height, self.channels)?;
        for row in 0..height {
            let src = view.row(row).ok_or(PartScoreError::InvalidInput(
                "crop row outside source field",
            ))?;
            out.row_mut(row).copy_from_slice(src);
        }
        Ok(out)
    }
}

impl<T> Field<T> {
    /// Wraps an existing buffer of exactly `width * height * channels` samples.
    pub fn from_vec(
        data: Vec<T>,
        width: usize,
        height: usize,
        channels: usize,
    ) -> PartScoreResult<Self> {
        let needed = checked_len(width, height, channels)?;
        if data.len() != needed {
            return Err(PartScoreError::LengthMismatch {
                expected: needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            channels,
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

    /// Returns the samples in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the samples in row-major order, mutably.
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consumes the field and returns its buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Returns a borrowed view of the field.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            channels: self.channels,
            stride: self.width * self.channels,
        }
    }

    #[inline]
    pub(crate) fn index(&self, x: usize, y: usize, channel: usize) -> usize {
        (y * self.width + x) * self.channels + channel
    }

    /// Returns row `y` as interleaved samples.
    ///
    /// # Panics
    ///
    /// If `y >= height`.
    pub fn row(&self, y: usize) -> &[T] {
        let len = self.width * self.channels;
        &self.data[y * len..(y + 1) * len]
    }

    /// Returns row `y` mutably.
    ///
    /// # Panics
    ///
    /// If `y >= height`.
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let len = self.width * self.channels;
        &mut self.data[y * len..(y + 1) * len]
    }
}

impl<T: Copy> Field<T> {
    /// Returns the sample at `(x, y, channel)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize, channel: usize) -> Option<T> {
        if x >= self.width || y >= self.height || channel >= self.channels {
            return None;
        }
        Some(self.data[self.index(x, y, channel)])
    }

    /// Writes the sample at `(x, y, channel)`; out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, channel: usize, value: T) {
        if x < self.width && y < self.height && channel < self.channels {
            let idx = self.index(x, y, channel);
            self.data[idx] = value;
        }
    }

    /// Overwrites every sample with `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl Field<f64> {
    /// Copies any sample view into an `f64` field.
    pub fn from_view<S: Sample>(view: ImageView<'_, S>) -> PartScoreResult<Self> {
        let mut out = Self::zeros(view.width(), view.height(), view.channels())?;
        for y in 0..view.height() {
            let src = view.row(y).ok_or(PartScoreError::BufferTooSmall {
                needed: (y + 1) * view.stride(),
                got: view.as_slice().len(),
            })?;
            for (dst, &value) in out.row_mut(y).iter_mut().zip(src) {
                *dst = value.to_f64();
            }
        }
        Ok(out)
    }

    /// Returns a new field with every sample squared.
    pub fn squared(&self) -> PartScoreResult<Self> {
        let mut out = Self::zeros(self.width, self.height, self.channels)?;
        for (dst, &v) in out.data.iter_mut().zip(&self.data) {
            *dst = v * v;
        }
        Ok(out)
    }

    /// Returns the elementwise product of two fields of equal shape.
    pub fn multiply(&self, other: &Self) -> PartScoreResult<Self> {
        if self.channels != other.channels {
            return Err(PartScoreError::ChannelMismatch {
                image: self.channels,
                template: other.channels,
            });
        }
        if self.width != other.width || self.height != other.height {
            return Err(PartScoreError::LengthMismatch {
                expected: self.data.len(),
                got: other.data.len(),
            });
        }
        let mut out = Self::zeros(self.width, self.height, self.channels)?;
        for ((dst, &a), &b) in out.data.iter_mut().zip(&self.data).zip(&other.data) {
            *dst = a * b;
        }
        Ok(out)
    }

    /// Smallest and largest finite sample, or `None` if there is none.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

fn checked_len(width: usize, height: usize, channels: usize) -> PartScoreResult<usize> {
    if width == 0 || height == 0 || channels == 0 {
        return Err(PartScoreError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .and_then(|v| v.checked_mul(channels))
        .ok_or(PartScoreError::InvalidDimensions { width, height })
}
