//! Fallible buffer allocation.

use crate::util::{PartScoreError, PartScoreResult};

/// Allocates `len` copies of `value`, reporting failure as
/// `AllocationFailed` instead of aborting.
pub(crate) fn try_filled_vec<T: Clone>(len: usize, value: T) -> PartScoreResult<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| PartScoreError::AllocationFailed { elements: len })?;
    data.resize(len, value);
    Ok(data)
}

/// Allocates an empty buffer able to hold `len` items without reallocating.
pub(crate) fn try_with_capacity<T>(len: usize) -> PartScoreResult<Vec<T>> {
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| PartScoreError::AllocationFailed { elements: len })?;
    Ok(data)
}
