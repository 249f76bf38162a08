//! Row-wise application of a 1D transform over a field.

use crate::dt::{daq, envelope, DtMethod};
use crate::image::Field;
use crate::util::PartScoreResult;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Output of one separable pass: transformed values and per-cell argmin.
pub(crate) struct Pass {
    pub(crate) values: Field<f64>,
    pub(crate) argmin: Field<usize>,
}

fn solve_line(
    method: DtMethod,
    src: &[f64],
    dst: &mut [f64],
    arg: &mut [usize],
    a: f64,
    b: f64,
    scratch: &mut envelope::Scratch,
) {
    match method {
        DtMethod::DivideAndConquer => daq::solve(src, dst, arg, a, b),
        DtMethod::LowerEnvelope => envelope::solve(src, dst, arg, a, b, scratch),
    }
}

/// Transforms every row of a single-channel field independently.
///
/// Rows neither read nor write each other, so with `parallel` (and the
/// `rayon` feature) they run on the rayon pool.
pub(crate) fn row_pass(
    field: &Field<f64>,
    a: f64,
    b: f64,
    method: DtMethod,
    parallel: bool,
) -> PartScoreResult<Pass> {
    let width = field.width();
    let mut values = Field::zeros(width, field.height(), 1)?;
    let mut argmin = Field::zeros(width, field.height(), 1)?;

    #[cfg(feature = "rayon")]
    {
        if parallel {
            field
                .data()
                .par_chunks(width)
                .zip(values.data_mut().par_chunks_mut(width))
                .zip(argmin.data_mut().par_chunks_mut(width))
                .for_each_init(envelope::Scratch::default, |scratch, ((src, dst), arg)| {
                    solve_line(method, src, dst, arg, a, b, scratch)
                });
            return Ok(Pass { values, argmin });
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    let mut scratch = envelope::Scratch::default();
    for ((src, dst), arg) in field
        .data()
        .chunks(width)
        .zip(values.data_mut().chunks_mut(width))
        .zip(argmin.data_mut().chunks_mut(width))
    {
        solve_line(method, src, dst, arg, a, b, &mut scratch);
    }
    Ok(Pass { values, argmin })
}
