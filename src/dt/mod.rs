//! Generalized distance transform over 2D cost fields.
//!
//! For a cost field `c` and a [`Deformation`] the transform computes
//!
//! ```text
//! D(x, y) = min_{sx, sy} c(sx, sy) + ax*dx^2 + bx*dx + ay*dy^2 + by*dy
//! ```
//!
//! with `dx = x - sx`, `dy = y - sy`. The penalty is additively separable,
//! so the 2D transform is a 1D transform of every row with `(ax, bx)`
//! followed by a 1D transform of every column of that intermediate with
//! `(ay, by)`. The column pass starts only after all rows are done.

mod daq;
mod envelope;
mod passes;

pub use daq::{transform_1d, transform_1d_into};
pub use envelope::transform_1d_envelope;

use crate::image::{Field, ImageView, Sample};
use crate::trace::{trace_event, trace_span};
use crate::util::math::{bisection_depth, deformation_cost};
use crate::util::{Axis, PartScoreError, PartScoreResult};

/// Result of a 1D transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform1d {
    /// Minimum cost at each destination index.
    pub values: Vec<f64>,
    /// Source index achieving the minimum.
    pub argmin: Vec<usize>,
}

/// Per-axis quadratic and linear displacement costs.
///
/// Displacing by `d` along an axis costs `a*d^2 + b*d`, where `d` is
/// destination minus source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Deformation {
    /// Quadratic cost along x; must be non-negative.
    pub ax: f64,
    /// Linear cost along x.
    pub bx: f64,
    /// Quadratic cost along y; must be non-negative.
    pub ay: f64,
    /// Linear cost along y.
    pub by: f64,
}

impl Deformation {
    /// Creates validated coefficients.
    pub fn new(ax: f64, bx: f64, ay: f64, by: f64) -> PartScoreResult<Self> {
        let deformation = Self { ax, bx, ay, by };
        deformation.validate()?;
        Ok(deformation)
    }

    /// Same coefficients on both axes.
    pub fn isotropic(a: f64, b: f64) -> PartScoreResult<Self> {
        Self::new(a, b, a, b)
    }

    /// Checks finiteness and convexity on both axes.
    pub fn validate(&self) -> PartScoreResult<()> {
        check_axis(Axis::X, self.ax, self.bx)?;
        check_axis(Axis::Y, self.ay, self.by)
    }

    /// Penalty for displacing by `(dx, dy)`.
    pub fn cost(&self, dx: isize, dy: isize) -> f64 {
        deformation_cost(self.ax, self.bx, dx) + deformation_cost(self.ay, self.by, dy)
    }
}

pub(crate) fn check_axis(axis: Axis, a: f64, b: f64) -> PartScoreResult<()> {
    let (a_name, b_name) = match axis {
        Axis::X => ("ax", "bx"),
        Axis::Y => ("ay", "by"),
    };
    for (name, value) in [(a_name, a), (b_name, b)] {
        if !value.is_finite() {
            return Err(PartScoreError::NonFiniteCoefficient { name, value });
        }
    }
    if a < 0.0 {
        return Err(PartScoreError::NegativeQuadratic { axis, value: a });
    }
    Ok(())
}

/// Rejects NaN samples in a single line of costs, reported at `(index, 0)`.
pub(crate) fn check_costs_1d(src: &[f64]) -> PartScoreResult<()> {
    match src.iter().position(|v| v.is_nan()) {
        Some(x) => Err(PartScoreError::NanCost { x, y: 0 }),
        None => Ok(()),
    }
}

/// Rejects NaN samples; with `finite` also rejects infinities.
fn check_costs_2d<S: Sample>(cost: &ImageView<'_, S>, finite: bool) -> PartScoreResult<()> {
    for y in 0..cost.height() {
        let row = cost.row(y).ok_or(PartScoreError::BufferTooSmall {
            needed: (y + 1) * cost.stride(),
            got: cost.as_slice().len(),
        })?;
        for (x, v) in row.iter().map(|v| v.to_f64()).enumerate() {
            if v.is_nan() {
                return Err(PartScoreError::NanCost { x, y });
            }
            if finite && v.is_infinite() {
                return Err(envelope::infinite_cost_error());
            }
        }
    }
    Ok(())
}

/// 1D algorithm used for each row and column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DtMethod {
    /// Divide and conquer, `O(n log n)` typical. Accepts `a = 0` and
    /// infinite source costs.
    #[default]
    DivideAndConquer,
    /// Lower-envelope sweep, `O(n)`. Needs `a > 0` and finite costs.
    LowerEnvelope,
}

/// Configuration for [`distance_transform_with`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DtConfig {
    /// 1D algorithm.
    pub method: DtMethod,
    /// Run row and column passes on the rayon pool when the `rayon`
    /// feature is enabled.
    pub parallel: bool,
}

/// Output of the 2D transform.
#[derive(Clone, Debug)]
pub struct DistanceTransform {
    values: Field<f64>,
    arg_x: Field<usize>,
    arg_y: Field<usize>,
}

impl DistanceTransform {
    /// Transformed costs.
    pub fn values(&self) -> &Field<f64> {
        &self.values
    }

    /// Source column chosen by the row pass for each cell of the
    /// intermediate field.
    pub fn arg_x(&self) -> &Field<usize> {
        &self.arg_x
    }

    /// Source row chosen by the column pass for each output cell.
    pub fn arg_y(&self) -> &Field<usize> {
        &self.arg_y
    }

    /// Transformed cost at `(x, y)`.
    pub fn value(&self, x: usize, y: usize) -> Option<f64> {
        self.values.get(x, y, 0)
    }

    /// Backtracks the source cell `(sx, sy)` whose cost and displacement
    /// produced the value at `(x, y)`.
    pub fn source_of(&self, x: usize, y: usize) -> Option<(usize, usize)> {
        let sy = self.arg_y.get(x, y, 0)?;
        let sx = self.arg_x.get(x, sy, 0)?;
        Some((sx, sy))
    }

    /// Consumes the output and returns `(values, arg_x, arg_y)`.
    pub fn into_parts(self) -> (Field<f64>, Field<usize>, Field<usize>) {
        (self.values, self.arg_x, self.arg_y)
    }
}

/// Computes the 2D transform with the default configuration.
pub fn distance_transform<S: Sample>(
    cost: ImageView<'_, S>,
    deformation: Deformation,
) -> PartScoreResult<DistanceTransform> {
    distance_transform_with(cost, deformation, DtConfig::default())
}

/// Computes the 2D transform of a single-channel cost field.
///
/// All preconditions are checked before any output is allocated.
pub fn distance_transform_with<S: Sample>(
    cost: ImageView<'_, S>,
    deformation: Deformation,
    cfg: DtConfig,
) -> PartScoreResult<DistanceTransform> {
    deformation.validate()?;
    if cost.channels() != 1 {
        return Err(PartScoreError::UnsupportedChannels {
            expected: 1,
            got: cost.channels(),
        });
    }
    let finite_only = cfg.method == DtMethod::LowerEnvelope;
    if finite_only {
        envelope::check_envelope_quadratic(deformation.ax.min(deformation.ay))?;
    }
    check_costs_2d(&cost, finite_only)?;
    let field = Field::from_view(cost)?;

    let (width, height) = (field.width(), field.height());
    let _span = trace_span!("distance_transform", width = width, height = height).entered();
    trace_event!(
        "deformation",
        ax = deformation.ax,
        bx = deformation.bx,
        ay = deformation.ay,
        by = deformation.by
    );

    let rows = {
        let _pass = trace_span!("dt_pass", axis = "x", lines = height).entered();
        trace_event!("dt_pass_bound", max_depth = bisection_depth(width));
        passes::row_pass(
            &field,
            deformation.ax,
            deformation.bx,
            cfg.method,
            cfg.parallel,
        )?
    };

    // Columns of the intermediate become rows of its transpose.
    let cols = {
        let _pass = trace_span!("dt_pass", axis = "y", lines = width).entered();
        trace_event!("dt_pass_bound", max_depth = bisection_depth(height));
        passes::row_pass(
            &rows.values.transposed()?,
            deformation.ay,
            deformation.by,
            cfg.method,
            cfg.parallel,
        )?
    };

    Ok(DistanceTransform {
        values: cols.values.transposed()?,
        arg_x: rows.argmin,
        arg_y: cols.argmin.transposed()?,
    })
}

#[cfg(test)]
mod tests {
    use super::{distance_transform, distance_transform_with, Deformation, DtConfig, DtMethod};
    use crate::image::ImageView;
    use crate::util::{Axis, PartScoreError};

    #[test]
    fn deformation_rejects_bad_coefficients() {
        assert_eq!(
            Deformation::new(1.0, 0.0, -2.0, 0.0).err().unwrap(),
            PartScoreError::NegativeQuadratic {
                axis: Axis::Y,
                value: -2.0
            }
        );
        assert!(matches!(
            Deformation::new(1.0, f64::NAN, 1.0, 0.0),
            Err(PartScoreError::NonFiniteCoefficient { name: "bx", .. })
        ));
        assert_eq!(Deformation::isotropic(0.5, 1.0).unwrap().cost(2, -1), 2.0 + 2.0 - 0.5);
    }

    #[test]
    fn unvalidated_deformation_is_rejected_by_transform() {
        let data = [0u8; 4];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        let bad = Deformation {
            ax: -1.0,
            bx: 0.0,
            ay: 1.0,
            by: 0.0,
        };
        assert_eq!(
            distance_transform(view, bad).err().unwrap(),
            PartScoreError::NegativeQuadratic {
                axis: Axis::X,
                value: -1.0
            }
        );
    }

    #[test]
    fn multichannel_cost_is_rejected() {
        let data = [0u8; 12];
        let view = ImageView::with_channels(&data, 2, 2, 3).unwrap();
        let err = distance_transform(view, Deformation::isotropic(1.0, 0.0).unwrap())
            .err()
            .unwrap();
        assert_eq!(
            err,
            PartScoreError::UnsupportedChannels {
                expected: 1,
                got: 3
            }
        );
    }

    #[test]
    fn nan_costs_are_rejected_by_both_methods() {
        let cost = [f64::NAN, 0.0, 5.0];
        let view = ImageView::from_slice(&cost, 3, 1).unwrap();
        let def = Deformation::isotropic(1.0, 0.0).unwrap();
        for method in [DtMethod::DivideAndConquer, DtMethod::LowerEnvelope] {
            let cfg = DtConfig {
                method,
                parallel: false,
            };
            assert_eq!(
                distance_transform_with(view, def, cfg).err().unwrap(),
                PartScoreError::NanCost { x: 0, y: 0 }
            );
        }

        // NaN in row padding is outside the view and ignored.
        let padded = [1.0, 2.0, f64::NAN, 3.0, 4.0, f64::NAN];
        let view = ImageView::new(&padded, 2, 2, 1, 3).unwrap();
        let dt = distance_transform(view, def).unwrap();
        assert!(dt.values().data().iter().all(|v| v.is_finite()));

        let late = [0.0, 1.0, 2.0, f64::NAN];
        let view = ImageView::from_slice(&late, 2, 2).unwrap();
        assert_eq!(
            distance_transform(view, def).err().unwrap(),
            PartScoreError::NanCost { x: 1, y: 1 }
        );
    }

    #[test]
    fn infinite_costs_need_divide_and_conquer() {
        let cost = [f64::INFINITY, 0.0, 5.0];
        let view = ImageView::from_slice(&cost, 3, 1).unwrap();
        let def = Deformation::isotropic(1.0, 0.0).unwrap();
        let dt = distance_transform(view, def).unwrap();
        assert_eq!(dt.values().data(), &[1.0, 0.0, 1.0]);
        let cfg = DtConfig {
            method: DtMethod::LowerEnvelope,
            parallel: false,
        };
        assert!(matches!(
            distance_transform_with(view, def, cfg),
            Err(PartScoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn source_of_backtracks_through_both_passes() {
        // Single cheap source at (3, 1) in a 5x4 field.
        let mut cost = vec![100.0f64; 20];
        cost[5 + 3] = 0.0;
        let view = ImageView::from_slice(&cost, 5, 4).unwrap();
        let dt = distance_transform(view, Deformation::isotropic(1.0, 0.0).unwrap()).unwrap();
        for y in 0..4 {
            for x in 0..5 {
                assert_eq!(dt.source_of(x, y), Some((3, 1)));
                let expected = Deformation::isotropic(1.0, 0.0)
                    .unwrap()
                    .cost(x as isize - 3, y as isize - 1);
                assert_eq!(dt.value(x, y), Some(expected));
            }
        }
    }
}
