//! partscore provides the two numeric kernels at the heart of part-based
//! detection pipelines over dense 2D grids:
//!
//! - [`ssd`]: a windowed sum-of-squared-differences matcher evaluated via
//!   cross-correlation and a summed-area table instead of per-window loops.
//! - [`dt`]: a generalized distance transform with per-axis quadratic and
//!   linear deformation costs, solved separably with a divide-and-conquer
//!   1D lower-envelope search.
//!
//! Optional features: `rayon` (parallel backends and passes), `simd`
//! (vectorised correlation), `image-io` (file loading) and `tracing`.

mod candidate;
pub mod dt;
pub mod image;
pub mod kernel;
pub mod lowlevel;
mod refine;
pub mod ssd;
pub mod template;
mod trace;
pub mod util;

pub use crate::dt::{
    distance_transform, distance_transform_with, transform_1d, Deformation, DistanceTransform,
    DtConfig, DtMethod, Transform1d,
};
pub use crate::image::{Field, ImageView, Sample};
pub use crate::kernel::{Backend, ScalarBackend};
pub use crate::ssd::{match_ssd, Match, ScoreRegion, SsdConfig, SsdMatcher, ValidBand};
pub use crate::template::{SsdTemplatePlan, Template};
pub use crate::util::{Axis, ErrorKind, PartScoreError, PartScoreResult};

#[cfg(feature = "image-io")]
pub use crate::image::io;
