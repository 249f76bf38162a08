//! Low-level building blocks for custom pipelines.
//!
//! These expose the 1D transforms, the summed-area energy lookup and the
//! candidate utilities behind the high-level [`SsdMatcher`](crate::SsdMatcher)
//! and [`distance_transform`](crate::distance_transform) APIs.

pub use crate::candidate::nms::nms_2d;
pub use crate::candidate::topk::{Peak, TopK};
pub use crate::dt::{transform_1d, transform_1d_envelope, transform_1d_into};
pub use crate::kernel::DefaultBackend;
pub use crate::refine::quad1d::quad_min_offset_1d;
pub use crate::ssd::{best_matches, window_energy};
