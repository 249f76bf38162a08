//! Candidate selection on SSD score maps.
//!
//! Includes lowest-K collection and spatial non-maximum suppression.

pub(crate) mod nms;
pub(crate) mod topk;
