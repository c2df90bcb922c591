use thiserror::Error;

use crate::types::ObjectId;

/// Rejected geometry. Negative or non-finite extents would corrupt the
/// intersection math, so they never make it into a box.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    #[error("negative extent {value} on axis {axis}")]
    NegativeExtent { axis: usize, value: f32 },

    #[error("non-finite coordinate or extent")]
    NonFinite,

    #[error("min exceeds max on axis {axis}")]
    InvertedBounds { axis: usize },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("no object registered under id {0}")]
    UnknownObject(ObjectId),

    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
}
