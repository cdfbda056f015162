//! Construction-time validation errors.
//!
//! Queries and integration never fail. Everything that can go wrong is caught
//! when a body or shape is built from caller-supplied geometry.

use thiserror::Error;

/// Errors raised while building bodies and shapes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    #[error("shape has no points")]
    EmptyShape,

    #[error("face {face} references point {index}, but the shape only has {count} points")]
    FaceIndexOutOfRange {
        face: usize,
        index: usize,
        count: usize,
    },

    #[error("face {face} has {len} indices, at least 3 are required")]
    DegenerateFace { face: usize, len: usize },

    #[error("particle index {index} out of range ({count} particles)")]
    ParticleOutOfRange { index: usize, count: usize },

    #[error("constraint between particles {a} and {b} has zero rest length")]
    DegenerateConstraint { a: usize, b: usize },

    #[error("beam endpoints coincide")]
    DegenerateBeam,

    #[error("prism base needs at least 3 points, got {0}")]
    DegeneratePrism(usize),

    #[error("non-finite coordinate in input geometry")]
    NonFinite,
}
