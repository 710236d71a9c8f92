//! Error types for hull construction, mass aggregation and world bookkeeping.

use std::path::PathBuf;
use thiserror::Error;

use crate::collision::BodyHandle;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading or building a half-edge mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The underlying stream could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not carry the `.obj` extension.
    #[error("unsupported mesh file: {path}")]
    UnsupportedExtension {
        /// Offending path.
        path: PathBuf,
    },

    /// A line of the OBJ stream could not be parsed.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// A face has fewer than three vertices or zero area.
    #[error("face {face} is degenerate")]
    DegenerateFace {
        /// 1-based face index in input order.
        face: usize,
    },

    /// A face references a vertex that does not exist.
    #[error("face {face} references vertex {vertex}, mesh has {count} vertices")]
    VertexOutOfRange {
        /// 1-based face index in input order.
        face: usize,
        /// The 1-based vertex index that was referenced.
        vertex: i64,
        /// Number of vertices in the mesh.
        count: usize,
    },

    /// Two faces use the same directed edge (inconsistent winding or non-manifold).
    #[error("directed edge {tail} -> {head} is used by more than one face")]
    DuplicateEdge {
        /// Tail vertex id.
        tail: u32,
        /// Head vertex id.
        head: u32,
    },

    /// A directed edge has no opposite edge, so the mesh is open.
    #[error("half-edge {tail} -> {head} has no twin")]
    UnresolvedTwin {
        /// Tail vertex id.
        tail: u32,
        /// Head vertex id.
        head: u32,
    },

    /// The input contained no faces.
    #[error("mesh has no faces")]
    Empty,
}

impl MeshError {
    /// Create a `Parse` error for the given line.
    #[must_use]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Errors raised while computing or aggregating mass properties.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MassError {
    /// The colliders attached to a body sum to zero mass.
    #[error("total mass of attached colliders is zero")]
    ZeroMass,

    /// A sphere radius was not strictly positive.
    #[error("invalid sphere radius: {0}")]
    InvalidRadius(f32),

    /// A density was not strictly positive.
    #[error("invalid density: {0}")]
    InvalidDensity(f32),

    /// The hull encloses no volume (flat or wound inside-out).
    #[error("hull volume is not positive: {0}")]
    NonPositiveVolume(f32),
}

/// Top-level error.
#[derive(Debug, Error)]
pub enum Error {
    /// Mesh construction failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Mass computation failed.
    #[error(transparent)]
    Mass(#[from] MassError),

    /// The handle does not name a live body.
    #[error("no body for handle {0:?}")]
    InvalidBody(BodyHandle),
}
