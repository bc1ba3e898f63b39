//! Error types for mesh and silhouette operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::topology::{EdgeId, Side};

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Errors that can occur while loading a mesh, building its topology or
/// tracing a silhouette.
#[derive(Debug, Error)]
pub enum MeshError {
    /// Error reading from a file.
    #[error("failed to read mesh from {path}: {source}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing to a file.
    #[error("failed to write {path}: {source}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing mesh file format.
    #[error("failed to parse mesh from {path}: {details}")]
    ParseError { path: PathBuf, details: String },

    /// Unsupported file format.
    #[error("unsupported mesh format: {extension:?}")]
    UnsupportedFormat { extension: Option<String> },

    /// Empty mesh (no vertices or polygons).
    #[error("mesh is empty: {details}")]
    EmptyMesh { details: String },

    /// A polygon with fewer than three vertices.
    #[error("polygon {polygon} has {vertex_count} vertices, at least 3 required")]
    PolygonTooSmall { polygon: u32, vertex_count: usize },

    /// A polygon references a vertex that does not exist.
    #[error("polygon {polygon} references vertex {vertex}, mesh has {vertex_count} vertices")]
    VertexOutOfRange {
        polygon: u32,
        vertex: u32,
        vertex_count: usize,
    },

    /// A polygon repeats a vertex on consecutive positions.
    #[error("polygon {polygon} repeats vertex {vertex} on consecutive positions")]
    DegenerateEdge { polygon: u32, vertex: u32 },

    /// Two polygons traverse the same edge in the same direction.
    #[error(
        "edge {edge} ({}, {}) is claimed on the {side} side by polygons {existing} and {polygon}",
        vertices[0],
        vertices[1]
    )]
    EdgeSideConflict {
        edge: EdgeId,
        vertices: [u32; 2],
        side: Side,
        existing: u32,
        polygon: u32,
    },

    /// Side assignment met an edge missing from the arena.
    #[error("edge ({}, {}) missing from the edge arena", vertices[0], vertices[1])]
    EdgeNotFound { vertices: [u32; 2] },

    /// A classification was produced for a different topology.
    #[error("classification covers {found} edges but the topology has {expected}")]
    ClassificationMismatch { expected: usize, found: usize },

    /// More than one silhouette edge leaves a vertex and no tie-break chose one.
    #[error("ambiguous traversal at vertex {vertex}: candidate edges {candidates:?}")]
    AmbiguousTraversal {
        vertex: u32,
        candidates: Vec<EdgeId>,
    },

    /// A silhouette walk reached a vertex with no way out.
    #[error("silhouette is open at vertex {vertex} (arrived via edge {edge})")]
    OpenSilhouette { vertex: u32, edge: EdgeId },

    /// Parameter (de)serialisation failed.
    #[error("invalid silhouette config: {details}")]
    Config { details: String },
}
