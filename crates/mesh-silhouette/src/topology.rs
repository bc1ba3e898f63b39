//! Edge and adjacency topology for polygon meshes.
//!
//! Edges are stored once, in canonical `[low, high]` form, in a sorted arena.
//! An edge id is its index in that arena. Each edge remembers the polygon
//! that walks it low→high (its *left* side) and the polygon that walks it
//! high→low (its *right* side).

use std::collections::BTreeSet;
use std::fmt;

use nalgebra::{Point3, Vector3};
use tracing::{debug, info, warn};

use crate::error::{MeshError, MeshResult};
use crate::types::{Polygon, PolygonMesh};

/// Dense edge index into [`MeshTopology::edges`].
pub type EdgeId = u32;

/// Which side of an edge a polygon sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The polygon traverses the edge from its low to its high vertex.
    Left,
    /// The polygon traverses the edge from its high to its low vertex.
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// An undirected mesh edge with up to two incident polygons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    /// Endpoints, lower index first.
    pub vertices: [u32; 2],

    /// Polygon traversing `vertices[0] -> vertices[1]`.
    pub left: Option<u32>,

    /// Polygon traversing `vertices[1] -> vertices[0]`.
    pub right: Option<u32>,
}

impl Edge {
    fn new(a: u32, b: u32) -> Self {
        Self {
            vertices: [a, b],
            left: None,
            right: None,
        }
    }

    /// Polygon on the given side, if any.
    #[inline]
    pub fn side(&self, side: Side) -> Option<u32> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Number of populated sides (0, 1 or 2).
    pub fn side_count(&self) -> usize {
        self.left.is_some() as usize + self.right.is_some() as usize
    }

    /// An edge with a single incident polygon lies on the mesh boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.side_count() < 2
    }

    /// The endpoint opposite `vertex`, or None if `vertex` is not on the edge.
    pub fn other(&self, vertex: u32) -> Option<u32> {
        match self.vertices {
            [a, b] if a == vertex => Some(b),
            [a, b] if b == vertex => Some(a),
            _ => None,
        }
    }
}

/// Canonical (min, max) form of a vertex pair.
#[inline]
pub(crate) fn canonical(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Immutable topology built once from a [`PolygonMesh`].
#[derive(Debug, Clone)]
pub struct MeshTopology {
    mesh: PolygonMesh,
    normals: Vec<Vector3<f64>>,
    edges: Vec<Edge>,
    vertex_edges: Vec<Vec<EdgeId>>,
}

impl MeshTopology {
    /// Build topology from a polygon soup.
    ///
    /// Fails if any polygon has fewer than three vertices, references a
    /// missing vertex, repeats a vertex on consecutive positions, or if two
    /// polygons walk the same edge in the same direction.
    pub fn build(mesh: &PolygonMesh) -> MeshResult<Self> {
        validate_polygons(mesh)?;

        let mut degenerate = 0usize;
        let normals: Vec<Vector3<f64>> = (0..mesh.polygons.len())
            .map(|idx| {
                mesh.polygon_normal(idx).unwrap_or_else(|| {
                    degenerate += 1;
                    Vector3::zeros()
                })
            })
            .collect();
        if degenerate > 0 {
            warn!(
                "{} polygons have a degenerate normal and will never face the viewer",
                degenerate
            );
        }

        let mut edges = collect_edges(&mesh.polygons);

        let mut vertex_edges: Vec<Vec<EdgeId>> = vec![Vec::new(); mesh.vertices.len()];
        for (edge_id, edge) in edges.iter().enumerate() {
            vertex_edges[edge.vertices[0] as usize].push(edge_id as EdgeId);
            vertex_edges[edge.vertices[1] as usize].push(edge_id as EdgeId);
        }

        assign_sides(&mesh.polygons, &mut edges)?;

        let topology = Self {
            mesh: mesh.clone(),
            normals,
            edges,
            vertex_edges,
        };

        info!(
            "Built topology: {} vertices, {} polygons, {} edges ({} boundary)",
            topology.vertex_count(),
            topology.polygon_count(),
            topology.edge_count(),
            topology.boundary_edge_count()
        );

        Ok(topology)
    }

    /// The mesh this topology was built from.
    #[inline]
    pub fn mesh(&self) -> &PolygonMesh {
        &self.mesh
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertices.len()
    }

    #[inline]
    pub fn polygon_count(&self) -> usize {
        self.mesh.polygons.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All edges, indexed by [`EdgeId`].
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id as usize)
    }

    /// Look up the edge joining two vertices, in either order.
    pub fn find_edge(&self, a: u32, b: u32) -> Option<EdgeId> {
        let (lo, hi) = canonical(a, b);
        self.edges
            .binary_search_by_key(&[lo, hi], |e| e.vertices)
            .ok()
            .map(|idx| idx as EdgeId)
    }

    /// Edge ids touching a vertex, ascending. Empty for unknown vertices.
    pub fn vertex_edges(&self, vertex: u32) -> &[EdgeId] {
        self.vertex_edges
            .get(vertex as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[inline]
    pub fn polygon(&self, id: u32) -> Option<&Polygon> {
        self.mesh.polygons.get(id as usize)
    }

    /// Unit normal of a polygon (zero for degenerate polygons).
    #[inline]
    pub fn normal(&self, id: u32) -> Option<Vector3<f64>> {
        self.normals.get(id as usize).copied()
    }

    /// All polygon normals, indexed by polygon id.
    #[inline]
    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    #[inline]
    pub fn position(&self, vertex: u32) -> Option<Point3<f64>> {
        self.mesh.vertices.get(vertex as usize).map(|v| v.position)
    }

    /// Edges with fewer than two incident polygons.
    ///
    /// A closed manifold mesh has none.
    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_boundary())
            .map(|(id, _)| id as EdgeId)
    }

    pub fn boundary_edge_count(&self) -> usize {
        self.edges.iter().filter(|e| e.is_boundary()).count()
    }

    /// Check if every edge has both sides populated.
    pub fn is_closed(&self) -> bool {
        self.edges.iter().all(|e| !e.is_boundary())
    }

    /// Number of polygons whose normal could not be computed.
    pub fn degenerate_polygon_count(&self) -> usize {
        self.normals.iter().filter(|n| n.norm_squared() == 0.0).count()
    }

    /// Distinct material ids in ascending order.
    pub fn materials(&self) -> BTreeSet<u32> {
        self.mesh.materials()
    }
}

fn validate_polygons(mesh: &PolygonMesh) -> MeshResult<()> {
    let vertex_count = mesh.vertices.len();

    for (idx, polygon) in mesh.polygons.iter().enumerate() {
        let polygon_id = idx as u32;

        if polygon.len() < 3 {
            return Err(MeshError::PolygonTooSmall {
                polygon: polygon_id,
                vertex_count: polygon.len(),
            });
        }

        if let Some(&vertex) = polygon.vertices.iter().find(|&&v| v as usize >= vertex_count) {
            return Err(MeshError::VertexOutOfRange {
                polygon: polygon_id,
                vertex,
                vertex_count,
            });
        }

        if let Some((vertex, _)) = polygon.boundary().find(|(a, b)| a == b) {
            return Err(MeshError::DegenerateEdge {
                polygon: polygon_id,
                vertex,
            });
        }
    }

    Ok(())
}

/// First pass: every boundary occurrence, canonicalised, sorted and deduplicated.
fn collect_edges(polygons: &[Polygon]) -> Vec<Edge> {
    let mut occurrences: Vec<(u32, u32)> = polygons
        .iter()
        .flat_map(|p| p.boundary().map(|(a, b)| canonical(a, b)))
        .collect();
    let occurrence_count = occurrences.len();

    occurrences.sort_unstable();
    occurrences.dedup();

    debug!(
        "Collapsed {} edge occurrences into {} unique edges",
        occurrence_count,
        occurrences.len()
    );

    occurrences.into_iter().map(|(a, b)| Edge::new(a, b)).collect()
}

/// Second pass: attach each polygon to the left or right slot of its edges.
fn assign_sides(polygons: &[Polygon], edges: &mut [Edge]) -> MeshResult<()> {
    for (idx, polygon) in polygons.iter().enumerate() {
        let polygon_id = idx as u32;

        for (a, b) in polygon.boundary() {
            let (lo, hi) = canonical(a, b);
            let edge_id = edges
                .binary_search_by_key(&[lo, hi], |e| e.vertices)
                .map_err(|_| MeshError::EdgeNotFound { vertices: [lo, hi] })?;
            let edge = &mut edges[edge_id];

            let side = if a < b { Side::Left } else { Side::Right };
            let slot = match side {
                Side::Left => &mut edge.left,
                Side::Right => &mut edge.right,
            };

            if let Some(existing) = *slot {
                return Err(MeshError::EdgeSideConflict {
                    edge: edge_id as EdgeId,
                    vertices: [lo, hi],
                    side,
                    existing,
                    polygon: polygon_id,
                });
            }
            *slot = Some(polygon_id);
        }
    }

    Ok(())
}
