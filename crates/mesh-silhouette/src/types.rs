//! Core mesh data types.

use std::collections::BTreeSet;

use nalgebra::{Matrix3, Point2, Point3, Rotation3, Unit, Vector3};

/// Material id given to polygons that carry no material of their own.
pub const UNASSIGNED_MATERIAL: u32 = u32::MAX;

/// A vertex of the mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Create a new vertex at a position.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// A polygon: an ordered loop of vertex indices tagged with a material.
///
/// Front faces list their vertices counter-clockwise when seen from the
/// viewer; see [`PolygonMesh::polygon_normal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    /// Vertex indices in boundary order.
    pub vertices: Vec<u32>,

    /// Material tag used by the silhouette material filter.
    pub material: u32,
}

impl Polygon {
    pub fn new(vertices: impl Into<Vec<u32>>, material: u32) -> Self {
        Self {
            vertices: vertices.into(),
            material,
        }
    }

    /// Number of boundary vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Directed boundary edges `(from, to)`, including the closing edge.
    pub fn boundary(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// A polygon soup: positions plus indexed polygons.
#[derive(Debug, Clone, Default)]
pub struct PolygonMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Polygons as index loops into the vertex array.
    pub polygons: Vec<Polygon>,
}

impl PolygonMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, polygon_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            polygons: Vec::with_capacity(polygon_count),
        }
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, x: f64, y: f64, z: f64) -> u32 {
        self.vertices.push(Vertex::from_coords(x, y, z));
        (self.vertices.len() - 1) as u32
    }

    /// Append a polygon and return its index.
    pub fn push_polygon(&mut self, vertices: impl Into<Vec<u32>>, material: u32) -> u32 {
        self.polygons.push(Polygon::new(vertices, material));
        (self.polygons.len() - 1) as u32
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Check if mesh is empty (no vertices or polygons).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.polygons.is_empty()
    }

    /// Distinct material ids in ascending order.
    pub fn materials(&self) -> BTreeSet<u32> {
        self.polygons.iter().map(|p| p.material).collect()
    }

    /// Compute the axis-aligned bounding box.
    /// Returns (min_corner, max_corner) or None if mesh is empty.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;
        let mut min = first;
        let mut max = first;

        for vertex in &self.vertices[1..] {
            let p = &vertex.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }

    /// Unit normal of a polygon from its first, second and last vertex:
    /// `(v1 - v0) x (v_last - v0)`, normalized.
    ///
    /// Returns None for polygons with fewer than three vertices, indices out
    /// of range, or a degenerate cross product. Degeneracy is judged against
    /// the lengths of the two edges, so it does not depend on mesh scale.
    pub fn polygon_normal(&self, polygon_idx: usize) -> Option<Vector3<f64>> {
        let polygon = self.polygons.get(polygon_idx)?;
        if polygon.len() < 3 {
            return None;
        }
        let position = |i: u32| self.vertices.get(i as usize).map(|v| v.position);
        let v0 = position(polygon.vertices[0])?;
        let v1 = position(polygon.vertices[1])?;
        let last = position(polygon.vertices[polygon.len() - 1])?;

        let (a, b) = (v1 - v0, last - v0);
        let n = a.cross(&b);
        let len_sq = n.norm_squared();
        // |a x b|^2 = |a|^2 |b|^2 sin^2(angle)
        if len_sq > f64::EPSILON * a.norm_squared() * b.norm_squared() {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }
}

/// A 3x3 transform from mesh space to screen space.
///
/// Projection applies the matrix and drops z; there is no perspective or
/// translation. Screen space is y-up with +z pointing at the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "config",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "[[f64; 3]; 3]", into = "[[f64; 3]; 3]")
)]
pub struct Orientation(pub Matrix3<f64>);

impl Orientation {
    pub fn identity() -> Self {
        Self(Matrix3::identity())
    }

    pub fn from_matrix(matrix: Matrix3<f64>) -> Self {
        Self(matrix)
    }

    /// Build from three row vectors (screen x, screen y, screen z).
    #[rustfmt::skip]
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self(Matrix3::new(
            rows[0][0], rows[0][1], rows[0][2],
            rows[1][0], rows[1][1], rows[1][2],
            rows[2][0], rows[2][1], rows[2][2],
        ))
    }

    /// Rows of the matrix, the inverse of [`Orientation::from_rows`].
    pub fn rows(&self) -> [[f64; 3]; 3] {
        let m = &self.0;
        [
            [m[(0, 0)], m[(0, 1)], m[(0, 2)]],
            [m[(1, 0)], m[(1, 1)], m[(1, 2)]],
            [m[(2, 0)], m[(2, 1)], m[(2, 2)]],
        ]
    }

    /// Right-handed rotation that maps `view_direction` onto screen +z.
    ///
    /// World +y stays "up" on screen unless the view is (anti)parallel to it,
    /// in which case world +z is used. A zero view direction gives identity.
    pub fn facing(view_direction: Vector3<f64>) -> Self {
        let Some(z) = view_direction.try_normalize(f64::EPSILON) else {
            return Self::identity();
        };
        let up = if z.y.abs() > 0.999 { Vector3::z() } else { Vector3::y() };
        let x = up.cross(&z).normalize();
        let y = z.cross(&x);
        Self(Matrix3::from_rows(&[x.transpose(), y.transpose(), z.transpose()]))
    }

    /// Apply an additional screen-space rotation after this transform.
    pub fn rotated(&self, axis: Unit<Vector3<f64>>, angle: f64) -> Self {
        let rotation = Rotation3::from_axis_angle(&axis, angle);
        Self(rotation.matrix() * self.0)
    }

    /// Transform a point and drop its z component.
    #[inline]
    pub fn project(&self, point: &Point3<f64>) -> Point2<f64> {
        let p = self.0 * point.coords;
        Point2::new(p.x, p.y)
    }
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<[[f64; 3]; 3]> for Orientation {
    fn from(rows: [[f64; 3]; 3]) -> Self {
        Self::from_rows(rows)
    }
}

impl From<Orientation> for [[f64; 3]; 3] {
    fn from(orientation: Orientation) -> Self {
        orientation.rows()
    }
}
