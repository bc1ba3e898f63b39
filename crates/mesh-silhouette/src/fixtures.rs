//! Small meshes shared by the unit tests.

use crate::PolygonMesh;

/// Axis-aligned 10mm cube, outward quads, all material 0.
pub fn cube() -> PolygonMesh {
    let mut mesh = PolygonMesh::new();
    for &(x, y, z) in &[
        (0.0, 0.0, 0.0),
        (10.0, 0.0, 0.0),
        (10.0, 10.0, 0.0),
        (0.0, 10.0, 0.0),
        (0.0, 0.0, 10.0),
        (10.0, 0.0, 10.0),
        (10.0, 10.0, 10.0),
        (0.0, 10.0, 10.0),
    ] {
        mesh.push_vertex(x, y, z);
    }
    mesh.push_polygon([0, 3, 2, 1], 0); // bottom, -z
    mesh.push_polygon([4, 5, 6, 7], 0); // top, +z
    mesh.push_polygon([0, 1, 5, 4], 0); // front, -y
    mesh.push_polygon([3, 7, 6, 2], 0); // back, +y
    mesh.push_polygon([0, 4, 7, 3], 0); // left, -x
    mesh.push_polygon([1, 2, 6, 5], 0); // right, +x
    mesh
}

/// Regular tetrahedron with outward triangles.
///
/// Face 0 (`[0, 1, 2]`) is opposite vertex 3 and has normal (1, 1, -1)/√3.
pub fn tetrahedron() -> PolygonMesh {
    let mut mesh = PolygonMesh::new();
    mesh.push_vertex(1.0, 1.0, 1.0);
    mesh.push_vertex(1.0, -1.0, -1.0);
    mesh.push_vertex(-1.0, 1.0, -1.0);
    mesh.push_vertex(-1.0, -1.0, 1.0);
    mesh.push_polygon([0, 1, 2], 0);
    mesh.push_polygon([0, 3, 1], 0);
    mesh.push_polygon([0, 2, 3], 0);
    mesh.push_polygon([1, 3, 2], 0);
    mesh
}

/// Two triangles in the z=0 plane touching only at vertex 4.
///
/// Both face +z. Walking the silhouette from edge (0, 1) reaches vertex 4
/// with two outgoing silhouette edges.
pub fn bowtie() -> PolygonMesh {
    let mut mesh = PolygonMesh::new();
    mesh.push_vertex(2.0, -1.0, 0.0);
    mesh.push_vertex(2.0, 1.0, 0.0);
    mesh.push_vertex(-2.0, 1.0, 0.0);
    mesh.push_vertex(-2.0, -1.0, 0.0);
    mesh.push_vertex(0.0, 0.0, 0.0);
    mesh.push_polygon([4, 0, 1], 0);
    mesh.push_polygon([4, 2, 3], 0);
    mesh
}

/// [`bowtie`] renumbered so the shared vertex is 0.
///
/// The first seed edge (0, 1) starts at the pinch, so the branch shows up
/// only when the walk comes back around to its starting vertex.
pub fn bowtie_pinch_first() -> PolygonMesh {
    let mut mesh = PolygonMesh::new();
    mesh.push_vertex(0.0, 0.0, 0.0);
    mesh.push_vertex(2.0, -1.0, 0.0);
    mesh.push_vertex(2.0, 1.0, 0.0);
    mesh.push_vertex(-2.0, 1.0, 0.0);
    mesh.push_vertex(-2.0, -1.0, 0.0);
    mesh.push_polygon([0, 1, 2], 0);
    mesh.push_polygon([0, 3, 4], 0);
    mesh
}

/// Two disjoint unit squares facing +z, materials 0 and 1.
pub fn two_squares() -> PolygonMesh {
    let mut mesh = PolygonMesh::new();
    for &(x0, material) in &[(0.0, 0u32), (5.0, 1u32)] {
        let a = mesh.push_vertex(x0, 0.0, 0.0);
        let b = mesh.push_vertex(x0 + 1.0, 0.0, 0.0);
        let c = mesh.push_vertex(x0 + 1.0, 1.0, 0.0);
        let d = mesh.push_vertex(x0, 1.0, 0.0);
        mesh.push_polygon([a, b, c, d], material);
    }
    mesh
}
