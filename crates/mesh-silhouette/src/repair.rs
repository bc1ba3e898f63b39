//! Cleanup passes for polygon soups before topology construction.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::{debug, info};

use crate::PolygonMesh;

/// Default weld distance used by the file loaders.
pub const DEFAULT_WELD_EPSILON: f64 = 1e-6;

/// Weld vertices that are within epsilon distance of each other.
///
/// Uses spatial hashing. Polygons are remapped onto the surviving vertex
/// (the smallest index of each cluster), then cleaned with
/// [`remove_degenerate_polygons`]. Returns the number of vertices merged.
/// Merged vertices stay in the vertex list; see [`remove_unreferenced_vertices`].
pub fn weld_vertices(mesh: &mut PolygonMesh, epsilon: f64) -> usize {
    let vertex_count = mesh.vertices.len();
    if vertex_count == 0 || epsilon <= 0.0 {
        return 0;
    }

    let cell_size = epsilon * 2.0;

    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<u32>> = HashMap::new();
    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        let cell = pos_to_cell(&vertex.position, cell_size);
        spatial_hash.entry(cell).or_default().push(idx as u32);
    }

    let mut vertex_remap: Vec<u32> = (0..vertex_count as u32).collect();
    let mut merged_count = 0;

    for (idx, vertex) in mesh.vertices.iter().enumerate() {
        let idx = idx as u32;
        if vertex_remap[idx as usize] != idx {
            continue;
        }

        let cell = pos_to_cell(&vertex.position, cell_size);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (cell.0 + dx, cell.1 + dy, cell.2 + dz);
                    let Some(candidates) = spatial_hash.get(&neighbor) else {
                        continue;
                    };
                    for &other in candidates {
                        if other <= idx || vertex_remap[other as usize] != other {
                            continue;
                        }
                        let distance =
                            (vertex.position - mesh.vertices[other as usize].position).norm();
                        if distance < epsilon {
                            vertex_remap[other as usize] = idx;
                            merged_count += 1;
                        }
                    }
                }
            }
        }
    }

    if merged_count == 0 {
        return 0;
    }

    for polygon in &mut mesh.polygons {
        for v in &mut polygon.vertices {
            *v = vertex_remap[*v as usize];
        }
    }
    remove_degenerate_polygons(mesh);

    info!(
        "Welded {} vertices (epsilon = {:e}): {} → {}",
        merged_count,
        epsilon,
        vertex_count,
        vertex_count - merged_count
    );

    merged_count
}

/// Collapse repeated consecutive vertices and drop polygons left with fewer
/// than three. Returns the number of polygons removed.
pub fn remove_degenerate_polygons(mesh: &mut PolygonMesh) -> usize {
    let original = mesh.polygons.len();

    for polygon in &mut mesh.polygons {
        polygon.vertices.dedup();
        while polygon.vertices.len() > 1 && polygon.vertices.first() == polygon.vertices.last() {
            polygon.vertices.pop();
        }
    }
    mesh.polygons.retain(|p| p.len() >= 3);

    let removed = original - mesh.polygons.len();
    if removed > 0 {
        debug!("Removed {} degenerate polygons", removed);
    }
    removed
}

/// Remove unreferenced vertices and compact the vertex array.
///
/// Returns the number of vertices removed. Relative vertex order is kept.
pub fn remove_unreferenced_vertices(mesh: &mut PolygonMesh) -> usize {
    let original = mesh.vertices.len();

    let mut referenced = vec![false; original];
    for polygon in &mesh.polygons {
        for &v in &polygon.vertices {
            if let Some(flag) = referenced.get_mut(v as usize) {
                *flag = true;
            }
        }
    }

    let mut remap = vec![u32::MAX; original];
    let mut next = 0u32;
    for (old, _) in referenced.iter().enumerate().filter(|(_, &r)| r) {
        remap[old] = next;
        next += 1;
    }

    if next as usize == original {
        return 0;
    }

    let mut idx = 0;
    mesh.vertices.retain(|_| {
        let keep = referenced[idx];
        idx += 1;
        keep
    });
    for polygon in &mut mesh.polygons {
        for v in &mut polygon.vertices {
            *v = remap[*v as usize];
        }
    }

    let removed = original - mesh.vertices.len();
    debug!("Removed {} unreferenced vertices", removed);
    removed
}

/// Weld and compact. Returns the number of vertices merged.
pub fn weld_and_compact(mesh: &mut PolygonMesh, epsilon: f64) -> usize {
    let merged = weld_vertices(mesh, epsilon);
    remove_degenerate_polygons(mesh);
    remove_unreferenced_vertices(mesh);
    merged
}

#[inline]
fn pos_to_cell(pos: &Point3<f64>, cell_size: f64) -> (i64, i64, i64) {
    (
        (pos.x / cell_size).floor() as i64,
        (pos.y / cell_size).floor() as i64,
        (pos.z / cell_size).floor() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::MeshTopology;

    /// Two quads sharing an edge, each with its own copy of the shared vertices.
    fn split_quads() -> PolygonMesh {
        let mut mesh = PolygonMesh::new();
        mesh.push_vertex(0.0, 0.0, 0.0);
        mesh.push_vertex(1.0, 0.0, 0.0);
        mesh.push_vertex(1.0, 1.0, 0.0);
        mesh.push_vertex(0.0, 1.0, 0.0);
        mesh.push_vertex(1.0, 0.0, 0.0);
        mesh.push_vertex(2.0, 0.0, 0.0);
        mesh.push_vertex(2.0, 1.0, 0.0);
        mesh.push_vertex(1.0, 1.0, 0.0);
        mesh.push_polygon([0, 1, 2, 3], 0);
        mesh.push_polygon([4, 5, 6, 7], 1);
        mesh
    }

    #[test]
    fn test_weld_shares_edges() {
        let mut mesh = split_quads();
        let before = MeshTopology::build(&mesh).unwrap();
        assert_eq!(before.edge_count(), 8);

        let merged = weld_vertices(&mut mesh, 1e-6);
        assert_eq!(merged, 2);
        assert_eq!(mesh.polygons[1].vertices, vec![1, 5, 6, 2]);

        let after = MeshTopology::build(&mesh).unwrap();
        assert_eq!(after.edge_count(), 7);
        let shared = after.edge(after.find_edge(1, 2).unwrap()).unwrap();
        assert_eq!(shared.side_count(), 2);
    }

    #[test]
    fn test_weld_respects_epsilon() {
        let mut mesh = split_quads();
        mesh.vertices[4].position.x += 0.01;
        mesh.vertices[7].position.x += 0.01;
        assert_eq!(weld_vertices(&mut mesh, 1e-3), 0);
        assert_eq!(weld_vertices(&mut mesh, 0.1), 2);
    }

    #[test]
    fn test_remove_degenerate_polygons() {
        let mut mesh = PolygonMesh::new();
        for i in 0..4 {
            mesh.push_vertex(i as f64, (i % 2) as f64, 0.0);
        }
        mesh.push_polygon([0, 1, 1, 2, 0], 0);
        mesh.push_polygon([2, 3, 3, 2], 0);

        assert_eq!(remove_degenerate_polygons(&mut mesh), 1);
        assert_eq!(mesh.polygons.len(), 1);
        assert_eq!(mesh.polygons[0].vertices, vec![0, 1, 2]);
    }

    #[test]
    fn test_weld_and_compact() {
        let mut mesh = split_quads();
        assert_eq!(weld_and_compact(&mut mesh, 1e-6), 2);
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.polygons[0].vertices, vec![0, 1, 2, 3]);
        assert_eq!(mesh.polygons[1].vertices, vec![1, 4, 5, 2]);
        assert_eq!(mesh.polygons[1].material, 1);
    }
}
