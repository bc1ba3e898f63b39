//! Per-query visibility classification.
//!
//! A polygon is visible when it carries the requested material and faces the
//! viewer. Silhouette ("draw") edges are the edges whose two sides disagree on
//! visibility; a missing side counts as invisible, so open mesh borders next to
//! a visible polygon are drawn too.

use nalgebra::Vector3;
use tracing::debug;

use crate::topology::{EdgeId, MeshTopology};

/// Visibility flags for one (view direction, material) query.
///
/// Always built fresh by [`classify`]; nothing here is cached on the topology.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Per polygon: material matches and the polygon faces the viewer.
    pub polygon_visible: Vec<bool>,

    /// Per edge: visibility differs between its two sides.
    pub edge_draw: Vec<bool>,

    /// Per edge: the visible side is the right one, so the directed
    /// silhouette edge runs high→low.
    pub edge_reverse: Vec<bool>,

    edge_vertices: Vec<[u32; 2]>,
}

impl Classification {
    /// Directed `(from, to)` vertices of an edge, following its visible side.
    ///
    /// Returns None for unknown edge ids.
    pub fn directed(&self, edge: EdgeId) -> Option<(u32, u32)> {
        let [lo, hi] = *self.edge_vertices.get(edge as usize)?;
        if self.edge_reverse[edge as usize] {
            Some((hi, lo))
        } else {
            Some((lo, hi))
        }
    }

    /// Ids of the draw edges, ascending.
    pub fn draw_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edge_draw
            .iter()
            .enumerate()
            .filter(|(_, &draw)| draw)
            .map(|(id, _)| id as EdgeId)
    }

    /// Check that this classification was built from `topology`.
    pub fn is_for(&self, topology: &MeshTopology) -> bool {
        self.polygon_visible.len() == topology.polygon_count()
            && self.edge_vertices.len() == topology.edge_count()
            && self
                .edge_vertices
                .iter()
                .zip(topology.edges())
                .all(|(vertices, edge)| *vertices == edge.vertices)
    }

    pub fn visible_count(&self) -> usize {
        self.polygon_visible.iter().filter(|&&v| v).count()
    }

    pub fn draw_edge_count(&self) -> usize {
        self.edge_draw.iter().filter(|&&d| d).count()
    }
}

/// Classify polygons and edges for a view direction and material.
///
/// `view_direction` points from the surface toward the viewer; a polygon is
/// front-facing when its normal has a strictly positive dot product with it.
///
/// Returns None when no polygon is visible, i.e. there is nothing to draw.
pub fn classify(
    topology: &MeshTopology,
    view_direction: &Vector3<f64>,
    material: u32,
) -> Option<Classification> {
    let polygon_visible: Vec<bool> = topology
        .mesh()
        .polygons
        .iter()
        .zip(topology.normals())
        .map(|(polygon, normal)| polygon.material == material && view_direction.dot(normal) > 0.0)
        .collect();

    if !polygon_visible.iter().any(|&v| v) {
        debug!("No polygon of material {} faces {:?}", material, view_direction);
        return None;
    }

    let visible = |side: Option<u32>| side.is_some_and(|p| polygon_visible[p as usize]);

    let edge_count = topology.edge_count();
    let mut edge_draw = Vec::with_capacity(edge_count);
    let mut edge_reverse = Vec::with_capacity(edge_count);
    let mut edge_vertices = Vec::with_capacity(edge_count);

    for edge in topology.edges() {
        let left = visible(edge.left);
        let right = visible(edge.right);
        edge_draw.push(left != right);
        edge_reverse.push(right && !left);
        edge_vertices.push(edge.vertices);
    }

    let classification = Classification {
        polygon_visible,
        edge_draw,
        edge_reverse,
        edge_vertices,
    };

    debug!(
        "Material {}: {} visible polygons, {} silhouette edges",
        material,
        classification.visible_count(),
        classification.draw_edge_count()
    );

    Some(classification)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cube, tetrahedron, two_squares};
    use crate::types::PolygonMesh;
    use approx::assert_relative_eq;

    #[test]
    fn test_view_along_normal_is_visible() {
        let topo = MeshTopology::build(&tetrahedron()).unwrap();
        for polygon in 0..topo.polygon_count() as u32 {
            let normal = topo.normal(polygon).unwrap();

            let front = classify(&topo, &normal, 0).expect("polygon faces the view");
            assert!(front.polygon_visible[polygon as usize]);

            let back = classify(&topo, &(-normal), 0);
            assert!(back.map_or(true, |c| !c.polygon_visible[polygon as usize]));
        }
    }

    #[test]
    fn test_small_scale_polygon_is_visible_along_its_normal() {
        let mut mesh = PolygonMesh::new();
        mesh.push_vertex(0.0, 0.0, 0.0);
        mesh.push_vertex(2e-4, 0.0, 0.0);
        mesh.push_vertex(0.0, 1e-4, 0.0);
        mesh.push_polygon([0, 1, 2], 0);
        let topo = MeshTopology::build(&mesh).unwrap();

        let normal = topo.normal(0).unwrap();
        assert_relative_eq!(normal, Vector3::z(), epsilon = 1e-12);
        let c = classify(&topo, &normal, 0).expect("polygon faces the view");
        assert!(c.polygon_visible[0]);
        assert_eq!(c.draw_edge_count(), 3);
    }

    #[test]
    fn test_tetrahedron_apex_view() {
        let topo = MeshTopology::build(&tetrahedron()).unwrap();
        let view = Vector3::new(1.0, 1.0, -1.0).normalize();
        let c = classify(&topo, &view, 0).unwrap();

        assert_eq!(c.polygon_visible, vec![true, false, false, false]);
        assert_eq!(c.draw_edge_count(), 3);
        // The visible face walks 0->1, 1->2, 2->0.
        let mut directed: Vec<_> = c.draw_edges().map(|e| c.directed(e).unwrap()).collect();
        directed.sort_unstable();
        assert_eq!(directed, vec![(0, 1), (1, 2), (2, 0)]);
    }

    #[test]
    fn test_perpendicular_faces_are_hidden() {
        let topo = MeshTopology::build(&cube()).unwrap();
        let c = classify(&topo, &Vector3::z(), 0).unwrap();
        // Only the top face has a positive dot product with +z.
        assert_eq!(c.visible_count(), 1);
        assert!(c.polygon_visible[1]);
        assert_eq!(c.draw_edge_count(), 4);
    }

    #[test]
    fn test_material_filter() {
        let topo = MeshTopology::build(&two_squares()).unwrap();
        let c = classify(&topo, &Vector3::z(), 1).unwrap();
        assert_eq!(c.polygon_visible, vec![false, true]);
        assert_eq!(c.draw_edge_count(), 4);

        assert!(classify(&topo, &Vector3::z(), 7).is_none());
    }

    #[test]
    fn test_back_view_draws_nothing() {
        let topo = MeshTopology::build(&two_squares()).unwrap();
        assert!(classify(&topo, &-Vector3::z(), 0).is_none());
    }

    #[test]
    fn test_reverse_follows_visible_side() {
        let topo = MeshTopology::build(&cube()).unwrap();
        let c = classify(&topo, &Vector3::z(), 0).unwrap();
        // Top face [4, 5, 6, 7] walks 4->5, 5->6, 6->7 low→high and 7->4 high→low.
        let e67 = topo.find_edge(6, 7).unwrap();
        let e47 = topo.find_edge(4, 7).unwrap();
        assert!(!c.edge_reverse[e67 as usize]);
        assert!(c.edge_reverse[e47 as usize]);
        assert_eq!(c.directed(e67), Some((6, 7)));
        assert_eq!(c.directed(e47), Some((7, 4)));
    }

    #[test]
    fn test_hidden_interior_edges_not_drawn() {
        let topo = MeshTopology::build(&cube()).unwrap();
        let view = Vector3::new(1.0, 1.0, 1.0).normalize();
        let c = classify(&topo, &view, 0).unwrap();
        assert_eq!(c.visible_count(), 3);
        // Hexagonal outline; the three edges between visible faces are not drawn.
        assert_eq!(c.draw_edge_count(), 6);
        let e56 = topo.find_edge(5, 6).unwrap();
        assert!(!c.edge_draw[e56 as usize]);
    }
}
