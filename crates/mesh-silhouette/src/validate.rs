//! Topology statistics and reporting.

use std::collections::BTreeSet;

use nalgebra::Point3;
use tracing::{debug, info, warn};

use crate::topology::MeshTopology;

/// Summary of a built [`MeshTopology`].
#[derive(Debug, Clone)]
pub struct TopologyReport {
    /// Whether every edge has both sides populated.
    pub is_closed: bool,

    /// Number of edges with a single incident polygon.
    pub boundary_edge_count: usize,

    /// Polygons whose normal is degenerate; they never face the viewer.
    pub degenerate_polygon_count: usize,

    pub vertex_count: usize,
    pub polygon_count: usize,
    pub edge_count: usize,

    /// Distinct material ids.
    pub materials: BTreeSet<u32>,

    /// Bounding box as (min_corner, max_corner).
    pub bounds: Option<(Point3<f64>, Point3<f64>)>,

    /// Dimensions (x, y, z).
    pub dimensions: Option<(f64, f64, f64)>,
}

impl TopologyReport {
    /// Check if the topology has anything to draw.
    pub fn is_valid(&self) -> bool {
        self.polygon_count > 0 && self.degenerate_polygon_count < self.polygon_count
    }

    /// Vertex, edge and polygon counts satisfy V - E + F = 2.
    pub fn is_sphere_like(&self) -> bool {
        self.is_closed
            && self.vertex_count as i64 - self.edge_count as i64 + self.polygon_count as i64 == 2
    }
}

impl std::fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Topology Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Polygons: {}", self.polygon_count)?;
        writeln!(f, "  Edges: {}", self.edge_count)?;

        let materials: Vec<String> = self.materials.iter().map(|m| m.to_string()).collect();
        writeln!(f, "  Materials: {}", materials.join(", "))?;

        if let Some((min, max)) = &self.bounds {
            writeln!(
                f,
                "  Bounds: [{:.1}, {:.1}, {:.1}] to [{:.1}, {:.1}, {:.1}]",
                min.x, min.y, min.z, max.x, max.y, max.z
            )?;
        }

        if let Some((dx, dy, dz)) = &self.dimensions {
            writeln!(f, "  Dimensions: {:.1} x {:.1} x {:.1}", dx, dy, dz)?;
        }

        writeln!(
            f,
            "  Closed: {} (boundary edges: {})",
            if self.is_closed { "yes" } else { "NO" },
            self.boundary_edge_count
        )?;

        writeln!(f, "  Degenerate polygons: {}", self.degenerate_polygon_count)?;

        Ok(())
    }
}

/// Build a report for a topology.
pub fn report_topology(topology: &MeshTopology) -> TopologyReport {
    let bounds = topology.mesh().bounds();
    let dimensions = bounds.map(|(min, max)| (max.x - min.x, max.y - min.y, max.z - min.z));

    let report = TopologyReport {
        is_closed: topology.is_closed(),
        boundary_edge_count: topology.boundary_edge_count(),
        degenerate_polygon_count: topology.degenerate_polygon_count(),
        vertex_count: topology.vertex_count(),
        polygon_count: topology.polygon_count(),
        edge_count: topology.edge_count(),
        materials: topology.materials(),
        bounds,
        dimensions,
    };

    debug!("{}", report);

    report
}

/// Log a summary of a topology report.
pub fn log_report(report: &TopologyReport) {
    info!(
        "Topology: {} verts, {} polygons, {} edges, {} materials",
        report.vertex_count,
        report.polygon_count,
        report.edge_count,
        report.materials.len()
    );

    if !report.is_closed {
        warn!(
            "Mesh is open: {} boundary edges will be drawn next to visible polygons",
            report.boundary_edge_count
        );
    }
    if report.degenerate_polygon_count > 0 {
        warn!(
            "{} degenerate polygons are never visible",
            report.degenerate_polygon_count
        );
    }
}
