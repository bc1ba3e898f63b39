//! `silhouette info`: topology statistics.

use std::path::Path;

use anyhow::{Context, Result};
use mesh_silhouette::{validate::log_report, MeshTopology, TopologyReport};
use serde::Serialize;

use crate::output;
use crate::OutputFormat;

#[derive(Debug, Serialize)]
struct InfoOutput {
    input: String,
    vertices: usize,
    polygons: usize,
    edges: usize,
    boundary_edges: usize,
    degenerate_polygons: usize,
    closed: bool,
    materials: Vec<u32>,
    dimensions: Option<[f64; 3]>,
}

impl InfoOutput {
    fn new(input: &Path, report: &TopologyReport) -> Self {
        Self {
            input: input.display().to_string(),
            vertices: report.vertex_count,
            polygons: report.polygon_count,
            edges: report.edge_count,
            boundary_edges: report.boundary_edge_count,
            degenerate_polygons: report.degenerate_polygon_count,
            closed: report.is_closed,
            materials: report.materials.iter().copied().collect(),
            dimensions: report.dimensions.map(|(x, y, z)| [x, y, z]),
        }
    }
}

pub fn run(input: &Path, format: OutputFormat, quiet: bool) -> Result<()> {
    let topology = MeshTopology::load(input)
        .with_context(|| format!("failed to load {}", input.display()))?;
    let report = topology.report();
    log_report(&report);

    match format {
        OutputFormat::Text => {
            output::info(&report.to_string(), format, quiet);
            if !report.is_valid() {
                output::warning("no polygon can ever face the viewer", format, quiet);
            }
        }
        OutputFormat::Json => output::print(&InfoOutput::new(input, &report), format, quiet),
    }

    Ok(())
}
