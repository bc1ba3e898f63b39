//! Silhouette extraction for polygon meshes.
//!
//! This crate turns a polygon soup into closed, wound 2-D outlines of the
//! polygons that face a viewer:
//!
//! - **Topology**: canonical edge arena with left/right polygon adjacency
//! - **Classification**: per view direction and material, visible polygons and silhouette edges
//! - **Tracing**: silhouette edges walked into closed loops with shoelace winding
//! - **Emission**: loops projected and fed to a vector path sink (SVG included)
//!
//! # Example
//!
//! ```no_run
//! use mesh_silhouette::{MeshTopology, SilhouetteParams, svg::SvgPath};
//! use nalgebra::Vector3;
//!
//! let topology = MeshTopology::load("model.obj").unwrap();
//!
//! let params = SilhouetteParams::new()
//!     .with_material(0)
//!     .with_view_direction(Vector3::new(1.0, 1.0, 1.0));
//!
//! let mut svg = SvgPath::new();
//! mesh_silhouette::draw_silhouette(&topology, &params, &mut svg).unwrap();
//! mesh_silhouette::io::save_svg(&svg, "outline.svg".as_ref()).unwrap();
//! ```

mod error;
mod types;

pub mod classify;
pub mod emit;
pub mod io;
pub mod params;
pub mod repair;
pub mod svg;
pub mod topology;
pub mod trace;
pub mod validate;

#[cfg(test)]
mod fixtures;

// Re-export core types at crate root
pub use error::{MeshError, MeshResult};
pub use types::{Orientation, Polygon, PolygonMesh, Vertex, UNASSIGNED_MATERIAL};

pub use classify::{classify, Classification};
pub use emit::{PathCommand, PathEmitter, PathSink, SubPath};
pub use io::{load_mesh, save_svg, MeshFormat};
pub use params::SilhouetteParams;
pub use repair::weld_vertices;
pub use topology::{Edge, EdgeId, MeshTopology, Side};
pub use trace::{
    trace_loops, Branch, Candidate, LoopTracer, SilhouetteLoop, TieBreak, TieBreakPolicy, Winding,
};
pub use validate::{report_topology, TopologyReport};

// Convenience methods on MeshTopology
impl MeshTopology {
    /// Load a mesh file and build its topology.
    pub fn load(path: impl AsRef<std::path::Path>) -> MeshResult<Self> {
        let mesh = io::load_mesh(path.as_ref())?;
        Self::build(&mesh)
    }

    /// Summarize the topology.
    pub fn report(&self) -> TopologyReport {
        validate::report_topology(self)
    }

    /// Classify and trace in one call.
    ///
    /// Returns no loops when nothing of the material faces the viewer.
    pub fn silhouette(&self, params: &SilhouetteParams) -> MeshResult<Vec<SilhouetteLoop>> {
        let Some(classification) = classify::classify(self, &params.view_direction, params.material)
        else {
            return Ok(Vec::new());
        };
        trace::trace_loops(self, &classification, params.orientation(), params.tie_break)
    }
}

/// Classify, trace and emit to `sink`; returns the number of subpaths drawn.
pub fn draw_silhouette<S: PathSink + ?Sized>(
    topology: &MeshTopology,
    params: &SilhouetteParams,
    sink: &mut S,
) -> MeshResult<usize> {
    let loops = topology.silhouette(params)?;
    let emitted = PathEmitter::new(params.orientation())
        .with_fill(params.fill)
        .with_stroke(params.stroke)
        .emit(topology, &loops, sink);
    Ok(emitted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{cube, two_squares};
    use nalgebra::Vector3;

    #[test]
    fn test_corner_view_pipeline() {
        let topology = MeshTopology::build(&cube()).unwrap();
        let params = SilhouetteParams::new().with_view_direction(Vector3::new(1.0, 1.0, 1.0));

        let loops = topology.silhouette(&params).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].len(), 6);
        // Front faces seen from the viewer run counter-clockwise.
        assert_eq!(loops[0].winding, Winding::CounterClockwise);

        let mut commands: Vec<PathCommand> = Vec::new();
        assert_eq!(draw_silhouette(&topology, &params, &mut commands).unwrap(), 1);
        assert_eq!(commands.len(), 11);
        assert_eq!(commands[0], PathCommand::BeginPath);
        assert_eq!(commands[9], PathCommand::Fill);
        assert_eq!(commands[10], PathCommand::Stroke);
    }

    #[test]
    fn test_nothing_visible_draws_nothing() {
        let topology = MeshTopology::build(&two_squares()).unwrap();
        let params = SilhouetteParams::new().with_view_direction(-Vector3::z());

        assert!(topology.silhouette(&params).unwrap().is_empty());

        let mut commands: Vec<PathCommand> = Vec::new();
        assert_eq!(draw_silhouette(&topology, &params, &mut commands).unwrap(), 0);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_material_selects_island() {
        let topology = MeshTopology::build(&two_squares()).unwrap();
        let params = SilhouetteParams::new().with_material(1).with_stroke(false);

        let mut svg = svg::SvgPath::new();
        assert_eq!(draw_silhouette(&topology, &params, &mut svg).unwrap(), 1);
        assert_eq!(svg.data(), "M 5 0 L 6 0 L 6 -1 L 5 -1 Z");
    }

    #[test]
    fn test_report_convenience() {
        let topology = MeshTopology::build(&cube()).unwrap();
        assert!(topology.report().is_closed);
    }
}
