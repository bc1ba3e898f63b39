//! Emitting traced loops to a vector path interface.

use nalgebra::Point2;
use tracing::warn;

use crate::topology::MeshTopology;
use crate::trace::{SilhouetteLoop, Winding};
use crate::types::Orientation;

/// Receiver for vector path commands.
///
/// Mirrors an immediate-mode path API: a path is opened with `begin_path`,
/// built from subpaths (`move_to`, `line_to`..., `close_path`), each subpath
/// optionally tagged with `set_winding`, and finally filled and/or stroked.
/// Coordinates are screen space, y up.
pub trait PathSink {
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);
    /// Winding of the subpath that was just closed.
    fn set_winding(&mut self, winding: Winding);
    fn fill(&mut self);
    fn stroke(&mut self);
}

/// A recorded path command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    BeginPath,
    MoveTo(f64, f64),
    LineTo(f64, f64),
    ClosePath,
    SetWinding(Winding),
    Fill,
    Stroke,
}

impl PathSink for Vec<PathCommand> {
    fn begin_path(&mut self) {
        self.push(PathCommand::BeginPath);
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.push(PathCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push(PathCommand::LineTo(x, y));
    }

    fn close_path(&mut self) {
        self.push(PathCommand::ClosePath);
    }

    fn set_winding(&mut self, winding: Winding) {
        self.push(PathCommand::SetWinding(winding));
    }

    fn fill(&mut self) {
        self.push(PathCommand::Fill);
    }

    fn stroke(&mut self) {
        self.push(PathCommand::Stroke);
    }
}

/// A projected loop ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct SubPath {
    pub points: Vec<Point2<f64>>,
    pub winding: Winding,
}

/// Projects loops through an orientation and feeds them to a [`PathSink`].
#[derive(Debug, Clone, Copy)]
pub struct PathEmitter {
    orientation: Orientation,
    fill: bool,
    stroke: bool,
}

impl PathEmitter {
    /// Emitter that only builds the path; no fill or stroke is issued.
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            fill: false,
            stroke: false,
        }
    }

    /// Issue `fill` after the last subpath.
    pub fn with_fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    /// Issue `stroke` after the last subpath (and after `fill`).
    pub fn with_stroke(mut self, stroke: bool) -> Self {
        self.stroke = stroke;
        self
    }

    /// Project loop vertices to screen space without emitting anything.
    ///
    /// Loops referencing vertices outside the topology are skipped with a
    /// warning.
    pub fn project(&self, topology: &MeshTopology, loops: &[SilhouetteLoop]) -> Vec<SubPath> {
        loops
            .iter()
            .enumerate()
            .filter_map(|(i, l)| {
                let Some(points) = l
                    .vertices
                    .iter()
                    .map(|&v| topology.position(v).map(|p| self.orientation.project(&p)))
                    .collect::<Option<Vec<_>>>()
                else {
                    warn!(
                        "Skipping loop {}: references vertices outside the mesh ({} vertices)",
                        i,
                        topology.vertex_count()
                    );
                    return None;
                };
                (!points.is_empty()).then_some(SubPath {
                    points,
                    winding: l.winding,
                })
            })
            .collect()
    }

    /// Emit one subpath per loop; returns the number of subpaths emitted.
    ///
    /// Nothing at all is emitted for an empty loop list.
    pub fn emit<S: PathSink + ?Sized>(
        &self,
        topology: &MeshTopology,
        loops: &[SilhouetteLoop],
        sink: &mut S,
    ) -> usize {
        let subpaths = self.project(topology, loops);
        if subpaths.is_empty() {
            return 0;
        }

        sink.begin_path();
        for subpath in &subpaths {
            let (first, rest) = match subpath.points.split_first() {
                Some(split) => split,
                None => continue,
            };
            sink.move_to(first.x, first.y);
            for p in rest {
                sink.line_to(p.x, p.y);
            }
            sink.close_path();
            sink.set_winding(subpath.winding);
        }

        if self.fill {
            sink.fill();
        }
        if self.stroke {
            sink.stroke();
        }

        subpaths.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::fixtures::{cube, two_squares};
    use crate::trace::{trace_loops, TieBreakPolicy};
    use nalgebra::Vector3;

    fn top_face_loops() -> (MeshTopology, Vec<SilhouetteLoop>) {
        let topo = MeshTopology::build(&cube()).unwrap();
        let c = classify(&topo, &Vector3::z(), 0).unwrap();
        let loops =
            trace_loops(&topo, &c, Orientation::identity(), TieBreakPolicy::Reject).unwrap();
        (topo, loops)
    }

    #[test]
    fn test_emit_square() {
        let (topo, loops) = top_face_loops();
        let mut commands: Vec<PathCommand> = Vec::new();
        let emitted = PathEmitter::new(Orientation::identity())
            .with_fill(true)
            .with_stroke(true)
            .emit(&topo, &loops, &mut commands);

        assert_eq!(emitted, 1);
        assert_eq!(
            commands,
            vec![
                PathCommand::BeginPath,
                PathCommand::MoveTo(0.0, 0.0),
                PathCommand::LineTo(10.0, 0.0),
                PathCommand::LineTo(10.0, 10.0),
                PathCommand::LineTo(0.0, 10.0),
                PathCommand::ClosePath,
                PathCommand::SetWinding(Winding::CounterClockwise),
                PathCommand::Fill,
                PathCommand::Stroke,
            ]
        );
    }

    #[test]
    fn test_emit_nothing_for_no_loops() {
        let topo = MeshTopology::build(&cube()).unwrap();
        let mut commands: Vec<PathCommand> = Vec::new();
        let emitted = PathEmitter::new(Orientation::identity())
            .with_fill(true)
            .emit(&topo, &[], &mut commands);
        assert_eq!(emitted, 0);
        assert!(commands.is_empty());
    }

    #[test]
    fn test_one_subpath_per_island() {
        let mut mesh = two_squares();
        mesh.polygons[1].material = 0;
        let topo = MeshTopology::build(&mesh).unwrap();
        let c = classify(&topo, &Vector3::z(), 0).unwrap();
        let loops =
            trace_loops(&topo, &c, Orientation::identity(), TieBreakPolicy::Reject).unwrap();

        let mut commands: Vec<PathCommand> = Vec::new();
        let emitted = PathEmitter::new(Orientation::identity()).emit(&topo, &loops, &mut commands);
        assert_eq!(emitted, 2);
        let begins = commands.iter().filter(|c| **c == PathCommand::BeginPath).count();
        let moves = commands.iter().filter(|c| matches!(c, PathCommand::MoveTo(..))).count();
        let closes = commands.iter().filter(|c| **c == PathCommand::ClosePath).count();
        assert_eq!((begins, moves, closes), (1, 2, 2));
        assert!(!commands.contains(&PathCommand::Fill));
    }

    #[test]
    fn test_projection_applies_orientation() {
        let (topo, loops) = top_face_loops();
        // Swap screen x and y.
        let swap = Orientation::from_rows([[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        let subpaths = PathEmitter::new(swap).project(&topo, &loops);
        assert_eq!(subpaths.len(), 1);
        assert_eq!(subpaths[0].points[1], Point2::new(0.0, 10.0));
        assert_eq!(subpaths[0].winding, Winding::CounterClockwise);
    }

    #[test]
    fn test_loop_with_unknown_vertex_is_skipped() {
        let (topo, mut loops) = top_face_loops();
        let mut stray = loops[0].clone();
        stray.vertices[2] = topo.vertex_count() as u32 + 3;
        loops.insert(0, stray);

        let subpaths = PathEmitter::new(Orientation::identity()).project(&topo, &loops);
        assert_eq!(subpaths.len(), 1);
        assert_eq!(subpaths[0].points[2], Point2::new(10.0, 10.0));

        let mut commands: Vec<PathCommand> = Vec::new();
        let emitted = PathEmitter::new(Orientation::identity()).emit(&topo, &loops, &mut commands);
        assert_eq!(emitted, 1);
    }
}
