//! Tracing silhouette edges into closed loops.
//!
//! Each directed draw edge follows the winding of its visible polygon, so a
//! walk that always leaves a vertex along an outgoing draw edge closes into a
//! loop wound like the visible region it encloses. Separate loops ("islands")
//! are returned separately.

use std::fmt;

use nalgebra::{Point2, Vector2};
use tracing::debug;

use crate::classify::Classification;
use crate::error::{MeshError, MeshResult};
use crate::topology::{EdgeId, MeshTopology};
use crate::types::Orientation;

/// Direction of a projected loop in y-up screen space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum Winding {
    CounterClockwise,
    Clockwise,
}

impl Winding {
    /// Winding for a shoelace sum `Σ (x_i − x_{i−1})·(y_i + y_{i−1})`.
    ///
    /// The sum is minus twice the signed area, so counter-clockwise loops
    /// give a negative value. Zero-area loops count as clockwise.
    pub fn from_shoelace(sum: f64) -> Self {
        if sum < 0.0 {
            Winding::CounterClockwise
        } else {
            Winding::Clockwise
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Winding::CounterClockwise => Winding::Clockwise,
            Winding::Clockwise => Winding::CounterClockwise,
        }
    }
}

impl fmt::Display for Winding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winding::CounterClockwise => write!(f, "ccw"),
            Winding::Clockwise => write!(f, "cw"),
        }
    }
}

/// One closed silhouette loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SilhouetteLoop {
    /// Vertex indices in walk order; the closing edge back to the first
    /// vertex is implied.
    pub vertices: Vec<u32>,

    /// Edge ids in walk order; `edges[i]` leaves `vertices[i]`.
    pub edges: Vec<EdgeId>,

    /// Shoelace sum over the projected vertices.
    pub shoelace: f64,

    pub winding: Winding,
}

impl SilhouetteLoop {
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Signed area in screen space, positive when counter-clockwise.
    #[inline]
    pub fn signed_area(&self) -> f64 {
        -0.5 * self.shoelace
    }
}

/// A candidate exit at a branch point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub edge: EdgeId,
    /// Vertex the edge leads to.
    pub to: u32,
    /// Projected direction of the edge.
    pub direction: Vector2<f64>,
}

/// A vertex where the walk has more than one way to go.
///
/// When the walk is back at the vertex it started from, the seed edge is
/// among the candidates; choosing it closes the loop.
#[derive(Debug, Clone)]
pub struct Branch<'a> {
    pub vertex: u32,
    /// Edge the walk arrived by.
    pub incoming: EdgeId,
    /// Projected direction of the incoming edge.
    pub incoming_direction: Vector2<f64>,
    /// Exits in ascending edge id order.
    pub candidates: &'a [Candidate],
}

/// Strategy for choosing an exit at a branch point.
///
/// Returning None declines the choice and makes the trace fail with
/// [`MeshError::AmbiguousTraversal`]. Returning an edge that is not among the
/// candidates is treated the same way.
pub trait TieBreak {
    fn choose(&self, branch: &Branch<'_>) -> Option<EdgeId>;
}

impl<F> TieBreak for F
where
    F: Fn(&Branch<'_>) -> Option<EdgeId>,
{
    fn choose(&self, branch: &Branch<'_>) -> Option<EdgeId> {
        self(branch)
    }
}

/// Built-in tie-break strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum TieBreakPolicy {
    /// Never choose; branch points are reported as errors.
    Reject,

    /// Take the exit that turns least relative to the incoming edge,
    /// measured in projected screen space. Equal turns go to the lower id.
    #[default]
    MinTurningAngle,

    /// Take the exit with the lowest edge id.
    LowestEdgeId,
}

impl TieBreak for TieBreakPolicy {
    fn choose(&self, branch: &Branch<'_>) -> Option<EdgeId> {
        match self {
            TieBreakPolicy::Reject => None,
            TieBreakPolicy::LowestEdgeId => branch.candidates.iter().map(|c| c.edge).min(),
            TieBreakPolicy::MinTurningAngle => branch
                .candidates
                .iter()
                .map(|c| (turning_angle(&branch.incoming_direction, &c.direction), c.edge))
                .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)))
                .map(|(_, edge)| edge),
        }
    }
}

impl fmt::Display for TieBreakPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreakPolicy::Reject => write!(f, "reject"),
            TieBreakPolicy::MinTurningAngle => write!(f, "min-turning-angle"),
            TieBreakPolicy::LowestEdgeId => write!(f, "lowest-edge-id"),
        }
    }
}

/// Absolute angle in radians between two directions, in `[0, π]`.
fn turning_angle(incoming: &Vector2<f64>, outgoing: &Vector2<f64>) -> f64 {
    incoming.perp(outgoing).atan2(incoming.dot(outgoing)).abs()
}

/// Walks the draw edges of a [`Classification`] into closed loops.
pub struct LoopTracer<'a, T = TieBreakPolicy> {
    topology: &'a MeshTopology,
    orientation: Orientation,
    tie_break: T,
}

impl<'a> LoopTracer<'a, TieBreakPolicy> {
    /// Tracer with the default tie-break ([`TieBreakPolicy::MinTurningAngle`]).
    pub fn new(topology: &'a MeshTopology, orientation: Orientation) -> Self {
        Self::with_tie_break(topology, orientation, TieBreakPolicy::default())
    }
}

impl<'a, T: TieBreak> LoopTracer<'a, T> {
    pub fn with_tie_break(
        topology: &'a MeshTopology,
        orientation: Orientation,
        tie_break: T,
    ) -> Self {
        Self {
            topology,
            orientation,
            tie_break,
        }
    }

    fn project(&self, vertex: u32) -> Point2<f64> {
        let position = self.topology.mesh().vertices[vertex as usize].position;
        self.orientation.project(&position)
    }

    /// Trace every draw edge exactly once.
    ///
    /// Seeds are taken in ascending edge id, so identical inputs always give
    /// identical loops.
    pub fn trace(&self, classification: &Classification) -> MeshResult<Vec<SilhouetteLoop>> {
        let edge_count = self.topology.edge_count();
        if !classification.is_for(self.topology) {
            return Err(MeshError::ClassificationMismatch {
                expected: edge_count,
                found: classification.edge_draw.len(),
            });
        }

        let mut visited = vec![false; edge_count];
        let mut loops = Vec::new();

        for seed in classification.draw_edges() {
            if visited[seed as usize] {
                continue;
            }
            let traced = self.trace_from(seed, classification, &mut visited)?;
            loops.push(traced);
        }

        debug!(
            "Traced {} loops from {} silhouette edges",
            loops.len(),
            classification.draw_edge_count()
        );

        Ok(loops)
    }

    fn trace_from(
        &self,
        seed: EdgeId,
        classification: &Classification,
        visited: &mut [bool],
    ) -> MeshResult<SilhouetteLoop> {
        let directed = |edge: EdgeId| {
            classification
                .directed(edge)
                .ok_or(MeshError::ClassificationMismatch {
                    expected: self.topology.edge_count(),
                    found: classification.edge_draw.len(),
                })
        };

        visited[seed as usize] = true;
        let (start, first) = directed(seed)?;
        let mut current = first;

        let mut vertices = vec![start];
        let mut edges = vec![seed];
        let mut incoming = seed;
        let mut previous_point = self.project(start);
        let mut shoelace = 0.0;
        let mut candidates: Vec<Candidate> = Vec::new();

        loop {
            let point = self.project(current);
            shoelace += (point.x - previous_point.x) * (point.y + previous_point.y);

            candidates.clear();
            // Back at the start, the seed edge is the exit that closes the loop.
            if current == start {
                candidates.push(Candidate {
                    edge: seed,
                    to: first,
                    direction: self.project(first) - point,
                });
            }
            for &edge in self.topology.vertex_edges(current) {
                if !classification.edge_draw[edge as usize] || visited[edge as usize] {
                    continue;
                }
                let (from, to) = directed(edge)?;
                if from == current {
                    candidates.push(Candidate {
                        edge,
                        to,
                        direction: self.project(to) - point,
                    });
                }
            }
            candidates.sort_unstable_by_key(|c| c.edge);

            let next = match candidates.as_slice() {
                [] => {
                    return Err(MeshError::OpenSilhouette {
                        vertex: current,
                        edge: incoming,
                    })
                }
                [only] => *only,
                many => {
                    let branch = Branch {
                        vertex: current,
                        incoming,
                        incoming_direction: point - previous_point,
                        candidates: many,
                    };
                    let chosen = self.tie_break.choose(&branch);
                    match chosen.and_then(|edge| many.iter().find(|c| c.edge == edge)) {
                        Some(candidate) => {
                            debug!(
                                "Branch at vertex {}: took edge {} of {}",
                                current,
                                candidate.edge,
                                many.len()
                            );
                            *candidate
                        }
                        None => {
                            return Err(MeshError::AmbiguousTraversal {
                                vertex: current,
                                candidates: many.iter().map(|c| c.edge).collect(),
                            })
                        }
                    }
                }
            };

            if next.edge == seed {
                break;
            }
            visited[next.edge as usize] = true;
            vertices.push(current);
            edges.push(next.edge);
            incoming = next.edge;
            previous_point = point;
            current = next.to;
        }

        Ok(SilhouetteLoop {
            vertices,
            edges,
            shoelace,
            winding: Winding::from_shoelace(shoelace),
        })
    }
}

/// Trace with a default tracer; see [`LoopTracer::trace`].
pub fn trace_loops(
    topology: &MeshTopology,
    classification: &Classification,
    orientation: Orientation,
    tie_break: TieBreakPolicy,
) -> MeshResult<Vec<SilhouetteLoop>> {
    LoopTracer::with_tie_break(topology, orientation, tie_break).trace(classification)
}
