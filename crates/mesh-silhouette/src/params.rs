//! Per-query silhouette parameters.
//!
//! With the `config` feature, parameters (de)serialize to TOML and JSON:
//!
//! ```toml
//! material = 1
//! view_direction = [0.0, 0.0, 1.0]
//! tie_break = "lowest_edge_id"
//! fill = true
//! stroke = false
//! ```

use nalgebra::Vector3;

use crate::trace::TieBreakPolicy;
use crate::types::Orientation;

#[cfg(feature = "config")]
use crate::error::{MeshError, MeshResult};

/// Parameters for one silhouette query.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct SilhouetteParams {
    /// Material whose polygons are drawn.
    pub material: u32,

    /// Direction from the surface toward the viewer.
    pub view_direction: Vector3<f64>,

    /// Mesh to screen transform. None derives it from the view direction.
    #[cfg_attr(feature = "config", serde(skip_serializing_if = "Option::is_none"))]
    pub orientation: Option<Orientation>,

    /// How branch points in the silhouette are resolved.
    pub tie_break: TieBreakPolicy,

    pub fill: bool,
    pub stroke: bool,
}

impl Default for SilhouetteParams {
    fn default() -> Self {
        Self {
            material: 0,
            view_direction: Vector3::z(),
            orientation: None,
            tie_break: TieBreakPolicy::default(),
            fill: true,
            stroke: true,
        }
    }
}

impl SilhouetteParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_material(mut self, material: u32) -> Self {
        self.material = material;
        self
    }

    pub fn with_view_direction(mut self, view_direction: Vector3<f64>) -> Self {
        self.view_direction = view_direction;
        self
    }

    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    pub fn with_tie_break(mut self, tie_break: TieBreakPolicy) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_stroke(mut self, stroke: bool) -> Self {
        self.stroke = stroke;
        self
    }

    /// The orientation used for projection and winding.
    pub fn orientation(&self) -> Orientation {
        self.orientation
            .unwrap_or_else(|| Orientation::facing(self.view_direction))
    }
}

#[cfg(feature = "config")]
impl SilhouetteParams {
    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> MeshResult<String> {
        toml::to_string_pretty(self).map_err(|e| MeshError::Config {
            details: e.to_string(),
        })
    }

    /// Parse from a TOML string. Missing keys take their defaults.
    pub fn from_toml(s: &str) -> MeshResult<Self> {
        toml::from_str(s).map_err(|e| MeshError::Config {
            details: e.to_string(),
        })
    }

    /// Serialize to a pretty-printed JSON string.
    pub fn to_json(&self) -> MeshResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| MeshError::Config {
            details: e.to_string(),
        })
    }

    pub fn from_json(s: &str) -> MeshResult<Self> {
        serde_json::from_str(s).map_err(|e| MeshError::Config {
            details: e.to_string(),
        })
    }

    /// Load from a TOML file.
    pub fn from_toml_file(path: impl AsRef<std::path::Path>) -> MeshResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| MeshError::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let params = SilhouetteParams::default();
        assert_eq!(params.material, 0);
        assert_eq!(params.view_direction, Vector3::z());
        assert_eq!(params.tie_break, TieBreakPolicy::MinTurningAngle);
        assert!(params.fill && params.stroke);
        // Looking down +z with y up is the identity view.
        assert_relative_eq!(params.orientation().0, Orientation::identity().0, epsilon = 1e-12);
    }

    #[test]
    fn test_builders() {
        let params = SilhouetteParams::new()
            .with_material(3)
            .with_view_direction(Vector3::x())
            .with_tie_break(TieBreakPolicy::Reject)
            .with_fill(false);

        assert_eq!(params.material, 3);
        assert_eq!(params.tie_break, TieBreakPolicy::Reject);
        assert!(!params.fill);
        assert!(params.stroke);

        let projected = params.orientation().project(&nalgebra::Point3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(projected.coords.norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_explicit_orientation_wins() {
        let mirror = Orientation::from_rows([[-1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, -1.0]]);
        let params = SilhouetteParams::new()
            .with_view_direction(Vector3::x())
            .with_orientation(mirror);
        assert_eq!(params.orientation(), mirror);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_toml_partial() {
        let params = SilhouetteParams::from_toml(
            r#"
            material = 2
            tie_break = "lowest_edge_id"
            "#,
        )
        .unwrap();
        assert_eq!(params.material, 2);
        assert_eq!(params.tie_break, TieBreakPolicy::LowestEdgeId);
        assert_eq!(params.view_direction, Vector3::z());
        assert!(params.orientation.is_none());
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_toml_and_json_roundtrip() {
        let params = SilhouetteParams::new()
            .with_material(7)
            .with_view_direction(Vector3::new(1.0, 2.0, 3.0))
            .with_stroke(false);

        let toml = params.to_toml().unwrap();
        assert_eq!(SilhouetteParams::from_toml(&toml).unwrap(), params);

        let json = params.to_json().unwrap();
        assert_eq!(SilhouetteParams::from_json(&json).unwrap(), params);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_bad_config() {
        let err = SilhouetteParams::from_toml("material = \"red\"").unwrap_err();
        assert!(matches!(err, MeshError::Config { .. }));
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_from_toml_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(file, "material = 4\nfill = false").unwrap();

        let params = SilhouetteParams::from_toml_file(file.path()).unwrap();
        assert_eq!(params.material, 4);
        assert!(!params.fill);
    }
}
