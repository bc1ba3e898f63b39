//! Example: Silhouette parameter serialization
//!
//! Shows how `SilhouetteParams` round-trips through TOML and JSON and drives
//! the one-call silhouette pipeline.
//!
//! Run with: `cargo run --example silhouette_config --features config`

use mesh_silhouette::{
    draw_silhouette, MeshTopology, PathCommand, PolygonMesh, SilhouetteParams, TieBreakPolicy,
};
use nalgebra::Vector3;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // =========================================================================
    // 1. Parameters built in code
    // =========================================================================

    let params = SilhouetteParams::new()
        .with_material(0)
        .with_view_direction(Vector3::new(1.0, 1.0, 1.0))
        .with_tie_break(TieBreakPolicy::LowestEdgeId)
        .with_stroke(false);

    println!("=== TOML Output ===\n{}", params.to_toml()?);
    println!("=== JSON Output ===\n{}", params.to_json()?);

    // =========================================================================
    // 2. Parameters from a TOML string; missing keys keep their defaults
    // =========================================================================

    let parsed = SilhouetteParams::from_toml(
        r#"
        material = 0
        view_direction = [1.0, 1.0, 1.0]
        tie_break = "lowest_edge_id"
        stroke = false
        "#,
    )?;
    assert_eq!(parsed, params);

    // =========================================================================
    // 3. Trace a unit cube seen from a corner
    // =========================================================================

    let mut mesh = PolygonMesh::new();
    for &(x, y, z) in &[
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 1.0),
        (0.0, 1.0, 1.0),
    ] {
        mesh.push_vertex(x, y, z);
    }
    for face in [
        [0, 3, 2, 1],
        [4, 5, 6, 7],
        [0, 1, 5, 4],
        [3, 7, 6, 2],
        [0, 4, 7, 3],
        [1, 2, 6, 5],
    ] {
        mesh.push_polygon(face, 0);
    }

    let topology = MeshTopology::build(&mesh)?;
    let mut commands: Vec<PathCommand> = Vec::new();
    let subpaths = draw_silhouette(&topology, &parsed, &mut commands)?;

    println!("=== Path ({} subpaths) ===", subpaths);
    for command in &commands {
        println!("  {:?}", command);
    }

    Ok(())
}
