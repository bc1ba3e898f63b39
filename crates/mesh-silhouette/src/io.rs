//! Mesh file loading (OBJ, STL) and SVG output.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{MeshError, MeshResult};
use crate::repair::{weld_and_compact, DEFAULT_WELD_EPSILON};
use crate::svg::SvgPath;
use crate::types::{PolygonMesh, Vertex, UNASSIGNED_MATERIAL};

/// Supported mesh file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Obj,
    Stl,
}

impl MeshFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "obj" => Some(MeshFormat::Obj),
                "stl" => Some(MeshFormat::Stl),
                _ => None,
            })
    }
}

/// Load a polygon mesh from file, auto-detecting format from extension.
///
/// Coincident vertices are welded so that polygons from different OBJ
/// groups or materials, and STL facets, share their edges.
pub fn load_mesh(path: &Path) -> MeshResult<PolygonMesh> {
    let format = MeshFormat::from_path(path).ok_or_else(|| MeshError::UnsupportedFormat {
        extension: path.extension().and_then(|e| e.to_str()).map(String::from),
    })?;

    info!("Loading mesh from {:?} (format: {:?})", path, format);

    let mut mesh = match format {
        MeshFormat::Obj => load_obj(path)?,
        MeshFormat::Stl => load_stl(path)?,
    };

    weld_and_compact(&mut mesh, DEFAULT_WELD_EPSILON);

    if mesh.is_empty() {
        return Err(MeshError::EmptyMesh {
            details: "mesh has no vertices or polygons".to_string(),
        });
    }

    info!(
        "Loaded mesh: {} vertices, {} polygons, {} materials",
        mesh.vertex_count(),
        mesh.polygon_count(),
        mesh.materials().len()
    );
    if let Some((min, max)) = mesh.bounds() {
        debug!(
            "Bounding box: [{:.1}, {:.1}, {:.1}] to [{:.1}, {:.1}, {:.1}]",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }

    Ok(mesh)
}

/// Load polygons from an OBJ file, keeping faces un-triangulated.
///
/// Each polygon's material is the index of its `usemtl` material in the
/// material library; faces without one get [`UNASSIGNED_MATERIAL`].
fn load_obj(path: &Path) -> MeshResult<PolygonMesh> {
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: false,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| MeshError::ParseError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    match materials {
        Ok(materials) => debug!("OBJ material library: {} materials", materials.len()),
        Err(e) => debug!("No OBJ material library loaded: {}", e),
    }

    if models.is_empty() {
        return Err(MeshError::EmptyMesh {
            details: "OBJ file contains no models".to_string(),
        });
    }

    let mut mesh = PolygonMesh::new();

    for model in &models {
        let obj_mesh = &model.mesh;
        let vertex_offset = mesh.vertices.len() as u32;
        let material = obj_mesh
            .material_id
            .map_or(UNASSIGNED_MATERIAL, |id| id as u32);

        debug!(
            "OBJ model '{}': {} positions, material {:?}",
            model.name,
            obj_mesh.positions.len() / 3,
            obj_mesh.material_id
        );

        for chunk in obj_mesh.positions.chunks_exact(3) {
            mesh.vertices.push(Vertex::from_coords(
                chunk[0] as f64,
                chunk[1] as f64,
                chunk[2] as f64,
            ));
        }

        // No arities means every face is a triangle.
        let arities: Vec<usize> = if obj_mesh.face_arities.is_empty() {
            vec![3; obj_mesh.indices.len() / 3]
        } else {
            obj_mesh.face_arities.iter().map(|&a| a as usize).collect()
        };

        let mut start = 0usize;
        for arity in arities {
            let Some(face) = obj_mesh.indices.get(start..start + arity) else {
                warn!("OBJ model '{}' has truncated face data", model.name);
                break;
            };
            mesh.push_polygon(
                face.iter().map(|&i| i + vertex_offset).collect::<Vec<_>>(),
                material,
            );
            start += arity;
        }
    }

    debug!(
        "OBJ loaded: {} vertices, {} polygons from {} models",
        mesh.vertices.len(),
        mesh.polygons.len(),
        models.len()
    );

    Ok(mesh)
}

/// Load triangles from an STL file (binary or ASCII), all with material 0.
fn load_stl(path: &Path) -> MeshResult<PolygonMesh> {
    let file = File::open(path).map_err(|e| MeshError::IoRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut reader = BufReader::new(file);

    let stl = stl_io::read_stl(&mut reader).map_err(|e| MeshError::ParseError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    debug!(
        "STL contains {} vertices, {} triangles",
        stl.vertices.len(),
        stl.faces.len()
    );

    let mut mesh = PolygonMesh::with_capacity(stl.vertices.len(), stl.faces.len());
    for v in &stl.vertices {
        mesh.vertices.push(Vertex::from_coords(
            v.0[0] as f64,
            v.0[1] as f64,
            v.0[2] as f64,
        ));
    }
    for face in &stl.faces {
        mesh.push_polygon(
            [
                face.vertices[0] as u32,
                face.vertices[1] as u32,
                face.vertices[2] as u32,
            ],
            0,
        );
    }

    Ok(mesh)
}

/// Write an SVG document for the path collected by `svg`.
pub fn save_svg(svg: &SvgPath, path: &Path) -> MeshResult<()> {
    info!("Saving SVG to {:?}", path);

    let io_err = |e| MeshError::IoWrite {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(svg.document().as_bytes()).map_err(io_err)?;
    writer.flush().map_err(io_err)?;

    info!("Saved {} subpaths to {:?}", svg.subpath_count(), path);

    Ok(())
}
