//! STL surface loading, binary or ASCII.
//!
//! STL stores every triangle with its own corners, so corners closer than
//! [`MERGE_TOLERANCE`] are merged into one vertex before the surface is
//! built. Triangles that collapse under merging are dropped.

use std::fs::File;
use std::path::Path;

use nalgebra::Point3;

use crate::error::{ExportError, Result};
use crate::mesh::UnstructuredMesh;

use super::surface_mesh;

/// Distance below which two triangle corners are the same vertex.
pub const MERGE_TOLERANCE: f64 = 1e-10;

/// Load a planar STL surface as a 2-D mesh.
///
/// # Example
///
/// ```no_run
/// use foamport::io::stl;
///
/// let mesh = stl::load("plate.stl").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<UnstructuredMesh> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let stl = stl_io::read_stl(&mut file).map_err(|e| ExportError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut vertices: Vec<Point3<f64>> = Vec::new();
    let mut polygons: Vec<Vec<usize>> = Vec::with_capacity(stl.faces.len());
    for tri in &stl.faces {
        let mut corners = [0; 3];
        for (corner, &index) in corners.iter_mut().zip(&tri.vertices) {
            let v = stl.vertices.get(index).ok_or_else(|| ExportError::LoadError {
                path: path.to_path_buf(),
                message: format!("triangle references vertex {}", index),
            })?;
            let p = Point3::new(v[0] as f64, v[1] as f64, v[2] as f64);
            *corner = find_or_add_vertex(&mut vertices, p);
        }
        let [i0, i1, i2] = corners;
        if i0 != i1 && i1 != i2 && i0 != i2 {
            polygons.push(corners.to_vec());
        }
    }

    surface_mesh(path, vertices, &polygons)
}

fn find_or_add_vertex(vertices: &mut Vec<Point3<f64>>, p: Point3<f64>) -> usize {
    if let Some(i) = vertices.iter().position(|v| (v - p).norm() < MERGE_TOLERANCE) {
        return i;
    }
    vertices.push(p);
    vertices.len() - 1
}
