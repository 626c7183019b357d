//! PLY (Stanford polygon) surface loading.
//!
//! The `vertex` element supplies the points and the `face` element the
//! polygons, read from `vertex_indices` or `vertex_index`.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::Point3;
use ply_rs::parser::Parser;
use ply_rs::ply::{DefaultElement, Property};

use crate::error::{ExportError, Result};
use crate::mesh::UnstructuredMesh;

use super::surface_mesh;

/// Load a planar PLY surface as a 2-D mesh.
///
/// # Example
///
/// ```no_run
/// use foamport::io::ply;
///
/// let mesh = ply::load("plate.ply").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<UnstructuredMesh> {
    let path = path.as_ref();
    let load_error = |message: &str| ExportError::LoadError {
        path: path.to_path_buf(),
        message: message.to_string(),
    };
    let mut reader = BufReader::new(File::open(path)?);

    let parser = Parser::<DefaultElement>::new();
    let ply = parser
        .read_ply(&mut reader)
        .map_err(|e| load_error(&e.to_string()))?;

    let vertex_element = ply
        .payload
        .get("vertex")
        .ok_or_else(|| load_error("PLY file has no vertex element"))?;
    let mut vertices = Vec::with_capacity(vertex_element.len());
    for vertex in vertex_element {
        let coord = |name: &str| {
            get_float_property(vertex, name)
                .ok_or_else(|| load_error(&format!("vertex missing {} coordinate", name)))
        };
        vertices.push(Point3::new(coord("x")?, coord("y")?, coord("z")?));
    }

    let face_element = ply
        .payload
        .get("face")
        .ok_or_else(|| load_error("PLY file has no face element"))?;
    let mut polygons = Vec::with_capacity(face_element.len());
    for face in face_element {
        let indices = get_list_property(face, "vertex_indices")
            .or_else(|| get_list_property(face, "vertex_index"))
            .ok_or_else(|| load_error("face missing vertex_indices property"))?
            .map_err(|index| load_error(&format!("negative vertex index {}", index)))?;
        polygons.push(indices);
    }

    surface_mesh(path, vertices, &polygons)
}

fn get_float_property(element: &DefaultElement, name: &str) -> Option<f64> {
    match element.get(name)? {
        Property::Float(v) => Some(*v as f64),
        Property::Double(v) => Some(*v),
        Property::Int(v) => Some(*v as f64),
        Property::UInt(v) => Some(*v as f64),
        Property::Short(v) => Some(*v as f64),
        Property::UShort(v) => Some(*v as f64),
        Property::Char(v) => Some(*v as f64),
        Property::UChar(v) => Some(*v as f64),
        _ => None,
    }
}

/// Vertex indices of a list property, or the first negative index.
fn get_list_property(
    element: &DefaultElement,
    name: &str,
) -> Option<std::result::Result<Vec<usize>, i64>> {
    fn convert<T: Copy + Into<i64>>(v: &[T]) -> std::result::Result<Vec<usize>, i64> {
        v.iter()
            .map(|&x| {
                let x: i64 = x.into();
                usize::try_from(x).map_err(|_| x)
            })
            .collect()
    }
    match element.get(name)? {
        Property::ListInt(v) => Some(convert(v.as_slice())),
        Property::ListUInt(v) => Some(convert(v.as_slice())),
        Property::ListShort(v) => Some(convert(v.as_slice())),
        Property::ListUShort(v) => Some(convert(v.as_slice())),
        Property::ListChar(v) => Some(convert(v.as_slice())),
        Property::ListUChar(v) => Some(convert(v.as_slice())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshModel;

    #[test]
    fn test_load_ascii_square() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("square.ply");
        std::fs::write(
            &path,
            "ply\n\
             format ascii 1.0\n\
             element vertex 4\n\
             property float x\n\
             property float y\n\
             property float z\n\
             element face 1\n\
             property list uchar int vertex_indices\n\
             end_header\n\
             0 0 0\n\
             1 0 0\n\
             1 1 0\n\
             0 1 0\n\
             4 0 1 2 3\n",
        )
        .unwrap();

        let mesh = load(&path).unwrap();
        assert!(mesh.is_2d());
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.cell_count(), 1);
        assert_eq!(mesh.domains()[0].faces().len(), 4);
    }

    #[test]
    fn test_missing_faces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.ply");
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n",
        )
        .unwrap();
        assert!(matches!(load(&path), Err(ExportError::LoadError { .. })));
    }

    #[test]
    fn test_negative_index_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ply");
        std::fs::write(
            &path,
            "ply\n\
             format ascii 1.0\n\
             element vertex 3\n\
             property float x\n\
             property float y\n\
             property float z\n\
             element face 1\n\
             property list uchar int vertex_indices\n\
             end_header\n\
             0 0 0\n\
             1 0 0\n\
             1 1 0\n\
             3 0 -1 2\n",
        )
        .unwrap();
        match load(&path) {
            Err(ExportError::LoadError { message, .. }) => assert!(message.contains("-1")),
            other => panic!("unexpected {:?}", other.map(|m| m.vertex_count())),
        }
    }
}
