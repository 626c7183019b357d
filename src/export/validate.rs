//! Planarity and winding checks for 2-D grids.
//!
//! A 2-D grid is extruded along Z, so every vertex must lie on one Z plane
//! and every block must wind the same way around Z. The winding of a block
//! is taken from its first cell.

use nalgebra::Point3;

use crate::error::{ExportError, Result};
use crate::mesh::{BlockId, MeshModel};

/// Winding of a 2-D grid around the Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Counter-clockwise seen from +Z; the extrusion goes towards +Z.
    Positive,
    /// Clockwise seen from +Z; the extrusion goes towards -Z.
    Negative,
}

impl Orientation {
    /// +1 or -1.
    pub fn sign(self) -> f64 {
        match self {
            Orientation::Positive => 1.0,
            Orientation::Negative => -1.0,
        }
    }

    fn of(p0: Point3<f64>, p1: Point3<f64>, p2: Point3<f64>) -> Self {
        if (p1 - p0).cross(&(p2 - p0)).z > 0.0 {
            Orientation::Positive
        } else {
            Orientation::Negative
        }
    }
}

/// Result of inspecting a 2-D grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridProperties {
    /// Whether all vertices are within tolerance of the first vertex's Z.
    pub is_planar: bool,
    /// Z of the first vertex.
    pub plane_z: f64,
    /// Winding of the first cell of the first block.
    pub orientation: Orientation,
    /// Whether every block winds like the first one.
    pub consistent: bool,
    /// First vertex off the plane, with its distance.
    pub off_plane: Option<(usize, f64)>,
    /// First block winding against the first one.
    pub mismatched_block: Option<usize>,
}

/// Inspect planarity and winding of a 2-D grid.
pub fn inspect<M: MeshModel + ?Sized>(model: &M, tolerance: f64) -> Result<GridProperties> {
    let plane_z = model.vertex(0).map_or(0.0, |p| p.z);
    let off_plane = (1..model.vertex_count()).find_map(|i| {
        let dz = (model.vertex(i)?.z - plane_z).abs();
        (dz > tolerance).then_some((i, dz))
    });

    let mut orientation = None;
    let mut mismatched_block = None;
    for b in 0..model.block_count() {
        let Some(winding) = block_orientation(model, BlockId::new(b))? else {
            continue;
        };
        match orientation {
            None => orientation = Some(winding),
            Some(master) if master != winding => {
                mismatched_block = Some(b);
                break;
            }
            Some(_) => {}
        }
    }
    let orientation =
        orientation.ok_or_else(|| ExportError::invalid_mesh("the 2-D grid has no cells"))?;

    Ok(GridProperties {
        is_planar: off_plane.is_none(),
        plane_z,
        orientation,
        consistent: mismatched_block.is_none(),
        off_plane,
        mismatched_block,
    })
}

/// Inspect a 2-D grid and fail unless it is planar and consistently wound.
pub fn validate_2d<M: MeshModel + ?Sized>(model: &M, tolerance: f64) -> Result<GridProperties> {
    let props = inspect(model, tolerance)?;
    if let Some((vertex, offset)) = props.off_plane {
        return Err(ExportError::NotPlanar { vertex, offset });
    }
    if let Some(block) = props.mismatched_block {
        return Err(ExportError::InconsistentNormals { block });
    }
    log::debug!(
        "2-D grid on z = {} with {:?} orientation",
        props.plane_z,
        props.orientation
    );
    Ok(props)
}

fn block_orientation<M: MeshModel + ?Sized>(model: &M, block: BlockId) -> Result<Option<Orientation>> {
    let Some(cell) = model.block_cell(block, 0) else {
        return Ok(None);
    };
    let v = cell.vertices();
    if v.len() < 3 {
        return Err(ExportError::invalid_mesh(format!(
            "first cell of block {} is a {}, not a polygon",
            block,
            cell.kind()
        )));
    }
    let point = |i: usize| {
        model
            .vertex(i)
            .ok_or_else(|| ExportError::invalid_mesh(format!("vertex {} does not exist", i)))
    };
    Ok(Some(Orientation::of(point(v[0])?, point(v[1])?, point(v[v.len() - 1])?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Dimension, Element, UnstructuredMesh};

    fn strip(second_reversed: bool) -> UnstructuredMesh {
        let mut mesh = UnstructuredMesh::new(Dimension::Two);
        mesh.add_vertices([
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(2.0, 0.0, 2.0),
            Point3::new(0.0, 1.0, 2.0),
            Point3::new(1.0, 1.0, 2.0),
            Point3::new(2.0, 1.0, 2.0),
        ]);
        let a = mesh.add_block("a", None);
        mesh.add_cell(a, Element::quad([0, 1, 4, 3])).unwrap();
        let b = mesh.add_block("b", None);
        let second = if second_reversed {
            Element::tri([1, 5, 2])
        } else {
            Element::tri([1, 2, 5])
        };
        mesh.add_cell(b, second).unwrap();
        mesh
    }

    #[test]
    fn test_consistent_grid() {
        let props = validate_2d(&strip(false), 1e-10).unwrap();
        assert!(props.is_planar);
        assert!(props.consistent);
        assert_eq!(props.plane_z, 2.0);
        assert_eq!(props.orientation, Orientation::Positive);
    }

    #[test]
    fn test_opposite_winding_is_inconsistent() {
        let mesh = strip(true);
        let props = inspect(&mesh, 1e-10).unwrap();
        assert!(!props.consistent);
        assert_eq!(props.mismatched_block, Some(1));
        assert!(matches!(
            validate_2d(&mesh, 1e-10),
            Err(ExportError::InconsistentNormals { block: 1 })
        ));
    }

    #[test]
    fn test_single_block_is_consistent() {
        let mut mesh = UnstructuredMesh::new(Dimension::Two);
        mesh.add_vertices([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
        ]);
        let a = mesh.add_block("a", None);
        mesh.add_cell(a, Element::tri([0, 1, 2])).unwrap();
        let props = inspect(&mesh, 0.0).unwrap();
        assert!(props.consistent);
        assert_eq!(props.orientation, Orientation::Negative);
    }

    #[test]
    fn test_not_planar() {
        let mut mesh = strip(false);
        mesh.add_vertex(Point3::new(5.0, 5.0, 2.5));
        assert!(matches!(
            validate_2d(&mesh, 1e-3),
            Err(ExportError::NotPlanar { vertex: 6, .. })
        ));
        assert!(validate_2d(&mesh, 1.0).is_ok());
    }
}
