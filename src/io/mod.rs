//! Mesh loading for the command-line tool.
//!
//! # Supported Formats
//!
//! | Format | Extension | Result |
//! |--------|-----------|--------|
//! | JSON document | `.json` | 2-D or 3-D mesh with blocks, domains and attributes |
//! | PLY | `.ply` | planar surface as a 2-D mesh |
//! | STL | `.stl` | planar surface as a 2-D mesh, binary or ASCII |
//!
//! A surface loaded from PLY or STL becomes one block named `surface`
//! without a volume condition. Its open edges form one `boundary` domain
//! of type `patch`.
//!
//! ```no_run
//! use foamport::io::load;
//! use foamport::mesh::MeshModel;
//!
//! let mesh = load("channel.json").unwrap();
//! println!("{} cells", mesh.cell_count());
//! ```

pub mod json;
pub mod ply;
pub mod stl;

use std::collections::HashMap;
use std::path::Path;

use nalgebra::Point3;

use crate::error::{ExportError, Result};
use crate::mesh::{Condition, Dimension, Element, UnstructuredMesh};

/// Name of the block created for a loaded surface.
pub const SURFACE_BLOCK: &str = "surface";

/// Name of the domain holding the open edges of a loaded surface.
pub const SURFACE_BOUNDARY: &str = "boundary";

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// JSON mesh document.
    Json,
    /// PLY (Stanford polygon) format.
    Ply,
    /// STL (stereolithography) format.
    Stl,
}

impl Format {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Format> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "ply" => Some(Format::Ply),
            "stl" => Some(Format::Stl),
            _ => None,
        }
    }

    /// Detect format from file path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Format> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }
}

/// Load a mesh, choosing the format by file extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<UnstructuredMesh> {
    let path = path.as_ref();
    let format = Format::from_path(path).ok_or_else(|| ExportError::UnsupportedFormat {
        extension: path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("(none)")
            .to_string(),
    })?;

    let mesh = match format {
        Format::Json => json::load(path)?,
        Format::Ply => ply::load(path)?,
        Format::Stl => stl::load(path)?,
    };
    log::debug!(
        "loaded {} with {} vertices, {} blocks and {} domains",
        path.display(),
        mesh.vertices().len(),
        mesh.blocks().len(),
        mesh.domains().len()
    );
    Ok(mesh)
}

/// Build a 2-D mesh from surface polygons.
///
/// Triangles and quads become cells as they are, larger polygons are fan
/// triangulated. Edges used by exactly one polygon go to the boundary
/// domain, in the winding of that polygon.
pub(crate) fn surface_mesh(
    path: &Path,
    vertices: Vec<Point3<f64>>,
    polygons: &[Vec<usize>],
) -> Result<UnstructuredMesh> {
    let load_error = |message: String| ExportError::LoadError {
        path: path.to_path_buf(),
        message,
    };

    let mut mesh = UnstructuredMesh::new(Dimension::Two);
    mesh.add_vertices(vertices);
    let block = mesh.add_block(SURFACE_BLOCK, None);

    let mut cells = Vec::with_capacity(polygons.len());
    for polygon in polygons {
        match polygon.len() {
            0..=2 => {
                return Err(load_error(format!(
                    "polygon with {} vertices",
                    polygon.len()
                )))
            }
            3 => cells.push(Element::tri([polygon[0], polygon[1], polygon[2]])),
            4 => cells.push(Element::quad([polygon[0], polygon[1], polygon[2], polygon[3]])),
            n => {
                for i in 1..n - 1 {
                    cells.push(Element::tri([polygon[0], polygon[i], polygon[i + 1]]));
                }
            }
        }
    }
    if cells.is_empty() {
        return Err(load_error("no faces".to_string()));
    }

    // edge key -> (first directed edge, uses)
    let mut edges: HashMap<(usize, usize), ((usize, usize), usize)> = HashMap::new();
    let mut order = Vec::new();
    for cell in &cells {
        let v = cell.vertices();
        for i in 0..v.len() {
            let (a, b) = (v[i], v[(i + 1) % v.len()]);
            let key = (a.min(b), a.max(b));
            let entry = edges.entry(key).or_insert_with(|| {
                order.push(key);
                ((a, b), 0)
            });
            entry.1 += 1;
        }
    }

    for cell in cells {
        mesh.add_cell(block, cell)?;
    }
    let open: Vec<(usize, usize)> = order
        .iter()
        .filter_map(|key| edges.get(key))
        .filter(|(_, uses)| *uses == 1)
        .map(|(edge, _)| *edge)
        .collect();
    if !open.is_empty() {
        let domain = mesh.add_domain(
            SURFACE_BOUNDARY,
            Some(Condition::boundary(SURFACE_BOUNDARY, "patch")),
        );
        for (a, b) in open {
            mesh.add_domain_face(domain, Element::bar([a, b]))?;
        }
    }
    Ok(mesh)
}
