//! JSON mesh documents.
//!
//! ```json
//! {
//!   "dimension": "3d",
//!   "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0], [0, 0, 1]],
//!   "blocks": [
//!     { "name": "core", "vc": { "name": "fluid", "type": "volumeToCell" },
//!       "cells": [[0, 1, 2, 3]] }
//!   ],
//!   "domains": [
//!     { "name": "wall", "bc": { "name": "wall", "type": "wall" },
//!       "faces": [[0, 2, 1]] }
//!   ],
//!   "attributes": { "PointPrecision": 8 }
//! }
//! ```
//!
//! Element types follow from the vertex count and the dimension: tri and
//! quad cells with bar faces in 2-D, tet, pyramid, wedge and hex cells
//! with tri and quad faces in 3-D.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use nalgebra::Point3;
use serde::Deserialize;

use crate::error::{ExportError, Result};
use crate::mesh::{AttributeValue, Condition, Dimension, Element, ElementType, UnstructuredMesh};

/// A condition as written in the document.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionDoc {
    /// Condition name.
    pub name: String,
    /// Condition type name.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A block of cells.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockDoc {
    /// Block name.
    pub name: String,
    /// Volume condition.
    #[serde(default)]
    pub vc: Option<ConditionDoc>,
    /// Cells as vertex index lists.
    pub cells: Vec<Vec<usize>>,
}

/// A boundary domain.
#[derive(Debug, Clone, Deserialize)]
pub struct DomainDoc {
    /// Domain name.
    pub name: String,
    /// Boundary condition.
    #[serde(default)]
    pub bc: Option<ConditionDoc>,
    /// Faces as vertex index lists.
    pub faces: Vec<Vec<usize>>,
}

/// The whole document.
#[derive(Debug, Clone, Deserialize)]
pub struct MeshDoc {
    /// Grid dimension.
    pub dimension: Dimension,
    /// Vertex coordinates.
    pub vertices: Vec<[f64; 3]>,
    /// Blocks in cell numbering order.
    pub blocks: Vec<BlockDoc>,
    /// Boundary domains.
    #[serde(default)]
    pub domains: Vec<DomainDoc>,
    /// Export attributes such as `Thickness` or `SideBCExport`.
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,
}

/// Load a JSON mesh document.
pub fn load<P: AsRef<Path>>(path: P) -> Result<UnstructuredMesh> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let doc: MeshDoc = serde_json::from_reader(reader).map_err(|e| ExportError::LoadError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    build(doc).map_err(|e| match e {
        ExportError::InvalidMesh(message) => ExportError::LoadError {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Parse a document from a string.
pub fn from_str(text: &str) -> Result<UnstructuredMesh> {
    let doc: MeshDoc = serde_json::from_str(text).map_err(|e| ExportError::LoadError {
        path: "<string>".into(),
        message: e.to_string(),
    })?;
    build(doc)
}

fn build(doc: MeshDoc) -> Result<UnstructuredMesh> {
    let dimension = doc.dimension;
    let mut mesh = UnstructuredMesh::new(dimension);
    mesh.add_vertices(doc.vertices.iter().map(|&[x, y, z]| Point3::new(x, y, z)));

    for block in doc.blocks {
        let vc = match block.vc {
            Some(vc) => Some(Condition::volume(&vc.name, &vc.type_name).ok_or_else(|| {
                ExportError::invalid_mesh(format!(
                    "block {}: unknown volume condition type {}",
                    block.name, vc.type_name
                ))
            })?),
            None => None,
        };
        let id = mesh.add_block(block.name, vc);
        for cell in block.cells {
            let kind = cell_kind(dimension, cell.len());
            mesh.add_cell(id, element(cell, kind)?)?;
        }
    }

    for domain in doc.domains {
        let bc = domain
            .bc
            .map(|bc| Condition::boundary(bc.name, &bc.type_name));
        let id = mesh.add_domain(domain.name, bc);
        for face in domain.faces {
            let kind = face_kind(dimension, face.len());
            mesh.add_domain_face(id, element(face, kind)?)?;
        }
    }

    for (name, value) in doc.attributes {
        mesh.set_attribute(name, value);
    }
    Ok(mesh)
}

fn element(vertices: Vec<usize>, kind: Option<ElementType>) -> Result<Element> {
    let n = vertices.len();
    kind.and_then(|kind| Element::new(kind, vertices))
        .ok_or_else(|| ExportError::invalid_mesh(format!("no element has {} vertices here", n)))
}

fn cell_kind(dimension: Dimension, n: usize) -> Option<ElementType> {
    match (dimension, n) {
        (Dimension::Two, 3) => Some(ElementType::Tri),
        (Dimension::Two, 4) => Some(ElementType::Quad),
        (Dimension::Three, 4) => Some(ElementType::Tet),
        (Dimension::Three, 5) => Some(ElementType::Pyramid),
        (Dimension::Three, 6) => Some(ElementType::Wedge),
        (Dimension::Three, 8) => Some(ElementType::Hex),
        _ => None,
    }
}

fn face_kind(dimension: Dimension, n: usize) -> Option<ElementType> {
    match (dimension, n) {
        (Dimension::Two, 2) => Some(ElementType::Bar),
        (Dimension::Three, 3) => Some(ElementType::Tri),
        (Dimension::Three, 4) => Some(ElementType::Quad),
        _ => None,
    }
}
