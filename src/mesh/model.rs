//! The mesh model seen by the exporter.
//!
//! [`MeshModel`] is the narrow interface the exporter consumes: entity
//! enumeration by dense index, condition and attribute lookup, and a
//! single-pass face stream. [`UnstructuredMesh`](super::UnstructuredMesh)
//! is the in-memory implementation; other hosts can implement the trait
//! directly.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::element::Element;
use super::index::{BlockId, DomainId};
use crate::error::Result;

/// Dimension of the exported grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dimension {
    /// Planar grid of tri/quad cells, extruded one cell thick on export.
    #[serde(rename = "2d", alias = "2D")]
    Two,
    /// Volume grid.
    #[serde(rename = "3d", alias = "3D")]
    Three,
}

/// Order in which faces are streamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceOrder {
    /// Faces in discovery order.
    Natural,
    /// Internal faces first, sorted by (owner, neighbour), then boundary
    /// faces grouped contiguously by boundary condition name.
    BcGroupsLast,
}

/// Classification of a streamed face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaceKind {
    /// Shared by two cells of the same block.
    Interior,
    /// One-sided face on the outer boundary.
    Boundary,
    /// Shared by two cells of different blocks, or lying on a domain
    /// between two cells.
    Connection,
}

/// A cell on one side of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceSide {
    /// Global cell index.
    pub cell: usize,
    /// Block that owns the cell.
    pub block: BlockId,
}

/// One face delivered by a [`FaceStream`].
#[derive(Debug, Clone, PartialEq)]
pub struct FaceRecord {
    /// Face index, dense and increasing along the stream.
    pub index: usize,
    /// Face connectivity; its normal points into the owner cell.
    pub element: Element,
    /// The owner cell (lower cell index for internal faces).
    pub owner: FaceSide,
    /// The neighbour cell of an internal face.
    pub neighbour: Option<FaceSide>,
    /// Domain the face lies on, if any.
    pub domain: Option<DomainId>,
    /// Face classification.
    pub kind: FaceKind,
}

/// A finite, single-pass sequence of faces with a known length.
pub struct FaceStream<'a> {
    total: usize,
    faces: Box<dyn Iterator<Item = FaceRecord> + 'a>,
}

impl<'a> FaceStream<'a> {
    /// Wrap an iterator that yields exactly `total` faces.
    pub fn new<I>(total: usize, faces: I) -> Self
    where
        I: Iterator<Item = FaceRecord> + 'a,
    {
        Self {
            total,
            faces: Box::new(faces),
        }
    }

    /// Total number of faces in the stream.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Iterator for FaceStream<'_> {
    type Item = FaceRecord;

    fn next(&mut self) -> Option<FaceRecord> {
        self.faces.next()
    }
}

impl std::fmt::Debug for FaceStream<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceStream")
            .field("total", &self.total)
            .finish_non_exhaustive()
    }
}

/// A scalar or enumerated attribute value stored on the mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Unsigned integer or enum ordinal.
    Uint(u64),
    /// Real number.
    Real(f64),
    /// Enum name or free text.
    Text(String),
}

impl AttributeValue {
    /// Interpret as a real number.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            AttributeValue::Uint(v) => Some(*v as f64),
            AttributeValue::Real(v) => Some(*v),
            AttributeValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Interpret as an unsigned integer.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            AttributeValue::Uint(v) => Some(*v),
            AttributeValue::Real(v) if *v >= 0.0 && v.fract() == 0.0 => Some(*v as u64),
            AttributeValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Read-only view of a mesh as needed for export.
///
/// Cells are the volume elements of the blocks (tri/quad in 2-D), numbered
/// block-major: all cells of block 0, then block 1, and so on.
pub trait MeshModel {
    /// Grid dimension.
    fn dimension(&self) -> Dimension;

    /// Number of vertices.
    fn vertex_count(&self) -> usize;

    /// Vertex coordinates.
    fn vertex(&self, index: usize) -> Option<Point3<f64>>;

    /// Number of cells over all blocks.
    fn cell_count(&self) -> usize;

    /// A cell and the block that owns it.
    fn cell(&self, index: usize) -> Option<(&Element, BlockId)>;

    /// Number of blocks.
    fn block_count(&self) -> usize;

    /// Number of cells in a block.
    fn block_cell_count(&self, block: BlockId) -> usize;

    /// The `index`-th cell of a block.
    fn block_cell(&self, block: BlockId, index: usize) -> Option<&Element>;

    /// Volume condition of a block.
    fn block_condition(&self, block: BlockId) -> Option<&Condition>;

    /// Number of boundary domains.
    fn domain_count(&self) -> usize;

    /// Boundary condition of a domain.
    fn domain_condition(&self, domain: DomainId) -> Option<&Condition>;

    /// Scalar or enum attribute.
    fn attribute(&self, name: &str) -> Option<&AttributeValue>;

    /// Stream all faces of the mesh in the requested order.
    fn stream_faces(&self, order: FaceOrder) -> Result<FaceStream<'_>>;

    /// Whether the grid is two-dimensional.
    fn is_2d(&self) -> bool {
        self.dimension() == Dimension::Two
    }
}
