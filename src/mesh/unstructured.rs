//! In-memory unstructured mesh.

use std::collections::HashMap;

use nalgebra::Point3;

use super::condition::Condition;
use super::element::{Element, ElementType};
use super::index::{BlockId, DomainId};
use super::model::{AttributeValue, Dimension, FaceOrder, FaceStream, MeshModel};
use super::topology;
use crate::error::{ExportError, Result};

/// A named group of cells sharing at most one volume condition.
#[derive(Debug, Clone)]
pub struct Block {
    /// Block name.
    pub name: String,
    /// Volume condition, if assigned.
    pub condition: Option<Condition>,
    cells: Vec<Element>,
}

impl Block {
    /// The cells of this block.
    pub fn cells(&self) -> &[Element] {
        &self.cells
    }
}

/// A named group of boundary faces sharing at most one boundary condition.
#[derive(Debug, Clone)]
pub struct Domain {
    /// Domain name.
    pub name: String,
    /// Boundary condition, if assigned.
    pub condition: Option<Condition>,
    faces: Vec<Element>,
}

impl Domain {
    /// The faces of this domain.
    pub fn faces(&self) -> &[Element] {
        &self.faces
    }
}

/// An unstructured mesh of blocks and boundary domains.
///
/// # Example
///
/// ```
/// use foamport::mesh::{Condition, Dimension, Element, UnstructuredMesh};
/// use nalgebra::Point3;
///
/// let mut mesh = UnstructuredMesh::new(Dimension::Two);
/// mesh.add_vertices([
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ]);
/// let block = mesh.add_block("fluid", Condition::volume("fluid", "volumeToCell"));
/// mesh.add_cell(block, Element::quad([0, 1, 2, 3])).unwrap();
/// assert_eq!(mesh.num_cells(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct UnstructuredMesh {
    dimension: Dimension,
    vertices: Vec<Point3<f64>>,
    blocks: Vec<Block>,
    /// One past the last global cell id of each block.
    block_ends: Vec<usize>,
    domains: Vec<Domain>,
    attributes: HashMap<String, AttributeValue>,
}

impl UnstructuredMesh {
    /// Create an empty mesh.
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            vertices: Vec::new(),
            blocks: Vec::new(),
            block_ends: Vec::new(),
            domains: Vec::new(),
            attributes: HashMap::new(),
        }
    }

    /// Add a vertex, returning its index.
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    /// Add several vertices.
    pub fn add_vertices<I: IntoIterator<Item = Point3<f64>>>(&mut self, positions: I) {
        self.vertices.extend(positions);
    }

    /// Add an empty block.
    pub fn add_block(&mut self, name: impl Into<String>, condition: Option<Condition>) -> BlockId {
        self.blocks.push(Block {
            name: name.into(),
            condition,
            cells: Vec::new(),
        });
        self.block_ends.push(self.num_cells());
        BlockId::new(self.blocks.len() - 1)
    }

    /// Add a cell to a block.
    ///
    /// Cells must be tri/quad elements in a 2-D mesh and tet, hex, wedge or
    /// pyramid elements in a 3-D mesh.
    pub fn add_cell(&mut self, block: BlockId, cell: Element) -> Result<()> {
        let valid = match self.dimension {
            Dimension::Two => matches!(cell.kind(), ElementType::Tri | ElementType::Quad),
            Dimension::Three => cell.kind().topological_dim() == 3,
        };
        if !valid {
            return Err(ExportError::invalid_mesh(format!(
                "{} cannot be a cell of a {:?} mesh",
                cell.kind(),
                self.dimension
            )));
        }
        self.check_vertices(&cell)?;
        let target = self
            .blocks
            .get_mut(block.index())
            .ok_or_else(|| ExportError::invalid_mesh(format!("no block {}", block)))?;
        target.cells.push(cell);
        for end in &mut self.block_ends[block.index()..] {
            *end += 1;
        }
        Ok(())
    }

    /// Add an empty boundary domain.
    pub fn add_domain(&mut self, name: impl Into<String>, condition: Option<Condition>) -> DomainId {
        self.domains.push(Domain {
            name: name.into(),
            condition,
            faces: Vec::new(),
        });
        DomainId::new(self.domains.len() - 1)
    }

    /// Add a face to a domain: a bar in 2-D, a tri or quad in 3-D.
    pub fn add_domain_face(&mut self, domain: DomainId, face: Element) -> Result<()> {
        let valid = match self.dimension {
            Dimension::Two => face.kind() == ElementType::Bar,
            Dimension::Three => matches!(face.kind(), ElementType::Tri | ElementType::Quad),
        };
        if !valid {
            return Err(ExportError::invalid_mesh(format!(
                "{} cannot be a domain face of a {:?} mesh",
                face.kind(),
                self.dimension
            )));
        }
        self.check_vertices(&face)?;
        let target = self
            .domains
            .get_mut(domain.index())
            .ok_or_else(|| ExportError::invalid_mesh(format!("no domain {}", domain)))?;
        target.faces.push(face);
        Ok(())
    }

    /// Set a named attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Vertex positions.
    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    /// All blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// All domains.
    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    /// Total number of cells.
    pub fn num_cells(&self) -> usize {
        self.block_ends.last().copied().unwrap_or(0)
    }

    /// Axis-aligned bounding box, or `None` for a mesh without vertices.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(lo, hi), p| {
            (lo.inf(p), hi.sup(p))
        }))
    }

    fn check_vertices(&self, element: &Element) -> Result<()> {
        match element.max_vertex() {
            Some(v) if v >= self.vertices.len() => Err(ExportError::invalid_mesh(format!(
                "{} references vertex {} but the mesh has {} vertices",
                element.kind(),
                v,
                self.vertices.len()
            ))),
            _ => Ok(()),
        }
    }
}

impl MeshModel for UnstructuredMesh {
    fn dimension(&self) -> Dimension {
        self.dimension
    }

    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn vertex(&self, index: usize) -> Option<Point3<f64>> {
        self.vertices.get(index).copied()
    }

    fn cell_count(&self) -> usize {
        self.num_cells()
    }

    fn cell(&self, index: usize) -> Option<(&Element, BlockId)> {
        let b = self.block_ends.partition_point(|&end| end <= index);
        let start = if b == 0 { 0 } else { self.block_ends[b - 1] };
        let cell = self.blocks.get(b)?.cells.get(index - start)?;
        Some((cell, BlockId::new(b)))
    }

    fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn block_cell_count(&self, block: BlockId) -> usize {
        self.blocks.get(block.index()).map_or(0, |b| b.cells.len())
    }

    fn block_cell(&self, block: BlockId, index: usize) -> Option<&Element> {
        self.blocks.get(block.index())?.cells.get(index)
    }

    fn block_condition(&self, block: BlockId) -> Option<&Condition> {
        self.blocks.get(block.index())?.condition.as_ref()
    }

    fn domain_count(&self) -> usize {
        self.domains.len()
    }

    fn domain_condition(&self, domain: DomainId) -> Option<&Condition> {
        self.domains.get(domain.index())?.condition.as_ref()
    }

    fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    fn stream_faces(&self, order: FaceOrder) -> Result<FaceStream<'_>> {
        let faces = topology::collect_faces(&self.blocks, &self.domains, order)?;
        Ok(FaceStream::new(faces.len(), faces.into_iter()))
    }
}
