//! Mesh model consumed by the exporter.
//!
//! This module provides the [`MeshModel`] trait the exporter reads from and
//! [`UnstructuredMesh`], an in-memory implementation made of vertices,
//! blocks of cells and boundary domains.
//!
//! # Overview
//!
//! - Vertices are dense 0-based points.
//! - Blocks group cells (tri/quad in 2-D, tet/hex/wedge/pyramid in 3-D)
//!   and may carry a volume condition.
//! - Domains group boundary faces and may carry a boundary condition.
//! - Cells are numbered block-major; faces are numbered by the face stream.
//!
//! # Face streaming
//!
//! [`MeshModel::stream_faces`] yields every face exactly once. In
//! [`FaceOrder::BcGroupsLast`] order internal faces come first, sorted by
//! owner then neighbour, and boundary faces follow grouped by boundary
//! condition name.
//!
//! ```
//! use foamport::mesh::{Dimension, Element, FaceOrder, MeshModel, UnstructuredMesh};
//! use nalgebra::Point3;
//!
//! let mut mesh = UnstructuredMesh::new(Dimension::Two);
//! mesh.add_vertices([
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ]);
//! let block = mesh.add_block("fluid", None);
//! mesh.add_cell(block, Element::tri([0, 1, 2])).unwrap();
//!
//! let faces = mesh.stream_faces(FaceOrder::BcGroupsLast).unwrap();
//! assert_eq!(faces.total(), 3);
//! ```

mod condition;
mod element;
mod index;
mod model;
mod topology;
mod unstructured;

pub use condition::{Condition, VcFlags, BC_TYPES, SHADOW_BC_TYPE, UNSPECIFIED, VC_TYPES};
pub use element::{Element, ElementType};
pub use index::{BlockId, DomainId};
pub use model::{
    AttributeValue, Dimension, FaceKind, FaceOrder, FaceRecord, FaceSide, FaceStream, MeshModel,
};
pub use unstructured::{Block, Domain, UnstructuredMesh};
