//! # foamport
//!
//! Export of unstructured meshes to the OpenFOAM `polyMesh` format.
//!
//! foamport writes the `points`, `faces`, `owner`, `neighbour` and
//! `boundary` files of a polyMesh directory from any [`mesh::MeshModel`],
//! together with the face and cell sets and zones derived from the
//! volume conditions of the mesh blocks.
//!
//! ## Features
//!
//! - **Single-pass face streaming**: every face is written once, in
//!   lock-step to `faces` and `owner`, with boundary patches accumulated
//!   on the fly
//! - **2-D grids**: planar tri/quad grids are extruded one cell thick, with
//!   configurable base and top patches
//! - **Sets and zones**: `cellSet`/`faceSet` files per volume condition,
//!   merged into `cellZones` and `faceZones`
//! - **Progress and cancellation**: a callback sees every step and can
//!   abort the export
//!
//! ## Quick Start
//!
//! ```no_run
//! use foamport::prelude::*;
//!
//! let mesh = foamport::io::load("channel.json")?;
//! let options = ExportOptions::from_model(&mesh)?;
//! let summary = export(&mesh, "case/constant/polyMesh", &options, &Progress::none())?;
//! println!("{} cells, {} boundary patches", summary.cells, summary.patches);
//! # Ok::<(), ExportError>(())
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use foamport::prelude::*;
//! use nalgebra::Point3;
//!
//! let mut mesh = UnstructuredMesh::new(Dimension::Three);
//! mesh.add_vertices([
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(0.0, 0.0, 1.0),
//! ]);
//! let block = mesh.add_block("core", Condition::volume("fluid", "volumeToCell"));
//! mesh.add_cell(block, Element::tet([0, 1, 2, 3]))?;
//!
//! let dir = tempfile::tempdir()?;
//! let summary = export(&mesh, dir.path(), &ExportOptions::default(), &Progress::none())?;
//! assert_eq!(summary.faces, 4);
//! assert_eq!(summary.internal_faces, 0);
//! # Ok::<(), ExportError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod export;
pub mod foam;
pub mod io;
pub mod mesh;
pub mod progress;

pub use error::{ExportError, Result};

/// Prelude module for convenient imports.
///
/// ```
/// use foamport::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{ExportError, Result};
    pub use crate::export::{export, ExportOptions, ExportSummary, SetZoneExport, SideBcMode};
    pub use crate::mesh::{
        BlockId, Condition, Dimension, DomainId, Element, ElementType, MeshModel, UnstructuredMesh,
    };
    pub use crate::progress::Progress;
}

// Re-export nalgebra types for convenience
pub use nalgebra;
