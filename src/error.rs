//! Error types for foamport.
//!
//! Every failure during an export (collaborator failures, geometric
//! validation, cancellation, malformed intermediate files) is reported
//! through [`ExportError`]. The export aborts on the first error.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`ExportError`].
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while loading or exporting a mesh.
#[derive(Error, Debug)]
pub enum ExportError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An output file could not be created.
    #[error("could not create {path}: {source}")]
    CreateFile {
        /// The file path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A 2-D grid does not lie in a single Z plane.
    #[error("the grid is not Z-planar (vertex {vertex} is {offset:e} off the plane)")]
    NotPlanar {
        /// First vertex found off the plane.
        vertex: usize,
        /// Its distance from the reference plane.
        offset: f64,
    },

    /// Blocks of a 2-D grid wind in opposite directions.
    #[error("the grid has inconsistent normals (block {block} disagrees with block 0)")]
    InconsistentNormals {
        /// First block whose winding differs from block 0.
        block: usize,
    },

    /// The export was cancelled through the progress callback.
    #[error("export cancelled")]
    Cancelled,

    /// A previously written set file is absent.
    #[error("set file {path} does not exist")]
    MissingSet {
        /// The set file path.
        path: PathBuf,
    },

    /// A previously written set file could not be merged into a zone.
    #[error("malformed set file {path}: {reason}")]
    MalformedSet {
        /// The set file path.
        path: PathBuf,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A streamed face has an element type that cannot be written as a face.
    #[error("face {face} has unsupported element type {kind}")]
    UnsupportedFaceType {
        /// The face index.
        face: usize,
        /// Element type name.
        kind: &'static str,
    },

    /// The mesh model is inconsistent or incomplete.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// A face was written to a file that was never opened.
    #[error("{object} is not open")]
    NotOpen {
        /// OpenFOAM object name of the file.
        object: String,
    },

    /// Error loading a mesh from file.
    #[error("failed to load mesh from {path}: {message}")]
    LoadError {
        /// The file path.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// Unsupported input file format.
    #[error("unsupported file format: {extension}")]
    UnsupportedFormat {
        /// The file extension.
        extension: String,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl ExportError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        ExportError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// Create an invalid mesh error.
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        ExportError::InvalidMesh(message.into())
    }
}
