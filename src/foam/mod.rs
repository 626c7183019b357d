//! OpenFOAM polyMesh file writers.
//!
//! All files share the counted-list shape written by [`FoamFile`]; the
//! per-file item encoding lives in an encoder ([`PointList`],
//! [`FaceList`], [`LabelList`], [`BoundaryList`], [`ZoneList`]).
//!
//! # Example
//!
//! ```no_run
//! use foamport::foam::owner_file;
//!
//! let mut owner = owner_file("case/constant/polyMesh");
//! owner.open()?;
//! for cell in [0usize, 0, 1] {
//!     owner.write(&cell)?;
//! }
//! owner.close()?;
//! # Ok::<(), foamport::ExportError>(())
//! ```

mod file;
mod lists;
mod naming;
mod zone;

pub use file::{FoamFile, ListEncoder, COUNT_WIDTH, POLYMESH_LOCATION};
pub use lists::{
    boundary_file, faces_file, format_general, neighbour_file, owner_file, points_file, set_file,
    BcStat, BoundaryFile, BoundaryList, FaceList, FacesFile, LabelFile, LabelList, PointList,
    PointsFile, SetKind, LABELS_PER_ROW, SETS_LOCATION,
};
pub use naming::{sanitize, UsedNames};
pub use zone::{merge_set, read_set, zone_file, SetContents, ZoneFile, ZoneKind, ZoneList};
