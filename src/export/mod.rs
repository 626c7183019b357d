//! OpenFOAM polyMesh export.
//!
//! [`export`] writes a [`MeshModel`] into a polyMesh directory in three
//! major phases:
//!
//! 1. **Faces**: one pass over the face stream writes `faces`, `owner`,
//!    `neighbour` and the volume-condition face sets, a 2-D grid is
//!    extruded, then `boundary` and `faceZones` are written.
//! 2. **Points**: `points`, doubled onto the offset plane for a 2-D grid.
//! 3. **Cells**: the cell sets and `cellZones`.
//!
//! Set files under `sets/` are kept when sets are requested and deleted
//! once the zones are built otherwise.
//!
//! # Example
//!
//! ```no_run
//! use foamport::export::{export, ExportOptions, SetZoneExport};
//! use foamport::mesh::{Dimension, Element, UnstructuredMesh};
//! use foamport::progress::Progress;
//! use nalgebra::Point3;
//!
//! let mut mesh = UnstructuredMesh::new(Dimension::Two);
//! mesh.add_vertices([
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ]);
//! let block = mesh.add_block("fluid", None);
//! mesh.add_cell(block, Element::quad([0, 1, 2, 3]))?;
//!
//! let options = ExportOptions::default().with_cell_export(SetZoneExport::NONE);
//! let summary = export(&mesh, "case/constant/polyMesh", &options, &Progress::none())?;
//! println!("{} cells, {} faces", summary.cells, summary.faces);
//! # Ok::<(), foamport::ExportError>(())
//! ```

mod bc_stats;
mod extrude;
mod options;
mod stream;
mod validate;
mod vc_sets;
mod zones;

pub use bc_stats::BcStats;
pub use extrude::{side_condition, Extrusion, Side};
pub use options::{ExportOptions, SetZoneExport, SideBcMode, PRECISION_RANGE};
pub use stream::{FaceStreamWriter, StreamSummary};
pub use validate::{inspect, validate_2d, GridProperties, Orientation};
pub use vc_sets::{SetsDir, VcSetFiles, VcSetManager, SETS_DIR};
pub use zones::{write_cell_zones, write_face_zones};

use std::path::Path;

use crate::error::{ExportError, Result};
use crate::foam::points_file;
use crate::mesh::{BlockId, MeshModel};
use crate::progress::{Progress, ProgressSteps};

/// What an export wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    /// Entries in `points`.
    pub points: usize,
    /// Entries in `faces`.
    pub faces: usize,
    /// Entries in `neighbour`.
    pub internal_faces: usize,
    /// Number of cells.
    pub cells: usize,
    /// Entries in `boundary`.
    pub patches: usize,
    /// Entries in `faceZones`, if written.
    pub face_zones: Option<usize>,
    /// Entries in `cellZones`, if written.
    pub cell_zones: Option<usize>,
    /// Extrusion thickness of a 2-D grid.
    pub thickness: Option<f64>,
}

/// Export `model` into the polyMesh directory `mesh_dir`.
///
/// The directory must exist. A 2-D grid is checked for planarity and
/// consistent winding before anything is written. On failure the files
/// written so far are left in place, closed and well-formed.
pub fn export<M: MeshModel + ?Sized>(
    model: &M,
    mesh_dir: impl AsRef<Path>,
    options: &ExportOptions,
    progress: &Progress,
) -> Result<ExportSummary> {
    let mesh_dir = mesh_dir.as_ref();
    let result = run(model, mesh_dir, options, progress);
    if let Err(e) = &result {
        log::error!("export to {} failed: {}", mesh_dir.display(), e);
    }
    result
}

fn run<M: MeshModel + ?Sized>(
    model: &M,
    mesh_dir: &Path,
    options: &ExportOptions,
    progress: &Progress,
) -> Result<ExportSummary> {
    options.validate()?;
    let grid = if model.is_2d() {
        Some(validate_2d(model, options.grid_point_tolerance)?)
    } else {
        None
    };

    let face_zones = options.face_export.contains(SetZoneExport::ZONES);
    let cell_zones = options.cell_export.contains(SetZoneExport::ZONES);
    let major_steps = 3 + usize::from(face_zones) + usize::from(cell_zones);
    let mut steps = ProgressSteps::new(progress, major_steps);

    let mut sets = VcSetManager::new(SetsDir::new(mesh_dir));
    let result = run_phases(model, mesh_dir, options, grid, &mut sets, &mut steps);
    let sets_dir = sets.sets_dir().clone();
    // close whatever is still open before looking at the directory
    drop(sets);
    sets_dir.remove_if_unused();
    result
}

fn run_phases<M: MeshModel + ?Sized>(
    model: &M,
    mesh_dir: &Path,
    options: &ExportOptions,
    grid: Option<GridProperties>,
    sets: &mut VcSetManager,
    steps: &mut ProgressSteps<'_>,
) -> Result<ExportSummary> {
    if options.any_sets_or_zones() {
        sets.prepare(
            model,
            !options.face_export.is_empty(),
            !options.cell_export.is_empty(),
        )?;
    }

    // faces
    let stream = FaceStreamWriter::new(model, mesh_dir, options).run(sets, steps)?;
    sets.flush_face_files()?;
    let mut face_zone_count = None;
    if options.face_export.contains(SetZoneExport::ZONES) {
        face_zone_count = Some(write_face_zones(mesh_dir, sets, steps)?);
    }
    if !options.face_export.contains(SetZoneExport::SETS) {
        sets.discard_face_files()?;
    }

    // points
    let points = write_points(model, mesh_dir, options, grid, stream.thickness, steps)?;

    // cells
    let mut cell_zone_count = None;
    if !options.cell_export.is_empty() && !sets.is_empty() {
        write_cell_sets(model, sets, steps)?;
        sets.flush_cell_files()?;
        if options.cell_export.contains(SetZoneExport::ZONES) {
            cell_zone_count = Some(write_cell_zones(mesh_dir, sets, steps)?);
        }
        if !options.cell_export.contains(SetZoneExport::SETS) {
            sets.discard_cell_files()?;
        }
    } else {
        steps.begin_step(0, "Writing cell sets")?;
        steps.end_step()?;
    }

    let summary = ExportSummary {
        points,
        faces: stream.faces,
        internal_faces: stream.internal_faces,
        cells: model.cell_count(),
        patches: stream.patches,
        face_zones: face_zone_count,
        cell_zones: cell_zone_count,
        thickness: grid.map(|_| stream.thickness),
    };
    log::info!(
        "exported {} points, {} faces, {} cells and {} patches to {}",
        summary.points,
        summary.faces,
        summary.cells,
        summary.patches,
        mesh_dir.display()
    );
    Ok(summary)
}

/// Write `points`. A 2-D grid gets a second copy of every point on the
/// plane `plane_z + orientation * thickness`.
fn write_points<M: MeshModel + ?Sized>(
    model: &M,
    mesh_dir: &Path,
    options: &ExportOptions,
    grid: Option<GridProperties>,
    thickness: f64,
    steps: &mut ProgressSteps<'_>,
) -> Result<usize> {
    let n = model.vertex_count();
    let copies = if grid.is_some() { 2 } else { 1 };
    steps.begin_step(n * copies, "Writing points")?;

    let mut points = points_file(mesh_dir, options.point_precision);
    points.open()?;
    let offset_z = grid.map(|g| g.plane_z + g.orientation.sign() * thickness);
    for z in std::iter::once(None).chain(offset_z.map(Some)) {
        for i in 0..n {
            let mut p = model
                .vertex(i)
                .ok_or_else(|| ExportError::invalid_mesh(format!("vertex {} does not exist", i)))?;
            if let Some(z) = z {
                p.z = z;
            }
            points.write(&p)?;
            steps.increment()?;
        }
    }
    points.close()?;
    steps.end_step()?;
    Ok(points.num_items())
}

/// Add every cell to the cell set of its block's group, in block order.
/// Blocks whose group writes no cell set are skipped.
fn write_cell_sets<M: MeshModel + ?Sized>(
    model: &M,
    sets: &mut VcSetManager,
    steps: &mut ProgressSteps<'_>,
) -> Result<()> {
    steps.begin_step(sets.total_cells(), "Writing cell sets")?;
    let mut cell = 0;
    for b in 0..model.block_count() {
        let block = BlockId::new(b);
        let count = model.block_cell_count(block);
        if sets.block_has_cell_file(block) {
            for id in cell..cell + count {
                sets.add_cell(block, id)?;
                steps.increment()?;
            }
        }
        cell += count;
    }
    steps.end_step()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Condition, Dimension, Element, UnstructuredMesh};
    use nalgebra::Point3;
    use std::fs;

    fn list_body(text: &str) -> Vec<&str> {
        let start = text.find("(\n").unwrap() + 2;
        let end = text.rfind(")\n").unwrap();
        text[start..end].lines().collect()
    }

    fn labels(text: &str) -> Vec<usize> {
        list_body(text)
            .iter()
            .flat_map(|l| l.split_whitespace().map(|t| t.parse::<usize>().unwrap()))
            .collect()
    }

    fn count(text: &str) -> usize {
        text.lines().find_map(|l| l.trim().parse().ok()).unwrap()
    }

    fn single_quad() -> UnstructuredMesh {
        let mut mesh = UnstructuredMesh::new(Dimension::Two);
        mesh.add_vertices([
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(3.0, 0.0, 1.0),
            Point3::new(3.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ]);
        let block = mesh.add_block("fluid", Condition::volume("fluid", "volumeToCell"));
        mesh.add_cell(block, Element::quad([0, 1, 2, 3])).unwrap();
        mesh
    }

    /// A 2 x 1 x 1 hex grid split over two blocks with different VCs.
    fn hex_pair() -> UnstructuredMesh {
        let mut mesh = UnstructuredMesh::new(Dimension::Three);
        for k in 0..2 {
            for j in 0..2 {
                for i in 0..3 {
                    mesh.add_vertex(Point3::new(i as f64, j as f64, k as f64));
                }
            }
        }
        let v = |i: usize, j: usize, k: usize| k * 6 + j * 3 + i;
        let hex = |i: usize| {
            Element::hex([
                v(i, 0, 0),
                v(i + 1, 0, 0),
                v(i + 1, 1, 0),
                v(i, 1, 0),
                v(i, 0, 1),
                v(i + 1, 0, 1),
                v(i + 1, 1, 1),
                v(i, 1, 1),
            ])
        };
        let a = mesh.add_block("a", Condition::volume("left", "volumeToCell+volumeToFace"));
        mesh.add_cell(a, hex(0)).unwrap();
        let b = mesh.add_block("b", Condition::volume("right", "volumeToCell"));
        mesh.add_cell(b, hex(1)).unwrap();
        let wall = mesh.add_domain("walls", Some(Condition::boundary("walls", "wall")));
        mesh.add_domain_face(wall, Element::quad([v(0, 0, 0), v(0, 1, 0), v(0, 1, 1), v(0, 0, 1)]))
            .unwrap();
        mesh
    }

    #[test]
    fn test_2d_quad_extrusion_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = single_quad();
        let summary = export(&mesh, dir.path(), &ExportOptions::default(), &Progress::none()).unwrap();

        // mean of 3, 1, 3, 1
        assert_eq!(summary.thickness, Some(2.0));
        assert_eq!(summary.points, 8);
        assert_eq!(summary.faces, 6);
        assert_eq!(summary.internal_faces, 0);

        let points = fs::read_to_string(dir.path().join("points")).unwrap();
        assert_eq!(count(&points), 2 * mesh.vertex_count());
        let rows = list_body(&points);
        assert_eq!(rows[0], "(0 0 1)");
        assert_eq!(rows[6], "(3 1 3)");

        let faces = fs::read_to_string(dir.path().join("faces")).unwrap();
        assert_eq!(count(&faces), 6);
        let owner = fs::read_to_string(dir.path().join("owner")).unwrap();
        assert_eq!(labels(&owner), vec![0; 6]);
        let neighbour = fs::read_to_string(dir.path().join("neighbour")).unwrap();
        assert_eq!(count(&neighbour), 0);

        let boundary = fs::read_to_string(dir.path().join("boundary")).unwrap();
        assert_eq!(count(&boundary), 2);
        assert!(boundary.contains("BaseAndTop"));

        let zones = fs::read_to_string(dir.path().join("cellZones")).unwrap();
        assert!(zones.contains("fluid-cells"));
        assert!(dir.path().join("sets").join("fluid-cells").exists());
    }

    #[test]
    fn test_owner_below_neighbour_and_zones_only() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = hex_pair();
        let options = ExportOptions::default()
            .with_face_export(SetZoneExport::ZONES)
            .with_cell_export(SetZoneExport::ZONES);
        let summary = export(&mesh, dir.path(), &options, &Progress::none()).unwrap();
        assert_eq!(summary.faces, 11);
        assert_eq!(summary.internal_faces, 1);
        assert_eq!(summary.cells, 2);
        assert_eq!(summary.thickness, None);
        assert_eq!(summary.cell_zones, Some(2));

        let owner = labels(&fs::read_to_string(dir.path().join("owner")).unwrap());
        let neighbour = labels(&fs::read_to_string(dir.path().join("neighbour")).unwrap());
        assert_eq!(owner.len(), 11);
        for (o, n) in owner.iter().zip(&neighbour) {
            assert!(o < n);
        }

        let face_zones = fs::read_to_string(dir.path().join("faceZones")).unwrap();
        assert!(face_zones.contains("left-faces"));
        let cell_zones = fs::read_to_string(dir.path().join("cellZones")).unwrap();
        assert!(cell_zones.contains("left-cells") && cell_zones.contains("right-cells"));
        // zones only: the sets directory is gone again
        assert!(!dir.path().join("sets").exists());
    }

    #[test]
    fn test_no_sets_or_zones() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExportOptions::default()
            .with_face_export(SetZoneExport::NONE)
            .with_cell_export(SetZoneExport::NONE)
            .with_point_precision(6);
        let summary = export(&hex_pair(), dir.path(), &options, &Progress::none()).unwrap();
        assert_eq!(summary.face_zones, None);
        assert_eq!(summary.patches, 2);
        assert!(!dir.path().join("sets").exists());
        assert!(!dir.path().join("faceZones").exists());
        assert!(!dir.path().join("cellZones").exists());
    }

    #[test]
    fn test_existing_sets_dir_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sets")).unwrap();
        let options = ExportOptions::default()
            .with_face_export(SetZoneExport::ZONES)
            .with_cell_export(SetZoneExport::ZONES);
        export(&hex_pair(), dir.path(), &options, &Progress::none()).unwrap();
        assert!(dir.path().join("sets").exists());
    }

    #[test]
    fn test_non_planar_grid_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut mesh = single_quad();
        mesh.add_vertex(Point3::new(0.0, 0.0, 1.5));
        let err = export(&mesh, dir.path(), &ExportOptions::default(), &Progress::none()).unwrap_err();
        assert!(matches!(err, ExportError::NotPlanar { .. }));
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    /// Patch name, nFaces and startFace of every `boundary` entry.
    fn patches(text: &str) -> Vec<(String, usize, usize)> {
        let body = list_body(text);
        let field = |line: &str, key: &str| -> usize {
            line.trim()
                .strip_prefix(key)
                .and_then(|v| v.trim().strip_suffix(';'))
                .unwrap()
                .parse()
                .unwrap()
        };
        body.windows(5)
            .filter(|w| w[1].trim() == "{")
            .map(|w| {
                let n_faces = field(w[3], "nFaces");
                let start = field(w[4], "startFace");
                (w[0].trim().to_string(), n_faces, start)
            })
            .collect()
    }

    /// A 3 x 1 quad strip in blocks fluid, solid, fluid with boundary
    /// domains wall (bottom), inlet (right), wall (top) and one without a
    /// condition (left).
    fn shared_names_strip() -> UnstructuredMesh {
        let mut mesh = UnstructuredMesh::new(Dimension::Two);
        for j in 0..2 {
            for i in 0..4 {
                mesh.add_vertex(Point3::new(i as f64, j as f64, 0.0));
            }
        }
        for (name, vc) in [("a", "fluid"), ("b", "solid"), ("c", "fluid")] {
            let block = mesh.add_block(name, Condition::volume(vc, "volumeToCell"));
            let i = block.index();
            mesh.add_cell(block, Element::quad([i, i + 1, i + 5, i + 4])).unwrap();
        }
        let domains: [(&str, Option<Condition>, Vec<[usize; 2]>); 4] = [
            ("bottom", Some(Condition::boundary("wall", "wall")), vec![[0, 1], [1, 2], [2, 3]]),
            ("right", Some(Condition::boundary("inlet", "patch")), vec![[3, 7]]),
            ("top", Some(Condition::boundary("wall", "wall")), vec![[4, 5], [5, 6], [6, 7]]),
            ("left", None, vec![[0, 4]]),
        ];
        for (name, bc, edges) in domains {
            let d = mesh.add_domain(name, bc);
            for edge in edges {
                mesh.add_domain_face(d, Element::bar(edge)).unwrap();
            }
        }
        mesh
    }

    #[test]
    fn test_patch_names_unique_for_every_side_mode() {
        let mesh = shared_names_strip();
        let cases = [
            (SideBcMode::Unspecified, vec!["wall", "inlet", "Unspecified"]),
            (SideBcMode::Single, vec!["wall", "inlet", "Unspecified", "BaseAndTop"]),
            (SideBcMode::BaseTop, vec!["wall", "inlet", "Unspecified", "Base", "Top"]),
            (
                SideBcMode::Multiple,
                vec![
                    "wall",
                    "inlet",
                    "Unspecified",
                    "fluid-base",
                    "solid-base",
                    "fluid-top",
                    "solid-top",
                ],
            ),
        ];
        for (mode, expected) in cases {
            let dir = tempfile::tempdir().unwrap();
            let options = ExportOptions::default().with_side_bc_mode(mode);
            let summary = export(&mesh, dir.path(), &options, &Progress::none()).unwrap();
            assert_eq!(summary.faces, 16);
            assert_eq!(summary.internal_faces, 2);

            let boundary = fs::read_to_string(dir.path().join("boundary")).unwrap();
            let patches = patches(&boundary);
            let names: Vec<_> = patches.iter().map(|p| p.0.as_str()).collect();
            assert_eq!(names, expected, "{:?}", mode);
            let unique: std::collections::HashSet<_> = names.iter().collect();
            assert_eq!(unique.len(), names.len(), "{:?}", mode);
            assert_eq!(summary.patches, names.len());

            // patches tile the boundary faces without gaps
            let mut next = summary.internal_faces;
            for (name, n_faces, start) in &patches {
                assert_eq!(*start, next, "{} in {:?}", name, mode);
                next += n_faces;
            }
            assert_eq!(next, summary.faces);
        }
    }
}
