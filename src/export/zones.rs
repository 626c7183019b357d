//! `cellZones` and `faceZones` assembly from the closed set files.

use std::path::Path;

use crate::error::Result;
use crate::foam::{merge_set, zone_file, ZoneKind};
use crate::progress::ProgressSteps;

use super::vc_sets::VcSetManager;

/// Write `faceZones`: the face sets of every group in creation order, then
/// the per-domain face sets. Returns the number of zones.
pub fn write_face_zones(
    mesh_dir: &Path,
    sets: &VcSetManager,
    steps: &mut ProgressSteps<'_>,
) -> Result<usize> {
    let domain_sets = sets.domain_set_paths();
    steps.begin_step(sets.groups().len() + domain_sets.len(), "Writing face zones")?;
    let mut zones = zone_file(mesh_dir, ZoneKind::Face);
    zones.open()?;
    for group in sets.groups() {
        group.merge_faces_into_zone(&mut zones)?;
        steps.increment()?;
    }
    for path in &domain_sets {
        merge_set(&mut zones, path)?;
        steps.increment()?;
    }
    zones.close()?;
    steps.end_step()?;
    Ok(zones.num_items())
}

/// Write `cellZones` from the cell set of every group. Returns the number
/// of zones.
pub fn write_cell_zones(
    mesh_dir: &Path,
    sets: &VcSetManager,
    steps: &mut ProgressSteps<'_>,
) -> Result<usize> {
    steps.begin_step(sets.groups().len(), "Writing cell zones")?;
    let mut zones = zone_file(mesh_dir, ZoneKind::Cell);
    zones.open()?;
    for group in sets.groups() {
        group.merge_cells_into_zone(&mut zones)?;
        steps.increment()?;
    }
    zones.close()?;
    steps.end_step()?;
    Ok(zones.num_items())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::vc_sets::SetsDir;
    use crate::mesh::{BlockId, Condition, DomainId, Dimension, Element, FaceKind, UnstructuredMesh};
    use crate::progress::Progress;
    use nalgebra::Point3;

    #[test]
    fn test_face_zones_in_group_then_domain_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut mesh = UnstructuredMesh::new(Dimension::Two);
        mesh.add_vertices([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let a = mesh.add_block("a", Condition::volume("fluid", "interiorToFace+boundaryToFace"));
        mesh.add_cell(a, Element::tri([0, 1, 2])).unwrap();
        let b = mesh.add_block("b", Condition::volume("solid", "volumeToCell+volumeToFace"));
        mesh.add_cell(b, Element::tri([0, 1, 2])).unwrap();

        let mut sets = VcSetManager::new(SetsDir::new(dir.path()));
        sets.prepare(&mesh, true, true).unwrap();
        sets.add_face(BlockId::new(0), FaceKind::Interior, 3).unwrap();
        sets.add_face(BlockId::new(1), FaceKind::Boundary, 4).unwrap();
        sets.add_cell(BlockId::new(1), 1).unwrap();
        sets.domain_set(DomainId::new(0), &Condition::boundary("gap", "faceSet"))
            .unwrap()
            .write(&9)
            .unwrap();
        sets.flush_face_files().unwrap();
        sets.flush_cell_files().unwrap();

        let progress = Progress::none();
        let mut steps = ProgressSteps::new(&progress, 2);
        assert_eq!(write_face_zones(dir.path(), &sets, &mut steps).unwrap(), 4);
        assert_eq!(write_cell_zones(dir.path(), &sets, &mut steps).unwrap(), 1);

        let text = std::fs::read_to_string(dir.path().join("faceZones")).unwrap();
        let order: Vec<_> = ["fluid-interiorFaces\n", "fluid-boundaryFaces\n", "solid-faces\n", "gap\n"]
            .iter()
            .map(|name| text.find(name).unwrap())
            .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));

        let cells = std::fs::read_to_string(dir.path().join("cellZones")).unwrap();
        assert!(cells.contains("solid-cells\n{\n  type cellZone;"));
    }
}
