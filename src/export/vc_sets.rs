//! Volume-condition set files.
//!
//! Blocks sharing a volume condition name share one [`VcSetFiles`] group.
//! The condition's [`VcFlags`] decide which set files the group writes:
//!
//! | Flags                      | Files                                   |
//! |----------------------------|-----------------------------------------|
//! | interior + boundary, split | `<vc>-interiorFaces`, `<vc>-boundaryFaces` |
//! | interior + boundary        | `<vc>-faces` (shared)                   |
//! | interior only              | `<vc>-interiorFaces`                    |
//! | boundary only              | `<vc>-boundaryFaces`                    |
//! | cells                      | `<vc>-cells`                            |
//!
//! Connection faces that lie on a boundary domain also go to a per-domain
//! face set named after the domain's boundary condition. Those sets are
//! created on first use.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::foam::{merge_set, set_file, LabelFile, SetKind, UsedNames, ZoneFile};
use crate::mesh::{BlockId, Condition, DomainId, FaceKind, MeshModel, VcFlags};

/// Name of the set directory inside the polyMesh directory.
pub const SETS_DIR: &str = "sets";

/// The `sets/` directory, remembering whether this export created it.
#[derive(Debug, Clone)]
pub struct SetsDir {
    path: PathBuf,
    created: bool,
}

impl SetsDir {
    /// Describe the set directory under `mesh_dir`.
    pub fn new(mesh_dir: &Path) -> Self {
        Self {
            path: mesh_dir.join(SETS_DIR),
            created: false,
        }
    }

    /// Create the directory if it does not exist yet.
    pub fn ensure(&mut self) -> Result<()> {
        match fs::create_dir(&self.path) {
            Ok(()) => {
                self.created = true;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove the directory if this export created it and it is empty.
    pub fn remove_if_unused(&self) {
        if !self.created {
            return;
        }
        let empty = fs::read_dir(&self.path).map_or(false, |mut d| d.next().is_none());
        if empty {
            if let Err(e) = fs::remove_dir(&self.path) {
                log::warn!("could not remove {}: {}", self.path.display(), e);
            }
        }
    }

    /// Path of the directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this export created the directory.
    pub fn was_created(&self) -> bool {
        self.created
    }
}

/// The set files written for one volume condition.
#[derive(Debug)]
pub struct VcSetFiles {
    name: String,
    interior: Option<LabelFile>,
    boundary: Option<LabelFile>,
    shared_faces: bool,
    cells: Option<LabelFile>,
}

impl VcSetFiles {
    /// Create and open the set files of `vc` in `sets_dir`.
    ///
    /// Face files are only created when `faces` is set, the cell file only
    /// when `cells` is set.
    pub fn create(
        vc: &Condition,
        sets_dir: &Path,
        used: &mut UsedNames,
        faces: bool,
        cells: bool,
    ) -> Result<Self> {
        let flags = vc.vc_flags();
        let mut open = |suffix: &str, kind: SetKind| -> Result<LabelFile> {
            let mut file = set_file(sets_dir, kind);
            file.open_as(used.unique(&vc.name, suffix))?;
            Ok(file)
        };

        let mut group = Self {
            name: vc.name.clone(),
            interior: None,
            boundary: None,
            shared_faces: false,
            cells: None,
        };
        if faces {
            if flags.contains(VcFlags::IB_FACES) {
                group.interior = Some(open("-interiorFaces", SetKind::Face)?);
                group.boundary = Some(open("-boundaryFaces", SetKind::Face)?);
            } else if flags.contains(VcFlags::FACES) {
                group.interior = Some(open("-faces", SetKind::Face)?);
                group.shared_faces = true;
            } else if flags.contains(VcFlags::INTERIOR_FACES) {
                group.interior = Some(open("-interiorFaces", SetKind::Face)?);
            } else if flags.contains(VcFlags::BOUNDARY_FACES) {
                group.boundary = Some(open("-boundaryFaces", SetKind::Face)?);
            }
        }
        if cells && flags.contains(VcFlags::CELLS) {
            group.cells = Some(open("-cells", SetKind::Cell)?);
        }
        Ok(group)
    }

    /// Volume condition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether interior and boundary faces share one file.
    pub fn shares_face_file(&self) -> bool {
        self.shared_faces
    }

    /// Whether a cell set is written.
    pub fn has_cell_file(&self) -> bool {
        self.cells.is_some()
    }

    /// Route a face to the interior or boundary file. Connection faces
    /// count as boundary faces of the group.
    pub fn add_face(&mut self, kind: FaceKind, face: usize) -> Result<()> {
        let target = match kind {
            FaceKind::Interior => self.interior.as_mut(),
            FaceKind::Boundary | FaceKind::Connection => self.boundary_file(),
        };
        match target {
            Some(file) => file.write(&face),
            None => Ok(()),
        }
    }

    /// Add a cell to the cell file, if any.
    pub fn add_cell(&mut self, cell: usize) -> Result<()> {
        match self.cells.as_mut() {
            Some(file) => file.write(&cell),
            None => Ok(()),
        }
    }

    /// Close the face files, keeping them on disk.
    pub fn flush_face_files(&mut self) -> Result<()> {
        for file in self.face_files_mut() {
            file.close()?;
        }
        Ok(())
    }

    /// Close the cell file, keeping it on disk.
    pub fn flush_cell_file(&mut self) -> Result<()> {
        match self.cells.as_mut() {
            Some(file) => file.close(),
            None => Ok(()),
        }
    }

    /// Close and delete the face files.
    pub fn discard_face_files(&mut self) -> Result<()> {
        for file in self.face_files_mut() {
            file.close()?;
            remove_set(&file.path());
        }
        Ok(())
    }

    /// Close and delete the cell file.
    pub fn discard_cell_file(&mut self) -> Result<()> {
        if let Some(file) = self.cells.as_mut() {
            file.close()?;
            remove_set(&file.path());
        }
        Ok(())
    }

    /// Merge the face files into a face zone file, each distinct file once.
    pub fn merge_faces_into_zone(&self, zone: &mut ZoneFile) -> Result<()> {
        for file in [self.interior.as_ref(), self.boundary.as_ref()]
            .into_iter()
            .flatten()
        {
            merge_set(zone, &file.path())?;
        }
        Ok(())
    }

    /// Merge the cell file into a cell zone file.
    pub fn merge_cells_into_zone(&self, zone: &mut ZoneFile) -> Result<()> {
        match self.cells.as_ref() {
            Some(file) => merge_set(zone, &file.path()),
            None => Ok(()),
        }
    }

    /// Paths of the set files of this group.
    pub fn set_paths(&self) -> Vec<PathBuf> {
        [&self.interior, &self.boundary, &self.cells]
            .into_iter()
            .flatten()
            .map(|f| f.path())
            .collect()
    }

    fn boundary_file(&mut self) -> Option<&mut LabelFile> {
        if self.shared_faces {
            self.interior.as_mut()
        } else {
            self.boundary.as_mut()
        }
    }

    fn face_files_mut(&mut self) -> impl Iterator<Item = &mut LabelFile> {
        [self.interior.as_mut(), self.boundary.as_mut()]
            .into_iter()
            .flatten()
    }
}

fn remove_set(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            log::warn!("could not delete {}: {}", path.display(), e);
        }
    }
}

/// Maps blocks to their volume-condition groups and owns all set files of
/// one export.
#[derive(Debug)]
pub struct VcSetManager {
    sets_dir: SetsDir,
    groups: Vec<VcSetFiles>,
    block_group: Vec<usize>,
    total_cells: usize,
    used_names: UsedNames,
    domain_sets: BTreeMap<DomainId, LabelFile>,
}

impl VcSetManager {
    /// A manager without groups. Until [`prepare`](Self::prepare) is
    /// called faces and cells are never routed.
    pub fn new(sets_dir: SetsDir) -> Self {
        Self {
            sets_dir,
            groups: Vec::new(),
            block_group: Vec::new(),
            total_cells: 0,
            used_names: UsedNames::new(),
            domain_sets: BTreeMap::new(),
        }
    }

    /// Create the set directory and one group per unique volume condition
    /// name, in block order. Blocks without a condition share the
    /// unspecified group, which writes no files.
    pub fn prepare<M: MeshModel + ?Sized>(
        &mut self,
        model: &M,
        faces: bool,
        cells: bool,
    ) -> Result<()> {
        self.sets_dir.ensure()?;
        let unspecified = Condition::unspecified();
        let mut by_name: HashMap<String, usize> = HashMap::new();

        for b in 0..model.block_count() {
            let block = BlockId::new(b);
            let vc = model.block_condition(block).unwrap_or(&unspecified);
            let group = match by_name.get(&vc.name) {
                Some(&g) => g,
                None => {
                    let files = VcSetFiles::create(
                        vc,
                        self.sets_dir.path(),
                        &mut self.used_names,
                        faces,
                        cells,
                    )?;
                    self.groups.push(files);
                    by_name.insert(vc.name.clone(), self.groups.len() - 1);
                    self.groups.len() - 1
                }
            };
            self.block_group.push(group);
            self.total_cells += model.block_cell_count(block);
        }
        log::debug!(
            "{} volume condition groups for {} blocks",
            self.groups.len(),
            self.block_group.len()
        );
        Ok(())
    }

    /// Whether any group exists.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// The groups in creation order.
    pub fn groups(&self) -> &[VcSetFiles] {
        &self.groups
    }

    /// Group index of a block.
    pub fn group_of(&self, block: BlockId) -> Option<usize> {
        self.block_group.get(block.index()).copied()
    }

    /// Whether two blocks share a volume condition.
    pub fn same_condition(&self, a: BlockId, b: BlockId) -> bool {
        matches!((self.group_of(a), self.group_of(b)), (Some(x), Some(y)) if x == y)
    }

    /// Total cell count of all blocks.
    pub fn total_cells(&self) -> usize {
        self.total_cells
    }

    /// Route a face to the group of `block`.
    pub fn add_face(&mut self, block: BlockId, kind: FaceKind, face: usize) -> Result<()> {
        match self.group_of(block) {
            Some(g) => self.groups[g].add_face(kind, face),
            None => Ok(()),
        }
    }

    /// Route a cell to the group of `block`.
    pub fn add_cell(&mut self, block: BlockId, cell: usize) -> Result<()> {
        match self.group_of(block) {
            Some(g) => self.groups[g].add_cell(cell),
            None => Ok(()),
        }
    }

    /// Whether the group of `block` writes a cell set.
    pub fn block_has_cell_file(&self, block: BlockId) -> bool {
        self.group_of(block)
            .is_some_and(|g| self.groups[g].has_cell_file())
    }

    /// The face set of a boundary domain, created and opened on first use.
    pub fn domain_set(&mut self, domain: DomainId, bc: &Condition) -> Result<&mut LabelFile> {
        match self.domain_sets.entry(domain) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                self.sets_dir.ensure()?;
                let mut file = set_file(self.sets_dir.path(), SetKind::Face);
                file.open_as(self.used_names.unique(&bc.name, ""))?;
                log::debug!("face set {} for domain {}", file.object(), domain);
                Ok(e.insert(file))
            }
        }
    }

    /// Number of per-domain face sets created so far.
    pub fn domain_set_count(&self) -> usize {
        self.domain_sets.len()
    }

    /// Close the per-domain face sets.
    pub fn close_domain_sets(&mut self) -> Result<()> {
        for file in self.domain_sets.values_mut() {
            file.close()?;
        }
        Ok(())
    }

    /// Close all face set files.
    pub fn flush_face_files(&mut self) -> Result<()> {
        for group in &mut self.groups {
            group.flush_face_files()?;
        }
        self.close_domain_sets()
    }

    /// Close all cell set files.
    pub fn flush_cell_files(&mut self) -> Result<()> {
        for group in &mut self.groups {
            group.flush_cell_file()?;
        }
        Ok(())
    }

    /// Delete all face set files, including the per-domain ones.
    pub fn discard_face_files(&mut self) -> Result<()> {
        for group in &mut self.groups {
            group.discard_face_files()?;
        }
        for file in self.domain_sets.values_mut() {
            file.close()?;
            remove_set(&file.path());
        }
        Ok(())
    }

    /// Delete all cell set files.
    pub fn discard_cell_files(&mut self) -> Result<()> {
        for group in &mut self.groups {
            group.discard_cell_file()?;
        }
        Ok(())
    }

    /// Paths of the per-domain face sets in domain order.
    pub fn domain_set_paths(&self) -> Vec<PathBuf> {
        self.domain_sets.values().map(|f| f.path()).collect()
    }

    /// The set directory.
    pub fn sets_dir(&self) -> &SetsDir {
        &self.sets_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Dimension, Element, UnstructuredMesh};
    use nalgebra::Point3;

    fn labels(path: &Path) -> Vec<usize> {
        crate::foam::read_set(path)
            .unwrap()
            .lines
            .iter()
            .skip(2)
            .flat_map(|l| l.split_whitespace().filter_map(|t| t.parse().ok()).collect::<Vec<_>>())
            .collect()
    }

    fn three_blocks() -> UnstructuredMesh {
        let mut mesh = UnstructuredMesh::new(Dimension::Two);
        mesh.add_vertices([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let fluid = Condition::volume("fluid", "volumeToCell+volumeToFace");
        let a = mesh.add_block("a", fluid.clone());
        let b = mesh.add_block("b", Condition::volume("solid", "interiorToFace+boundaryToFace"));
        let c = mesh.add_block("c", fluid);
        let d = mesh.add_block("d", None);
        for block in [a, b, c, d] {
            mesh.add_cell(block, Element::tri([0, 1, 2])).unwrap();
        }
        mesh
    }

    #[test]
    fn test_blocks_share_groups_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = three_blocks();
        let mut manager = VcSetManager::new(SetsDir::new(dir.path()));
        manager.prepare(&mesh, true, true).unwrap();

        assert_eq!(manager.groups().len(), 3);
        assert_eq!(manager.group_of(BlockId::new(0)), Some(0));
        assert_eq!(manager.group_of(BlockId::new(2)), Some(0));
        assert_eq!(manager.group_of(BlockId::new(1)), Some(1));
        assert!(manager.same_condition(BlockId::new(0), BlockId::new(2)));
        assert!(!manager.same_condition(BlockId::new(0), BlockId::new(1)));
        assert_eq!(manager.total_cells(), 4);
        assert!(manager.sets_dir().was_created());

        let names: Vec<_> = manager
            .groups()
            .iter()
            .flat_map(|g| g.set_paths())
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec!["fluid-faces", "fluid-cells", "solid-interiorFaces", "solid-boundaryFaces"]
        );
        assert!(manager.groups()[0].shares_face_file());
        assert!(manager.groups()[2].set_paths().is_empty());
    }

    #[test]
    fn test_face_routing() {
        let dir = tempfile::tempdir().unwrap();
        let mesh = three_blocks();
        let mut manager = VcSetManager::new(SetsDir::new(dir.path()));
        manager.prepare(&mesh, true, false).unwrap();
        manager.add_face(BlockId::new(0), FaceKind::Interior, 1).unwrap();
        manager.add_face(BlockId::new(2), FaceKind::Boundary, 2).unwrap();
        manager.add_face(BlockId::new(1), FaceKind::Interior, 3).unwrap();
        manager.add_face(BlockId::new(1), FaceKind::Connection, 4).unwrap();
        manager.add_face(BlockId::new(3), FaceKind::Interior, 5).unwrap();
        manager.add_cell(BlockId::new(0), 0).unwrap();
        manager.flush_face_files().unwrap();

        let sets = dir.path().join(SETS_DIR);
        assert_eq!(labels(&sets.join("fluid-faces")), vec![1, 2]);
        assert_eq!(labels(&sets.join("solid-interiorFaces")), vec![3]);
        assert_eq!(labels(&sets.join("solid-boundaryFaces")), vec![4]);
        assert!(!sets.join("fluid-cells").exists());
    }

    #[test]
    fn test_domain_sets_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = VcSetManager::new(SetsDir::new(dir.path()));
        let bc = Condition::boundary("baffle 1", "faceSet");
        manager.domain_set(DomainId::new(4), &bc).unwrap().write(&7).unwrap();
        manager.domain_set(DomainId::new(4), &bc).unwrap().write(&8).unwrap();
        assert_eq!(manager.domain_set_count(), 1);
        manager.close_domain_sets().unwrap();

        let paths = manager.domain_set_paths();
        assert_eq!(paths[0].file_name().unwrap(), "baffle_1");
        assert_eq!(labels(&paths[0]), vec![7, 8]);

        manager.discard_face_files().unwrap();
        assert!(!paths[0].exists());
        manager.sets_dir().remove_if_unused();
        assert!(!dir.path().join(SETS_DIR).exists());
    }
}
