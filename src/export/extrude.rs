//! One-cell-thick extrusion of a 2-D grid.
//!
//! Each 2-D cell becomes a prism or hex whose side faces are the streamed
//! edges. The two remaining faces of every extruded cell are the 2-D cell
//! itself (the base) and its copy on the offset plane (the top). They are
//! appended after the streamed faces as boundary faces: all bases first,
//! then all tops. Both passes visit the blocks grouped by volume condition,
//! in order of first appearance, so every side patch is one contiguous run.

use crate::error::{ExportError, Result};
use crate::foam::{FacesFile, LabelFile};
use crate::mesh::{BlockId, Condition, FaceKind, MeshModel, UNSPECIFIED};

use super::bc_stats::BcStats;
use super::options::SideBcMode;
use super::vc_sets::VcSetManager;

const SIDE_BC_TYPE: &str = "empty";

/// Which copy of the 2-D grid a face belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The original plane.
    Base,
    /// The offset plane.
    Top,
}

/// Boundary condition of a base or top face of `block`.
pub fn side_condition<M: MeshModel + ?Sized>(
    model: &M,
    block: BlockId,
    side: Side,
    mode: SideBcMode,
) -> Condition {
    match mode {
        SideBcMode::Unspecified => Condition::unspecified(),
        SideBcMode::Single => Condition::boundary("BaseAndTop", SIDE_BC_TYPE),
        SideBcMode::BaseTop => {
            let name = match side {
                Side::Base => "Base",
                Side::Top => "Top",
            };
            Condition::boundary(name, SIDE_BC_TYPE)
        }
        SideBcMode::Multiple => {
            let vc = model
                .block_condition(block)
                .map_or(UNSPECIFIED, |c| c.name.as_str());
            let suffix = match side {
                Side::Base => "-base",
                Side::Top => "-top",
            };
            Condition::boundary(format!("{}{}", vc, suffix), SIDE_BC_TYPE)
        }
    }
}

/// Writes the base and top faces of an extruded 2-D grid.
pub struct Extrusion<'a, M: MeshModel + ?Sized> {
    model: &'a M,
    mode: SideBcMode,
    first_face: usize,
}

impl<'a, M: MeshModel + ?Sized> Extrusion<'a, M> {
    /// `first_face` is the id of the first base face, the number of
    /// streamed faces.
    pub fn new(model: &'a M, mode: SideBcMode, first_face: usize) -> Self {
        Self {
            model,
            mode,
            first_face,
        }
    }

    /// Write both passes. Returns the number of faces written.
    pub fn write(
        &self,
        faces: &mut FacesFile,
        owner: &mut LabelFile,
        bc_stats: &mut BcStats,
        mut sets: Option<&mut VcSetManager>,
    ) -> Result<usize> {
        let n_cells = self.model.cell_count();
        let blocks = self.blocks_by_condition();
        for side in [Side::Base, Side::Top] {
            let (mut face_id, vertex_offset) = match side {
                Side::Base => (self.first_face, 0),
                Side::Top => (self.first_face + n_cells, self.model.vertex_count()),
            };
            for &(block, first_cell) in &blocks {
                let bc = side_condition(self.model, block, side, self.mode);
                for local in 0..self.model.block_cell_count(block) {
                    let element = self.model.block_cell(block, local).ok_or_else(|| {
                        ExportError::invalid_mesh(format!("block {} has no cell {}", block, local))
                    })?;
                    let mut face = element.clone();
                    if side == Side::Top {
                        face.offset(vertex_offset);
                        face.flip();
                    }
                    faces.write(&face)?;
                    owner.write(&(first_cell + local))?;

                    bc_stats.push(&bc, face_id);
                    if let Some(sets) = sets.as_deref_mut() {
                        sets.add_face(block, FaceKind::Boundary, face_id)?;
                    }
                    face_id += 1;
                }
            }
        }
        log::debug!("wrote {} extruded base and top faces", 2 * n_cells);
        Ok(2 * n_cells)
    }

    /// Blocks with their first cell id, stably grouped by volume condition
    /// name in order of first appearance.
    fn blocks_by_condition(&self) -> Vec<(BlockId, usize)> {
        let mut names: Vec<&str> = Vec::new();
        let mut blocks = Vec::with_capacity(self.model.block_count());
        let mut first_cell = 0;
        for b in 0..self.model.block_count() {
            let block = BlockId::new(b);
            let name = self
                .model
                .block_condition(block)
                .map_or(UNSPECIFIED, |c| c.name.as_str());
            let rank = names.iter().position(|&n| n == name).unwrap_or_else(|| {
                names.push(name);
                names.len() - 1
            });
            blocks.push((rank, block, first_cell));
            first_cell += self.model.block_cell_count(block);
        }
        blocks.sort_by_key(|&(rank, _, _)| rank);
        blocks
            .into_iter()
            .map(|(_, block, first_cell)| (block, first_cell))
            .collect()
    }
}
