//! Volume and boundary conditions.
//!
//! Blocks may carry a volume condition (VC) and domains a boundary
//! condition (BC). Both are `{name, type, type id}` triples. For a VC the
//! type id is a [`VcFlags`] bit field that controls which cell and face set
//! files are written for the blocks sharing that VC name.

use bitflags::bitflags;

bitflags! {
    /// Export policy of a volume condition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct VcFlags: u32 {
        /// Write interior faces of the VC.
        const INTERIOR_FACES = 0x0001;
        /// Write boundary faces of the VC.
        const BOUNDARY_FACES = 0x0002;
        /// Keep interior and boundary faces in separate files.
        /// Only meaningful together with both face flags.
        const SPLIT = 0x0004;
        /// Write the cells of the VC.
        const CELLS = 0x0008;

        /// All faces in one file.
        const FACES = Self::INTERIOR_FACES.bits() | Self::BOUNDARY_FACES.bits();
        /// Interior and boundary faces in separate files.
        const IB_FACES = Self::SPLIT.bits() | Self::FACES.bits();
        /// Cells and all faces in one file.
        const CELLS_FACES = Self::CELLS.bits() | Self::FACES.bits();
        /// Cells and interior faces.
        const CELLS_I_FACES = Self::CELLS.bits() | Self::INTERIOR_FACES.bits();
        /// Cells and boundary faces.
        const CELLS_B_FACES = Self::CELLS.bits() | Self::BOUNDARY_FACES.bits();
        /// Cells plus interior and boundary faces in separate files.
        const CELLS_IB_FACES = Self::CELLS.bits() | Self::IB_FACES.bits();
    }
}

/// Boundary condition types understood by OpenFOAM, with their type ids.
pub const BC_TYPES: &[(&str, u32)] = &[
    ("patch", 100),
    ("wall", 101),
    ("symmetryPlane", 102),
    ("empty", 103),
    ("wedge", 104),
    ("cyclic", 105),
    ("faceSet", 106),
];

/// Boundary condition type marking non-inflated (shadow) domains.
pub const SHADOW_BC_TYPE: &str = "faceSet";

/// Volume condition types and the set files each one produces.
pub const VC_TYPES: &[(&str, VcFlags)] = &[
    ("volumeToFace", VcFlags::FACES),
    ("interiorToFace", VcFlags::INTERIOR_FACES),
    ("boundaryToFace", VcFlags::BOUNDARY_FACES),
    ("interiorToFace+boundaryToFace", VcFlags::IB_FACES),
    ("volumeToCell", VcFlags::CELLS),
    ("volumeToCell+volumeToFace", VcFlags::CELLS_FACES),
    ("volumeToCell+interiorToFace", VcFlags::CELLS_I_FACES),
    ("volumeToCell+boundaryToFace", VcFlags::CELLS_B_FACES),
    ("volumeToCell+interiorToFace+boundaryToFace", VcFlags::CELLS_IB_FACES),
];

/// Name and type of the condition used when none is assigned.
pub const UNSPECIFIED: &str = "Unspecified";

/// A named volume or boundary condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Condition name, e.g. `inlet` or `fluid`.
    pub name: String,
    /// Condition type name, e.g. `wall` or `volumeToCell`.
    pub type_name: String,
    /// Type id; the export flag bits for a VC.
    pub tid: u32,
}

impl Condition {
    /// Create a condition from its parts.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, tid: u32) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            tid,
        }
    }

    /// The condition reported for blocks and domains without one.
    pub fn unspecified() -> Self {
        Self::new(UNSPECIFIED, UNSPECIFIED, 0)
    }

    /// Create a volume condition from a [`VC_TYPES`] type name.
    pub fn volume(name: impl Into<String>, type_name: &str) -> Option<Self> {
        VC_TYPES
            .iter()
            .find(|(t, _)| *t == type_name)
            .map(|(t, flags)| Self::new(name, *t, flags.bits()))
    }

    /// Create a volume condition with explicit export flags.
    pub fn volume_with_flags(name: impl Into<String>, flags: VcFlags) -> Self {
        let type_name = VC_TYPES
            .iter()
            .find(|(_, f)| *f == flags)
            .map_or("volume", |(t, _)| *t);
        Self::new(name, type_name, flags.bits())
    }

    /// Create a boundary condition. Types outside [`BC_TYPES`] get type id 0.
    pub fn boundary(name: impl Into<String>, type_name: &str) -> Self {
        let tid = BC_TYPES
            .iter()
            .find(|(t, _)| *t == type_name)
            .map_or(0, |(_, id)| *id);
        Self::new(name, type_name, tid)
    }

    /// Export flags of a volume condition.
    pub fn vc_flags(&self) -> VcFlags {
        VcFlags::from_bits_truncate(self.tid)
    }

    /// Whether this is the unspecified condition.
    pub fn is_unspecified(&self) -> bool {
        self.tid == 0 && self.name == UNSPECIFIED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(VcFlags::FACES.bits(), 3);
        assert_eq!(VcFlags::IB_FACES.bits(), 7);
        assert_eq!(VcFlags::CELLS_IB_FACES.bits(), 15);
        assert!(VcFlags::CELLS_I_FACES.contains(VcFlags::CELLS));
    }

    #[test]
    fn test_volume_lookup() {
        let vc = Condition::volume("fluid", "volumeToCell+boundaryToFace").unwrap();
        assert_eq!(vc.vc_flags(), VcFlags::CELLS | VcFlags::BOUNDARY_FACES);
        assert!(Condition::volume("fluid", "bogus").is_none());

        let vc = Condition::volume_with_flags("solid", VcFlags::IB_FACES);
        assert_eq!(vc.type_name, "interiorToFace+boundaryToFace");
    }

    #[test]
    fn test_boundary_tid() {
        assert_eq!(Condition::boundary("in", "wall").tid, 101);
        assert_eq!(Condition::boundary("in", "custom").tid, 0);
        assert!(Condition::unspecified().is_unspecified());
    }
}
