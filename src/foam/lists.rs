//! Item encoders for the polyMesh files.

use std::io::Write;
use std::path::PathBuf;

use nalgebra::Point3;

use super::file::{FoamFile, ListEncoder, POLYMESH_LOCATION};
use crate::error::{ExportError, Result};
use crate::mesh::{Element, ElementType};

/// Labels written per row of a label list.
pub const LABELS_PER_ROW: usize = 10;

/// Location header entry of set files.
pub const SETS_LOCATION: &str = "constant/polyMesh/sets";

/// Format like C's `%.*g`: `precision` significant digits, trailing zeros
/// removed, scientific notation for very small or large exponents.
///
/// ```
/// use foamport::foam::format_general;
///
/// assert_eq!(format_general(0.5, 16), "0.5");
/// assert_eq!(format_general(1.0e20, 16), "1e+20");
/// assert_eq!(format_general(1.0 / 3.0, 4), "0.3333");
/// ```
pub fn format_general(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let p = precision.max(1);
    let sci = format!("{:.*e}", p - 1, value);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if exp < -4 || exp >= p as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `points`: one `(x y z)` per line.
#[derive(Debug, Clone, Copy)]
pub struct PointList {
    precision: usize,
}

impl ListEncoder for PointList {
    type Item = Point3<f64>;

    fn encode(&mut self, out: &mut dyn Write, p: &Point3<f64>, _written: usize) -> Result<()> {
        let g = |v: f64| format_general(v, self.precision);
        writeln!(out, "({} {} {})", g(p.x), g(p.y), g(p.z))?;
        Ok(())
    }
}

/// `faces`: one `n(v0 ... vn-1)` per line with the host winding reversed.
///
/// The host orients a face so its normal points into the owner cell.
/// OpenFOAM wants internal-face normals pointing from owner to neighbour
/// and boundary-face normals pointing out of the domain, which is the
/// reversed vertex order. In 2-D a bar becomes the quad joining it to its
/// copy on the offset plane.
#[derive(Debug, Clone, Copy)]
pub struct FaceList {
    two_d: bool,
    vertex_count: usize,
}

impl ListEncoder for FaceList {
    type Item = Element;

    fn encode(&mut self, out: &mut dyn Write, face: &Element, written: usize) -> Result<()> {
        let v = face.vertices();
        match face.kind() {
            ElementType::Tri | ElementType::Quad => {
                write!(out, "{}(", v.len())?;
                for (i, vi) in v.iter().rev().enumerate() {
                    if i > 0 {
                        out.write_all(b" ")?;
                    }
                    write!(out, "{}", vi)?;
                }
                writeln!(out, ")")?;
            }
            ElementType::Bar if self.two_d => {
                let n = self.vertex_count;
                writeln!(out, "4({} {} {} {})", v[0], v[1], v[1] + n, v[0] + n)?;
            }
            ElementType::Bar => writeln!(out, "2({} {})", v[1], v[0])?,
            other => {
                return Err(ExportError::UnsupportedFaceType {
                    face: written,
                    kind: other.name(),
                })
            }
        }
        Ok(())
    }
}

/// `labelList` files (owner, neighbour, sets): ten labels per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelList;

impl ListEncoder for LabelList {
    type Item = usize;

    fn encode(&mut self, out: &mut dyn Write, label: &usize, written: usize) -> Result<()> {
        if written % LABELS_PER_ROW == LABELS_PER_ROW - 1 {
            writeln!(out, " {}", label)?;
        } else {
            write!(out, " {}", label)?;
        }
        Ok(())
    }

    fn after_list(&mut self, out: &mut dyn Write, count: usize) -> Result<()> {
        if count % LABELS_PER_ROW != 0 {
            writeln!(out)?;
        }
        Ok(())
    }
}

/// A contiguous run of boundary faces sharing one boundary condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BcStat {
    /// Boundary condition name.
    pub name: String,
    /// Boundary condition type.
    pub type_name: String,
    /// Number of faces in the run.
    pub n_faces: usize,
    /// Index of the first face of the run.
    pub start_face: usize,
}

/// `boundary`: one patch entry per [`BcStat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundaryList;

impl ListEncoder for BoundaryList {
    type Item = BcStat;

    fn encode(&mut self, out: &mut dyn Write, bc: &BcStat, _written: usize) -> Result<()> {
        writeln!(out, "    {}", bc.name)?;
        writeln!(out, "    {{")?;
        writeln!(out, "        type {};", bc.type_name)?;
        writeln!(out, "        nFaces {};", bc.n_faces)?;
        writeln!(out, "        startFace {};", bc.start_face)?;
        writeln!(out, "    }}")?;
        Ok(())
    }
}

/// The `points` file.
pub type PointsFile = FoamFile<PointList>;
/// The `faces` file.
pub type FacesFile = FoamFile<FaceList>;
/// A `labelList` file: `owner`, `neighbour` or a set.
pub type LabelFile = FoamFile<LabelList>;
/// The `boundary` file.
pub type BoundaryFile = FoamFile<BoundaryList>;

/// Kind of set file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetKind {
    /// A `cellSet`.
    Cell,
    /// A `faceSet`.
    Face,
}

impl SetKind {
    /// Header class of the set file.
    pub fn class(self) -> &'static str {
        match self {
            SetKind::Cell => "cellSet",
            SetKind::Face => "faceSet",
        }
    }
}

/// Create the `points` file writer.
pub fn points_file(dir: impl Into<PathBuf>, precision: usize) -> PointsFile {
    FoamFile::new(dir, "vectorField", "points", POLYMESH_LOCATION, PointList { precision })
}

/// Create the `faces` file writer. `vertex_count` is the number of mesh
/// vertices, the offset of the extruded copy in 2-D.
pub fn faces_file(dir: impl Into<PathBuf>, two_d: bool, vertex_count: usize) -> FacesFile {
    FoamFile::new(
        dir,
        "faceList",
        "faces",
        POLYMESH_LOCATION,
        FaceList { two_d, vertex_count },
    )
}

/// Create the `owner` file writer.
pub fn owner_file(dir: impl Into<PathBuf>) -> LabelFile {
    FoamFile::new(dir, "labelList", "owner", POLYMESH_LOCATION, LabelList)
}

/// Create the `neighbour` file writer.
pub fn neighbour_file(dir: impl Into<PathBuf>) -> LabelFile {
    FoamFile::new(dir, "labelList", "neighbour", POLYMESH_LOCATION, LabelList)
}

/// Create a set file writer in `sets_dir`. The name is given on open.
pub fn set_file(sets_dir: impl Into<PathBuf>, kind: SetKind) -> LabelFile {
    FoamFile::new(sets_dir, kind.class(), "", SETS_LOCATION, LabelList)
}

/// Create the `boundary` file writer.
pub fn boundary_file(dir: impl Into<PathBuf>) -> BoundaryFile {
    FoamFile::new(dir, "polyBoundaryMesh", "boundary", POLYMESH_LOCATION, BoundaryList)
}
