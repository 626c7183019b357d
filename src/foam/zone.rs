//! `cellZones` / `faceZones` files assembled from set files.
//!
//! A zone file is a counted list of named zone blocks. Each block takes
//! its labels from a set file already on disk:
//!
//! ```text
//! fluid-faces
//! {
//!   type faceZone;
//!   faceLabels List<label>
//!   3
//!   (
//!    5 9 12
//!   )
//!   ;
//!   flipMap List<bool> 3{0};
//! }
//! ```

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::file::{FoamFile, ListEncoder, POLYMESH_LOCATION};
use crate::error::{ExportError, Result};

/// Kind of zone file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    /// `cellZones`
    Cell,
    /// `faceZones`
    Face,
}

impl ZoneKind {
    /// Object name of the zone file.
    pub fn object(self) -> &'static str {
        match self {
            ZoneKind::Cell => "cellZones",
            ZoneKind::Face => "faceZones",
        }
    }

    fn zone_type(self) -> &'static str {
        match self {
            ZoneKind::Cell => "cellZone",
            ZoneKind::Face => "faceZone",
        }
    }

    fn labels_entry(self) -> &'static str {
        match self {
            ZoneKind::Cell => "cellLabels",
            ZoneKind::Face => "faceLabels",
        }
    }
}

/// The labels section of a set file: its count and the lines from the
/// count line through the closing `)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetContents {
    /// Number of labels in the set.
    pub count: usize,
    /// Raw lines, count line first, closing line last.
    pub lines: Vec<String>,
}

/// Read the label section of the set file at `path`.
pub fn read_set(path: &Path) -> Result<SetContents> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ExportError::MissingSet {
            path: path.to_path_buf(),
        },
        _ => ExportError::Io(e),
    })?;
    let malformed = |reason| ExportError::MalformedSet {
        path: path.to_path_buf(),
        reason,
    };

    let mut lines = text.lines();
    let mut count = None;
    let mut section = Vec::new();
    for line in lines.by_ref() {
        if let Ok(n) = line.trim().parse::<usize>() {
            count = Some(n);
            section.push(line.to_string());
            break;
        }
    }
    let count = count.ok_or_else(|| malformed("no count line"))?;

    for line in lines {
        section.push(line.to_string());
        if line.contains(')') {
            return Ok(SetContents {
                count,
                lines: section,
            });
        }
    }
    Err(malformed("list is not terminated"))
}

/// Encoder writing one zone block per merged set file.
#[derive(Debug, Clone, Copy)]
pub struct ZoneList {
    kind: ZoneKind,
}

impl ListEncoder for ZoneList {
    type Item = Path;

    fn encode(&mut self, out: &mut dyn Write, set: &Path, written: usize) -> Result<()> {
        // read fully first so a bad set leaves the zone file untouched
        let contents = read_set(set)?;
        let name = set
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if written > 0 {
            writeln!(out)?;
        }
        writeln!(out, "{}", name)?;
        writeln!(out, "{{")?;
        writeln!(out, "  type {};", self.kind.zone_type())?;
        writeln!(out, "  {} List<label>", self.kind.labels_entry())?;
        for line in &contents.lines {
            writeln!(out, "  {}", line)?;
        }
        writeln!(out, "  ;")?;
        if self.kind == ZoneKind::Face {
            writeln!(out, "  flipMap List<bool> {}{{0}};", contents.count)?;
        }
        writeln!(out, "}}")?;
        Ok(())
    }
}

/// A `cellZones` or `faceZones` file.
pub type ZoneFile = FoamFile<ZoneList>;

/// Create a zone file writer in the polyMesh directory `dir`.
pub fn zone_file(dir: impl Into<PathBuf>, kind: ZoneKind) -> ZoneFile {
    FoamFile::new(
        dir,
        "regIOobject",
        kind.object(),
        POLYMESH_LOCATION,
        ZoneList { kind },
    )
}

/// Append the set file at `path` to an open zone file.
pub fn merge_set(zone: &mut ZoneFile, path: &Path) -> Result<()> {
    log::debug!("merging {} into {}", path.display(), zone.object());
    zone.write(path)
}
