//! The OpenFOAM counted-list file.
//!
//! Every polyMesh file shares one shape:
//!
//! ```text
//! FoamFile
//! {
//!     version     2.0;
//!     format      ascii;
//!     class       labelList;
//!     location    "constant/polyMesh";
//!     object      owner;
//! }
//!
//! 3
//! (
//!  0 0 1
//! )
//! ```
//!
//! The item count is not known until the file is closed, so a fixed-width
//! slot is reserved after the header and patched on close. What an item
//! looks like is decided by the file's [`ListEncoder`].

use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::{ExportError, Result};

/// Characters reserved for the item count.
pub const COUNT_WIDTH: usize = 10;

/// Default `location` header entry.
pub const POLYMESH_LOCATION: &str = "constant/polyMesh";

/// Encodes the items of one kind of counted-list file.
pub trait ListEncoder {
    /// The item type written by this encoder.
    type Item: ?Sized;

    /// Write one item. `written` is the number of items already in the list.
    fn encode(&mut self, out: &mut dyn Write, item: &Self::Item, written: usize) -> Result<()>;

    /// Called after the opening delimiter has been written.
    fn before_list(&mut self, _out: &mut dyn Write) -> Result<()> {
        Ok(())
    }

    /// Called before the closing delimiter is written.
    fn after_list(&mut self, _out: &mut dyn Write, _count: usize) -> Result<()> {
        Ok(())
    }
}

/// A counted-list output file.
///
/// Lifecycle: created closed, [`open`](Self::open) writes the header and a
/// placeholder count, items are appended, [`close`](Self::close) patches
/// the count and writes the closing delimiter. Dropping an open file
/// closes it, so a file is well-formed even if the export fails midway.
#[derive(Debug)]
pub struct FoamFile<E: ListEncoder> {
    dir: PathBuf,
    class: String,
    object: String,
    location: String,
    writer: Option<BufWriter<File>>,
    count_pos: Option<u64>,
    num_items: usize,
    encoder: E,
}

impl<E: ListEncoder> FoamFile<E> {
    /// Describe a file `dir/object` with the given header class and location.
    pub fn new(
        dir: impl Into<PathBuf>,
        class: impl Into<String>,
        object: impl Into<String>,
        location: impl Into<String>,
        encoder: E,
    ) -> Self {
        Self {
            dir: dir.into(),
            class: class.into(),
            object: object.into(),
            location: location.into(),
            writer: None,
            count_pos: None,
            num_items: 0,
            encoder,
        }
    }

    /// Open the file under its current object name.
    ///
    /// Any previously open file is closed first and the item counter reset.
    pub fn open(&mut self) -> Result<()> {
        self.close()?;
        self.num_items = 0;
        if self.object.is_empty() {
            return Err(ExportError::NotOpen {
                object: format!("unnamed {}", self.class),
            });
        }

        let path = self.path();
        let file = File::create(&path).map_err(|source| ExportError::CreateFile {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        write_header(&mut writer, &self.class, &self.location, &self.object)?;
        let pos = writer.stream_position()?;
        write!(writer, "{:<width$}\n(\n", 0, width = COUNT_WIDTH)?;
        self.encoder.before_list(&mut writer)?;

        self.count_pos = Some(pos);
        self.writer = Some(writer);
        Ok(())
    }

    /// Open the file under a new object name.
    pub fn open_as(&mut self, object: impl Into<String>) -> Result<()> {
        self.close()?;
        self.object = object.into();
        self.open()
    }

    /// Append one item.
    pub fn write(&mut self, item: &E::Item) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| ExportError::NotOpen {
            object: self.object.clone(),
        })?;
        self.encoder.encode(writer, item, self.num_items)?;
        self.num_items += 1;
        Ok(())
    }

    /// Advance the item counter without writing, returning the new count.
    pub fn increment(&mut self, n: usize) -> usize {
        self.num_items += n;
        self.num_items
    }

    /// Patch the item count, write the closing delimiter and release the
    /// file. Closing a closed file does nothing.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        self.encoder.after_list(&mut writer, self.num_items)?;
        if let Some(pos) = self.count_pos.take() {
            let end = writer.stream_position()?;
            writer.seek(SeekFrom::Start(pos))?;
            write!(writer, "{:<width$}", self.num_items, width = COUNT_WIDTH)?;
            writer.seek(SeekFrom::Start(end))?;
        }
        writer.write_all(b")\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Whether the file is open.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Number of items written since the last open.
    pub fn num_items(&self) -> usize {
        self.num_items
    }

    /// The object (file) name.
    pub fn object(&self) -> &str {
        &self.object
    }

    /// The header class.
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Full path of the file on disk.
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.object)
    }

    /// Directory holding the file.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The item encoder.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }
}

impl<E: ListEncoder> Drop for FoamFile<E> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("failed to close {}: {}", self.path().display(), e);
        }
    }
}

fn write_header(out: &mut impl Write, class: &str, location: &str, object: &str) -> Result<()> {
    writeln!(out, "FoamFile")?;
    writeln!(out, "{{")?;
    writeln!(out, "    version     2.0;")?;
    writeln!(out, "    format      ascii;")?;
    writeln!(out, "    class       {};", class)?;
    writeln!(out, "    location    \"{}\";", location)?;
    writeln!(out, "    object      {};", object)?;
    writeln!(out, "}}")?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One word per line.
    struct Words;

    impl ListEncoder for Words {
        type Item = str;

        fn encode(&mut self, out: &mut dyn Write, item: &str, _written: usize) -> Result<()> {
            writeln!(out, "{}", item)?;
            Ok(())
        }
    }

    fn count_of(text: &str) -> usize {
        text.lines()
            .find_map(|l| l.trim().parse().ok())
            .expect("no count line")
    }

    #[test]
    fn test_header_and_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = FoamFile::new(dir.path(), "wordList", "words", POLYMESH_LOCATION, Words);
        file.open().unwrap();
        file.close().unwrap();

        let text = std::fs::read_to_string(dir.path().join("words")).unwrap();
        let expected = "FoamFile\n{\n    version     2.0;\n    format      ascii;\n    \
class       wordList;\n    location    \"constant/polyMesh\";\n    object      words;\n}\n\n\
0         \n(\n)\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_count_is_patched() {
        let dir = tempfile::tempdir().unwrap();
        for n in [0usize, 1, 10, 10_000] {
            let mut file = FoamFile::new(dir.path(), "wordList", "words", POLYMESH_LOCATION, Words);
            file.open().unwrap();
            for _ in 0..n {
                file.write("w").unwrap();
            }
            file.close().unwrap();
            let text = std::fs::read_to_string(file.path()).unwrap();
            assert_eq!(count_of(&text), n);
            assert_eq!(text.lines().filter(|l| *l == "w").count(), n);
            assert!(text.ends_with(")\n"));
        }
    }

    #[test]
    fn test_close_is_idempotent_and_drop_closes() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut file = FoamFile::new(dir.path(), "wordList", "words", POLYMESH_LOCATION, Words);
            file.open().unwrap();
            file.write("a").unwrap();
            file.write("b").unwrap();
            file.close().unwrap();
            file.close().unwrap();
            assert!(!file.is_open());

            file.open_as("more").unwrap();
            file.write("c").unwrap();
        }
        let words = std::fs::read_to_string(dir.path().join("words")).unwrap();
        assert_eq!(count_of(&words), 2);
        assert_eq!(words.matches(")\n").count(), 1);
        let more = std::fs::read_to_string(dir.path().join("more")).unwrap();
        assert_eq!(count_of(&more), 1);
        assert!(more.ends_with("c\n)\n"));
    }

    #[test]
    fn test_write_requires_open() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = FoamFile::new(dir.path(), "wordList", "words", POLYMESH_LOCATION, Words);
        assert!(matches!(file.write("x"), Err(ExportError::NotOpen { .. })));
        assert_eq!(file.increment(3), 3);
    }

    #[test]
    fn test_open_fails_in_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = FoamFile::new(
            dir.path().join("nope"),
            "wordList",
            "words",
            POLYMESH_LOCATION,
            Words,
        );
        assert!(matches!(file.open(), Err(ExportError::CreateFile { .. })));
    }
}
