//! The textual part map: one `<offset>:<part-file-name>` line per written
//! part, in reconstruction order.
//!
//! Only the order and the names matter when reading a map back. Offsets are
//! kept when they parse and otherwise ignored.

use std::fs;
use std::path::Path;

use crate::error::{Error, PathContext, Result};
use crate::naming::is_plain_file_name;

/// One line of a map file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapEntry {
    /// Start offset of the part in the original file. Informational only;
    /// `None` when the map text did not carry a decimal number.
    pub offset: Option<u64>,
    /// Part file name, relative to the map file's directory.
    pub part: String,
}

/// Ordered list of parts making up one original file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PartMap {
    entries: Vec<MapEntry>,
}

impl PartMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, offset: u64, part: impl Into<String>) {
        self.entries.push(MapEntry {
            offset: Some(offset),
            part: part.into(),
        });
    }

    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses map text as whitespace-separated tokens. The part name of a
    /// token is whatever follows its last colon and must be a plain file name.
    pub fn parse(text: &str) -> Result<Self> {
        let mut map = PartMap::new();
        for (i, line) in text.lines().enumerate() {
            for token in line.split_whitespace() {
                let (offset, part) = match token.rsplit_once(':') {
                    Some((offset, part)) => (offset.parse().ok(), part),
                    None => (None, token),
                };
                if !is_plain_file_name(part) {
                    return Err(Error::InvalidMapEntry {
                        line: i + 1,
                        text: String::from(token),
                    });
                }
                map.entries.push(MapEntry {
                    offset,
                    part: String::from(part),
                });
            }
        }
        Ok(map)
    }

    /// Reads and parses the map file at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_path(path)?;
        Self::parse(&text)
    }

    /// Writes the map to `path`, replacing any existing file.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string()).with_path(path)
    }
}

impl core::fmt::Display for PartMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for entry in &self.entries {
            match entry.offset {
                Some(offset) => writeln!(f, "{}:{}", offset, entry.part)?,
                None => writeln!(f, ":{}", entry.part)?,
            }
        }
        Ok(())
    }
}
