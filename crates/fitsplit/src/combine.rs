//! Reassembling an original file from its part map.

use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::block::BLOCK_SIZE;
use crate::config::Config;
use crate::error::{Error, PathContext, Result};
use crate::map::PartMap;
use crate::naming::{file_stem, map_directory};

/// Result of combining one map file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineReport {
    pub map_path: PathBuf,
    pub output: PathBuf,
    pub parts: usize,
    pub bytes: u64,
}

/// Concatenates the parts listed in the map at `map_path` into a single
/// output file named after the map with its extension removed.
///
/// Part names resolve against the map file's directory. Recorded offsets are
/// not checked; line order alone decides the output layout. On error, any
/// output already written is left in place.
pub fn combine_map(map_path: &Path, config: &Config) -> Result<CombineReport> {
    let stem = file_stem(map_path)?;
    let map = PartMap::read(map_path)?;
    if map.is_empty() {
        return Err(Error::EmptyMap(map_path.to_path_buf()));
    }

    let base = map_directory(map_path);
    let output = config.output_path(stem);
    let file = File::create(&output).with_path(&output)?;
    let mut writer = BufWriter::new(file);
    let mut bytes = 0u64;

    for entry in map.entries() {
        let part_path = base.join(&entry.part);
        let mut part = File::open(&part_path).with_path(&part_path)?;
        let copied = copy_part(&mut part, &part_path, &mut writer, &output)?;
        debug!(
            part = %part_path.display(),
            offset = ?entry.offset,
            bytes = copied,
            "appended part"
        );
        bytes += copied;
    }
    writer.flush().with_path(&output)?;
    info!(output = %output.display(), parts = map.len(), bytes, "combined parts");

    Ok(CombineReport {
        map_path: map_path.to_path_buf(),
        output,
        parts: map.len(),
        bytes,
    })
}

/// Copies all of `part` to `out`, attributing failures to the right path.
fn copy_part<W: Write>(
    part: &mut File,
    part_path: &Path,
    out: &mut W,
    out_path: &Path,
) -> Result<u64> {
    let mut buf = [0u8; BLOCK_SIZE];
    let mut total = 0u64;
    loop {
        let n = match part.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::File {
                    path: part_path.to_path_buf(),
                    source,
                })
            }
        };
        out.write_all(&buf[..n]).with_path(out_path)?;
        total += n as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, bytes: &[u8]) {
        std::fs::write(dir.join(name), bytes).unwrap();
    }

    #[test]
    fn combine_concatenates_in_map_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "x.part_0", b"AAA");
        write(dir.path(), "x.part_2", b"BB");
        write(dir.path(), "x.part_1", b"C");
        // Line order, not part number or offset, decides the layout.
        write(dir.path(), "x.part_map", b"0:x.part_0\n3:x.part_2\n5:x.part_1\n");

        let out = tempfile::tempdir().unwrap();
        let report = combine_map(
            &dir.path().join("x.part_map"),
            &Config::default().with_outdir(out.path()),
        )
        .unwrap();

        assert_eq!(report.output, out.path().join("x"));
        assert_eq!(report.parts, 3);
        assert_eq!(report.bytes, 6);
        assert_eq!(std::fs::read(&report.output).unwrap(), b"AAABBC");
    }

    #[test]
    fn combine_ignores_recorded_offsets() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "y.part_0", b"hello");
        write(dir.path(), "y.part_map", b"999:y.part_0\n");
        let report = combine_map(
            &dir.path().join("y.part_map"),
            &Config::default().with_outdir(dir.path()),
        )
        .unwrap();
        assert_eq!(std::fs::read(&report.output).unwrap(), b"hello");
    }

    #[test]
    fn combine_missing_part_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "z.part_0", b"abc");
        write(dir.path(), "z.part_map", b"0:z.part_0\n3:z.part_1\n");
        let result = combine_map(
            &dir.path().join("z.part_map"),
            &Config::default().with_outdir(dir.path()),
        );
        match result {
            Err(Error::File { path, .. }) => assert_eq!(path, dir.path().join("z.part_1")),
            other => panic!("Expected File error, got {:?}", other),
        }
        // Partial output stays on disk.
        assert_eq!(std::fs::read(dir.path().join("z")).unwrap(), b"abc");
    }

    #[test]
    fn combine_empty_map_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "e.part_map", b"\n");
        let result = combine_map(
            &dir.path().join("e.part_map"),
            &Config::default().with_outdir(dir.path()),
        );
        assert!(matches!(result, Err(Error::EmptyMap(_))));
        assert!(!dir.path().join("e").exists());
    }
}
