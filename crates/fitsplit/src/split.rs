//! Writing each segment of a FITS file to its own part file.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::block::BLOCK_SIZE;
use crate::config::Config;
use crate::error::{Error, PathContext, Result};
use crate::index::{FrameIndex, Segment, SegmentKind};
use crate::map::PartMap;
use crate::naming::{ensure_distinct_from_source, map_file_name, part_file_name, part_stem};

/// Outcome for one entry of the frame index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRecord {
    /// Part number; equal to the entry's position in the index.
    pub number: usize,
    pub kind: SegmentKind,
    pub segment: Segment,
    /// Path of the written part, or `None` for a skipped empty segment.
    pub path: Option<PathBuf>,
}

/// Everything produced by splitting one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    pub source: PathBuf,
    pub map_path: PathBuf,
    pub parts: Vec<PartRecord>,
}

impl SplitReport {
    /// Iterates over the parts that were actually written.
    pub fn written(&self) -> impl Iterator<Item = &PartRecord> {
        self.parts.iter().filter(|p| p.path.is_some())
    }
}

/// Copies `segment` from `src` into `dest`, one block at a time.
///
/// I/O errors carry the path of the side that failed. Fails with
/// [`Error::UnexpectedEof`] if `src` ends before `segment.stop`.
pub fn copy_segment<R, W>(
    src: &mut R,
    src_path: &Path,
    dest: &mut W,
    dest_path: &Path,
    segment: Segment,
) -> Result<u64>
where
    R: Read + Seek,
    W: Write,
{
    src.seek(SeekFrom::Start(segment.start)).with_path(src_path)?;
    let mut block = [0u8; BLOCK_SIZE];
    let mut position = segment.start;
    while position < segment.stop {
        let want = (segment.stop - position).min(BLOCK_SIZE as u64) as usize;
        let n = match src.read(&mut block[..want]) {
            Ok(0) => return Err(Error::UnexpectedEof),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Error::File {
                    path: src_path.to_path_buf(),
                    source,
                })
            }
        };
        dest.write_all(&block[..n]).with_path(dest_path)?;
        position += n as u64;
    }
    Ok(position - segment.start)
}

fn write_part(input: &mut File, source: &Path, dest: &Path, segment: Segment) -> Result<()> {
    let mut out = File::create(dest).with_path(dest)?;
    copy_segment(input, source, &mut out, dest, segment)?;
    out.flush().with_path(dest)
}

/// Splits the FITS file at `source` into part files plus a map file, all
/// written to the configured output directory.
///
/// Part `N` holds entry `N` of the frame index. Empty entries consume a
/// number but produce neither a file nor a map line. Nothing is written if
/// any output would replace `source` itself. On error, files already written
/// are left in place.
pub fn split_file(source: &Path, config: &Config) -> Result<SplitReport> {
    let stem = part_stem(source)?;
    let index = FrameIndex::from_file(source, config.keyword_match)?;
    debug!(source = %source.display(), entries = index.len(), "built frame index");

    let map_path = config.output_path(&map_file_name(stem));
    let mut outputs: Vec<PathBuf> = index
        .iter()
        .enumerate()
        .filter(|(_, (_, segment))| !segment.is_empty())
        .map(|(number, _)| config.output_path(&part_file_name(stem, number)))
        .collect();
    outputs.push(map_path.clone());
    ensure_distinct_from_source(source, &outputs)?;

    let mut input = File::open(source).with_path(source)?;
    let mut map = PartMap::new();
    let mut parts = Vec::with_capacity(index.len());

    for (number, (kind, segment)) in index.iter().enumerate() {
        let name = part_file_name(stem, number);
        if segment.is_empty() {
            debug!(part = %name, offset = segment.start, "skipping empty segment");
            parts.push(PartRecord {
                number,
                kind,
                segment,
                path: None,
            });
            continue;
        }

        let dest = config.output_path(&name);
        write_part(&mut input, source, &dest, segment)?;
        info!(
            part = %dest.display(),
            %kind,
            start = segment.start,
            stop = segment.stop,
            "wrote part"
        );
        map.push(segment.start, name);
        parts.push(PartRecord {
            number,
            kind,
            segment,
            path: Some(dest),
        });
    }

    map.write(&map_path)?;
    info!(map = %map_path.display(), parts = map.len(), "wrote part map");

    Ok(SplitReport {
        source: source.to_path_buf(),
        map_path,
        parts,
    })
}
