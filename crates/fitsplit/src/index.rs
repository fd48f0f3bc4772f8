//! Header/data segmentation of a whole FITS file.
//!
//! A [`FrameIndex`] is an ordered table of byte ranges covering the file with
//! no gaps or overlaps. Entries alternate by position: even entries are
//! header segments, odd entries are the data following each header.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::{debug, warn};

use crate::block::{is_header_end, is_header_start, read_block, KeywordMatch, BLOCK_SIZE};
use crate::error::{Error, PathContext, Result};

/// A half-open byte range `[start, stop)` of the original file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Segment {
    pub start: u64,
    pub stop: u64,
}

impl Segment {
    pub fn new(start: u64, stop: u64) -> Self {
        Segment { start, stop }
    }

    /// Length of the range in bytes.
    pub fn len(&self) -> u64 {
        self.stop.saturating_sub(self.start)
    }

    /// Returns `true` for a zero-length range (e.g. no data between two
    /// adjacent headers).
    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }
}

/// Role of a [`FrameIndex`] entry, determined by its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Header,
    Data,
}

impl SegmentKind {
    /// Even positions are headers, odd positions are data.
    pub fn at(position: usize) -> Self {
        if position % 2 == 0 {
            SegmentKind::Header
        } else {
            SegmentKind::Data
        }
    }
}

impl core::fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SegmentKind::Header => write!(f, "header"),
            SegmentKind::Data => write!(f, "data"),
        }
    }
}

/// Ordered header/data segment table for one file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameIndex {
    segments: Vec<Segment>,
}

impl FrameIndex {
    /// Scans `src` block by block and builds the segment table.
    ///
    /// Offsets are relative to the position of `src` when this is called.
    /// The whole input is consumed, since the trailing data segment ends at
    /// the total length.
    pub fn build<R: Read>(mut src: R, matching: KeywordMatch) -> Result<Self> {
        let mut index = FrameIndex::default();
        let mut block = [0u8; BLOCK_SIZE];
        let mut offset: u64 = 0;
        let mut pending_start: Option<u64> = None;

        // First pass: locate header segments, reserving a data slot after each.
        loop {
            let before = offset;
            let n = read_block(&mut src, &mut block)?;
            if n == 0 {
                break;
            }
            offset += n as u64;
            if n < BLOCK_SIZE {
                debug!(offset = before, len = n, "partial trailing block");
                continue;
            }

            if pending_start.is_none() && is_header_start(&block, matching) {
                debug!(offset = before, "header start");
                pending_start = Some(before);
            }

            if is_header_end(&block, matching) {
                let start = pending_start.take().unwrap_or_else(|| {
                    warn!(
                        offset = before,
                        "END block without SIMPLE/XTENSION; treating it as a one-block header"
                    );
                    before
                });
                debug!(start, stop = offset, "header end");
                index.append(Segment::new(start, offset));
                index.append(Segment::default());
            }
        }

        if let Some(start) = pending_start {
            warn!(
                offset = start,
                "header is not terminated before end of file; keeping it as data"
            );
        }

        if index.is_empty() {
            return Err(Error::NoHeader);
        }

        if index.segments[0].start != 0 {
            warn!(
                bytes = index.segments[0].start,
                "bytes before the first header are kept with header 0"
            );
            index.segments[0].start = 0;
        }

        // Second pass: each data slot spans from its header's stop to the next
        // header's start, or to the end of the input for the last one.
        for i in (2..index.segments.len()).step_by(2) {
            let previous_stop = index.segments[i - 2].stop;
            let next_start = index.segments[i].start;
            index.segments[i - 1] = Segment::new(previous_stop, next_start);
        }
        let last = index.segments.len() - 1;
        index.segments[last] = Segment::new(index.segments[last - 1].stop, offset);

        Ok(index)
    }

    /// Opens `path` and builds its segment table.
    pub fn from_file(path: &Path, matching: KeywordMatch) -> Result<Self> {
        let file = File::open(path).with_path(path)?;
        Self::build(BufReader::new(file), matching).map_err(|e| match e {
            Error::Io(source) => Error::File {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Appends a segment at the end of the table.
    pub fn append(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Iterates over `(kind, segment)` pairs in file order.
    pub fn iter(&self) -> impl Iterator<Item = (SegmentKind, Segment)> + '_ {
        self.segments
            .iter()
            .enumerate()
            .map(|(i, s)| (SegmentKind::at(i), *s))
    }

    /// Total number of bytes covered, i.e. the last entry's stop.
    pub fn total_len(&self) -> u64 {
        self.segments.last().map(|s| s.stop).unwrap_or(0)
    }

    /// Checks the structural invariants against a file of `file_len` bytes:
    /// even entry count, contiguous entries starting at 0, block-aligned
    /// headers, and coverage up to `file_len`.
    pub fn validate(&self, file_len: u64) -> core::result::Result<(), String> {
        if self.segments.len() % 2 != 0 {
            return Err(format!("odd number of entries: {}", self.segments.len()));
        }
        match self.segments.first() {
            Some(first) if first.start != 0 => {
                return Err(format!("first entry starts at {}", first.start));
            }
            _ => {}
        }
        for (i, pair) in self.segments.windows(2).enumerate() {
            if pair[1].start != pair[0].stop {
                return Err(format!(
                    "entry {} starts at {} but entry {} stops at {}",
                    i + 1,
                    pair[1].start,
                    i,
                    pair[0].stop
                ));
            }
        }
        for (i, (kind, segment)) in self.iter().enumerate() {
            if segment.stop < segment.start {
                return Err(format!("entry {i} is reversed"));
            }
            if kind == SegmentKind::Header && segment.len() % BLOCK_SIZE as u64 != 0 {
                return Err(format!(
                    "header entry {i} is {} bytes, not a multiple of {BLOCK_SIZE}",
                    segment.len()
                ));
            }
        }
        if self.total_len() != file_len {
            return Err(format!(
                "entries cover {} bytes, file has {file_len}",
                self.total_len()
            ));
        }
        Ok(())
    }
}
