//! Lossless splitting of FITS files into header and data parts.
//!
//! [`split_file`] scans a file in 2880-byte blocks, builds a [`FrameIndex`]
//! of alternating header and data segments, writes every non-empty segment
//! to a numbered part file, and records the parts in a map file.
//! [`combine_map`] reads a map file back and concatenates its parts to
//! reproduce the original bytes.

pub mod block;
pub mod combine;
pub mod config;
pub mod error;
pub mod index;
pub mod map;
pub mod naming;
pub mod split;

pub use block::{KeywordMatch, BLOCK_SIZE, CARDS_PER_BLOCK, CARD_SIZE};
pub use combine::{combine_map, CombineReport};
pub use config::Config;
pub use error::{Error, Result};
pub use index::{FrameIndex, Segment, SegmentKind};
pub use map::{MapEntry, PartMap};
pub use split::{split_file, PartRecord, SplitReport};
