//! Fixed-size FITS blocks and header-boundary detection.

use std::io::{ErrorKind, Read};

/// FITS block size in bytes (each logical record is one block).
pub const BLOCK_SIZE: usize = 2880;

/// FITS card (keyword record) size in bytes.
pub const CARD_SIZE: usize = 80;

/// Number of cards that fit in a single block.
pub const CARDS_PER_BLOCK: usize = BLOCK_SIZE / CARD_SIZE;

/// Width of the keyword field at the start of every card.
pub const KEYWORD_SIZE: usize = 8;

/// Padding byte used for header blocks (ASCII space).
pub const HEADER_PAD_BYTE: u8 = 0x20;

/// How a key is compared against the keyword field of each card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordMatch {
    /// The card starts with the key. `END` also matches `ENDTIME`.
    #[default]
    Prefix,
    /// The 8-byte keyword field equals the key padded with spaces.
    Exact,
}

/// Reads up to one block from `src`, retrying short reads until the block is
/// full or the source is exhausted.
///
/// Returns the number of bytes placed at the start of `dest`: `BLOCK_SIZE`
/// for a full block, less for the final partial block, and 0 at end of input.
pub fn read_block<R: Read>(src: &mut R, dest: &mut [u8; BLOCK_SIZE]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < BLOCK_SIZE {
        match src.read(&mut dest[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn card_matches(card: &[u8], key: &[u8], matching: KeywordMatch) -> bool {
    if card.len() < key.len() || &card[..key.len()] != key {
        return false;
    }
    match matching {
        KeywordMatch::Prefix => true,
        KeywordMatch::Exact => {
            key.len() <= KEYWORD_SIZE
                && card[key.len()..KEYWORD_SIZE]
                    .iter()
                    .all(|&b| b == HEADER_PAD_BYTE)
        }
    }
}

/// Returns `true` if any of the 80-byte card slots in `block` carries `key`.
///
/// Only whole cards are inspected; a trailing fragment shorter than
/// `CARD_SIZE` is ignored.
pub fn has_keyword(block: &[u8], key: &[u8], matching: KeywordMatch) -> bool {
    block
        .chunks_exact(CARD_SIZE)
        .take(CARDS_PER_BLOCK)
        .any(|card| card_matches(card, key, matching))
}

/// Returns `true` if `block` is the first block of a new HDU, i.e. it carries
/// `SIMPLE` (primary header) or `XTENSION` (extension header).
pub fn is_header_start(block: &[u8], matching: KeywordMatch) -> bool {
    has_keyword(block, b"SIMPLE", matching) || has_keyword(block, b"XTENSION", matching)
}

/// Returns `true` if `block` terminates a header: it carries `END` and its
/// last byte is blank fill.
pub fn is_header_end(block: &[u8], matching: KeywordMatch) -> bool {
    has_keyword(block, b"END", matching) && block.last() == Some(&HEADER_PAD_BYTE)
}
