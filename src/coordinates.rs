//! Touch coordinates streamed while the user draws.
//!
//! The device prints `(x,y)` for every sampled touch, with whatever other
//! text it likes in between. Reads don't line up with those tokens, so the
//! extractor is pure and always rescans the whole buffer: a pair split over
//! two reads simply shows up once its closing paren has arrived.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::protocol::X_MIRROR;

/// A pair exactly as it came off the wire. Used as the identity for
/// deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawPair {
    pub x: u32,
    pub y: u32,
}

impl RawPair {
    pub fn mirrored(self, mirror: i64) -> CoordinatePair {
        CoordinatePair {
            x: mirror - self.x as i64,
            y: self.y as i64,
        }
    }
}

/// A pair in display orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatePair {
    pub x: i64,
    pub y: i64,
}

/// Unique pairs in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateStream {
    pairs: Vec<CoordinatePair>,
}

impl CoordinateStream {
    pub fn new() -> CoordinateStream {
        CoordinateStream { pairs: Vec::new() }
    }

    pub fn pairs(&self) -> &[CoordinatePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn xs(&self) -> impl Iterator<Item = i64> + '_ {
        self.pairs.iter().map(|p| p.x)
    }

    pub fn ys(&self) -> impl Iterator<Item = i64> + '_ {
        self.pairs.iter().map(|p| p.y)
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
    }
}

pub fn extract(buffer: &[u8]) -> CoordinateStream {
    extract_mirrored(buffer, X_MIRROR)
}

/// Like [`extract`] with a different mirror constant for x.
pub fn extract_mirrored(buffer: &[u8], mirror: i64) -> CoordinateStream {
    let mut seen = BTreeSet::new();
    let mut pairs = Vec::new();
    for raw in RawPairs::new(buffer) {
        if seen.insert(raw) {
            pairs.push(raw.mirrored(mirror));
        }
    }
    CoordinateStream { pairs }
}

/// Iterates every `(<digits>,<digits>)` token left to right, duplicates
/// included.
pub struct RawPairs<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RawPairs<'a> {
    pub fn new(data: &'a [u8]) -> RawPairs<'a> {
        RawPairs { data, pos: 0 }
    }
}

impl Iterator for RawPairs<'_> {
    type Item = RawPair;

    fn next(&mut self) -> Option<RawPair> {
        while self.pos < self.data.len() {
            let start = self.pos;
            if self.data[start] != b'(' {
                self.pos += 1;
                continue;
            }
            match match_pair(&self.data[start..]) {
                Some(Token { len, pair }) => {
                    self.pos = start + len;
                    match pair {
                        Some(raw) => return Some(raw),
                        None => log::warn!(
                            "skipping coordinate token at offset {start}: value out of range"
                        ),
                    }
                }
                None => self.pos = start + 1,
            }
        }
        None
    }
}

struct Token {
    len: usize,
    /// None when a digit group doesn't fit in u32
    pair: Option<RawPair>,
}

/// Matches `(<digits>,<digits>)` at the very start of `data`.
fn match_pair(data: &[u8]) -> Option<Token> {
    let mut i = 1;
    let x = digits(data, &mut i)?;
    if data.get(i) != Some(&b',') {
        return None;
    }
    i += 1;
    let y = digits(data, &mut i)?;
    if data.get(i) != Some(&b')') {
        return None;
    }
    i += 1;
    Some(Token {
        len: i,
        pair: x.zip(y).map(|(x, y)| RawPair { x, y }),
    })
}

/// Consumes a run of ASCII digits starting at `*i`. Outer None means no
/// digits at all, inner None means the run overflowed.
fn digits(data: &[u8], i: &mut usize) -> Option<Option<u32>> {
    let start = *i;
    let mut value = Some(0u32);
    while let Some(d) = data.get(*i).filter(|b| b.is_ascii_digit()) {
        value = value
            .and_then(|v| v.checked_mul(10))
            .and_then(|v| v.checked_add((d - b'0') as u32));
        *i += 1;
    }
    if *i == start { None } else { Some(value) }
}
