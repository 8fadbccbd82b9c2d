//! Fuzzy member path candidates.
//!
//! A flat target member `CustomerAddressId` may come from a nested source
//! path. The name is split into PascalCase chunks and every way of merging
//! adjacent chunks back together is a candidate path:
//!
//! ```text
//! mask 0b11  Customer.Address.Id
//! mask 0b10  CustomerAddress.Id
//! mask 0b01  Customer.AddressId
//! ```
//!
//! Bit `i` of the mask splits before chunk `i + 1`. Masks are enumerated
//! from `2^(n-1) - 1` down to `1`, so the path with the most segments comes
//! first and the first candidate that resolves wins. Mask `0` (the name
//! itself) is the exact match and is not produced here.

use mapforge_common::limits::MAX_FUZZY_MATCH_CHUNKS;

/// Split at every uppercase letter after the first character.
pub fn pascal_case_chunks(name: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    for (i, ch) in name.char_indices() {
        if i > 0 && ch.is_uppercase() {
            chunks.push(&name[start..i]);
            start = i;
        }
    }
    if start < name.len() {
        chunks.push(&name[start..]);
    }
    chunks
}

pub struct MemberPathCandidateBuilder;

impl MemberPathCandidateBuilder {
    /// Candidates for `name`, most segments first. Names with a single
    /// chunk or with more than `MAX_FUZZY_MATCH_CHUNKS` chunks yield none.
    pub fn build(name: &str) -> MemberPathCandidates<'_> {
        let chunks = pascal_case_chunks(name);
        let mask = if chunks.len() < 2 || chunks.len() > MAX_FUZZY_MATCH_CHUNKS {
            0
        } else {
            (1u32 << (chunks.len() - 1)) - 1
        };
        MemberPathCandidates { chunks, mask }
    }
}

pub struct MemberPathCandidates<'n> {
    chunks: Vec<&'n str>,
    /// Next mask to produce, `0` when exhausted.
    mask: u32,
}

impl MemberPathCandidates<'_> {
    pub fn chunks(&self) -> &[&str] {
        &self.chunks
    }
}

impl Iterator for MemberPathCandidates<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.mask == 0 {
            return None;
        }
        let mask = self.mask;
        self.mask -= 1;

        let mut path = Vec::new();
        let mut segment = String::from(self.chunks[0]);
        for (i, chunk) in self.chunks.iter().enumerate().skip(1) {
            if mask & (1 << (i - 1)) != 0 {
                path.push(std::mem::take(&mut segment));
            }
            segment.push_str(chunk);
        }
        path.push(segment);
        Some(path)
    }
}
