//! Block-reference ids
//!
//! Adding a block to a queue tags the line with a `^id` suffix so the row's
//! link can target it. Ids are 7 lowercase alphanumerics. The RNG is
//! injected so collision handling is testable with a seeded generator.

use std::collections::HashSet;

use rand::Rng;
use regex::escape;
use regex::Regex;

const BLOCK_ID_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const BLOCK_ID_LEN: usize = 7;

/// Generate a random block id.
pub fn block_hash<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..BLOCK_ID_LEN)
        .map(|_| BLOCK_ID_CHARS[rng.gen_range(0..BLOCK_ID_CHARS.len())] as char)
        .collect()
}

/// Generate a block id not present in `used`, retrying on collision.
pub fn unique_block_hash<R: Rng + ?Sized>(rng: &mut R, used: &HashSet<String>) -> String {
    loop {
        let id = block_hash(rng);
        if !used.contains(&id) {
            return id;
        }
    }
}

/// If `line` already ends with one of the known block ids, return that id.
pub fn find_block_id<'a>(line: &str, known_ids: &'a [String]) -> Option<&'a str> {
    for id in known_ids {
        let re = Regex::new(&format!(r"(?i)\^{}\s*$", escape(id))).ok()?;
        if re.is_match(line) {
            return Some(id.as_str());
        }
    }
    None
}

/// Append a block id marker to a line of note text.
pub fn tag_line_with_id(line: &str, id: &str) -> String {
    format!("{} ^{}", line, id)
}
