//! Alternative search terms for the empty-results state.
//!
//! Failed or empty searches never show a blank screen; they offer a handful
//! of known-good terms to try instead.

use rand::seq::IndexedRandom;

/// Terms that reliably return results, used to seed empty-state suggestions.
const POPULAR_TERMS: &[&str] = &[
    "nature", "abstract", "minimal", "space", "city", "ocean", "mountains", "sunset", "dark",
    "anime",
];

/// Pick up to `count` suggested terms, excluding whatever the user already
/// searched for. Sampling is random so repeated dead-end searches do not show
/// the same three suggestions every time.
pub fn alternatives(searched: &str, count: usize) -> Vec<String> {
    let searched = searched.trim().to_lowercase();
    let candidates: Vec<&&str> = POPULAR_TERMS
        .iter()
        .filter(|term| **term != searched)
        .collect();
    candidates
        .choose_multiple(&mut rand::rng(), count)
        .map(|term| (**term).to_owned())
        .collect()
}
