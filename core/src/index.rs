use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Bound;

/// Word -> document -> 1-based positions, every level key-ordered.
///
/// The ordering is load-bearing: serialization is deterministic and
/// prefix search walks a contiguous key range. A word key exists iff
/// it has at least one document with at least one position.
pub type PostingMap = BTreeMap<String, BTreeMap<String, BTreeSet<usize>>>;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    index: PostingMap,
}

/// All matches for one query within one document. `frequency` sums the
/// occurrence counts of every matched word, `position` is the smallest
/// position any matched word occurs at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "where")]
    pub path: String,
    #[serde(rename = "count")]
    pub frequency: usize,
    #[serde(rename = "index")]
    pub position: usize,
}

impl Ord for SearchResult {
    /// Descending frequency, then ascending position, then ascending
    /// case-insensitive path. The raw path breaks the remaining tie so
    /// the order is total and consistent with `Eq`.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .frequency
            .cmp(&self.frequency)
            .then_with(|| self.position.cmp(&other.position))
            .then_with(|| self.path.to_lowercase().cmp(&other.path.to_lowercase()))
            .then_with(|| self.path.cmp(&other.path))
    }
}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `word` occurs in `path` at `position`.
    pub fn add(&mut self, word: &str, path: &str, position: usize) {
        self.index
            .entry(word.to_string())
            .or_default()
            .entry(path.to_string())
            .or_default()
            .insert(position);
    }

    /// Adds every word in order with strictly increasing positions
    /// starting at `start`.
    pub fn add_all(&mut self, words: &[String], path: &str, start: usize) {
        for (offset, word) in words.iter().enumerate() {
            self.add(word, path, start + offset);
        }
    }

    /// Unions another complete index into this one. Words present only
    /// in `other` are adopted wholesale; overlapping (word, document)
    /// pairs union their posting sets. Equivalent to replaying every
    /// `add` that built `other`.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (word, docs) in other.index {
            match self.index.entry(word) {
                Entry::Vacant(slot) => {
                    slot.insert(docs);
                }
                Entry::Occupied(mut slot) => {
                    let mine = slot.get_mut();
                    for (path, positions) in docs {
                        match mine.entry(path) {
                            Entry::Vacant(slot) => {
                                slot.insert(positions);
                            }
                            Entry::Occupied(mut slot) => {
                                slot.get_mut().extend(positions);
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Number of distinct words.
    pub fn word_count(&self) -> usize {
        self.index.len()
    }

    /// Number of documents a word occurs in, zero if absent.
    pub fn location_count(&self, word: &str) -> usize {
        self.index.get(word).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn postings(&self) -> &PostingMap {
        &self.index
    }

    /// Ranked results for the query words matched as exact index keys.
    /// Words absent from the index contribute nothing; an all-absent
    /// query yields an empty list, indistinguishable from no matches.
    pub fn exact_search(&self, words: &[String]) -> Vec<SearchResult> {
        let mut scratch: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for word in distinct(words) {
            if let Some(docs) = self.index.get(word) {
                fold_postings(docs, &mut scratch);
            }
        }
        into_ranked(scratch)
    }

    /// Ranked results for every index key having a query word as a
    /// prefix. Scans the key range starting at each word's lower bound
    /// and stops at the first non-matching key, so a query never walks
    /// the whole index.
    pub fn partial_search(&self, words: &[String]) -> Vec<SearchResult> {
        let mut scratch: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for word in distinct(words) {
            let from = (Bound::Included(word), Bound::Unbounded);
            for (key, docs) in self.index.range::<str, _>(from) {
                if !key.starts_with(word) {
                    break;
                }
                fold_postings(docs, &mut scratch);
            }
        }
        into_ranked(scratch)
    }
}

impl fmt::Display for InvertedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (word, docs) in &self.index {
            writeln!(f, "{word}:")?;
            for (path, positions) in docs {
                writeln!(f, "\t{path}: {positions:?}")?;
            }
        }
        Ok(())
    }
}

fn distinct(words: &[String]) -> BTreeSet<&str> {
    words.iter().map(String::as_str).collect()
}

/// Folds one key's postings into the per-document accumulators:
/// frequencies sum, positions keep the minimum.
fn fold_postings<'a>(
    docs: &'a BTreeMap<String, BTreeSet<usize>>,
    scratch: &mut BTreeMap<&'a str, (usize, usize)>,
) {
    for (path, positions) in docs {
        // Invariant: posting sets are never empty.
        let Some(&first) = positions.first() else {
            continue;
        };
        let entry = scratch.entry(path.as_str()).or_insert((0, first));
        entry.0 += positions.len();
        if first < entry.1 {
            entry.1 = first;
        }
    }
}

fn into_ranked(scratch: BTreeMap<&str, (usize, usize)>) -> Vec<SearchResult> {
    let mut results: Vec<SearchResult> = scratch
        .into_iter()
        .map(|(path, (frequency, position))| SearchResult {
            path: path.to_string(),
            frequency,
            position,
        })
        .collect();
    results.sort();
    results
}
