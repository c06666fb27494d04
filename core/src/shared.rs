use crate::index::{InvertedIndex, SearchResult};
use crate::lock::ReadWriteLock;
use crate::output;
use anyhow::Result;
use std::path::Path;

/// Thread-safe façade over [`InvertedIndex`].
///
/// Every mutation holds the write lock for its full duration, every
/// read-only operation the read lock for its full duration, so a
/// search or serialization observes one consistent snapshot even
/// while merges run concurrently.
#[derive(Default)]
pub struct SharedIndex {
    inner: ReadWriteLock<InvertedIndex>,
}

impl SharedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, word: &str, path: &str, position: usize) {
        self.inner.write().add(word, path, position);
    }

    pub fn add_all(&self, words: &[String], path: &str, start: usize) {
        self.inner.write().add_all(words, path, start);
    }

    pub fn merge(&self, other: InvertedIndex) {
        self.inner.write().merge(other);
    }

    pub fn contains(&self, word: &str) -> bool {
        self.inner.read().contains(word)
    }

    pub fn word_count(&self) -> usize {
        self.inner.read().word_count()
    }

    pub fn location_count(&self, word: &str) -> usize {
        self.inner.read().location_count(word)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn exact_search(&self, words: &[String]) -> Vec<SearchResult> {
        self.inner.read().exact_search(words)
    }

    pub fn partial_search(&self, words: &[String]) -> Vec<SearchResult> {
        self.inner.read().partial_search(words)
    }

    /// Writes the index snapshot as nested JSON.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        output::write_index(&self.inner.read(), path)
    }

    pub fn to_json(&self) -> Result<String> {
        output::index_to_string(&self.inner.read())
    }

    pub fn render(&self) -> String {
        self.inner.read().to_string()
    }

    pub fn into_inner(self) -> InvertedIndex {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn concurrent_merges_equal_sequential_replay() {
        let shared = Arc::new(SharedIndex::new());

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let path = format!("doc{n}.html");
                    let mut local = InvertedIndex::new();
                    local.add("shared", &path, 1);
                    local.add(&format!("word{n}"), &path, 2);
                    shared.merge(local);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut replayed = InvertedIndex::new();
        for n in 0..8 {
            let path = format!("doc{n}.html");
            replayed.add("shared", &path, 1);
            replayed.add(&format!("word{n}"), &path, 2);
        }

        let shared = Arc::try_unwrap(shared).ok().unwrap().into_inner();
        assert_eq!(shared, replayed);
    }
}
