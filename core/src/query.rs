use crate::index::InvertedIndex;
use crate::output::{self, ResultMap};
use crate::queue::WorkQueue;
use crate::shared::SharedIndex;
use crate::tokenizer::parse_words;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// A query line's distinct words, sorted ascending. Joined with single
/// spaces they form the normalized query key, which deduplicates
/// queries across the file.
pub fn normalize_query(line: &str) -> Vec<String> {
    let distinct: BTreeSet<String> = parse_words(line).into_iter().collect();
    distinct.into_iter().collect()
}

/// Runs a query file against a plain index on the calling thread.
pub struct QueryEngine<'a> {
    index: &'a InvertedIndex,
    results: ResultMap,
}

impl<'a> QueryEngine<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Self {
            index,
            results: ResultMap::new(),
        }
    }

    /// Searches one line per entry; empty normalizations are skipped
    /// and a repeated normalized query overwrites its earlier results.
    pub fn parse_file(&mut self, path: &Path, exact: bool) -> Result<()> {
        let file = File::open(path)
            .with_context(|| format!("opening query file {}", path.display()))?;
        for line in BufReader::new(file).lines() {
            let line = line?;
            let words = normalize_query(&line);
            if words.is_empty() {
                continue;
            }
            let ranked = if exact {
                self.index.exact_search(&words)
            } else {
                self.index.partial_search(&words)
            };
            self.results.insert(words.join(" "), ranked);
        }
        Ok(())
    }

    pub fn results(&self) -> &ResultMap {
        &self.results
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        output::write_results(&self.results, path)
    }
}

/// Runs a query file with one pool task per line. The result map has
/// its own critical section; whole-map exclusion is enough because
/// insertion is cheap next to the search it stores.
pub struct ThreadedQueryEngine {
    index: Arc<SharedIndex>,
    queue: Arc<WorkQueue>,
    results: Arc<Mutex<ResultMap>>,
}

impl ThreadedQueryEngine {
    pub fn new(index: Arc<SharedIndex>, queue: Arc<WorkQueue>) -> Self {
        Self {
            index,
            queue,
            results: Arc::new(Mutex::new(ResultMap::new())),
        }
    }

    /// Submits every line and blocks until all of them have been
    /// searched and recorded.
    pub fn parse_file(&self, path: &Path, exact: bool) -> Result<()> {
        let file = File::open(path)
            .with_context(|| format!("opening query file {}", path.display()))?;
        let mut read_error = None;
        for line in BufReader::new(file).lines() {
            let line = match line {
                Ok(line) => line,
                Err(error) => {
                    // Already-submitted lines still get awaited below.
                    read_error = Some(error);
                    break;
                }
            };
            let index = self.index.clone();
            let results = self.results.clone();
            self.queue.execute(move || {
                let words = normalize_query(&line);
                if words.is_empty() {
                    return;
                }
                let ranked = if exact {
                    index.exact_search(&words)
                } else {
                    index.partial_search(&words)
                };
                results.lock().insert(words.join(" "), ranked);
            });
        }
        self.queue.finish();
        match read_error {
            Some(error) => Err(error).context("reading query file"),
            None => Ok(()),
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        output::write_results(&self.results.lock(), path)
    }

    pub fn to_json(&self) -> Result<String> {
        output::results_to_string(&self.results.lock())
    }
}
