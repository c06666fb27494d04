use crate::index::{InvertedIndex, SearchResult};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Ranked results per normalized query, ordered by the query string.
pub type ResultMap = BTreeMap<String, Vec<SearchResult>>;

#[derive(Serialize)]
struct QueryEntry<'a> {
    queries: &'a str,
    results: &'a [SearchResult],
}

/// Writes the index as a nested JSON object:
/// `{ "<word>": { "<path>": [pos, ...], ... }, ... }` with words,
/// paths, and positions ascending. An empty index writes `{}`.
pub fn write_index(index: &InvertedIndex, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, index)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn index_to_string(index: &InvertedIndex) -> Result<String> {
    Ok(serde_json::to_string_pretty(index)?)
}

/// Writes query results as a JSON array of
/// `{ "queries": "...", "results": [ { "where", "count", "index" } ] }`
/// entries, ascending by normalized query. A matchless query keeps an
/// empty `results` array.
pub fn write_results(map: &ResultMap, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &entries(map))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

pub fn results_to_string(map: &ResultMap) -> Result<String> {
    Ok(serde_json::to_string_pretty(&entries(map))?)
}

fn entries(map: &ResultMap) -> Vec<QueryEntry<'_>> {
    map.iter()
        .map(|(queries, results)| QueryEntry {
            queries: queries.as_str(),
            results: results.as_slice(),
        })
        .collect()
}
