use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;
use webindex_core::builder::{build_index, build_index_threaded, traverse};
use webindex_core::crawler::{HttpFetcher, WebCrawler};
use webindex_core::output;
use webindex_core::query::{QueryEngine, ThreadedQueryEngine};
use webindex_core::{InvertedIndex, SharedIndex, WorkQueue, DEFAULT_CRAWL_LIMIT, DEFAULT_THREADS};

#[derive(Parser)]
#[command(name = "webindex")]
#[command(about = "Build and query a word-location index over local or crawled HTML")]
struct Cli {
    /// Root directory of HTML files to index
    #[arg(long)]
    path: Option<PathBuf>,
    /// Seed URL to crawl; implies the multithreaded pipeline
    #[arg(long)]
    url: Option<String>,
    /// Maximum pages to admit during a crawl, seed included
    #[arg(long, default_value_t = DEFAULT_CRAWL_LIMIT)]
    limit: usize,
    /// Worker thread count; presence selects the multithreaded
    /// pipeline, zero falls back to the default
    #[arg(long)]
    threads: Option<usize>,
    /// Write the index snapshot as JSON to this file
    #[arg(long)]
    index: Option<PathBuf>,
    /// File of queries, one per line
    #[arg(long)]
    query: Option<PathBuf>,
    /// Use exact search instead of prefix search
    #[arg(long, default_value_t = false)]
    exact: bool,
    /// Write query results as JSON to this file
    #[arg(long)]
    results: Option<PathBuf>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    // Crawling needs the pool, so --url forces the threaded pipeline
    // even without --threads.
    if cli.threads.is_some() || cli.url.is_some() {
        run_threaded(cli)
    } else {
        run_single(cli)
    }
}

fn run_single(cli: Cli) -> Result<()> {
    let mut index = InvertedIndex::new();

    if let Some(root) = &cli.path {
        let paths = traverse(root);
        tracing::info!(files = paths.len(), "building index");
        build_index(&paths, &mut index);
    }

    if let Some(out) = &cli.index {
        if let Err(error) = output::write_index(&index, out) {
            tracing::error!(%error, "could not write index file");
        }
    }

    let mut engine = QueryEngine::new(&index);
    if let Some(file) = &cli.query {
        if let Err(error) = engine.parse_file(file, cli.exact) {
            tracing::error!(%error, "could not process query file");
        }
    }
    if let Some(out) = &cli.results {
        if let Err(error) = engine.write_to(out) {
            tracing::error!(%error, "could not write results file");
        }
    }

    Ok(())
}

fn run_threaded(cli: Cli) -> Result<()> {
    let queue = Arc::new(WorkQueue::new(cli.threads.unwrap_or(DEFAULT_THREADS)));
    let index = Arc::new(SharedIndex::new());

    if let Some(seed) = &cli.url {
        match Url::parse(seed) {
            Ok(seed) => {
                let fetcher = Arc::new(HttpFetcher::new()?);
                let crawler = WebCrawler::new(queue.clone(), index.clone(), fetcher);
                tracing::info!(%seed, limit = cli.limit, "crawling");
                crawler.crawl(seed, cli.limit);
            }
            Err(error) => tracing::error!(%error, %seed, "invalid seed url, skipping crawl"),
        }
    }

    if let Some(root) = &cli.path {
        let paths = traverse(root);
        tracing::info!(files = paths.len(), "building index");
        build_index_threaded(&paths, &index, &queue);
    }

    if let Some(out) = &cli.index {
        if let Err(error) = index.write_to(out) {
            tracing::error!(%error, "could not write index file");
        }
    }

    let engine = ThreadedQueryEngine::new(index.clone(), queue.clone());
    if let Some(file) = &cli.query {
        if let Err(error) = engine.parse_file(file, cli.exact) {
            tracing::error!(%error, "could not process query file");
        }
    }
    if let Some(out) = &cli.results {
        if let Err(error) = engine.write_to(out) {
            tracing::error!(%error, "could not write results file");
        }
    }

    queue.shutdown();
    Ok(())
}
