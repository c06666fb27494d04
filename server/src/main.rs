use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;
use webindex_core::builder::{build_index_threaded, traverse};
use webindex_core::crawler::{HttpFetcher, WebCrawler};
use webindex_core::{SharedIndex, WorkQueue, DEFAULT_CRAWL_LIMIT, DEFAULT_THREADS};
use webindex_server::build_app;

#[derive(Parser)]
struct Args {
    /// Root directory of HTML files to index at startup
    #[arg(long)]
    path: Option<PathBuf>,
    /// Seed URL to crawl at startup
    #[arg(long)]
    url: Option<String>,
    /// Maximum pages to admit during the crawl
    #[arg(long, default_value_t = DEFAULT_CRAWL_LIMIT)]
    limit: usize,
    /// Worker threads for the build/crawl phase
    #[arg(long, default_value_t = DEFAULT_THREADS)]
    threads: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    // The index is rebuilt on every start; the blocking crawl and
    // build run to completion before the runtime comes up.
    let index = Arc::new(SharedIndex::new());
    let queue = Arc::new(WorkQueue::new(args.threads));

    if let Some(seed) = &args.url {
        match Url::parse(seed) {
            Ok(seed) => {
                let fetcher = Arc::new(HttpFetcher::new()?);
                let crawler = WebCrawler::new(queue.clone(), index.clone(), fetcher);
                tracing::info!(%seed, limit = args.limit, "crawling");
                crawler.crawl(seed, args.limit);
            }
            Err(error) => tracing::error!(%error, %seed, "invalid seed url, skipping crawl"),
        }
    }
    if let Some(root) = &args.path {
        let paths = traverse(root);
        tracing::info!(files = paths.len(), "building index");
        build_index_threaded(&paths, &index, &queue);
    }
    queue.shutdown();
    tracing::info!(words = index.word_count(), "index ready");

    let app = build_app(index);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "server listening");
        axum::serve(listener, app).await?;
        Ok(())
    })
}
