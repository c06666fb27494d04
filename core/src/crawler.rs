use crate::html::{list_links, strip_html};
use crate::index::InvertedIndex;
use crate::queue::WorkQueue;
use crate::shared::SharedIndex;
use crate::tokenizer::parse_words;
use anyhow::Result;
use parking_lot::Mutex;
use reqwest::blocking::Client;
use reqwest::header;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = "webindex-bot/0.1 (+https://example.com/bot)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(12);
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// The external fetch contract: raw HTML for a URL, or `None` when the
/// response is missing, failed, or not HTML.
pub trait Fetch: Send + Sync {
    fn fetch_html(&self, url: &Url) -> Option<String>;
}

/// Blocking HTTP fetcher. A fetch occupies its worker thread for the
/// full request duration; there is no timeout beyond the client's.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(FETCH_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch_html(&self, url: &Url) -> Option<String> {
        let response = match self.client.get(url.clone()).send() {
            Ok(response) => response,
            Err(error) => {
                tracing::debug!(%url, %error, "fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(%url, status = %response.status(), "non-success response");
            return None;
        }
        if let Some(content_type) = response.headers().get(header::CONTENT_TYPE) {
            match content_type.to_str() {
                Ok(value) if value.starts_with("text/html") => {}
                _ => return None,
            }
        }
        let bytes = response.bytes().ok()?;
        if bytes.len() > MAX_BODY_BYTES {
            tracing::debug!(%url, len = bytes.len(), "page too large");
            return None;
        }
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// URLs ever admitted to the frontier, plus the global page budget.
/// Admission and budget are checked under one mutex so concurrent
/// expansion cannot overshoot the limit.
struct Frontier {
    seen: HashSet<String>,
    limit: usize,
}

struct CrawlContext {
    queue: Arc<WorkQueue>,
    index: Arc<SharedIndex>,
    fetcher: Arc<dyn Fetch>,
    frontier: Mutex<Frontier>,
}

/// Breadth-first-in-intent crawler feeding the shared index through
/// the work queue. Completion order depends on fetch latency; only the
/// admission budget is guaranteed.
pub struct WebCrawler {
    context: Arc<CrawlContext>,
}

impl WebCrawler {
    pub fn new(queue: Arc<WorkQueue>, index: Arc<SharedIndex>, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            context: Arc::new(CrawlContext {
                queue,
                index,
                fetcher,
                frontier: Mutex::new(Frontier {
                    seen: HashSet::new(),
                    limit: 0,
                }),
            }),
        }
    }

    /// Crawls from `seed`, admitting at most `limit` URLs (the seed
    /// included; a limit of zero is raised to one). Blocks until every
    /// in-flight fetch has completed.
    pub fn crawl(&self, seed: Url, limit: usize) {
        let mut seed = seed;
        seed.set_fragment(None);
        {
            let mut frontier = self.context.frontier.lock();
            frontier.limit = limit.max(1);
            frontier.seen.insert(seed.to_string());
        }
        spawn_fetch(self.context.clone(), seed);
        self.context.queue.finish();
    }
}

fn spawn_fetch(context: Arc<CrawlContext>, url: Url) {
    let task_context = context.clone();
    context
        .queue
        .execute(move || fetch_task(task_context, url));
}

fn fetch_task(context: Arc<CrawlContext>, url: Url) {
    let Some(html) = context.fetcher.fetch_html(&url) else {
        tracing::debug!(%url, "nothing to index");
        return;
    };
    tracing::debug!(%url, "indexing page");

    // Parse lock-free into a local index, then merge once.
    let words = parse_words(&strip_html(&html));
    let mut local = InvertedIndex::new();
    local.add_all(&words, url.as_str(), 1);
    context.index.merge(local);

    let links = list_links(&url, &html);
    let mut frontier = context.frontier.lock();
    for link in links {
        // Reserve, then recurse: budget and membership are decided
        // together while the frontier is locked.
        if frontier.seen.len() >= frontier.limit {
            break;
        }
        if frontier.seen.insert(link.to_string()) {
            spawn_fetch(context.clone(), link);
        }
    }
}
