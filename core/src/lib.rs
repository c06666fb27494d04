pub mod builder;
pub mod crawler;
pub mod html;
pub mod index;
pub mod lock;
pub mod output;
pub mod query;
pub mod queue;
pub mod shared;
pub mod tokenizer;

pub use index::{InvertedIndex, SearchResult};
pub use lock::ReadWriteLock;
pub use queue::WorkQueue;
pub use shared::SharedIndex;

/// Worker threads used when no explicit count is configured.
pub const DEFAULT_THREADS: usize = 5;

/// Pages admitted per crawl when no explicit limit is configured.
pub const DEFAULT_CRAWL_LIMIT: usize = 50;
