//! Concurrent search engine core: an inverted word index populated from
//! local documents and a crawled web subgraph, searched with exact or
//! prefix queries, all under caller-controlled concurrency.

pub mod builder;
pub mod crawler;
pub mod fetch;
pub mod index;
pub mod lock;
pub mod normalize;
pub mod persist;
pub mod query;
pub mod scheduler;
pub mod shared;

pub use builder::IndexBuilder;
pub use crawler::{Crawler, Frontier};
pub use index::{SearchMatch, WordIndex};
pub use lock::ReadWriteLock;
pub use query::{QueryEngine, QueryResults};
pub use scheduler::WorkQueue;
pub use shared::SharedWordIndex;
