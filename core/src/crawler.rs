use crate::fetch;
use crate::index::WordIndex;
use crate::normalize;
use crate::scheduler::WorkQueue;
use crate::shared::SharedWordIndex;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Default cap on the number of distinct URLs ever fetched.
pub const DEFAULT_LIMIT: usize = 50;

/// Bounded, deduplicated set of URLs already claimed for crawling.
///
/// Admission is one atomic step per candidate batch: bound check, membership
/// check, HTML check, and insert all happen under a single lock, so two
/// workers can never claim the same URL or push the set past its capacity.
pub struct Frontier {
    limit: usize,
    seen: Mutex<HashSet<String>>,
}

impl Frontier {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Claims the seed without any of the admission checks.
    pub fn insert_unchecked(&self, url: &Url) {
        self.seen.lock().insert(url.to_string());
    }

    /// Filters a candidate batch down to the URLs this caller just claimed.
    /// Once the bound is reached no further candidates are admitted.
    pub fn admit(&self, candidates: Vec<Url>) -> Vec<Url> {
        let mut seen = self.seen.lock();
        let mut admitted = Vec::new();
        for url in candidates {
            if seen.len() >= self.limit {
                break;
            }
            if seen.contains(url.as_str()) || !fetch::looks_like_html(&url) {
                continue;
            }
            seen.insert(url.to_string());
            admitted.push(url);
        }
        admitted
    }

    /// Number of URLs claimed so far.
    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

/// Breadth-first web crawler fanning out through the work queue.
///
/// Every fetch task owns its URL and a private local index; the shared index
/// sees exactly one merge per page. Malformed URLs, connection failures, and
/// non-HTML responses are task-local outcomes that contribute nothing and
/// never stop the crawl.
pub struct Crawler {
    inner: Arc<CrawlerInner>,
}

struct CrawlerInner {
    index: Arc<SharedWordIndex>,
    queue: Arc<WorkQueue>,
    frontier: Frontier,
}

impl Crawler {
    pub fn new(index: Arc<SharedWordIndex>, queue: Arc<WorkQueue>, limit: usize) -> Self {
        Self {
            inner: Arc::new(CrawlerInner {
                index,
                queue,
                frontier: Frontier::new(limit),
            }),
        }
    }

    /// Claims the seed unconditionally and schedules its fetch as the first
    /// task.
    pub fn crawl(&self, seed: Url) {
        let mut seed = seed;
        seed.set_fragment(None);
        self.inner.frontier.insert_unchecked(&seed);
        let inner = self.inner.clone();
        self.inner.queue.submit(move || fetch_task(&inner, seed));
    }

    /// Number of distinct URLs claimed so far.
    pub fn claimed(&self) -> usize {
        self.inner.frontier.len()
    }
}

fn fetch_task(inner: &Arc<CrawlerInner>, url: Url) {
    let html = match fetch::fetch_html(&url) {
        Ok(Some(html)) => html,
        Ok(None) => {
            tracing::debug!(%url, "skipping non-html response");
            return;
        }
        Err(error) => {
            tracing::warn!(%url, %error, "fetch failed");
            return;
        }
    };

    // Links resolve against the fetched page, not the seed.
    let links = fetch::list_links(&url, &html);
    for next in inner.frontier.admit(links) {
        let task_inner = inner.clone();
        inner.queue.submit(move || fetch_task(&task_inner, next));
    }

    let cleaned = normalize::strip_html(&html);
    if cleaned.is_empty() {
        return;
    }
    let mut local = WordIndex::new();
    local.add_all(cleaned.split_whitespace(), url.as_str());
    inner.index.merge_from(local);
}
