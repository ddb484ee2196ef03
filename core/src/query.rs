use crate::index::{self, SearchMatch};
use crate::normalize;
use crate::scheduler::WorkQueue;
use crate::shared::SharedWordIndex;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// One canonical query with its ranked matches, in the persisted result
/// shape.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResults {
    pub queries: String,
    pub results: Vec<SearchMatch>,
}

/// Canonicalizes query lines and dispatches one search task per distinct
/// canonical query.
///
/// The canonical key is the normalized terms sorted and rejoined, so two
/// differently-ordered but term-identical lines collapse to one search. The
/// check-and-mark against the shared result map is a single critical
/// section, which keeps concurrent dispatch of duplicate lines down to one
/// task.
pub struct QueryEngine {
    index: Arc<SharedWordIndex>,
    queue: Arc<WorkQueue>,
    exact: bool,
    results: Arc<Mutex<HashMap<String, Vec<SearchMatch>>>>,
}

impl QueryEngine {
    /// `exact` selects exact-word matching; otherwise terms match indexed
    /// words by prefix.
    pub fn new(index: Arc<SharedWordIndex>, queue: Arc<WorkQueue>, exact: bool) -> Self {
        Self {
            index,
            queue,
            exact,
            results: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Dispatches one search per line of the file.
    pub fn search_file(&self, path: &Path) -> Result<()> {
        let file = File::open(path).with_context(|| format!("open queries {}", path.display()))?;
        for line in BufReader::new(file).lines() {
            let line = line.with_context(|| format!("read queries {}", path.display()))?;
            self.search_line(&line);
        }
        Ok(())
    }

    /// Normalizes one raw query line and submits a search task for it unless
    /// the line is empty after cleaning or its canonical form was already
    /// dispatched this run.
    pub fn search_line(&self, line: &str) {
        let cleaned = normalize::clean_query(line);
        if cleaned.is_empty() {
            return;
        }

        let mut terms: Vec<String> = cleaned.split_whitespace().map(str::to_string).collect();
        terms.sort();
        let canonical = terms.join(" ");

        {
            // Mark before dispatch; the placeholder claims the key so a
            // concurrent duplicate line is skipped, not searched twice.
            let mut results = self.results.lock();
            if results.contains_key(&canonical) {
                tracing::debug!(query = %canonical, "duplicate query skipped");
                return;
            }
            results.insert(canonical.clone(), Vec::new());
        }

        let index = self.index.clone();
        let results = self.results.clone();
        let exact = self.exact;
        self.queue.submit(move || {
            let matches = if exact {
                index.exact_search(&terms)
            } else {
                index.partial_search(&terms)
            };
            results.lock().insert(canonical, matches);
        });
    }

    /// Sorted copy of every canonical query dispatched this run.
    pub fn copy_queries(&self) -> Vec<String> {
        let mut queries: Vec<String> = self.results.lock().keys().cloned().collect();
        queries.sort();
        queries
    }

    /// Ranked copy of the matches for one canonical query, empty if it was
    /// never dispatched.
    pub fn copy_results(&self, query: &str) -> Vec<SearchMatch> {
        let mut matches = self
            .results
            .lock()
            .get(query)
            .cloned()
            .unwrap_or_default();
        index::rank(&mut matches);
        matches
    }

    /// Every query with its ranked matches, sorted by canonical query
    /// string. Call after the completion barrier so no search is mid-flight.
    pub fn export_ranked(&self) -> Vec<QueryResults> {
        self.copy_queries()
            .into_iter()
            .map(|queries| {
                let results = self.copy_results(&queries);
                QueryResults { queries, results }
            })
            .collect()
    }
}
