use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Unsynchronized inverted index mapping word -> path -> positions.
///
/// Positions are 1-based ordinals in the document's normalized token stream
/// and are deduplicated; inserting the same position twice is a no-op. The
/// maps themselves are unordered, so every read-side listing sorts before
/// returning.
#[derive(Debug, Default, Clone)]
pub struct WordIndex {
    entries: HashMap<String, HashMap<String, BTreeSet<usize>>>,
}

impl WordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the word and the position it was found at to the index, creating
    /// the intermediate maps as needed.
    pub fn add(&mut self, word: &str, path: &str, position: usize) {
        self.entries
            .entry(word.to_string())
            .or_default()
            .entry(path.to_string())
            .or_default()
            .insert(position);
    }

    /// Adds a whole token stream at once, numbering positions from 1.
    pub fn add_all<'a, I>(&mut self, words: I, path: &str)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for (i, word) in words.into_iter().enumerate() {
            self.add(word, path, i + 1);
        }
    }

    /// Number of positions recorded for a word within a path. Returns zero
    /// for anything never indexed.
    pub fn count(&self, word: &str, path: &str) -> usize {
        self.entries
            .get(word)
            .and_then(|paths| paths.get(path))
            .map_or(0, BTreeSet::len)
    }

    /// Number of distinct words stored in the index.
    pub fn word_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.entries.contains_key(word)
    }

    /// Sorted copy of the indexed words.
    pub fn copy_words(&self) -> Vec<String> {
        let mut words: Vec<String> = self.entries.keys().cloned().collect();
        words.sort();
        words
    }

    /// Sorted copy of the paths a word was found in, empty if the word was
    /// never indexed.
    pub fn copy_paths(&self, word: &str) -> Vec<String> {
        let mut paths: Vec<String> = self
            .entries
            .get(word)
            .map(|paths| paths.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }

    /// Sorted copy of the positions for a word/path pair, empty if never
    /// indexed.
    pub fn copy_positions(&self, word: &str, path: &str) -> Vec<usize> {
        self.entries
            .get(word)
            .and_then(|paths| paths.get(path))
            .map(|positions| positions.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Imports every entry of another index. Entry-level merging is
    /// commutative and idempotent, so interleaved merges from different
    /// producers converge on the same contents.
    pub fn merge_from(&mut self, other: WordIndex) {
        for (word, paths) in other.entries {
            let into = self.entries.entry(word).or_default();
            for (path, positions) in paths {
                into.entry(path).or_default().extend(positions);
            }
        }
    }

    /// Matches only indexed words identical to a query term. Results carry
    /// one accumulator per path with summed frequency and the earliest
    /// position across all matching terms.
    pub fn exact_search(&self, terms: &[String]) -> Vec<SearchMatch> {
        let mut by_path: HashMap<String, SearchMatch> = HashMap::new();
        for term in terms {
            if let Some(paths) = self.entries.get(term) {
                fold_paths(&mut by_path, paths);
            }
        }
        by_path.into_values().collect()
    }

    /// Matches indexed words that start with a query term. A path matched
    /// via several indexed words or several terms accumulates one summed
    /// frequency and a single overall earliest position.
    pub fn partial_search(&self, terms: &[String]) -> Vec<SearchMatch> {
        let mut by_path: HashMap<String, SearchMatch> = HashMap::new();
        for term in terms {
            for (word, paths) in &self.entries {
                if word.starts_with(term.as_str()) {
                    fold_paths(&mut by_path, paths);
                }
            }
        }
        by_path.into_values().collect()
    }

    /// Fully sorted snapshot of the index contents, in the shape of the
    /// persisted JSON: word -> path -> ascending positions.
    pub fn export_sorted(&self) -> BTreeMap<String, BTreeMap<String, Vec<usize>>> {
        self.entries
            .iter()
            .map(|(word, paths)| {
                let paths = paths
                    .iter()
                    .map(|(path, positions)| (path.clone(), positions.iter().copied().collect()))
                    .collect();
                (word.clone(), paths)
            })
            .collect()
    }
}

fn fold_paths(
    by_path: &mut HashMap<String, SearchMatch>,
    paths: &HashMap<String, BTreeSet<usize>>,
) {
    for (path, positions) in paths {
        let frequency = positions.len();
        let Some(first) = positions.iter().next().copied() else {
            continue;
        };
        by_path
            .entry(path.clone())
            .and_modify(|found| found.update(frequency, first))
            .or_insert_with(|| SearchMatch {
                path: path.clone(),
                frequency,
                position: first,
            });
    }
}

/// Per-path accumulator for a single query: cumulative frequency and the
/// earliest position seen. Serializes with the persisted result field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    #[serde(rename = "where")]
    pub path: String,
    #[serde(rename = "count")]
    pub frequency: usize,
    #[serde(rename = "index")]
    pub position: usize,
}

impl SearchMatch {
    /// Folds another occurrence batch in: frequencies add, the earliest
    /// position wins.
    pub fn update(&mut self, frequency: usize, position: usize) {
        self.frequency += frequency;
        if position < self.position {
            self.position = position;
        }
    }

    /// Ranking order: descending frequency, then ascending earliest
    /// position, then case-insensitive path.
    pub fn rank_cmp(&self, other: &SearchMatch) -> Ordering {
        other
            .frequency
            .cmp(&self.frequency)
            .then(self.position.cmp(&other.position))
            .then_with(|| self.path.to_lowercase().cmp(&other.path.to_lowercase()))
    }
}

/// Sorts matches into ranking order.
pub fn rank(matches: &mut [SearchMatch]) {
    matches.sort_by(SearchMatch::rank_cmp);
}
