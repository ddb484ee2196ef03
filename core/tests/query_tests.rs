use std::fs;
use std::sync::Arc;
use tarantula_core::{persist, QueryEngine, SharedWordIndex, WordIndex, WorkQueue};
use tempfile::tempdir;

fn fixture_index() -> Arc<SharedWordIndex> {
    let shared = Arc::new(SharedWordIndex::new());
    let mut local = WordIndex::new();
    local.add_all(["the", "cat", "chased", "the", "dog"], "pets.txt");
    local.add_all(["catalog", "of", "dog", "breeds", "dog"], "breeds.txt");
    shared.merge_from(local);
    shared
}

#[test]
fn canonicalization_collapses_reordered_queries() {
    let index = fixture_index();
    let queue = Arc::new(WorkQueue::new(4));
    let engine = QueryEngine::new(index, queue.clone(), true);

    engine.search_line("Dog Cat");
    engine.search_line("cat dog");
    engine.search_line("  cat,  DOG!! ");
    queue.finish();

    assert_eq!(engine.copy_queries(), vec!["cat dog"]);
}

#[test]
fn empty_and_punctuation_only_lines_are_skipped() {
    let index = fixture_index();
    let queue = Arc::new(WorkQueue::new(2));
    let engine = QueryEngine::new(index, queue.clone(), true);

    engine.search_line("");
    engine.search_line("   ");
    engine.search_line("1234 !!!");
    queue.finish();

    assert!(engine.copy_queries().is_empty());
}

#[test]
fn exact_results_accumulate_across_terms() {
    let index = fixture_index();
    let queue = Arc::new(WorkQueue::new(2));
    let engine = QueryEngine::new(index, queue.clone(), true);

    engine.search_line("cat dog");
    queue.finish();

    let results = engine.copy_results("cat dog");
    assert_eq!(results.len(), 2);
    // Both paths reach frequency 2; pets.txt wins the tie with the earlier
    // position ("cat" at 2 versus breeds.txt "dog" at 3).
    assert_eq!(results[0].path, "pets.txt");
    assert_eq!(results[0].frequency, 2);
    assert_eq!(results[0].position, 2);
    assert_eq!(results[1].path, "breeds.txt");
    assert_eq!(results[1].frequency, 2);
    assert_eq!(results[1].position, 3);
}

#[test]
fn partial_results_include_prefix_matches() {
    let index = fixture_index();
    let queue = Arc::new(WorkQueue::new(2));
    let engine = QueryEngine::new(index, queue.clone(), false);

    engine.search_line("cat");
    queue.finish();

    let results = engine.copy_results("cat");
    // "cat" in pets.txt and "catalog" in breeds.txt both match.
    assert_eq!(results.len(), 2);
    let paths: Vec<&str> = results.iter().map(|m| m.path.as_str()).collect();
    assert!(paths.contains(&"pets.txt"));
    assert!(paths.contains(&"breeds.txt"));
}

#[test]
fn unmatched_query_yields_empty_results() {
    let index = fixture_index();
    let queue = Arc::new(WorkQueue::new(2));
    let engine = QueryEngine::new(index, queue.clone(), true);

    engine.search_line("zebra");
    queue.finish();

    assert_eq!(engine.copy_queries(), vec!["zebra"]);
    assert!(engine.copy_results("zebra").is_empty());
}

#[test]
fn search_file_dispatches_every_line() {
    let dir = tempdir().unwrap();
    let queries = dir.path().join("queries.txt");
    fs::write(&queries, "cat dog\nzebra\n\ndog cat\n").unwrap();

    let index = fixture_index();
    let queue = Arc::new(WorkQueue::new(2));
    let engine = QueryEngine::new(index, queue.clone(), true);
    engine.search_file(&queries).unwrap();
    queue.finish();

    assert_eq!(engine.copy_queries(), vec!["cat dog", "zebra"]);
}

#[test]
fn exported_results_round_trip_as_sorted_json() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("results.json");

    let index = fixture_index();
    let queue = Arc::new(WorkQueue::new(2));
    let engine = QueryEngine::new(index, queue.clone(), true);
    engine.search_line("dog");
    engine.search_line("cat");
    queue.finish();

    persist::write_results(&engine.export_ranked(), &out).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();

    let entries = json.as_array().unwrap();
    assert_eq!(entries[0]["queries"], "cat");
    assert_eq!(entries[1]["queries"], "dog");
    let dog_results = entries[1]["results"].as_array().unwrap();
    assert_eq!(dog_results[0]["where"], "breeds.txt");
    assert_eq!(dog_results[0]["count"], 2);
    assert_eq!(dog_results[0]["index"], 3);
}
