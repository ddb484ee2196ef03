use crate::index::WordIndex;
use crate::query::QueryResults;
use crate::shared::SharedWordIndex;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Writes the index snapshot as pretty JSON: word -> path -> positions,
/// every level sorted ascending.
pub fn write_index(index: &SharedWordIndex, path: &Path) -> Result<()> {
    let snapshot = index.export_sorted();
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &snapshot)?;
    writer.flush()?;
    Ok(())
}

/// Loads a persisted index snapshot back into a plain index.
pub fn load_index(path: &Path) -> Result<WordIndex> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let snapshot: BTreeMap<String, BTreeMap<String, Vec<usize>>> =
        serde_json::from_reader(BufReader::new(file))?;

    let mut index = WordIndex::new();
    for (word, paths) in snapshot {
        for (doc, positions) in paths {
            for position in positions {
                index.add(&word, &doc, position);
            }
        }
    }
    Ok(index)
}

/// Writes ranked query results as a pretty JSON array, sorted by canonical
/// query with each result list already in ranking order.
pub fn write_results(results: &[QueryResults], path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, results)?;
    writer.flush()?;
    Ok(())
}
