use crate::index::WordIndex;
use crate::normalize;
use crate::scheduler::WorkQueue;
use crate::shared::SharedWordIndex;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions indexed when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["html", "htm", "txt"];

/// Populates the shared index from a directory tree.
///
/// Fan-out happens one directory level at a time: walking a directory
/// submits one task per immediate child, so large trees load-balance across
/// the pool instead of serializing behind one subtree walk. Each document
/// task builds a private local index and merges it into the shared index
/// exactly once.
pub struct IndexBuilder {
    index: Arc<SharedWordIndex>,
    queue: Arc<WorkQueue>,
    extensions: Arc<Vec<String>>,
}

impl IndexBuilder {
    pub fn new(index: Arc<SharedWordIndex>, queue: Arc<WorkQueue>) -> Self {
        let extensions = DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        Self::with_extensions(index, queue, extensions)
    }

    /// Extensions are matched case-insensitively against each file name.
    pub fn with_extensions(
        index: Arc<SharedWordIndex>,
        queue: Arc<WorkQueue>,
        extensions: Vec<String>,
    ) -> Self {
        let extensions = extensions.into_iter().map(|e| e.to_lowercase()).collect();
        Self {
            index,
            queue,
            extensions: Arc::new(extensions),
        }
    }

    /// Submits parse tasks for a recognized document, or one walk task per
    /// child entry of a directory. Anything else is silently skipped.
    pub fn walk(&self, root: &Path) {
        walk_entry(
            &self.index,
            &self.queue,
            &self.extensions,
            root.to_path_buf(),
        );
    }
}

fn walk_entry(
    index: &Arc<SharedWordIndex>,
    queue: &Arc<WorkQueue>,
    extensions: &Arc<Vec<String>>,
    path: PathBuf,
) {
    if path.is_file() {
        if !has_indexed_extension(&path, extensions) {
            tracing::debug!(path = %path.display(), "skipping unrecognized file");
            return;
        }
        let index = index.clone();
        queue.submit(move || {
            if let Err(error) = parse_document(&index, &path) {
                tracing::warn!(path = %path.display(), %error, "failed to index document");
            }
        });
    } else if path.is_dir() {
        let entries = match fs::read_dir(&path) {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "failed to list directory");
                return;
            }
        };
        for entry in entries.flatten() {
            let index = index.clone();
            let queue_for_task = queue.clone();
            let extensions = extensions.clone();
            let child = entry.path();
            queue.submit(move || {
                walk_entry(&index, &queue_for_task, &extensions, child);
            });
        }
    }
    // Special or unreadable entries fall through untouched; not an error.
}

fn has_indexed_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .is_some_and(|ext| extensions.iter().any(|allowed| *allowed == ext))
}

/// Reads one document, normalizes it, and merges the resulting local index
/// into the shared index under a single write acquisition. Empty normalized
/// text contributes nothing.
fn parse_document(index: &SharedWordIndex, path: &Path) -> Result<()> {
    let raw = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let text = String::from_utf8_lossy(&raw);
    let cleaned = normalize::strip_html(&text);
    if cleaned.is_empty() {
        return Ok(());
    }

    let mut local = WordIndex::new();
    local.add_all(cleaned.split_whitespace(), &path.to_string_lossy());
    index.merge_from(local);
    Ok(())
}
