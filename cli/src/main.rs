use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tarantula_core::persist;
use tarantula_core::{Crawler, IndexBuilder, QueryEngine, SharedWordIndex, WorkQueue};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

#[derive(Parser)]
#[command(name = "tarantula")]
#[command(about = "Build a searchable word index from local documents or a web crawl")]
struct Cli {
    /// Root directory or file of documents to index
    #[arg(long)]
    path: Option<PathBuf>,
    /// Seed URL to crawl
    #[arg(long)]
    seed: Option<String>,
    /// Maximum number of distinct URLs to fetch
    #[arg(long, default_value_t = 50)]
    limit: usize,
    /// Number of worker threads
    #[arg(long, default_value_t = tarantula_core::scheduler::DEFAULT_THREADS)]
    threads: usize,
    /// File of newline-separated query lines
    #[arg(long)]
    query: Option<PathBuf>,
    /// Match query terms exactly instead of by prefix
    #[arg(long, default_value_t = false)]
    exact: bool,
    /// Write the index as JSON to this path
    #[arg(long)]
    index_out: Option<PathBuf>,
    /// Write ranked query results as JSON to this path
    #[arg(long)]
    results_out: Option<PathBuf>,
    /// Comma-separated document extensions to index
    #[arg(long, default_value = "html,htm,txt")]
    extensions: String,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let queue = Arc::new(WorkQueue::new(args.threads));
    let index = Arc::new(SharedWordIndex::new());

    if let Some(root) = &args.path {
        let extensions = args
            .extensions
            .split(',')
            .map(|ext| ext.trim().to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        let builder = IndexBuilder::with_extensions(index.clone(), queue.clone(), extensions);
        builder.walk(root);
    }

    let crawler = match &args.seed {
        Some(seed) => {
            let seed = Url::parse(seed).with_context(|| format!("invalid seed url {seed}"))?;
            let crawler = Crawler::new(index.clone(), queue.clone(), args.limit);
            crawler.crawl(seed);
            Some(crawler)
        }
        None => None,
    };

    queue.finish();
    tracing::info!(words = index.word_count(), "index build complete");
    if let Some(crawler) = &crawler {
        tracing::info!(urls = crawler.claimed(), "crawl complete");
    }

    if let Some(out) = &args.index_out {
        persist::write_index(&index, out)?;
        tracing::info!(path = %out.display(), "wrote index");
    }

    if let Some(queries) = &args.query {
        let engine = QueryEngine::new(index.clone(), queue.clone(), args.exact);
        engine.search_file(queries)?;
        queue.finish();
        tracing::info!(queries = engine.copy_queries().len(), "search complete");

        if let Some(out) = &args.results_out {
            persist::write_results(&engine.export_ranked(), out)?;
            tracing::info!(path = %out.display(), "wrote results");
        }
    }

    queue.shutdown();
    Ok(())
}
