//! CLI commands: `index`, `search`, `strategies`.
//!
//! Each command builds its own [`Rag`] from the loaded configuration; the
//! index lives only for the duration of one invocation.

use anyhow::Result;
use clap::ValueEnum;
use std::path::Path;

use crate::config::{validate, Config};
use crate::rag::{render_context, Rag};
use crate::strategy::RetrievalMode;

/// How `search` prints its results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Numbered list with scores and excerpts.
    #[default]
    Text,
    /// JSON array of `{content, source}` objects.
    Json,
    /// The context block handed to an SQL optimizer.
    Prompt,
}

/// Index `repo` and print what was found.
pub async fn run_index(config: &Config, repo: &Path) -> Result<()> {
    let rag = Rag::new(config)?;
    let stats = rag.index_directory(repo).await?;

    println!("Indexed {} ({} mode)", repo.display(), rag.mode());
    println!("  files indexed: {}", stats.files_indexed);
    println!("  files skipped: {}", stats.files_skipped);
    println!("  fragments: {}", stats.fragments);
    println!("  backends: {}", stats.backends.join(", "));
    Ok(())
}

/// Index `repo`, then retrieve context for `query`.
///
/// `mode` and `top_k` override the configuration when given.
pub async fn run_search(
    config: &Config,
    repo: &Path,
    query: &str,
    mode: Option<RetrievalMode>,
    top_k: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(mode) = mode {
        config.retrieval.mode = mode;
    }
    if let Some(k) = top_k {
        config.retrieval.top_k = k;
    }
    validate(&config)?;

    let rag = Rag::new(&config)?;
    rag.index_directory(repo).await?;
    let k = config.retrieval.top_k;

    match format {
        OutputFormat::Json => {
            let fragments = rag.retrieve(query, k).await?;
            println!("{}", serde_json::to_string_pretty(&fragments)?);
        }
        OutputFormat::Prompt => {
            let fragments = rag.retrieve(query, k).await?;
            print!("{}", render_context(&fragments));
        }
        OutputFormat::Text => {
            let results = rag.retrieve_scored(query, k).await?;
            let backends = rag.backend_names().len();
            if results.is_empty() {
                println!("No results.");
                return Ok(());
            }
            for (i, result) in results.iter().enumerate() {
                println!(
                    "{}. [{:.2}] {} ({} of {} backends)",
                    i + 1,
                    result.score,
                    result.fragment.source,
                    result.hits,
                    backends,
                );
                println!(
                    "    excerpt: \"{}\"",
                    excerpt(&result.fragment.content, 160)
                );
                println!();
            }
        }
    }
    Ok(())
}

/// First `max_chars` characters of `content` on a single line.
fn excerpt(content: &str, max_chars: usize) -> String {
    let flat = content.replace('\n', " ");
    let flat = flat.trim();
    if flat.chars().count() <= max_chars {
        return flat.to_string();
    }
    let mut out: String = flat.chars().take(max_chars).collect();
    out.push('…');
    out
}

/// Describe every retrieval mode.
pub fn print_strategies() {
    for mode in RetrievalMode::ALL {
        let info = mode.info();
        println!("{} ({})", mode, info.name);
        println!("    components: {}", info.components.join(", "));
        println!("    use case: {}", info.use_case);
        println!("    pros: {}", info.pros.join("; "));
        println!("    cons: {}", info.cons.join("; "));
        println!();
    }
}
