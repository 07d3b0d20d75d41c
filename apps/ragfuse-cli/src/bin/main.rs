use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ragfuse_cli::{load_engine, render_ranking};
use ragfuse_core::config::{resolve_with_base, Config};
use ragfuse_core::traits::Embedder;
use ragfuse_embed::get_default_embedder;
use ragfuse_hybrid::sources::source_links;
use ragfuse_hybrid::SynonymExpander;

#[derive(Parser, Debug)]
#[command(name = "ragfuse", version, about = "Hybrid vector + BM25 retrieval over a chunk corpus")]
struct Cli {
    /// Corpus directory of *.jsonl chunk files (defaults to corpus.dir from config)
    #[arg(long, global = true)]
    corpus: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Retrieve the top chunks for a query
    Query {
        text: String,
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        /// Print the full ranking and debug trace as JSON
        #[arg(long)]
        json: bool,
        /// Print source links (one per extract) after the ranking
        #[arg(long)]
        sources: Option<usize>,
    },
    /// Print corpus statistics
    Stats,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config = Config::load().inspect_err(|e| eprintln!("Error loading config: {}", e))?;
    let settings = config.settings()?;
    let cwd = std::env::current_dir()?;
    let corpus_dir: PathBuf = resolve_with_base(&cwd, cli.corpus.as_deref().unwrap_or(&settings.corpus.dir));
    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder(settings.corpus.embedding_dim)?);
    let engine = load_engine(&settings, &corpus_dir, embedder, true)?;

    match cli.command {
        Command::Query { text, top_k, json, sources } => {
            let retrieval = engine.retrieve(&text, top_k)?;
            for line in SynonymExpander::new(&settings.synonyms)?.glossary(&text) {
                eprintln!("{line}");
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&retrieval)?);
            } else {
                print!("{}", render_ranking(&retrieval));
            }
            if let Some(max) = sources {
                for link in source_links(&retrieval.debug, Some(max)) {
                    println!("- {}", link.url);
                }
            }
        }
        Command::Stats => {
            let stats = engine.snapshot()?.stats();
            println!("chunks: {}", stats.doc_count);
            println!("distinct terms: {}", stats.document_frequency.len());
            println!("avg chunk length: {:.2}", stats.avg_chunk_length);
        }
    }
    Ok(())
}
