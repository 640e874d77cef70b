//! Offline tooling: QA extraction to JSON and bulk indexing
//!
//! Run with: cargo run -p faq-rag --features cli --bin faq-rag-cli -- --help

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use faq_rag::config::RagConfig;
use faq_rag::extraction::QaExtractor;
use faq_rag::ingestion::{extract_records, FileParser, IngestionCoordinator};
use faq_rag::providers::ollama_providers;
use faq_rag::server::state::AppState;
use faq_rag::storage::Corpus;
use faq_rag::types::qa::QaCollection;

#[derive(Parser)]
#[command(name = "faq-rag-cli", about = "FAQ extraction and indexing", version)]
struct Cli {
    /// TOML configuration file (overrides FAQ_RAG_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract question/answer pairs from a .xlsx, .pdf or .txt file
    Extract {
        /// Source file
        file: PathBuf,
        /// Write JSON here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Append the pairs of an extracted JSON file to the corpus
    Index {
        /// JSON file of the form {"questions": [{question, answer}]}
        #[arg(long)]
        qa_path: PathBuf,
    },

    /// Answer a question from the command line
    Ask {
        query: String,
    },

    /// Show document and vector counts
    Stats,
}

fn load_config(path: Option<&Path>) -> Result<RagConfig> {
    let config = match path {
        Some(path) => RagConfig::load(Some(path))?,
        None => RagConfig::from_env()?,
    };
    Ok(config)
}

fn extract(config: &RagConfig, file: &Path, output: Option<&Path>) -> Result<()> {
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("Source path has no file name")?;
    let data = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;

    let content = FileParser::parse(filename, &data, config.extraction.skip_sheets)?;
    let extractor = QaExtractor::new(&config.extraction)?;
    let collection = QaCollection {
        questions: extract_records(&extractor, &content),
    };
    let json = serde_json::to_string_pretty(&collection)?;

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Extracted {} QA pairs to {}",
                collection.questions.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn index(config: &RagConfig, qa_path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(qa_path)
        .with_context(|| format!("Failed to read {}", qa_path.display()))?;
    let collection: QaCollection =
        serde_json::from_str(&raw).with_context(|| format!("Invalid QA file {}", qa_path.display()))?;
    if collection.questions.is_empty() {
        bail!("No questions in {}", qa_path.display());
    }

    let (embedder, _) = ollama_providers(&config.llm, &config.embeddings)?;
    let corpus = Arc::new(Corpus::from_config(&config.storage, &config.embeddings)?);
    let coordinator = IngestionCoordinator::new(
        corpus,
        Arc::new(embedder),
        QaExtractor::new(&config.extraction)?,
        config.extraction.skip_sheets,
    );

    let outcome = coordinator.ingest_records(&collection.questions).await?;
    println!(
        "Indexed {} documents ({} total)",
        outcome.documents_added, outcome.total_documents
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("faq_rag=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Extract { file, output } => extract(&config, &file, output.as_deref())?,
        Command::Index { qa_path } => index(&config, &qa_path).await?,
        Command::Ask { query } => {
            let state = AppState::new(config).await?;
            match state.pipeline().answer(&query).await {
                Ok(answer) => println!("{}", answer),
                Err(e) if e.is_policy_violation() => {
                    eprintln!("{}", e);
                    std::process::exit(2);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Command::Stats => {
            let corpus = Corpus::from_config(&config.storage, &config.embeddings)?;
            let stats = corpus.stats();
            println!("documents:  {}", stats.documents);
            println!("vectors:    {}", stats.vectors);
            match stats.dimensions {
                Some(d) => println!("dimensions: {}", d),
                None => println!("dimensions: -"),
            }
        }
    }

    Ok(())
}
