//! FAQ RAG server binary
//!
//! Run with: cargo run -p faq-rag --bin faq-rag-server

use faq_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "faq_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                      FAQ RAG System                       ║
║          Grounded FAQ answers with policy guards          ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // FAQ_RAG_CONFIG points at a TOML file; defaults otherwise
    let config = RagConfig::from_env()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!("  - Documents: {}", config.storage.documents_path.display());
    tracing::info!("  - Index: {}", config.storage.index_path.display());
    tracing::info!("  - Audit log: {}", config.storage.audit_log_path.display());

    let server = RagServer::new(config.clone()).await?;

    tracing::info!("Checking Ollama at {}...", config.llm.base_url);
    if server.state().check_providers().await {
        tracing::info!("Ollama is running");
    } else {
        tracing::warn!("Ollama not available at {}, /ready reports 503", config.llm.base_url);
        tracing::warn!(
            "  Start it with `ollama serve`, then `ollama pull {}` and `ollama pull {}`",
            config.embeddings.model,
            config.llm.generate_model
        );
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/ingest - Upload a file (file, is_qa)");
    println!("  POST /api/query  - Ask a question");
    println!("  GET  /api/stats  - Corpus size");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
