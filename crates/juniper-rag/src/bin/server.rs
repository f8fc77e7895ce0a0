//! Juniper server binary
//!
//! Run with: cargo run -p juniper-rag --bin juniper-server -- --config juniper.toml

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use juniper_rag::{
    config::{CompletionBackend, RagConfig},
    ingestion::{corpus_fingerprint, load_corpus, to_documents},
    providers::{
        CompletionService, GroqClient, InMemoryIndex, OllamaChat, OllamaEmbedder, SemanticIndex,
    },
    server::RagServer,
    RagEngine,
};

#[derive(Parser, Debug)]
#[command(name = "juniper-server", version, about = "Bilingual medical research assistant server")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Knowledge corpus JSON (overrides the configured path)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Re-embed the corpus even if a matching index cache exists
    #[arg(long)]
    rebuild_index: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "juniper_rag=info,juniper_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                         Juniper                           ║
║      Medical Research Assistant (English / Roman Urdu)    ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    let mut config = RagConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(corpus) = args.corpus {
        config.knowledge.corpus_path = corpus;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Completion backend: {:?}", config.llm.backend);
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Top K: {}", config.retrieval.top_k);

    let embedder = Arc::new(OllamaEmbedder::new(&config.embeddings)?);
    let index = Arc::new(InMemoryIndex::new(embedder));
    prepare_index(&index, &config, args.rebuild_index).await;
    if index.passage_count() == 0 {
        tracing::error!("Knowledge index is empty; every query will receive the fallback answer");
    }

    let llm: Arc<dyn CompletionService> = match config.llm.backend {
        CompletionBackend::Groq => {
            if config.llm.api_key.is_none() {
                tracing::warn!("No Groq API key configured");
                tracing::warn!("Set JUNIPER_LLM_API_KEY (or GROQ_API_KEY), or use backend = \"ollama\"");
            }
            Arc::new(GroqClient::new(&config.llm)?)
        }
        CompletionBackend::Ollama => Arc::new(OllamaChat::new(&config.llm)?),
    };

    tracing::info!("Checking {} ({})...", llm.name(), llm.model());
    match llm.health_check().await {
        Ok(true) => tracing::info!("Completion service is reachable"),
        _ => tracing::warn!(
            "Completion service not available at {}; chat requests will return an apology",
            config.llm.base_url
        ),
    }

    let index: Arc<dyn SemanticIndex> = index;
    let engine = RagEngine::new(index, llm, &config);
    let server = RagServer::new(config, engine);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/api/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/chat  - Ask a question");
    println!("  POST /api/clear - Forget a conversation");
    println!("  GET  /api/stats - Statistics");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}

/// Load the cached index, or embed the corpus and cache it.
///
/// Failures leave the index empty; queries then take the fallback path.
async fn prepare_index(index: &InMemoryIndex, config: &RagConfig, rebuild: bool) {
    let corpus_path = &config.knowledge.corpus_path;
    let entries = match load_corpus(corpus_path) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::error!("Knowledge corpus unavailable: {}", e);
            return;
        }
    };

    let fingerprint = corpus_fingerprint(&entries);
    let cache_path = config.knowledge.index_path.as_path();

    if !rebuild {
        match index.load(cache_path, &fingerprint) {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => tracing::warn!("Ignoring unreadable index cache {}: {}", cache_path.display(), e),
        }
    }

    tracing::info!("Embedding {} knowledge entries...", entries.len());
    index.reset();
    if let Err(e) = index.add_documents(&to_documents(&entries)).await {
        tracing::error!("Failed to build index from {}: {}", corpus_path.display(), e);
        index.reset();
        return;
    }

    save_cache(index, cache_path, &fingerprint);
}

fn save_cache(index: &InMemoryIndex, path: &Path, fingerprint: &str) {
    if let Err(e) = index.save(path, fingerprint) {
        tracing::warn!("Could not write index cache {}: {}", path.display(), e);
    }
}
